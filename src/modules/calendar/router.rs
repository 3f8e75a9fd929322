use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_entry, delete_entry, generate_calendar, get_day_entries, get_entries, get_entry,
    renumber_calendar, reset_calendar, update_entry, update_summary,
};

/// Routes nested under `/classes/{id}/calendar`.
pub fn init_class_calendar_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_entries).post(create_entry))
        .route("/generate", post(generate_calendar))
        .route("/reset", post(reset_calendar))
        .route("/renumber", post(renumber_calendar))
}

/// Routes nested under `/calendar`.
pub fn init_calendar_entries_router() -> Router<AppState> {
    Router::new()
        .route("/day", get(get_day_entries))
        .route(
            "/entries/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/entries/{id}/summary", patch(update_summary))
}
