use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{export_grades, get_evaluations, get_grades, upsert_evaluations};

/// Routes nested under `/calendar/entries/{id}/evaluations`.
pub fn init_entry_evaluations_router() -> Router<AppState> {
    Router::new().route("/", get(get_evaluations).put(upsert_evaluations))
}

/// Routes nested under `/classes/{id}/grades`.
pub fn init_class_grades_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_grades))
        .route("/export", get(export_grades))
}
