use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    activate_school_year, close_school_year, create_school_year, delete_school_year,
    get_active_school_year, get_school_year, get_school_years, reopen_school_year,
    update_school_year,
};

pub fn init_school_years_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_school_year).get(get_school_years))
        .route("/active", get(get_active_school_year))
        .route(
            "/{id}",
            get(get_school_year)
                .put(update_school_year)
                .delete(delete_school_year),
        )
        .route("/{id}/activate", post(activate_school_year))
        .route("/{id}/close", post(close_school_year))
        .route("/{id}/reopen", post(reopen_school_year))
}
