use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    add_national_holidays, create_holiday, create_interruption, delete_holiday,
    delete_interruption, get_holidays, get_interruptions, get_school_calendar, update_holiday,
    update_interruption,
};

/// Routes nested under `/school-years/{id}`.
pub fn init_year_calendar_router() -> Router<AppState> {
    Router::new()
        .route(
            "/interruptions",
            post(create_interruption).get(get_interruptions),
        )
        .route("/holidays", post(create_holiday).get(get_holidays))
        .route("/holidays/national", post(add_national_holidays))
}

pub fn init_interruptions_router() -> Router<AppState> {
    Router::new().route("/{id}", put(update_interruption).delete(delete_interruption))
}

pub fn init_holidays_router() -> Router<AppState> {
    Router::new().route("/{id}", put(update_holiday).delete(delete_holiday))
}

pub fn init_school_calendar_router() -> Router<AppState> {
    Router::new().route("/", get(get_school_calendar))
}
