use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    add_extra_lesson, change_kind, export_other_dates_csv, export_other_dates_json,
    get_other_dates,
};

/// Routes nested under `/calendar/other-dates`.
pub fn init_other_dates_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_other_dates))
        .route("/extra", post(add_extra_lesson))
        .route("/change-type", post(change_kind))
        .route("/export/csv", get(export_other_dates_csv))
        .route("/export/json", get(export_other_dates_json))
}
