use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    export_summaries_csv, export_summaries_json, import_multi_class_json, import_summaries_csv,
    import_summaries_json,
};

/// Routes nested under `/classes/{id}/calendar`.
pub fn init_class_calendar_io_router() -> Router<AppState> {
    Router::new()
        .route("/export/json", get(export_summaries_json))
        .route("/export/csv", get(export_summaries_csv))
        .route("/import/json", post(import_summaries_json))
        .route("/import/csv", post(import_summaries_csv))
}

/// Routes nested under `/calendar`.
pub fn init_calendar_import_router() -> Router<AppState> {
    Router::new().route("/import/json", post(import_multi_class_json))
}
