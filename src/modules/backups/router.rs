use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{download_backup, list_backups, write_json_snapshot};

pub fn init_backups_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_backups))
        .route("/json", post(write_json_snapshot))
        .route("/{name}", get(download_backup))
}
