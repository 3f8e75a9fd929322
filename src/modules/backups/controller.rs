use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use lessonbook_core::AppError;
use tracing::instrument;

use crate::modules::backups::model::{BackupListing, JsonSnapshotResponse};
use crate::modules::backups::service::BackupService;
use crate::state::AppState;
use crate::utils::attachment::attachment;

const SQLITE_CONTENT_TYPE: &str = "application/vnd.sqlite3";

#[utoipa::path(
    get,
    path = "/api/backups",
    responses(
        (status = 200, description = "Backups newest first, with the most recent one", body = BackupListing)
    ),
    tag = "Backups"
)]
#[instrument(skip(state))]
pub async fn list_backups(State(state): State<AppState>) -> Result<Json<BackupListing>, AppError> {
    let listing = BackupService::list_backups(&state.backup_config).await?;
    Ok(Json(listing))
}

#[utoipa::path(
    get,
    path = "/api/backups/{name}",
    params(
        ("name" = String, Path, description = "Backup file name, backup-*.db")
    ),
    responses(
        (status = 200, description = "Backup file", content_type = "application/vnd.sqlite3"),
        (status = 400, description = "Invalid backup name"),
        (status = 404, description = "Backup not found")
    ),
    tag = "Backups"
)]
#[instrument(skip(state))]
pub async fn download_backup(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let (file, bytes) = BackupService::read_backup(&state.backup_config, &name).await?;
    Ok(attachment(bytes, SQLITE_CONTENT_TYPE, &file.name))
}

#[utoipa::path(
    post,
    path = "/api/backups/json",
    responses(
        (status = 201, description = "One summaries file written per class", body = JsonSnapshotResponse)
    ),
    tag = "Backups"
)]
#[instrument(skip(state))]
pub async fn write_json_snapshot(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<JsonSnapshotResponse>), AppError> {
    let response = BackupService::write_json_snapshot(&state.db, &state.export_config).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
