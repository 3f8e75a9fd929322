use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use lessonbook_core::AppError;
use lessonbook_models::ids::ClassId;
use tracing::instrument;

use crate::metrics::track_export;
use crate::modules::calendar_io::model::{
    ClassImportPayload, ClassSummariesExport, ImportReport, MultiImportParams, MultiImportPayload,
    MultiImportReport, summaries_stem,
};
use crate::modules::calendar_io::service::CalendarIoService;
use crate::state::AppState;
use crate::utils::attachment::{
    CSV_CONTENT_TYPE, JSON_CONTENT_TYPE, attachment, dated_filename, today,
};

#[utoipa::path(
    get,
    path = "/api/classes/{id}/calendar/export/json",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "calendario_<class>_sumarios_<date>.json", body = ClassSummariesExport),
        (status = 404, description = "Class not found")
    ),
    tag = "Calendar Import/Export"
)]
#[instrument(skip(state))]
pub async fn export_summaries_json(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
) -> Result<Response, AppError> {
    let (class, export) = CalendarIoService::export_json(&state.db, id).await?;
    let json = serde_json::to_string_pretty(&export)?;

    track_export("summaries_json");
    Ok(attachment(
        json,
        JSON_CONTENT_TYPE,
        &dated_filename(&summaries_stem(&class.name), today(), "json"),
    ))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}/calendar/export/csv",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "calendario_<class>_sumarios_<date>.csv", content_type = "text/csv"),
        (status = 404, description = "Class not found")
    ),
    tag = "Calendar Import/Export"
)]
#[instrument(skip(state))]
pub async fn export_summaries_csv(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
) -> Result<Response, AppError> {
    let (class, csv) = CalendarIoService::export_csv(&state.db, id).await?;

    track_export("summaries_csv");
    Ok(attachment(
        csv,
        CSV_CONTENT_TYPE,
        &dated_filename(&summaries_stem(&class.name), today(), "csv"),
    ))
}

#[utoipa::path(
    post,
    path = "/api/classes/{id}/calendar/import/json",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    request_body = ClassImportPayload,
    responses(
        (status = 200, description = "Lessons imported and calendar renumbered", body = ImportReport),
        (status = 404, description = "Class not found"),
        (status = 409, description = "School year is closed")
    ),
    tag = "Calendar Import/Export"
)]
#[instrument(skip(state, payload))]
pub async fn import_summaries_json(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    Json(payload): Json<ClassImportPayload>,
) -> Result<Json<ImportReport>, AppError> {
    let report = CalendarIoService::import_json(&state.db, id, payload.into_lessons()).await?;
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/api/classes/{id}/calendar/import/csv",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Summaries applied by date", body = ImportReport),
        (status = 400, description = "Unreadable CSV"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "School year is closed")
    ),
    tag = "Calendar Import/Export"
)]
#[instrument(skip(state, body))]
pub async fn import_summaries_csv(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    body: String,
) -> Result<Json<ImportReport>, AppError> {
    let report = CalendarIoService::import_csv(&state.db, id, &body).await?;
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/api/calendar/import/json",
    params(MultiImportParams),
    request_body = MultiImportPayload,
    responses(
        (status = 200, description = "Per-class import outcome", body = MultiImportReport),
        (status = 400, description = "A list of lessons without class_id"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "School year is closed")
    ),
    tag = "Calendar Import/Export"
)]
#[instrument(skip(state, payload))]
pub async fn import_multi_class_json(
    State(state): State<AppState>,
    Query(params): Query<MultiImportParams>,
    Json(payload): Json<MultiImportPayload>,
) -> Result<Json<MultiImportReport>, AppError> {
    let report = CalendarIoService::import_multi(&state.db, payload, params).await?;
    Ok(Json(report))
}
