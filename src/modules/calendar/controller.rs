use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use lessonbook_core::AppError;
use lessonbook_models::ids::{ClassId, LessonEntryId};
use tracing::instrument;

use crate::modules::calendar::model::{
    CalendarFilterParams, CreateLessonEntryDto, DayFilterParams, GenerateCalendarResponse,
    LessonEntry, LessonEntryWithClass, RenumberResponse, ResetCalendarResponse,
    UpdateLessonEntryDto, UpdateSummaryDto,
};
use crate::modules::calendar::service::CalendarService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/classes/{id}/calendar/generate",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    responses(
        (status = 201, description = "Calendar generated", body = GenerateCalendarResponse),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Class already has entries or its school year is closed"),
        (status = 422, description = "Semester boundaries missing for a semester class")
    ),
    tag = "Calendar"
)]
#[instrument(skip(state))]
pub async fn generate_calendar(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
) -> Result<(StatusCode, Json<GenerateCalendarResponse>), AppError> {
    let response = CalendarService::generate_calendar(&state.db, id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/classes/{id}/calendar/reset",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Every entry of the class deleted", body = ResetCalendarResponse),
        (status = 404, description = "Class not found"),
        (status = 409, description = "School year is closed")
    ),
    tag = "Calendar"
)]
#[instrument(skip(state))]
pub async fn reset_calendar(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
) -> Result<Json<ResetCalendarResponse>, AppError> {
    let response = CalendarService::reset_calendar(&state.db, id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/classes/{id}/calendar/renumber",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Calendar renumbered", body = RenumberResponse),
        (status = 404, description = "Class not found"),
        (status = 409, description = "School year is closed")
    ),
    tag = "Calendar"
)]
#[instrument(skip(state))]
pub async fn renumber_calendar(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
) -> Result<Json<RenumberResponse>, AppError> {
    let response = CalendarService::renumber_class(&state.db, id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}/calendar",
    params(
        ("id" = i64, Path, description = "Class ID"),
        CalendarFilterParams
    ),
    responses(
        (status = 200, description = "Live entries by date", body = Vec<LessonEntry>),
        (status = 400, description = "Unknown kind or semester"),
        (status = 404, description = "Class not found"),
        (status = 422, description = "School year has no semester boundaries")
    ),
    tag = "Calendar"
)]
#[instrument(skip(state))]
pub async fn get_entries(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    Query(filters): Query<CalendarFilterParams>,
) -> Result<Json<Vec<LessonEntry>>, AppError> {
    let entries = CalendarService::get_entries(&state.db, id, filters).await?;
    Ok(Json(entries))
}

#[utoipa::path(
    post,
    path = "/api/classes/{id}/calendar",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    request_body = CreateLessonEntryDto,
    responses(
        (status = 201, description = "Entry added and calendar renumbered", body = LessonEntry),
        (status = 404, description = "Class not found"),
        (status = 409, description = "School year is closed"),
        (status = 422, description = "Validation failed or date outside the school year")
    ),
    tag = "Calendar"
)]
#[instrument(skip(state))]
pub async fn create_entry(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<CreateLessonEntryDto>,
) -> Result<(StatusCode, Json<LessonEntry>), AppError> {
    let entry = CalendarService::create_entry(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/calendar/entries/{id}",
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry details", body = LessonEntry),
        (status = 404, description = "Entry not found or deleted")
    ),
    tag = "Calendar"
)]
#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<LessonEntryId>,
) -> Result<Json<LessonEntry>, AppError> {
    let entry = CalendarService::get_entry(&state.db, id).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    put,
    path = "/api/calendar/entries/{id}",
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    request_body = UpdateLessonEntryDto,
    responses(
        (status = 200, description = "Entry updated and calendar renumbered", body = LessonEntry),
        (status = 404, description = "Entry not found or deleted"),
        (status = 409, description = "School year is closed"),
        (status = 422, description = "Validation failed or date outside the school year")
    ),
    tag = "Calendar"
)]
#[instrument(skip(state))]
pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<LessonEntryId>,
    ValidatedJson(dto): ValidatedJson<UpdateLessonEntryDto>,
) -> Result<Json<LessonEntry>, AppError> {
    let entry = CalendarService::update_entry(&state.db, id, dto).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/calendar/entries/{id}",
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 204, description = "Entry soft-deleted and calendar renumbered"),
        (status = 404, description = "Entry not found or already deleted"),
        (status = 409, description = "School year is closed")
    ),
    tag = "Calendar"
)]
#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<LessonEntryId>,
) -> Result<StatusCode, AppError> {
    CalendarService::delete_entry(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/api/calendar/entries/{id}/summary",
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    request_body = UpdateSummaryDto,
    responses(
        (status = 200, description = "Summary saved", body = LessonEntry),
        (status = 404, description = "Entry not found or deleted"),
        (status = 409, description = "School year is closed")
    ),
    tag = "Calendar"
)]
#[instrument(skip(state))]
pub async fn update_summary(
    State(state): State<AppState>,
    Path(id): Path<LessonEntryId>,
    ValidatedJson(dto): ValidatedJson<UpdateSummaryDto>,
) -> Result<Json<LessonEntry>, AppError> {
    let entry = CalendarService::update_summary(&state.db, id, dto).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    get,
    path = "/api/calendar/day",
    params(DayFilterParams),
    responses(
        (status = 200, description = "Live entries of every class on the date", body = Vec<LessonEntryWithClass>),
        (status = 400, description = "Missing date")
    ),
    tag = "Calendar"
)]
#[instrument(skip(state))]
pub async fn get_day_entries(
    State(state): State<AppState>,
    Query(filters): Query<DayFilterParams>,
) -> Result<Json<Vec<LessonEntryWithClass>>, AppError> {
    let entries = CalendarService::get_day_entries(&state.db, filters).await?;
    Ok(Json(entries))
}
