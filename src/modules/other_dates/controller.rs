use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use lessonbook_core::AppError;
use tracing::instrument;

use crate::metrics::track_export;
use crate::modules::other_dates::model::{
    AddExtraLessonDto, ChangeKindDto, ChangeKindResponse, LessonEntry, LessonEntryWithClass,
    OtherDateRecord, OtherDatesFilterParams,
};
use crate::modules::other_dates::service::OtherDatesService;
use crate::state::AppState;
use crate::utils::attachment::{
    CSV_CONTENT_TYPE, JSON_CONTENT_TYPE, attachment, dated_filename, today,
};
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/calendar/other-dates",
    params(OtherDatesFilterParams),
    responses(
        (status = 200, description = "Special lessons by date", body = Vec<LessonEntryWithClass>),
        (status = 400, description = "Unknown kind")
    ),
    tag = "Other Dates"
)]
#[instrument(skip(state))]
pub async fn get_other_dates(
    State(state): State<AppState>,
    Query(filters): Query<OtherDatesFilterParams>,
) -> Result<Json<Vec<LessonEntryWithClass>>, AppError> {
    let entries = OtherDatesService::get_other_dates(&state.db, &filters).await?;
    Ok(Json(entries))
}

#[utoipa::path(
    post,
    path = "/api/calendar/other-dates/extra",
    request_body = AddExtraLessonDto,
    responses(
        (status = 201, description = "Extra lesson added", body = LessonEntry),
        (status = 404, description = "Class not found"),
        (status = 409, description = "School year is closed"),
        (status = 422, description = "Validation failed or date outside the school year")
    ),
    tag = "Other Dates"
)]
#[instrument(skip(state))]
pub async fn add_extra_lesson(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<AddExtraLessonDto>,
) -> Result<(StatusCode, Json<LessonEntry>), AppError> {
    let entry = OtherDatesService::add_extra_lesson(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    post,
    path = "/api/calendar/other-dates/change-type",
    request_body = ChangeKindDto,
    responses(
        (status = 200, description = "Kinds changed; closed years reported as blocked", body = ChangeKindResponse),
        (status = 400, description = "Unknown kind or kind extra"),
        (status = 404, description = "No lessons on that date")
    ),
    tag = "Other Dates"
)]
#[instrument(skip(state))]
pub async fn change_kind(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ChangeKindDto>,
) -> Result<Json<ChangeKindResponse>, AppError> {
    let response = OtherDatesService::change_kind(&state.db, dto).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/calendar/other-dates/export/csv",
    params(OtherDatesFilterParams),
    responses(
        (status = 200, description = "outras_datas_<date>.csv", content_type = "text/csv"),
        (status = 400, description = "Unknown kind")
    ),
    tag = "Other Dates"
)]
#[instrument(skip(state))]
pub async fn export_other_dates_csv(
    State(state): State<AppState>,
    Query(filters): Query<OtherDatesFilterParams>,
) -> Result<Response, AppError> {
    let entries = OtherDatesService::get_other_dates(&state.db, &filters).await?;
    let csv = OtherDatesService::render_csv(&OtherDatesService::to_records(entries))?;

    track_export("other_dates_csv");
    Ok(attachment(
        csv,
        CSV_CONTENT_TYPE,
        &dated_filename("outras_datas", today(), "csv"),
    ))
}

#[utoipa::path(
    get,
    path = "/api/calendar/other-dates/export/json",
    params(OtherDatesFilterParams),
    responses(
        (status = 200, description = "outras_datas_<date>.json", body = Vec<OtherDateRecord>),
        (status = 400, description = "Unknown kind")
    ),
    tag = "Other Dates"
)]
#[instrument(skip(state))]
pub async fn export_other_dates_json(
    State(state): State<AppState>,
    Query(filters): Query<OtherDatesFilterParams>,
) -> Result<Response, AppError> {
    let entries = OtherDatesService::get_other_dates(&state.db, &filters).await?;
    let json = serde_json::to_string_pretty(&OtherDatesService::to_records(entries))?;

    track_export("other_dates_json");
    Ok(attachment(
        json,
        JSON_CONTENT_TYPE,
        &dated_filename("outras_datas", today(), "json"),
    ))
}
