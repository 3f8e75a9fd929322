use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use lessonbook_core::AppError;
use lessonbook_models::ids::{HolidayId, InterruptionId, SchoolYearId};
use tracing::instrument;

use crate::modules::school_calendar::model::{
    Holiday, HolidayDto, Interruption, InterruptionDto, SchoolCalendarExport,
    SchoolCalendarParams,
};
use crate::modules::school_calendar::service::SchoolCalendarService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/school-years/{id}/interruptions",
    params(
        ("id" = i64, Path, description = "School year ID")
    ),
    request_body = InterruptionDto,
    responses(
        (status = 201, description = "Interruption created", body = Interruption),
        (status = 404, description = "School year not found"),
        (status = 409, description = "School year is closed"),
        (status = 422, description = "Missing or unparsable dates")
    ),
    tag = "School Calendar"
)]
#[instrument(skip(state))]
pub async fn create_interruption(
    State(state): State<AppState>,
    Path(id): Path<SchoolYearId>,
    ValidatedJson(dto): ValidatedJson<InterruptionDto>,
) -> Result<(StatusCode, Json<Interruption>), AppError> {
    let interruption = SchoolCalendarService::create_interruption(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(interruption)))
}

#[utoipa::path(
    get,
    path = "/api/school-years/{id}/interruptions",
    params(
        ("id" = i64, Path, description = "School year ID")
    ),
    responses(
        (status = 200, description = "Interruptions of the year", body = Vec<Interruption>),
        (status = 404, description = "School year not found")
    ),
    tag = "School Calendar"
)]
#[instrument(skip(state))]
pub async fn get_interruptions(
    State(state): State<AppState>,
    Path(id): Path<SchoolYearId>,
) -> Result<Json<Vec<Interruption>>, AppError> {
    let interruptions = SchoolCalendarService::get_interruptions(&state.db, id).await?;
    Ok(Json(interruptions))
}

#[utoipa::path(
    put,
    path = "/api/interruptions/{id}",
    params(
        ("id" = i64, Path, description = "Interruption ID")
    ),
    request_body = InterruptionDto,
    responses(
        (status = 200, description = "Interruption replaced", body = Interruption),
        (status = 404, description = "Interruption not found"),
        (status = 409, description = "School year is closed"),
        (status = 422, description = "Missing or unparsable dates")
    ),
    tag = "School Calendar"
)]
#[instrument(skip(state))]
pub async fn update_interruption(
    State(state): State<AppState>,
    Path(id): Path<InterruptionId>,
    ValidatedJson(dto): ValidatedJson<InterruptionDto>,
) -> Result<Json<Interruption>, AppError> {
    let interruption = SchoolCalendarService::update_interruption(&state.db, id, dto).await?;
    Ok(Json(interruption))
}

#[utoipa::path(
    delete,
    path = "/api/interruptions/{id}",
    params(
        ("id" = i64, Path, description = "Interruption ID")
    ),
    responses(
        (status = 204, description = "Interruption deleted"),
        (status = 404, description = "Interruption not found"),
        (status = 409, description = "School year is closed")
    ),
    tag = "School Calendar"
)]
#[instrument(skip(state))]
pub async fn delete_interruption(
    State(state): State<AppState>,
    Path(id): Path<InterruptionId>,
) -> Result<StatusCode, AppError> {
    SchoolCalendarService::delete_interruption(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/school-years/{id}/holidays",
    params(
        ("id" = i64, Path, description = "School year ID")
    ),
    request_body = HolidayDto,
    responses(
        (status = 201, description = "Holiday created", body = Holiday),
        (status = 404, description = "School year not found"),
        (status = 409, description = "School year is closed"),
        (status = 422, description = "Missing or unparsable date")
    ),
    tag = "School Calendar"
)]
#[instrument(skip(state))]
pub async fn create_holiday(
    State(state): State<AppState>,
    Path(id): Path<SchoolYearId>,
    ValidatedJson(dto): ValidatedJson<HolidayDto>,
) -> Result<(StatusCode, Json<Holiday>), AppError> {
    let holiday = SchoolCalendarService::create_holiday(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(holiday)))
}

#[utoipa::path(
    get,
    path = "/api/school-years/{id}/holidays",
    params(
        ("id" = i64, Path, description = "School year ID")
    ),
    responses(
        (status = 200, description = "Holidays of the year", body = Vec<Holiday>),
        (status = 404, description = "School year not found")
    ),
    tag = "School Calendar"
)]
#[instrument(skip(state))]
pub async fn get_holidays(
    State(state): State<AppState>,
    Path(id): Path<SchoolYearId>,
) -> Result<Json<Vec<Holiday>>, AppError> {
    let holidays = SchoolCalendarService::get_holidays(&state.db, id).await?;
    Ok(Json(holidays))
}

#[utoipa::path(
    post,
    path = "/api/school-years/{id}/holidays/national",
    params(
        ("id" = i64, Path, description = "School year ID")
    ),
    responses(
        (status = 201, description = "National holidays added; days already present are skipped", body = Vec<Holiday>),
        (status = 404, description = "School year not found"),
        (status = 409, description = "School year is closed")
    ),
    tag = "School Calendar"
)]
#[instrument(skip(state))]
pub async fn add_national_holidays(
    State(state): State<AppState>,
    Path(id): Path<SchoolYearId>,
) -> Result<(StatusCode, Json<Vec<Holiday>>), AppError> {
    let holidays = SchoolCalendarService::add_national_holidays(&state.db, id).await?;
    Ok((StatusCode::CREATED, Json(holidays)))
}

#[utoipa::path(
    put,
    path = "/api/holidays/{id}",
    params(
        ("id" = i64, Path, description = "Holiday ID")
    ),
    request_body = HolidayDto,
    responses(
        (status = 200, description = "Holiday replaced", body = Holiday),
        (status = 404, description = "Holiday not found"),
        (status = 409, description = "School year is closed"),
        (status = 422, description = "Missing or unparsable date")
    ),
    tag = "School Calendar"
)]
#[instrument(skip(state))]
pub async fn update_holiday(
    State(state): State<AppState>,
    Path(id): Path<HolidayId>,
    ValidatedJson(dto): ValidatedJson<HolidayDto>,
) -> Result<Json<Holiday>, AppError> {
    let holiday = SchoolCalendarService::update_holiday(&state.db, id, dto).await?;
    Ok(Json(holiday))
}

#[utoipa::path(
    delete,
    path = "/api/holidays/{id}",
    params(
        ("id" = i64, Path, description = "Holiday ID")
    ),
    responses(
        (status = 204, description = "Holiday deleted"),
        (status = 404, description = "Holiday not found"),
        (status = 409, description = "School year is closed")
    ),
    tag = "School Calendar"
)]
#[instrument(skip(state))]
pub async fn delete_holiday(
    State(state): State<AppState>,
    Path(id): Path<HolidayId>,
) -> Result<StatusCode, AppError> {
    SchoolCalendarService::delete_holiday(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/school-calendar",
    params(SchoolCalendarParams),
    responses(
        (status = 200, description = "School year with expanded breaks and holidays", body = SchoolCalendarExport),
        (status = 404, description = "No school year found")
    ),
    tag = "School Calendar"
)]
#[instrument(skip(state))]
pub async fn get_school_calendar(
    State(state): State<AppState>,
    Query(params): Query<SchoolCalendarParams>,
) -> Result<Json<SchoolCalendarExport>, AppError> {
    let export = SchoolCalendarService::export(&state.db, params.school_year_id()).await?;
    Ok(Json(export))
}
