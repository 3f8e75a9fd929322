use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use lessonbook_core::{AppError, PaginationParams};
use lessonbook_models::ids::SchoolYearId;
use tracing::instrument;

use crate::modules::school_years::model::{
    CreateSchoolYearDto, PaginatedSchoolYearsResponse, SchoolYear, SchoolYearFilterParams,
    UpdateSchoolYearDto,
};
use crate::modules::school_years::service::SchoolYearService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/school-years",
    request_body = CreateSchoolYearDto,
    responses(
        (status = 201, description = "School year created", body = SchoolYear),
        (status = 400, description = "Invalid input or duplicate name"),
        (status = 422, description = "Invalid dates")
    ),
    tag = "School Years"
)]
#[instrument(skip(state))]
pub async fn create_school_year(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateSchoolYearDto>,
) -> Result<(StatusCode, Json<SchoolYear>), AppError> {
    let school_year = SchoolYearService::create_school_year(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(school_year)))
}

#[utoipa::path(
    get,
    path = "/api/school-years",
    params(PaginationParams, SchoolYearFilterParams),
    responses(
        (status = 200, description = "School years, latest first", body = PaginatedSchoolYearsResponse)
    ),
    tag = "School Years"
)]
#[instrument(skip(state))]
pub async fn get_school_years(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filters): Query<SchoolYearFilterParams>,
) -> Result<Json<PaginatedSchoolYearsResponse>, AppError> {
    let school_years = SchoolYearService::get_school_years(&state.db, pagination, filters).await?;
    Ok(Json(school_years))
}

#[utoipa::path(
    get,
    path = "/api/school-years/active",
    responses(
        (status = 200, description = "The active school year", body = SchoolYear),
        (status = 404, description = "No school year is active")
    ),
    tag = "School Years"
)]
#[instrument(skip(state))]
pub async fn get_active_school_year(
    State(state): State<AppState>,
) -> Result<Json<SchoolYear>, AppError> {
    let school_year = SchoolYearService::get_active_school_year(&state.db).await?;
    Ok(Json(school_year))
}

#[utoipa::path(
    get,
    path = "/api/school-years/{id}",
    params(
        ("id" = i64, Path, description = "School year ID")
    ),
    responses(
        (status = 200, description = "School year details", body = SchoolYear),
        (status = 404, description = "School year not found")
    ),
    tag = "School Years"
)]
#[instrument(skip(state))]
pub async fn get_school_year(
    State(state): State<AppState>,
    Path(id): Path<SchoolYearId>,
) -> Result<Json<SchoolYear>, AppError> {
    let school_year = SchoolYearService::get_school_year(&state.db, id).await?;
    Ok(Json(school_year))
}

#[utoipa::path(
    put,
    path = "/api/school-years/{id}",
    params(
        ("id" = i64, Path, description = "School year ID")
    ),
    request_body = UpdateSchoolYearDto,
    responses(
        (status = 200, description = "School year updated", body = SchoolYear),
        (status = 400, description = "Invalid input or duplicate name"),
        (status = 404, description = "School year not found"),
        (status = 422, description = "Invalid dates")
    ),
    tag = "School Years"
)]
#[instrument(skip(state))]
pub async fn update_school_year(
    State(state): State<AppState>,
    Path(id): Path<SchoolYearId>,
    ValidatedJson(dto): ValidatedJson<UpdateSchoolYearDto>,
) -> Result<Json<SchoolYear>, AppError> {
    let school_year = SchoolYearService::update_school_year(&state.db, id, dto).await?;
    Ok(Json(school_year))
}

#[utoipa::path(
    delete,
    path = "/api/school-years/{id}",
    params(
        ("id" = i64, Path, description = "School year ID")
    ),
    responses(
        (status = 204, description = "School year and everything in it deleted"),
        (status = 404, description = "School year not found")
    ),
    tag = "School Years"
)]
#[instrument(skip(state))]
pub async fn delete_school_year(
    State(state): State<AppState>,
    Path(id): Path<SchoolYearId>,
) -> Result<StatusCode, AppError> {
    SchoolYearService::delete_school_year(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/school-years/{id}/activate",
    params(
        ("id" = i64, Path, description = "School year ID")
    ),
    responses(
        (status = 200, description = "School year is now the only active one", body = SchoolYear),
        (status = 404, description = "School year not found")
    ),
    tag = "School Years"
)]
#[instrument(skip(state))]
pub async fn activate_school_year(
    State(state): State<AppState>,
    Path(id): Path<SchoolYearId>,
) -> Result<Json<SchoolYear>, AppError> {
    let school_year = SchoolYearService::activate_school_year(&state.db, id).await?;
    Ok(Json(school_year))
}

#[utoipa::path(
    post,
    path = "/api/school-years/{id}/close",
    params(
        ("id" = i64, Path, description = "School year ID")
    ),
    responses(
        (status = 200, description = "School year closed", body = SchoolYear),
        (status = 404, description = "School year not found")
    ),
    tag = "School Years"
)]
#[instrument(skip(state))]
pub async fn close_school_year(
    State(state): State<AppState>,
    Path(id): Path<SchoolYearId>,
) -> Result<Json<SchoolYear>, AppError> {
    let school_year = SchoolYearService::set_closed(&state.db, id, true).await?;
    Ok(Json(school_year))
}

#[utoipa::path(
    post,
    path = "/api/school-years/{id}/reopen",
    params(
        ("id" = i64, Path, description = "School year ID")
    ),
    responses(
        (status = 200, description = "School year reopened", body = SchoolYear),
        (status = 404, description = "School year not found")
    ),
    tag = "School Years"
)]
#[instrument(skip(state))]
pub async fn reopen_school_year(
    State(state): State<AppState>,
    Path(id): Path<SchoolYearId>,
) -> Result<Json<SchoolYear>, AppError> {
    let school_year = SchoolYearService::set_closed(&state.db, id, false).await?;
    Ok(Json(school_year))
}
