use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use lessonbook_core::AppError;
use lessonbook_models::ids::{ClassId, LessonEntryId};
use tracing::instrument;

use crate::metrics::track_export;
use crate::modules::evaluations::model::{
    EvaluationRow, GradeSummary, GradesFilterParams, UpsertEvaluationsDto,
};
use crate::modules::evaluations::service::EvaluationService;
use crate::state::AppState;
use crate::utils::attachment::{CSV_CONTENT_TYPE, attachment, dated_filename, today};
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/calendar/entries/{id}/evaluations",
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "One row per student, defaults when not evaluated", body = Vec<EvaluationRow>),
        (status = 404, description = "Entry not found or deleted")
    ),
    tag = "Evaluations"
)]
#[instrument(skip(state))]
pub async fn get_evaluations(
    State(state): State<AppState>,
    Path(id): Path<LessonEntryId>,
) -> Result<Json<Vec<EvaluationRow>>, AppError> {
    let rows = EvaluationService::get_evaluations(&state.db, id).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    put,
    path = "/api/calendar/entries/{id}/evaluations",
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    request_body = UpsertEvaluationsDto,
    responses(
        (status = 200, description = "Evaluations saved", body = Vec<EvaluationRow>),
        (status = 404, description = "Entry not found or deleted"),
        (status = 409, description = "School year is closed"),
        (status = 422, description = "Out of range values or student outside the class")
    ),
    tag = "Evaluations"
)]
#[instrument(skip(state, dto))]
pub async fn upsert_evaluations(
    State(state): State<AppState>,
    Path(id): Path<LessonEntryId>,
    ValidatedJson(dto): ValidatedJson<UpsertEvaluationsDto>,
) -> Result<Json<Vec<EvaluationRow>>, AppError> {
    let rows = EvaluationService::upsert_evaluations(&state.db, id, dto).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}/grades",
    params(
        ("id" = i64, Path, description = "Class ID"),
        GradesFilterParams
    ),
    responses(
        (status = 200, description = "Aggregated grades per student", body = Vec<GradeSummary>),
        (status = 404, description = "Class not found")
    ),
    tag = "Evaluations"
)]
#[instrument(skip(state))]
pub async fn get_grades(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    Query(filters): Query<GradesFilterParams>,
) -> Result<Json<Vec<GradeSummary>>, AppError> {
    let (_, grades) = EvaluationService::get_grades(&state.db, id, filters).await?;
    Ok(Json(grades))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}/grades/export",
    params(
        ("id" = i64, Path, description = "Class ID"),
        GradesFilterParams
    ),
    responses(
        (status = 200, description = "avaliacoes_<class>_<date>.csv", content_type = "text/csv"),
        (status = 404, description = "Class not found")
    ),
    tag = "Evaluations"
)]
#[instrument(skip(state))]
pub async fn export_grades(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    Query(filters): Query<GradesFilterParams>,
) -> Result<Response, AppError> {
    let (class, grades) = EvaluationService::get_grades(&state.db, id, filters).await?;
    let csv = EvaluationService::render_csv(&grades)?;

    track_export("grades_csv");
    Ok(attachment(
        csv,
        CSV_CONTENT_TYPE,
        &dated_filename(&format!("avaliacoes_{}", class.name), today(), "csv"),
    ))
}
