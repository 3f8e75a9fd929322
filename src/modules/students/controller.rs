use crate::modules::students::model::{
    CreateStudentDto, PaginatedStudentsResponse, PaginationParams, Student, StudentImportParams,
    StudentImportReport, TransferResponse, TransferStudentsDto, UpdateStudentDto,
};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use lessonbook_core::AppError;
use lessonbook_models::ids::{ClassId, StudentId};
use tracing::instrument;

#[utoipa::path(
    post,
    path = "/api/classes/{id}/students",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 404, description = "Class not found"),
        (status = 409, description = "School year is closed"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn create_student(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let student = StudentService::create_student(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}/students",
    params(
        ("id" = i64, Path, description = "Class ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Students ordered by number, then name", body = PaginatedStudentsResponse),
        (status = 404, description = "Class not found")
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedStudentsResponse>, AppError> {
    let students = StudentService::get_students(&state.db, id, pagination).await?;
    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(
        ("id" = i64, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 404, description = "Student not found")
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::get_student(&state.db, id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(
        ("id" = i64, Path, description = "Student ID")
    ),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 404, description = "Student not found"),
        (status = 409, description = "School year is closed"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::update_student(&state.db, id, dto).await?;
    Ok(Json(student))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(
        ("id" = i64, Path, description = "Student ID")
    ),
    responses(
        (status = 204, description = "Student deleted with their evaluations"),
        (status = 404, description = "Student not found"),
        (status = 409, description = "School year is closed")
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<StatusCode, AppError> {
    StudentService::delete_student(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/students/import",
    params(StudentImportParams),
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Imported count and rejected rows", body = StudentImportReport),
        (status = 400, description = "Unreadable CSV"),
        (status = 404, description = "Default class not found")
    ),
    tag = "Students"
)]
#[instrument(skip(state, body))]
pub async fn import_students(
    State(state): State<AppState>,
    Query(params): Query<StudentImportParams>,
    body: String,
) -> Result<Json<StudentImportReport>, AppError> {
    let report = StudentService::import_students(&state.db, &body, params).await?;
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/api/students/transfer",
    request_body = TransferStudentsDto,
    responses(
        (status = 200, description = "Students copied or moved", body = TransferResponse),
        (status = 404, description = "Unknown student or class"),
        (status = 409, description = "Destination school year is closed"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn transfer_students(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<TransferStudentsDto>,
) -> Result<Json<TransferResponse>, AppError> {
    let response = StudentService::transfer_students(&state.db, dto).await?;
    Ok(Json(response))
}
