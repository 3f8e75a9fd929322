use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use lessonbook_core::AppError;
use lessonbook_models::ids::{ClassId, ModuleId};
use tracing::instrument;

use crate::modules::classes::model::{
    Class, ClassFilterParams, CreateClassDto, Module, ModuleDto, UpdateClassDto,
};
use crate::modules::classes::service::ClassService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created", body = Class),
        (status = 400, description = "Invalid input or duplicate name in the year"),
        (status = 404, description = "School year not found"),
        (status = 409, description = "School year is closed")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn create_class(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<Class>), AppError> {
    let class = ClassService::create_class(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    get,
    path = "/api/classes",
    params(ClassFilterParams),
    responses(
        (status = 200, description = "Classes ordered by name", body = Vec<Class>)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_classes(
    State(state): State<AppState>,
    Query(filters): Query<ClassFilterParams>,
) -> Result<Json<Vec<Class>>, AppError> {
    let classes = ClassService::get_classes(&state.db, filters).await?;
    Ok(Json(classes))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Class details", body = Class),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
) -> Result<Json<Class>, AppError> {
    let class = ClassService::get_class(&state.db, id).await?;
    Ok(Json(class))
}

#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated", body = Class),
        (status = 400, description = "Invalid input or duplicate name in the year"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Current or target school year is closed")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<Json<Class>, AppError> {
    let class = ClassService::update_class(&state.db, id, dto).await?;
    Ok(Json(class))
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    responses(
        (status = 204, description = "Class deleted with its calendar and students"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "School year is closed")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
) -> Result<StatusCode, AppError> {
    ClassService::delete_class(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}/modules",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Modules ordered by position", body = Vec<Module>),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_modules(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
) -> Result<Json<Vec<Module>>, AppError> {
    let modules = ClassService::get_modules(&state.db, id).await?;
    Ok(Json(modules))
}

#[utoipa::path(
    post,
    path = "/api/classes/{id}/modules",
    params(
        ("id" = i64, Path, description = "Class ID")
    ),
    request_body = ModuleDto,
    responses(
        (status = 201, description = "Module created and calendar renumbered", body = Module),
        (status = 404, description = "Class not found"),
        (status = 409, description = "School year is closed"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn create_module(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<ModuleDto>,
) -> Result<(StatusCode, Json<Module>), AppError> {
    let module = ClassService::create_module(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

#[utoipa::path(
    put,
    path = "/api/modules/{id}",
    params(
        ("id" = i64, Path, description = "Module ID")
    ),
    request_body = ModuleDto,
    responses(
        (status = 200, description = "Module replaced and calendar renumbered", body = Module),
        (status = 404, description = "Module not found"),
        (status = 409, description = "School year is closed"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn update_module(
    State(state): State<AppState>,
    Path(id): Path<ModuleId>,
    ValidatedJson(dto): ValidatedJson<ModuleDto>,
) -> Result<Json<Module>, AppError> {
    let module = ClassService::update_module(&state.db, id, dto).await?;
    Ok(Json(module))
}

#[utoipa::path(
    delete,
    path = "/api/modules/{id}",
    params(
        ("id" = i64, Path, description = "Module ID")
    ),
    responses(
        (status = 204, description = "Module deleted and calendar renumbered"),
        (status = 404, description = "Module not found"),
        (status = 409, description = "School year is closed")
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn delete_module(
    State(state): State<AppState>,
    Path(id): Path<ModuleId>,
) -> Result<StatusCode, AppError> {
    ClassService::delete_module(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
