use crate::modules::students::controller::{
    create_student, delete_student, get_student, get_students, import_students, transfer_students,
    update_student,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes nested under `/classes/{id}/students`.
pub fn init_class_students_router() -> Router<AppState> {
    Router::new().route("/", post(create_student).get(get_students))
}

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/import", post(import_students))
        .route("/transfer", post(transfer_students))
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}
