//! Application error type.
//!
//! Every handler returns `Result<_, AppError>`. The error carries the HTTP
//! status to answer with and renders as `{"error": "<message>"}`.
//!
//! Errors converted with `?` are classified by their source: backup errors
//! keep their meaning (bad name, missing file), anything else is a 500.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::backup::BackupError;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E: Into<Error>>(err: E) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E: Into<Error>>(err: E) -> Self {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    /// Well-formed input the domain rejects: bad date text, a student from
    /// another class, semester bounds missing.
    pub fn unprocessable<E: Into<Error>>(err: E) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E: Into<Error>>(err: E) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    /// Closed school year, calendar already generated.
    pub fn conflict<E: Into<Error>>(err: E) -> Self {
        Self::new(StatusCode::CONFLICT, err)
    }
}

fn classify(error: &Error) -> StatusCode {
    match error.downcast_ref::<BackupError>() {
        Some(BackupError::InvalidName(_)) => StatusCode::BAD_REQUEST,
        Some(BackupError::NotFound(_)) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                error = %format!("{:#}", self.error),
                "Request failed"
            );
        }

        (self.status, Json(json!({ "error": self.error.to_string() }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        Self {
            status: classify(&error),
            error,
        }
    }
}
