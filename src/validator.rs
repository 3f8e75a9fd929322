use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use lessonbook_core::AppError;

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.extend(field_errors.iter().map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{path} is invalid"))
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

pub fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.sort();
    messages.join(", ")
}

/// Field name out of serde's "missing field `x`" message.
fn missing_field(message: &str) -> Option<&str> {
    message
        .split("missing field `")
        .nth(1)
        .and_then(|rest| rest.split('`').next())
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    let message = match &rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected a JSON body (Content-Type: application/json)".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "Malformed JSON body".to_string(),
        JsonRejection::JsonDataError(_) => {
            let text = rejection.body_text();
            match missing_field(&text) {
                Some(field) => format!("{field} is required"),
                None => text
                    .rsplit_once(": ")
                    .map(|(_, detail)| format!("Invalid request body: {detail}"))
                    .unwrap_or(text),
            }
        }
        _ => rejection.body_text(),
    };
    AppError::new(StatusCode::BAD_REQUEST, anyhow!(message))
}

/// `Json<T>` that also runs `validator` rules. Malformed bodies are 400,
/// rule violations 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_error)?;

        value.validate().map_err(|errors| {
            AppError::unprocessable(anyhow!("{}", format_errors(&errors)))
        })?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonbook_models::evaluations::UpsertEvaluationsDto;
    use lessonbook_models::school_years::CreateSchoolYearDto;

    #[test]
    fn test_missing_field_is_extracted() {
        assert_eq!(
            missing_field("Failed to deserialize the JSON body into the target type: missing field `name` at line 1 column 2"),
            Some("name")
        );
        assert_eq!(missing_field("invalid type: string"), None);
    }

    #[test]
    fn test_format_errors_names_field() {
        let dto: CreateSchoolYearDto = serde_json::from_str(
            r#"{"name": "", "start_date": "2025-09-12", "end_date": "2026-06-30"}"#,
        )
        .unwrap();
        let errors = dto.validate().unwrap_err();
        assert_eq!(format_errors(&errors), "name is invalid");
    }

    #[test]
    fn test_format_errors_reaches_nested_lists() {
        let dto: UpsertEvaluationsDto = serde_json::from_str(
            r#"{"evaluations": [{"student_id": 1}, {"student_id": 2, "behaviour": 9}]}"#,
        )
        .unwrap();
        let errors = dto.validate().unwrap_err();
        assert_eq!(format_errors(&errors), "evaluations[1].behaviour is invalid");
    }
}
