//! Student domain models and DTOs.

use crate::ids::{ClassId, StudentId};
use chrono::{DateTime, Utc};
use lessonbook_core::PaginationMeta;
use lessonbook_core::serde::deserialize_optional_i64;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Student entity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    /// Unique identifier
    pub id: StudentId,
    /// Class the student is enrolled in
    pub class_id: ClassId,
    /// School process number
    pub process_number: Option<String>,
    /// Roll number inside the class
    pub number: Option<i64>,
    /// Full name
    pub name: String,
    /// Name used in day-to-day views
    pub short_name: Option<String>,
    /// Special educational needs (NEE)
    pub special_needs: bool,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a student.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(max = 50))]
    pub process_number: Option<String>,
    #[validate(range(min = 1, max = 999))]
    pub number: Option<i64>,
    /// Full name (1-200 characters)
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 100))]
    pub short_name: Option<String>,
    #[serde(default)]
    pub special_needs: bool,
    pub observations: Option<String>,
}

/// DTO for updating a student. Absent fields keep their value.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(max = 50))]
    pub process_number: Option<String>,
    #[validate(range(min = 1, max = 999))]
    pub number: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub short_name: Option<String>,
    pub special_needs: Option<bool>,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    /// Students ordered by number, then name
    pub data: Vec<Student>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentImportParams {
    /// Class for rows without a class column
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub default_class_id: Option<i64>,
}

/// Import row that was not imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RejectedRow {
    /// 1-based line number in the uploaded file
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct StudentImportReport {
    pub imported: i64,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Create new student rows in the destination class
    Copy,
    /// Reassign the students, keeping their evaluations
    Move,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TransferStudentsDto {
    #[validate(length(min = 1, message = "At least one student is required"))]
    pub student_ids: Vec<StudentId>,
    pub destination_class_id: ClassId,
    pub mode: TransferMode,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferResponse {
    pub mode: TransferMode,
    pub destination_class_id: ClassId,
    /// Students in the destination class after the transfer
    pub students: Vec<Student>,
}

/// Reads a special-needs cell: `1`, `s`, `sim`, `x`, `true`, `yes`, `y`.
pub fn parse_special_needs(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "s" | "sim" | "x" | "true" | "yes" | "y"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_needs_truthy_values() {
        for value in ["1", "S", "sim", "X", "True", "yes", " y "] {
            assert!(parse_special_needs(value), "{value} should be truthy");
        }
        for value in ["", "0", "não", "no", "n"] {
            assert!(!parse_special_needs(value), "{value} should be falsy");
        }
    }

    #[test]
    fn test_transfer_mode_wire_names() {
        let dto: TransferStudentsDto = serde_json::from_str(
            r#"{"student_ids": [1, 2], "destination_class_id": 4, "mode": "move"}"#,
        )
        .unwrap();
        assert_eq!(dto.mode, TransferMode::Move);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_transfer_requires_students() {
        let dto: TransferStudentsDto = serde_json::from_str(
            r#"{"student_ids": [], "destination_class_id": 4, "mode": "copy"}"#,
        )
        .unwrap();
        assert!(dto.validate().is_err());
    }
}
