//! School year ("ano letivo") domain models and DTOs.
//!
//! A school year bounds every calendar generated inside it and owns the
//! interruptions and holidays that are skipped. At most one year is active
//! (the default for "current" views). A closed year is read-only for
//! calendar, class and evaluation changes; student import still works.

use crate::ids::SchoolYearId;
use chrono::{DateTime, NaiveDate, Utc};
use lessonbook_core::PaginationMeta;
use lessonbook_core::serde::deserialize_optional_string;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// School year entity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SchoolYear {
    /// Unique identifier
    pub id: SchoolYearId,
    /// Display name, unique (e.g. "2025/2026")
    pub name: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// First day of the school year
    pub start_date: NaiveDate,
    /// Last day of the school year
    pub end_date: NaiveDate,
    /// Last day of the first semester
    pub first_semester_end: Option<NaiveDate>,
    /// First day of the second semester
    pub second_semester_start: Option<NaiveDate>,
    /// Whether this is the active year (at most one)
    pub is_active: bool,
    /// Closed years reject calendar, class and evaluation changes
    pub is_closed: bool,
    /// Timestamp when the year was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the year was last updated
    pub updated_at: DateTime<Utc>,
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SchoolYear {
    pub fn full_range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Semester 1 or 2 bounds, `None` when the year has no semester split.
    pub fn semester_range(&self, semester: u8) -> Option<DateRange> {
        match semester {
            1 => self.first_semester_end.map(|end| DateRange {
                start: self.start_date,
                end,
            }),
            2 => self.second_semester_start.map(|start| DateRange {
                start,
                end: self.end_date,
            }),
            _ => None,
        }
    }
}

fn validate_year_dates(dto: &CreateSchoolYearDto) -> Result<(), ValidationError> {
    check_year_dates(
        dto.start_date,
        dto.end_date,
        dto.first_semester_end,
        dto.second_semester_start,
    )
}

/// Shared date rules for create and update.
pub fn check_year_dates(
    start_date: NaiveDate,
    end_date: NaiveDate,
    first_semester_end: Option<NaiveDate>,
    second_semester_start: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    if start_date >= end_date {
        return Err(ValidationError::new("dates")
            .with_message("Start date must be before end date".into()));
    }
    for date in [first_semester_end, second_semester_start].into_iter().flatten() {
        if date < start_date || date > end_date {
            return Err(ValidationError::new("semester")
                .with_message("Semester dates must fall inside the school year".into()));
        }
    }
    if let (Some(s1_end), Some(s2_start)) = (first_semester_end, second_semester_start) {
        if s1_end >= s2_start {
            return Err(ValidationError::new("semester").with_message(
                "First semester must end before the second semester starts".into(),
            ));
        }
    }
    Ok(())
}

/// DTO for creating a school year.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_year_dates"))]
pub struct CreateSchoolYearDto {
    /// Name (1-50 characters)
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// First day of the school year
    pub start_date: NaiveDate,
    /// Last day of the school year (after start_date)
    pub end_date: NaiveDate,
    /// Last day of the first semester
    pub first_semester_end: Option<NaiveDate>,
    /// First day of the second semester
    pub second_semester_start: Option<NaiveDate>,
    /// Make this the active year
    #[serde(default)]
    pub is_active: bool,
}

/// DTO for updating a school year. Absent fields keep their value.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateSchoolYearDto {
    /// Updated name (1-50 characters)
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    /// Updated description
    pub description: Option<String>,
    /// Updated first day
    pub start_date: Option<NaiveDate>,
    /// Updated last day
    pub end_date: Option<NaiveDate>,
    /// Updated end of the first semester
    pub first_semester_end: Option<NaiveDate>,
    /// Updated start of the second semester
    pub second_semester_start: Option<NaiveDate>,
}

/// Query parameters for filtering school years.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SchoolYearFilterParams {
    /// Filter by active flag ("true"/"false")
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub is_active: Option<String>,
    /// Filter by closed flag ("true"/"false")
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub is_closed: Option<String>,
}

impl SchoolYearFilterParams {
    pub fn is_active(&self) -> Option<bool> {
        self.is_active.as_deref().and_then(parse_flag)
    }

    pub fn is_closed(&self) -> Option<bool> {
        self.is_closed.as_deref().and_then(parse_flag)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Paginated response containing school years.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedSchoolYearsResponse {
    /// School years, latest start first
    pub data: Vec<SchoolYear>,
    /// Pagination metadata
    pub meta: PaginationMeta,
}
