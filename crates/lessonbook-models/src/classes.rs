//! Class ("turma") and module domain models and DTOs.
//!
//! A class belongs to one school year and carries its weekly lesson load: the
//! number of lessons held on each weekday. Professional classes split their
//! lessons into ordered modules, each with a lesson total and a small
//! tolerance.

use crate::ids::{ClassId, ModuleId, SchoolYearId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use lessonbook_core::serde::deserialize_optional_i64;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
pub enum ClassKind {
    #[default]
    #[serde(rename = "regular")]
    #[sqlx(rename = "regular")]
    Regular,
    #[serde(rename = "profissional")]
    #[sqlx(rename = "profissional")]
    Professional,
}

/// Which part of the school year the class runs in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
pub enum PeriodType {
    #[default]
    #[serde(rename = "anual")]
    #[sqlx(rename = "anual")]
    Annual,
    #[serde(rename = "semestre1")]
    #[sqlx(rename = "semestre1")]
    FirstSemester,
    #[serde(rename = "semestre2")]
    #[sqlx(rename = "semestre2")]
    SecondSemester,
}

/// Class entity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Class {
    /// Unique identifier
    pub id: ClassId,
    /// Owning school year
    pub school_year_id: SchoolYearId,
    /// Class name, unique within the year (e.g. "10.º B")
    pub name: String,
    /// Regular or professional course
    pub kind: ClassKind,
    /// Annual or one of the semesters
    pub period_type: PeriodType,
    /// Lessons on Mondays
    pub load_monday: i64,
    /// Lessons on Tuesdays
    pub load_tuesday: i64,
    /// Lessons on Wednesdays
    pub load_wednesday: i64,
    /// Lessons on Thursdays
    pub load_thursday: i64,
    /// Lessons on Fridays
    pub load_friday: i64,
    /// Timestamp when the class was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the class was last updated
    pub updated_at: DateTime<Utc>,
}

impl Class {
    /// Lessons per weekday, Monday first.
    pub fn weekly_load(&self) -> [i64; 5] {
        [
            self.load_monday,
            self.load_tuesday,
            self.load_wednesday,
            self.load_thursday,
            self.load_friday,
        ]
    }

    /// Load for a weekday index (0 = Monday); weekends carry none.
    pub fn load_for_weekday(&self, weekday: u32) -> i64 {
        self.weekly_load()
            .get(weekday as usize)
            .copied()
            .unwrap_or(0)
    }
}

/// DTO for creating a class.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    /// Owning school year (must be open)
    pub school_year_id: SchoolYearId,
    /// Class name (1-50 characters)
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    /// Regular or professional (default "regular")
    #[serde(default)]
    pub kind: ClassKind,
    /// Period type (default "anual")
    #[serde(default)]
    pub period_type: PeriodType,
    /// Lessons on Mondays (0-12)
    #[serde(default)]
    #[validate(range(min = 0, max = 12))]
    pub load_monday: i64,
    /// Lessons on Tuesdays (0-12)
    #[serde(default)]
    #[validate(range(min = 0, max = 12))]
    pub load_tuesday: i64,
    /// Lessons on Wednesdays (0-12)
    #[serde(default)]
    #[validate(range(min = 0, max = 12))]
    pub load_wednesday: i64,
    /// Lessons on Thursdays (0-12)
    #[serde(default)]
    #[validate(range(min = 0, max = 12))]
    pub load_thursday: i64,
    /// Lessons on Fridays (0-12)
    #[serde(default)]
    #[validate(range(min = 0, max = 12))]
    pub load_friday: i64,
}

/// DTO for updating a class. Absent fields keep their value.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateClassDto {
    /// Move the class to another (open) school year
    pub school_year_id: Option<SchoolYearId>,
    /// Updated name (1-50 characters)
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    /// Updated kind
    pub kind: Option<ClassKind>,
    /// Updated period type
    pub period_type: Option<PeriodType>,
    #[validate(range(min = 0, max = 12))]
    pub load_monday: Option<i64>,
    #[validate(range(min = 0, max = 12))]
    pub load_tuesday: Option<i64>,
    #[validate(range(min = 0, max = 12))]
    pub load_wednesday: Option<i64>,
    #[validate(range(min = 0, max = 12))]
    pub load_thursday: Option<i64>,
    #[validate(range(min = 0, max = 12))]
    pub load_friday: Option<i64>,
}

/// Query parameters for listing classes.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassFilterParams {
    /// Only classes of this school year (defaults to the current year)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub school_year_id: Option<i64>,
    /// List classes of every year
    #[serde(default)]
    pub all_years: Option<bool>,
}

/// Module entity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Module {
    /// Unique identifier
    pub id: ModuleId,
    /// Owning class
    pub class_id: ClassId,
    /// Module name (e.g. "UFCD 0778")
    pub name: String,
    /// Planned number of lessons
    pub total_lessons: i64,
    /// Extra lessons the module may absorb before the next one starts
    pub tolerance: i64,
    /// Order inside the class
    pub position: i64,
}

/// DTO for creating or replacing a module.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ModuleDto {
    /// Module name (1-100 characters)
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Planned number of lessons (1-1000)
    #[validate(range(min = 1, max = 1000))]
    pub total_lessons: i64,
    /// Tolerance (0-20, default 2)
    #[serde(default = "default_tolerance")]
    #[validate(range(min = 0, max = 20))]
    pub tolerance: i64,
    /// Order inside the class (defaults to last)
    pub position: Option<i64>,
}

fn default_tolerance() -> i64 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&PeriodType::FirstSemester).unwrap(),
            "\"semestre1\""
        );
        let kind: ClassKind = serde_json::from_str("\"profissional\"").unwrap();
        assert_eq!(kind, ClassKind::Professional);
    }

    #[test]
    fn test_create_class_defaults() {
        let dto: CreateClassDto =
            serde_json::from_str(r#"{"school_year_id": 1, "name": "9.º D", "load_tuesday": 2}"#)
                .unwrap();
        assert_eq!(dto.kind, ClassKind::Regular);
        assert_eq!(dto.period_type, PeriodType::Annual);
        assert_eq!(dto.load_monday, 0);
        assert_eq!(dto.load_tuesday, 2);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_load_out_of_range_rejected() {
        let dto: CreateClassDto =
            serde_json::from_str(r#"{"school_year_id": 1, "name": "9.º D", "load_friday": 40}"#)
                .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_module_default_tolerance() {
        let dto: ModuleDto = serde_json::from_str(r#"{"name": "M1", "total_lessons": 25}"#).unwrap();
        assert_eq!(dto.tolerance, 2);
    }
}
