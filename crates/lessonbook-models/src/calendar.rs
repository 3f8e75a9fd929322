//! Lesson calendar entries of a class.
//!
//! Each entry is one lesson day. Only `normal` entries count towards the
//! summary sequence; every other kind (strike, official service, teacher
//! absence, other, extra) keeps its numbering fields empty.

use crate::ids::{ClassId, LessonEntryId, ModuleId};
use chrono::{DateTime, NaiveDate, Utc};
use lessonbook_core::serde::{
    deserialize_optional_date, deserialize_optional_i64, deserialize_optional_string,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Kind of a lesson entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
pub enum LessonKind {
    #[default]
    #[serde(rename = "normal")]
    #[sqlx(rename = "normal")]
    Normal,
    #[serde(rename = "greve")]
    #[sqlx(rename = "greve")]
    Strike,
    #[serde(rename = "servico_oficial")]
    #[sqlx(rename = "servico_oficial")]
    OfficialService,
    #[serde(rename = "faltei")]
    #[sqlx(rename = "faltei")]
    TeacherAbsence,
    #[serde(rename = "outros")]
    #[sqlx(rename = "outros")]
    Other,
    #[serde(rename = "extra")]
    #[sqlx(rename = "extra")]
    Extra,
}

impl LessonKind {
    pub const ALL: [LessonKind; 6] = [
        LessonKind::Normal,
        LessonKind::Strike,
        LessonKind::OfficialService,
        LessonKind::TeacherAbsence,
        LessonKind::Other,
        LessonKind::Extra,
    ];

    /// Whether entries of this kind advance the summary sequence.
    pub fn counts(self) -> bool {
        matches!(self, LessonKind::Normal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LessonKind::Normal => "normal",
            LessonKind::Strike => "greve",
            LessonKind::OfficialService => "servico_oficial",
            LessonKind::TeacherAbsence => "faltei",
            LessonKind::Other => "outros",
            LessonKind::Extra => "extra",
        }
    }

    /// Human label used in spreadsheet exports.
    pub fn label(self) -> &'static str {
        match self {
            LessonKind::Normal => "Normal",
            LessonKind::Strike => "Greve",
            LessonKind::OfficialService => "Serviço oficial",
            LessonKind::TeacherAbsence => "Faltei",
            LessonKind::Other => "Outros",
            LessonKind::Extra => "Extra",
        }
    }
}

impl fmt::Display for LessonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLessonKind(pub String);

impl fmt::Display for UnknownLessonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown lesson kind: {}", self.0)
    }
}

impl std::error::Error for UnknownLessonKind {}

impl FromStr for LessonKind {
    type Err = UnknownLessonKind;

    /// Accepts wire names and labels, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(' ', "_");
        LessonKind::ALL
            .into_iter()
            .find(|kind| {
                kind.as_str() == normalized
                    || kind.label().to_lowercase().replace(' ', "_") == normalized
            })
            .ok_or_else(|| UnknownLessonKind(s.to_string()))
    }
}

/// Lesson calendar entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LessonEntry {
    /// Unique identifier
    pub id: LessonEntryId,
    /// Owning class
    pub class_id: ClassId,
    /// Lesson date
    pub date: NaiveDate,
    /// Weekday, 0 = Monday
    pub weekday: i64,
    /// Entry kind
    pub kind: LessonKind,
    /// Lessons held that day
    pub lesson_count: i64,
    /// Module of the last lesson of the day
    pub module_id: Option<ModuleId>,
    /// Index of the last lesson inside its module
    pub module_number: Option<i64>,
    /// Last summary number of the day
    pub total_number: Option<i64>,
    /// Summary numbers of the day, e.g. "12,13"
    pub summary_numbers: Option<String>,
    /// Lesson summary ("sumário")
    pub summary: Option<String>,
    /// Planned content ("previsão")
    pub forecast: Option<String>,
    /// Lesson periods that do not count
    pub non_lesson_time: i64,
    pub observations: Option<String>,
    /// Whether an activity took place
    pub activity: bool,
    pub activity_name: Option<String>,
    /// Soft-delete flag
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entry together with its class name, for cross-class views.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LessonEntryWithClass {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub entry: LessonEntry,
    /// Name of the owning class
    pub class_name: String,
}

fn default_lesson_count() -> i64 {
    1
}

/// DTO for adding an entry to a class calendar.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLessonEntryDto {
    /// Lesson date
    pub date: NaiveDate,
    /// Entry kind (default "normal")
    #[serde(default)]
    pub kind: LessonKind,
    /// Lessons held that day (1-12, default 1)
    #[serde(default = "default_lesson_count")]
    #[validate(range(min = 1, max = 12))]
    pub lesson_count: i64,
    pub summary: Option<String>,
    pub forecast: Option<String>,
    /// Lesson periods that do not count (0-12)
    #[serde(default)]
    #[validate(range(min = 0, max = 12))]
    pub non_lesson_time: i64,
    pub observations: Option<String>,
    #[serde(default)]
    pub activity: bool,
    #[validate(length(max = 200))]
    pub activity_name: Option<String>,
}

/// DTO for editing an entry. Absent fields keep their value.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateLessonEntryDto {
    pub date: Option<NaiveDate>,
    pub kind: Option<LessonKind>,
    #[validate(range(min = 1, max = 12))]
    pub lesson_count: Option<i64>,
    pub summary: Option<String>,
    pub forecast: Option<String>,
    #[validate(range(min = 0, max = 12))]
    pub non_lesson_time: Option<i64>,
    pub observations: Option<String>,
    pub activity: Option<bool>,
    #[validate(length(max = 200))]
    pub activity_name: Option<String>,
}

/// Inline summary edit.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateSummaryDto {
    pub summary: Option<String>,
    pub forecast: Option<String>,
    pub observations: Option<String>,
    /// Changing the kind renumbers the class
    pub kind: Option<LessonKind>,
}

/// DTO for adding an extra lesson.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddExtraLessonDto {
    pub class_id: ClassId,
    pub date: NaiveDate,
    /// Lessons held (1-12, default 1)
    #[serde(default = "default_lesson_count")]
    #[validate(range(min = 1, max = 12))]
    pub lesson_count: i64,
    pub summary: Option<String>,
    pub observations: Option<String>,
}

/// Bulk kind change for every class on one date.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangeKindDto {
    pub date: NaiveDate,
    /// Target kind; "extra" is not allowed
    pub kind: LessonKind,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChangeKindResponse {
    pub date: NaiveDate,
    pub kind: LessonKind,
    /// Entries whose kind changed
    pub changed: i64,
    /// Classes skipped because their school year is closed
    pub blocked_classes: Vec<String>,
    /// Classes renumbered after the change
    pub renumbered_classes: Vec<ClassId>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenerateCalendarResponse {
    pub class_id: ClassId,
    /// Entries created
    pub created: i64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResetCalendarResponse {
    pub class_id: ClassId,
    /// Rows removed, soft-deleted ones included
    pub deleted: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenumberResponse {
    pub class_id: ClassId,
    /// Live entries walked
    pub entries: i64,
    /// Last summary number assigned
    pub last_number: Option<i64>,
}

/// Query parameters for a class calendar.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarFilterParams {
    /// First date (YYYY-MM-DD or dd/mm/YYYY)
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub from: Option<NaiveDate>,
    /// Last date
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub to: Option<NaiveDate>,
    /// Semester 1 or 2 of the class's school year
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub semester: Option<i64>,
    /// Only entries of this kind
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub kind: Option<String>,
}

/// Query parameters for the special lessons list.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OtherDatesFilterParams {
    /// Only this non-normal kind
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub class_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub to: Option<NaiveDate>,
}

/// Query parameters for the day view.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DayFilterParams {
    /// Day to show (required)
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub class_id: Option<i64>,
}

/// Parses an optional kind filter, mapping unknown values to an error message.
pub fn parse_kind_filter(kind: Option<&str>) -> Result<Option<LessonKind>, UnknownLessonKind> {
    kind.map(str::parse).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_normal_counts() {
        let counting: Vec<_> = LessonKind::ALL.into_iter().filter(|k| k.counts()).collect();
        assert_eq!(counting, vec![LessonKind::Normal]);
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&LessonKind::OfficialService).unwrap(),
            "\"servico_oficial\""
        );
        let kind: LessonKind = serde_json::from_str("\"faltei\"").unwrap();
        assert_eq!(kind, LessonKind::TeacherAbsence);
    }

    #[test]
    fn test_kind_from_str_accepts_labels() {
        assert_eq!("GREVE".parse::<LessonKind>().unwrap(), LessonKind::Strike);
        assert_eq!(
            "Serviço oficial".parse::<LessonKind>().unwrap(),
            LessonKind::OfficialService
        );
        assert!("feriado".parse::<LessonKind>().is_err());
    }

    #[test]
    fn test_create_entry_defaults() {
        let dto: CreateLessonEntryDto = serde_json::from_str(r#"{"date": "2025-09-15"}"#).unwrap();
        assert_eq!(dto.kind, LessonKind::Normal);
        assert_eq!(dto.lesson_count, 1);
        assert_eq!(dto.non_lesson_time, 0);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_zero_lesson_count_rejected() {
        let dto: CreateLessonEntryDto =
            serde_json::from_str(r#"{"date": "2025-09-15", "lesson_count": 0}"#).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_parse_kind_filter() {
        assert_eq!(parse_kind_filter(None).unwrap(), None);
        assert_eq!(
            parse_kind_filter(Some("extra")).unwrap(),
            Some(LessonKind::Extra)
        );
        assert!(parse_kind_filter(Some("x")).is_err());
    }
}
