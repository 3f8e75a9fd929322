//! Interruptions and holidays of a school year.
//!
//! Both may be given as explicit dates or as Portuguese date text
//! ("22 de dezembro de 2025 a 2 de janeiro de 2026"). Text takes precedence
//! for interruptions.

use crate::ids::{HolidayId, InterruptionId, SchoolYearId};
use crate::school_years::SchoolYear;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Kind of school break.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum InterruptionKind {
    Natal,
    Pascoa,
    Carnaval,
    Intercalar1,
    Intercalar2,
    #[default]
    Outros,
}

/// Interruption entity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Interruption {
    /// Unique identifier
    pub id: InterruptionId,
    /// Owning school year
    pub school_year_id: SchoolYearId,
    /// Kind of break
    pub kind: InterruptionKind,
    /// First day, when given as a date
    pub start_date: Option<NaiveDate>,
    /// Last day, when given as a date
    pub end_date: Option<NaiveDate>,
    /// Portuguese date text; takes precedence over the dates
    pub date_text: Option<String>,
    /// Optional description
    pub description: Option<String>,
}

/// DTO for creating or replacing an interruption.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct InterruptionDto {
    /// Kind of break (default "outros")
    #[serde(default)]
    pub kind: InterruptionKind,
    /// First day
    pub start_date: Option<NaiveDate>,
    /// Last day (defaults to start_date)
    pub end_date: Option<NaiveDate>,
    /// Portuguese date text, e.g. "16 e 17 de fevereiro de 2026"
    #[validate(length(max = 200))]
    pub date_text: Option<String>,
    /// Optional description
    #[validate(length(max = 200))]
    pub description: Option<String>,
}

/// Holiday entity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Holiday {
    /// Unique identifier
    pub id: HolidayId,
    /// Owning school year
    pub school_year_id: SchoolYearId,
    /// Holiday date
    pub date: Option<NaiveDate>,
    /// Portuguese date text, used when `date` is empty
    pub date_text: Option<String>,
    /// Holiday name
    pub name: String,
}

/// DTO for creating or replacing a holiday.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct HolidayDto {
    /// Holiday date
    pub date: Option<NaiveDate>,
    /// Portuguese date text
    #[validate(length(max = 200))]
    pub date_text: Option<String>,
    /// Holiday name (1-100 characters)
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Interruption with its expanded days.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InterruptionDays {
    #[serde(flatten)]
    pub interruption: Interruption,
    /// Every day covered, ascending
    pub days: Vec<NaiveDate>,
}

/// Holiday with its expanded days.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HolidayDays {
    #[serde(flatten)]
    pub holiday: Holiday,
    /// Every day covered, ascending
    pub days: Vec<NaiveDate>,
}

/// School calendar of a year: breaks and holidays with expanded days.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SchoolCalendarExport {
    pub school_year: SchoolYear,
    pub interruptions: Vec<InterruptionDays>,
    pub holidays: Vec<HolidayDays>,
}
