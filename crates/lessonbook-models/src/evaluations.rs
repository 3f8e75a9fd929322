//! Daily student evaluations and aggregated grades.
//!
//! One evaluation per (lesson entry, student). Missing evaluations read as
//! the defaults: on time, no absences, every dimension at the mid value 3.

use crate::ids::{EvaluationId, LessonEntryId, StudentId};
use chrono::{DateTime, NaiveDate, Utc};
use lessonbook_core::serde::deserialize_optional_date;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_DIMENSION: i64 = 3;

/// Stored evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DailyEvaluation {
    pub id: EvaluationId,
    pub entry_id: LessonEntryId,
    pub student_id: StudentId,
    pub late: bool,
    pub absences: i64,
    pub responsibility: i64,
    pub behaviour: i64,
    pub participation: i64,
    pub autonomous_work: i64,
    pub materials: i64,
    pub activity: i64,
    pub disciplinary_absence: i64,
    pub updated_at: DateTime<Utc>,
}

/// One student's row for a lesson, stored or defaulted.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EvaluationRow {
    pub student_id: StudentId,
    pub number: Option<i64>,
    pub name: String,
    pub short_name: Option<String>,
    pub special_needs: bool,
    /// Whether a stored evaluation exists
    pub evaluated: bool,
    pub late: bool,
    pub absences: i64,
    pub responsibility: i64,
    pub behaviour: i64,
    pub participation: i64,
    pub autonomous_work: i64,
    pub materials: i64,
    pub activity: i64,
    pub disciplinary_absence: i64,
}

fn default_dimension() -> i64 {
    DEFAULT_DIMENSION
}

/// Evaluation of one student; dimensions range 1..=5.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EvaluationInput {
    pub student_id: StudentId,
    #[serde(default)]
    pub late: bool,
    #[serde(default)]
    #[validate(range(min = 0, max = 20))]
    pub absences: i64,
    #[serde(default = "default_dimension")]
    #[validate(range(min = 1, max = 5))]
    pub responsibility: i64,
    #[serde(default = "default_dimension")]
    #[validate(range(min = 1, max = 5))]
    pub behaviour: i64,
    #[serde(default = "default_dimension")]
    #[validate(range(min = 1, max = 5))]
    pub participation: i64,
    #[serde(default = "default_dimension")]
    #[validate(range(min = 1, max = 5))]
    pub autonomous_work: i64,
    #[serde(default = "default_dimension")]
    #[validate(range(min = 1, max = 5))]
    pub materials: i64,
    #[serde(default = "default_dimension")]
    #[validate(range(min = 1, max = 5))]
    pub activity: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = 20))]
    pub disciplinary_absence: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertEvaluationsDto {
    #[validate(nested)]
    pub evaluations: Vec<EvaluationInput>,
}

/// Aggregated grades of one student.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct GradeSummary {
    pub student_id: StudentId,
    pub number: Option<i64>,
    pub name: String,
    pub lessons_evaluated: i64,
    pub late_count: i64,
    pub absences: i64,
    pub disciplinary_absences: i64,
    pub responsibility: Option<f64>,
    pub behaviour: Option<f64>,
    pub participation: Option<f64>,
    pub autonomous_work: Option<f64>,
    pub materials: Option<f64>,
    pub activity: Option<f64>,
    /// Mean of the six dimension averages
    #[sqlx(skip)]
    pub overall: Option<f64>,
}

impl GradeSummary {
    pub fn dimension_averages(&self) -> [Option<f64>; 6] {
        [
            self.responsibility,
            self.behaviour,
            self.participation,
            self.autonomous_work,
            self.materials,
            self.activity,
        ]
    }

    /// Fills `overall` from the dimension averages present.
    pub fn with_overall(mut self) -> Self {
        let present: Vec<f64> = self.dimension_averages().into_iter().flatten().collect();
        self.overall = if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f64>() / present.len() as f64)
        };
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GradesFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub to: Option<NaiveDate>,
}
