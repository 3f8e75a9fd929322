pub use lessonbook_models::school_calendar::*;

use lessonbook_core::serde::deserialize_optional_i64;
use lessonbook_models::ids::SchoolYearId;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for the school calendar export.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SchoolCalendarParams {
    /// School year; defaults to the active year, then the latest one
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    #[param(value_type = Option<i64>)]
    #[schema(value_type = Option<i64>)]
    pub school_year_id: Option<i64>,
}

impl SchoolCalendarParams {
    pub fn school_year_id(&self) -> Option<SchoolYearId> {
        self.school_year_id.map(SchoolYearId::from)
    }
}
