//! Data models for database seeding configuration.

use chrono::NaiveDate;
use lessonbook_models::classes::{ClassKind, PeriodType};
use lessonbook_models::ids::ClassId;
use lessonbook_models::school_calendar::InterruptionKind;

/// Seed data for the school year.
pub struct SchoolYearSeed {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub first_semester_end: NaiveDate,
    pub second_semester_start: NaiveDate,
}

/// Seed data for a break written as Portuguese date text.
pub struct InterruptionSeed {
    pub kind: InterruptionKind,
    pub date_text: &'static str,
    pub description: &'static str,
}

/// Seed data for a module of a professional class.
pub struct ModuleSeed {
    pub name: &'static str,
    pub total_lessons: i64,
}

/// Seed data for a class.
pub struct ClassSeed {
    pub name: &'static str,
    pub kind: ClassKind,
    pub period_type: PeriodType,
    /// Lessons from Monday to Friday
    pub weekly_load: [i64; 5],
    pub modules: Vec<ModuleSeed>,
}

/// Seed data for a student.
pub struct StudentSeed {
    pub class_id: ClassId,
    pub process_number: String,
    pub number: i64,
    pub name: String,
    pub short_name: String,
}

/// Complete configuration for database seeding.
#[derive(Clone)]
pub struct SeedConfig {
    pub students_per_class: usize,
    pub activate: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            students_per_class: 24,
            activate: true,
        }
    }
}

impl SeedConfig {
    /// Creates a new seed configuration with the given roster size.
    pub fn new(students_per_class: usize) -> Self {
        Self {
            students_per_class,
            ..Default::default()
        }
    }

    /// Leaves the seeded year inactive.
    pub fn inactive(mut self) -> Self {
        self.activate = false;
        self
    }
}
