//! # lessonbook calendar
//!
//! Pure calendar logic, free of I/O:
//!
//! - [`pt_dates`]: Portuguese date text ("16 e 17 de fevereiro de 2026")
//! - [`holidays`]: Easter and the Portuguese national holidays
//! - [`school_days`]: the school-day predicate of a school year
//! - [`generator`]: lesson days of a class from its weekly load
//! - [`numbering`]: summary and module numbering of a class calendar
//!
//! # Example
//!
//! ```ignore
//! use lessonbook_calendar::{generate, NonSchoolDays, SchoolCalendar, WeeklyLoad};
//!
//! let mut non_school = NonSchoolDays::default();
//! non_school.add_interruption(None, None, Some("22 de dezembro de 2025 a 2 de janeiro de 2026"))?;
//! let calendar = SchoolCalendar::new(start, end, non_school);
//! let lessons = generate(&calendar, start, end, &WeeklyLoad::new([2, 0, 1, 0, 0]), &[]);
//! ```

pub mod generator;
pub mod holidays;
pub mod numbering;
pub mod pt_dates;
pub mod school_days;

pub use generator::{ModulePlan, PlannedLesson, WeeklyLoad, generate};
pub use holidays::{NationalHoliday, easter_sunday, national_holidays, national_holidays_between};
pub use numbering::{Numbering, NumberingInput, number_entries};
pub use pt_dates::{DateTextError, days_between, expand_date_text, parse_pt_date};
pub use school_days::{NonSchoolDays, SchoolCalendar, holiday_days, interruption_days};
