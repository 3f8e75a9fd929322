pub mod backups;
pub mod calendar;
pub mod calendar_io;
pub mod classes;
pub mod evaluations;
pub mod other_dates;
pub mod school_calendar;
pub mod school_years;
pub mod students;
