//! Domain models for lessonbook.
//!
//! Entities map one-to-one onto the SQLite tables; DTOs carry `validator`
//! rules and `utoipa` schemas for the HTTP layer.

pub mod calendar;
pub mod calendar_io;
pub mod classes;
pub mod evaluations;
pub mod ids;
pub mod school_calendar;
pub mod school_years;
pub mod students;

pub use ids::*;
