//! # Lessonbook API
//!
//! A REST API built with Rust, Axum and SQLite for keeping a teacher's lesson
//! book: school years and their non-school days, classes with a weekly lesson
//! load, the generated lesson calendar with its numbered summaries, class
//! rosters and daily evaluations.
//!
//! ## Overview
//!
//! - **School years**: one active year at a time; closed years are read-only
//! - **School calendar**: interruptions and holidays, given as dates or as
//!   Portuguese text such as `"22 de dezembro de 2025 a 2 de janeiro de 2026"`
//! - **Lesson calendar**: generated per class, renumbered after every change
//!   so summary numbers stay contiguous
//! - **Import/export**: summaries as JSON or spreadsheet CSV, special dates,
//!   grade sheets
//! - **Backups**: startup rotation of the database file
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── modules/          # Feature modules
//! │   ├── school_years/
//! │   ├── school_calendar/
//! │   ├── classes/
//! │   ├── calendar/     # generation, entries, renumbering
//! │   ├── other_dates/
//! │   ├── calendar_io/
//! │   ├── students/
//! │   ├── evaluations/
//! │   └── backups/
//! └── utils/            # guards and download helpers
//! ```
//!
//! Each feature module follows the same layout:
//!
//! - `mod.rs`: Module exports
//! - `controller.rs`: HTTP handlers
//! - `service.rs`: Business logic
//! - `model.rs`: Re-exports of the DTOs in `lessonbook-models`
//! - `router.rs`: Axum router configuration
//!
//! ## Quick Start
//!
//! ```bash
//! DATABASE_URL=sqlite://lessonbook.db
//! DB_BACKUP_DIR=backups
//! DB_BACKUP_RETENTION=30
//! ```
//!
//! When the server is running, API documentation is available at:
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

// Re-export workspace crates for convenience
pub use lessonbook_calendar;
pub use lessonbook_config;
pub use lessonbook_core;
pub use lessonbook_db;
pub use lessonbook_models;
