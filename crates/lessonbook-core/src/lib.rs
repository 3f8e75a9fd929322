//! # lessonbook core
//!
//! Foundational types shared by every lessonbook crate:
//!
//! - [`errors`]: application error type with HTTP response conversion
//! - [`pagination`]: page-based pagination for list endpoints
//! - [`serde`]: query-string deserialization helpers
//! - [`spreadsheet`]: spreadsheet-friendly CSV writing and reading
//! - [`backup`]: database backup rotation
//!
//! # Example
//!
//! ```ignore
//! use lessonbook_core::errors::AppError;
//! use lessonbook_core::pagination::PaginationParams;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Class not found"));
//! let params = PaginationParams::default();
//! let limit = params.limit();
//! ```

pub mod backup;
pub mod errors;
pub mod pagination;
pub mod serde;
pub mod spreadsheet;

pub use backup::{BackupError, BackupFile, BackupRotation};
pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
