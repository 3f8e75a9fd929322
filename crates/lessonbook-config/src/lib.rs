//! # lessonbook config
//!
//! Configuration structures loaded from environment variables. Call
//! `dotenvy::dotenv()` first so a local `.env` file is honoured.
//!
//! - [`app`]: server address and `APP_ENV`
//! - [`cors`]: allowed origins
//! - [`database`]: SQLite location and pool size
//! - [`backup`]: backup directory, retention and host tag
//! - [`export`]: directory for JSON snapshots
//!
//! # Example
//!
//! ```ignore
//! use lessonbook_config::{BackupConfig, DatabaseConfig};
//!
//! let database = DatabaseConfig::from_env();
//! let backup = BackupConfig::from_env(&database);
//! ```

pub mod app;
pub mod backup;
pub mod cors;
pub mod database;
pub mod export;

pub use app::{AppEnv, ServerConfig};
pub use backup::BackupConfig;
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use export::ExportConfig;
