//! Backup rotation settings.
//!
//! - `DB_BACKUP_DIR`: backup directory (default `backups`)
//! - `DB_BACKUP_RETENTION`: how many backups to keep (default 30)
//! - `BACKUP_HOST`, then `HOSTNAME` / `COMPUTERNAME`: host tag in file names

use std::env;
use std::path::PathBuf;

use crate::database::DatabaseConfig;

pub const DEFAULT_RETENTION: usize = 30;

#[derive(Clone, Debug)]
pub struct BackupConfig {
    /// Database file being backed up, `None` for in-memory databases
    pub database_path: Option<PathBuf>,
    pub backup_dir: PathBuf,
    pub retention: usize,
    pub host: String,
}

impl BackupConfig {
    pub fn from_env(database: &DatabaseConfig) -> Self {
        let retention = match env::var("DB_BACKUP_RETENTION") {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %value, "Invalid DB_BACKUP_RETENTION, using default");
                DEFAULT_RETENTION
            }),
            Err(_) => DEFAULT_RETENTION,
        };

        let host = env::var("BACKUP_HOST")
            .or_else(|_| env::var("HOSTNAME"))
            .or_else(|_| env::var("COMPUTERNAME"))
            .unwrap_or_else(|_| "local".to_string());

        Self {
            database_path: database.database_path(),
            backup_dir: env::var("DB_BACKUP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("backups")),
            retention,
            host,
        }
    }
}
