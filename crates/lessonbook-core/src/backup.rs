//! Database backup rotation.
//!
//! On startup the active SQLite file is copied into the backup directory as
//! `backup-<YYYYmmdd-HHMMSS-mmm>-<host>.db`, then every backup beyond the
//! retention count is deleted, newest kept first.
//!
//! The copy lands in a `.tmp` file that is synced and renamed into place, so a
//! half-written file is never listed as a backup. The active database file is
//! only ever read. Restoring is a manual file replace; nothing here writes
//! back to the database path.
//!
//! # Example
//!
//! ```ignore
//! use lessonbook_core::backup::BackupRotation;
//!
//! let rotation = BackupRotation::new("lessonbook.db", "backups", 30, "lab-pc");
//! let outcome = rotation.run().await?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

pub const BACKUP_PREFIX: &str = "backup-";
pub const BACKUP_EXTENSION: &str = "db";
pub const DEFAULT_RETENTION: usize = 30;

static STARTUP_BACKUP_DONE: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid backup name: {0}")]
    InvalidName(String),
    #[error("backup not found: {0}")]
    NotFound(String),
}

impl BackupError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A backup file on disk.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BackupFile {
    /// File name inside the backup directory
    pub name: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Creation time (modification time where the filesystem has no birth time)
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub path: PathBuf,
}

/// Result of one rotation run.
#[derive(Debug, Clone)]
pub struct RotationOutcome {
    /// The new backup, `None` when the database file did not exist yet
    pub created: Option<BackupFile>,
    /// Backups removed by pruning
    pub pruned: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct BackupRotation {
    database_path: PathBuf,
    backup_dir: PathBuf,
    retention: usize,
    host: String,
}

impl BackupRotation {
    pub fn new(
        database_path: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
        retention: usize,
        host: &str,
    ) -> Self {
        Self {
            database_path: database_path.into(),
            backup_dir: backup_dir.into(),
            retention,
            host: sanitize_host(host),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Runs the rotation the first time it is called in this process and is a
    /// no-op afterwards.
    pub async fn run_once(&self) -> Result<Option<RotationOutcome>, BackupError> {
        if STARTUP_BACKUP_DONE.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }
        self.run().await.map(Some)
    }

    /// Copies the database, then prunes.
    #[instrument(skip(self), fields(db = %self.database_path.display()))]
    pub async fn run(&self) -> Result<RotationOutcome, BackupError> {
        let created = if fs::try_exists(&self.database_path).await.unwrap_or(false) {
            Some(self.create_backup().await?)
        } else {
            warn!("Database file does not exist yet, skipping backup copy");
            None
        };

        let pruned = self.prune().await?;

        Ok(RotationOutcome { created, pruned })
    }

    pub async fn create_backup(&self) -> Result<BackupFile, BackupError> {
        fs::create_dir_all(&self.backup_dir)
            .await
            .map_err(|e| BackupError::io(&self.backup_dir, e))?;

        let now = Utc::now();
        let name = format!(
            "{}{}-{:03}-{}.{}",
            BACKUP_PREFIX,
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_millis(),
            self.host,
            BACKUP_EXTENSION
        );
        let target = self.backup_dir.join(&name);
        let temp = self.backup_dir.join(format!("{name}.tmp"));

        if let Err(e) = copy_synced(&self.database_path, &temp).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e);
        }
        publish(&temp, &target).await?;

        let backup = describe(&target).await?;
        info!(backup = %backup.name, size_bytes = backup.size_bytes, "Database backup created");
        Ok(backup)
    }

    /// All backups, newest first.
    pub async fn list_backups(&self) -> Result<Vec<BackupFile>, BackupError> {
        let mut entries = match fs::read_dir(&self.backup_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BackupError::io(&self.backup_dir, e)),
        };

        let mut backups = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BackupError::io(&self.backup_dir, e))?
        {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if is_backup_name(&file_name) {
                backups.push(describe(&entry.path()).await?);
            }
        }

        backups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.name.cmp(&a.name))
        });

        Ok(backups)
    }

    pub async fn latest(&self) -> Result<Option<BackupFile>, BackupError> {
        Ok(self.list_backups().await?.into_iter().next())
    }

    /// Deletes every backup beyond the retention count.
    pub async fn prune(&self) -> Result<Vec<PathBuf>, BackupError> {
        let mut removed = Vec::new();
        for backup in self.list_backups().await?.into_iter().skip(self.retention) {
            if backup.path == self.database_path {
                continue;
            }
            fs::remove_file(&backup.path)
                .await
                .map_err(|e| BackupError::io(&backup.path, e))?;
            removed.push(backup.path);
        }

        if !removed.is_empty() {
            info!(
                removed = removed.len(),
                retention = self.retention,
                "Pruned old backups"
            );
        }
        Ok(removed)
    }

    /// Resolves a backup by file name, rejecting anything that is not a plain
    /// backup file name inside the backup directory.
    pub async fn find(&self, name: &str) -> Result<BackupFile, BackupError> {
        validate_name(name)?;
        let path = self.backup_dir.join(name);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(BackupError::NotFound(name.to_string()));
        }
        describe(&path).await
    }
}

/// Writes `contents` to `path` through a synced temp file and a rename.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), BackupError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| BackupError::io(parent, e))?;
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    let mut file = fs::File::create(&temp)
        .await
        .map_err(|e| BackupError::io(&temp, e))?;
    file.write_all(contents)
        .await
        .map_err(|e| BackupError::io(&temp, e))?;
    file.sync_all().await.map_err(|e| BackupError::io(&temp, e))?;
    drop(file);

    publish(&temp, path).await
}

/// Keeps `[A-Za-z0-9_-]`, maps everything else to `_`.
pub fn sanitize_host(host: &str) -> String {
    let cleaned: String = host
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "local".to_string()
    } else {
        cleaned
    }
}

pub fn is_backup_name(name: &str) -> bool {
    name.starts_with(BACKUP_PREFIX) && name.ends_with(&format!(".{BACKUP_EXTENSION}"))
}

fn validate_name(name: &str) -> Result<(), BackupError> {
    if name.contains('/') || name.contains('\\') || name.contains("..") || !is_backup_name(name)
    {
        return Err(BackupError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Renames a finished temp file into place. A failed rename removes the
/// temp file.
async fn publish(temp: &Path, target: &Path) -> Result<(), BackupError> {
    if let Err(e) = fs::rename(temp, target).await {
        let _ = fs::remove_file(temp).await;
        return Err(BackupError::io(target, e));
    }
    Ok(())
}

async fn copy_synced(from: &Path, to: &Path) -> Result<(), BackupError> {
    fs::copy(from, to).await.map_err(|e| BackupError::io(from, e))?;
    let file = fs::OpenOptions::new()
        .write(true)
        .open(to)
        .await
        .map_err(|e| BackupError::io(to, e))?;
    file.sync_all().await.map_err(|e| BackupError::io(to, e))
}

async fn describe(path: &Path) -> Result<BackupFile, BackupError> {
    let metadata = fs::metadata(path)
        .await
        .map_err(|e| BackupError::io(path, e))?;
    let created: SystemTime = metadata
        .created()
        .or_else(|_| metadata.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH);

    Ok(BackupFile {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        size_bytes: metadata.len(),
        created_at: DateTime::<Utc>::from(created),
        path: path.to_path_buf(),
    })
}
