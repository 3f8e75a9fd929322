pub use lessonbook_core::backup::BackupFile;
use serde::Serialize;
use utoipa::ToSchema;

/// Backup directory listing, newest first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BackupListing {
    pub backups: Vec<BackupFile>,
    pub latest: Option<BackupFile>,
    /// How many backups rotation keeps
    pub retention: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JsonSnapshotResponse {
    pub directory: String,
    /// File names written, one per class
    pub files: Vec<String>,
}
