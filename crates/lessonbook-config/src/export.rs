use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct ExportConfig {
    /// Where `POST /api/backups/json` writes one summaries file per class
    pub json_backup_dir: PathBuf,
}

impl ExportConfig {
    pub fn from_env() -> Self {
        Self {
            json_backup_dir: env::var("BACKUP_JSON_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("exports").join("backups")),
        }
    }
}
