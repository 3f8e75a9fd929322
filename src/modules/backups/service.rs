use anyhow::anyhow;
use lessonbook_config::{BackupConfig, ExportConfig};
use lessonbook_core::AppError;
use lessonbook_core::backup::{BackupRotation, RotationOutcome, write_atomic};
use lessonbook_db::checkpoint_wal;
use lessonbook_models::classes::Class;
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::modules::backups::model::{BackupFile, BackupListing, JsonSnapshotResponse};
use crate::modules::calendar_io::model::summaries_stem;
use crate::modules::calendar_io::service::CalendarIoService;
use crate::utils::attachment::{dated_filename, today};

pub fn backup_rotation(config: &BackupConfig) -> BackupRotation {
    BackupRotation::new(
        config.database_path.clone().unwrap_or_default(),
        &config.backup_dir,
        config.retention,
        &config.host,
    )
}

/// Startup rotation. The WAL is checkpointed first so the copy holds every
/// committed write, including those of a server that was killed.
pub async fn startup_backup(config: &BackupConfig) -> anyhow::Result<Option<RotationOutcome>> {
    if let Some(path) = &config.database_path {
        checkpoint_wal(path).await?;
    }
    Ok(backup_rotation(config).run_once().await?)
}

pub struct BackupService;

impl BackupService {
    #[instrument(skip(config))]
    pub async fn list_backups(config: &BackupConfig) -> Result<BackupListing, AppError> {
        let rotation = backup_rotation(config);
        let backups = rotation.list_backups().await?;

        Ok(BackupListing {
            latest: backups.first().cloned(),
            backups,
            retention: rotation.retention(),
        })
    }

    /// A backup by name with its contents.
    #[instrument(skip(config))]
    pub async fn read_backup(
        config: &BackupConfig,
        name: &str,
    ) -> Result<(BackupFile, Vec<u8>), AppError> {
        let file = backup_rotation(config).find(name).await?;
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|e| AppError::internal(anyhow!("Failed to read {}: {e}", file.name)))?;
        Ok((file, bytes))
    }

    /// Writes the summaries export of every class into the snapshot
    /// directory.
    #[instrument(skip(db, config))]
    pub async fn write_json_snapshot(
        db: &SqlitePool,
        config: &ExportConfig,
    ) -> Result<JsonSnapshotResponse, AppError> {
        let classes = sqlx::query_as::<_, Class>("SELECT * FROM classes ORDER BY id")
            .fetch_all(db)
            .await?;

        let date = today();
        let mut files = Vec::with_capacity(classes.len());
        for class in classes {
            let (_, export) = CalendarIoService::export_json(db, class.id).await?;
            let json = serde_json::to_vec_pretty(&export)?;

            let stem = summaries_stem(&format!("{}_{}", class.id, class.name));
            let name = dated_filename(&stem, date, "json");
            write_atomic(&config.json_backup_dir.join(&name), &json).await?;
            files.push(name);
        }

        info!(
            dir = %config.json_backup_dir.display(),
            files = files.len(),
            "JSON snapshot written"
        );
        Ok(JsonSnapshotResponse {
            directory: config.json_backup_dir.display().to_string(),
            files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> BackupConfig {
        BackupConfig {
            database_path: None,
            backup_dir: dir.path().to_path_buf(),
            retention: 30,
            host: "lab".to_string(),
        }
    }

    #[tokio::test]
    async fn test_listing_and_download() {
        let dir = TempDir::new().unwrap();
        for name in [
            "backup-20250101-080000-000-lab.db",
            "backup-20250102-080000-000-lab.db",
            "notes.txt",
        ] {
            tokio::fs::write(dir.path().join(name), b"sqlite").await.unwrap();
        }

        let listing = BackupService::list_backups(&config(&dir)).await.unwrap();
        assert_eq!(listing.backups.len(), 2);
        assert!(listing.latest.is_some());

        let (file, bytes) =
            BackupService::read_backup(&config(&dir), "backup-20250101-080000-000-lab.db")
                .await
                .unwrap();
        assert_eq!(file.size_bytes, 6);
        assert_eq!(bytes, b"sqlite");
    }

    #[tokio::test]
    async fn test_download_rejects_bad_names() {
        let dir = TempDir::new().unwrap();
        let err = BackupService::read_backup(&config(&dir), "../lessonbook.db")
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = BackupService::read_backup(&config(&dir), "backup-19990101-000000-000-x.db")
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_json_snapshot_writes_one_file_per_class(pool: SqlitePool) {
        let year_id: i64 = sqlx::query_scalar(
            "INSERT INTO school_years (name, start_date, end_date) VALUES ('2025/2026', '2025-09-15', '2026-06-30') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        for name in ["10.º B", "12.º A"] {
            sqlx::query("INSERT INTO classes (school_year_id, name) VALUES (?, ?)")
                .bind(year_id)
                .bind(name)
                .execute(&pool)
                .await
                .unwrap();
        }

        let dir = TempDir::new().unwrap();
        let export = ExportConfig {
            json_backup_dir: dir.path().join("snapshots"),
        };
        let response = BackupService::write_json_snapshot(&pool, &export)
            .await
            .unwrap();

        assert_eq!(response.files.len(), 2);
        assert!(response.files[0].starts_with("calendario_1_10._B_sumarios_"));
        let written: PathBuf = export.json_backup_dir.join(&response.files[1]);
        let contents = tokio::fs::read_to_string(written).await.unwrap();
        assert!(contents.contains("12.º A"));
    }
}
