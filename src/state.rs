use lessonbook_config::{BackupConfig, CorsConfig, DatabaseConfig, ExportConfig};
use lessonbook_db::init_db_pool;
use sqlx::SqlitePool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: SqlitePool,
    pub cors_config: CorsConfig,
    pub backup_config: BackupConfig,
    pub export_config: ExportConfig,
}

impl AppState {
    /// State over an existing pool, with the remaining settings read from the environment.
    pub fn from_pool(db: SqlitePool, database: &DatabaseConfig) -> Self {
        Self {
            db,
            cors_config: CorsConfig::from_env(),
            backup_config: BackupConfig::from_env(database),
            export_config: ExportConfig::from_env(),
        }
    }
}

pub async fn init_app_state(database: &DatabaseConfig) -> Result<AppState, sqlx::Error> {
    let db = init_db_pool(database).await?;
    Ok(AppState::from_pool(db, database))
}
