//! # lessonbook DB
//!
//! SQLite connection pool and embedded schema migrations.
//!
//! The application runs against one local database file with a single
//! writing process. The pool enables foreign keys (cascading deletes rely on
//! them), uses WAL journaling, and creates the file on first start.
//!
//! Committed writes can sit in `<db>-wal` until SQLite checkpoints, so a file
//! copy of the database must run [`checkpoint_wal`] first.
//!
//! # Example
//!
//! ```ignore
//! use lessonbook_config::DatabaseConfig;
//! use lessonbook_db::init_db_pool;
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//! ```

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use lessonbook_config::DatabaseConfig;
use sqlx::Connection;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions};
use tracing::{info, warn};

pub use sqlx::SqlitePool;

/// Schema migrations, embedded at compile time from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Opens the pool and applies pending migrations.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;
    info!(url = %config.url, "Database ready");

    Ok(pool)
}

/// Moves every committed page from the write-ahead log into the database
/// file and truncates the log. A missing file is left alone.
pub async fn checkpoint_wal(path: &Path) -> Result<(), sqlx::Error> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(());
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .busy_timeout(Duration::from_secs(5));
    let mut conn = SqliteConnection::connect_with(&options).await?;
    let (busy, log_frames, checkpointed) =
        sqlx::query_as::<_, (i64, i64, i64)>("PRAGMA wal_checkpoint(TRUNCATE)")
            .fetch_one(&mut conn)
            .await?;
    conn.close().await?;

    if busy != 0 {
        warn!(path = %path.display(), log_frames, checkpointed, "WAL checkpoint blocked by a reader");
    } else {
        info!(path = %path.display(), checkpointed, "WAL checkpointed");
    }
    Ok(())
}
