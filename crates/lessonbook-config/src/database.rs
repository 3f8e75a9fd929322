//! SQLite location.
//!
//! `DATABASE_URL` accepts `sqlite://path`, `sqlite:path` or a bare file path
//! and defaults to `sqlite://lessonbook.db` in the working directory.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://lessonbook.db";

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Self::new(url, max_connections)
    }

    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        let url = url.into();
        let url = if url.starts_with("sqlite:") {
            url
        } else {
            format!("sqlite://{url}")
        };
        Self {
            url,
            max_connections,
        }
    }

    /// File path of the database, `None` for in-memory databases.
    pub fn database_path(&self) -> Option<PathBuf> {
        let rest = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or_default();
        if path.is_empty() || path == ":memory:" {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_variants() {
        assert_eq!(
            DatabaseConfig::new("sqlite://lessonbook.db", 1).database_path(),
            Some(PathBuf::from("lessonbook.db"))
        );
        assert_eq!(
            DatabaseConfig::new("sqlite:data/escola.db?mode=rwc", 1).database_path(),
            Some(PathBuf::from("data/escola.db"))
        );
        assert_eq!(
            DatabaseConfig::new("/var/lib/lessonbook.db", 1).database_path(),
            Some(PathBuf::from("/var/lib/lessonbook.db"))
        );
        assert_eq!(DatabaseConfig::new("sqlite::memory:", 1).database_path(), None);
    }
}
