use std::env;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        Self::from_value(env::var("ALLOWED_ORIGINS").ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        let allowed_origins = value
            .unwrap_or("http://localhost:3000,http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { allowed_origins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_local_dev_servers() {
        let config = CorsConfig::from_value(None);
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_splits_and_trims() {
        let config = CorsConfig::from_value(Some(" http://a.pt , ,http://b.pt"));
        assert_eq!(config.allowed_origins, ["http://a.pt", "http://b.pt"]);
    }
}
