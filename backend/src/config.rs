//! Application Configuration
//!
//! Where the database and logs live. Loaded from JSON, then overlaid with
//! `TIERLIST_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file, or `:memory:`
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    /// Log file stem and subscriber name
    pub app_name: String,
    /// `minutely`, `hourly`, `daily` or `never`
    pub log_rotation: String,
    /// Log files kept; 0 keeps them all
    pub log_keep: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("tierlist.db"),
            log_dir: PathBuf::from("logs"),
            app_name: "TierList".to_string(),
            log_rotation: "daily".to_string(),
            log_keep: 3,
        }
    }
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> DomainResult<Self> {
        serde_json::from_str(json).map_err(|e| DomainError::InvalidInput(format!("bad config: {}", e)))
    }

    /// Defaults overlaid with the environment
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup("TIERLIST_DB_PATH") {
            self.db_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("TIERLIST_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("TIERLIST_APP_NAME") {
            self.app_name = name;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json_str(r#"{"db_path": ":memory:", "log_keep": 5}"#).unwrap();
        assert_eq!(config.db_path, PathBuf::from(":memory:"));
        assert_eq!(config.log_keep, 5);
        assert_eq!(config.app_name, "TierList");
        assert_eq!(config.log_rotation, "daily");
    }

    #[test]
    fn test_bad_json_is_invalid_input() {
        assert!(matches!(
            AppConfig::from_json_str("{ nope"),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::default().with_overrides(|key| match key {
            "TIERLIST_DB_PATH" => Some("/tmp/t.db".to_string()),
            "TIERLIST_APP_NAME" => Some("Ranker".to_string()),
            _ => None,
        });
        assert_eq!(config.db_path, PathBuf::from("/tmp/t.db"));
        assert_eq!(config.app_name, "Ranker");
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }
}
