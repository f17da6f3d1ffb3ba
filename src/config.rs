//! Configuration for the hwtrack CLI.
//!
//! Loaded from an explicit path, .hwtrack.yml, or ~/.config/hwtrack/hwtrack.yml

use crate::error::TrackerError;
use crate::sorter::URGENCY_WINDOW_DAYS;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub database: PathBuf,

    /// Days ahead of today that count as urgent when ordering
    pub urgency_window_days: u64,

    /// Max log level: error, warn, info, debug or trace
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            urgency_window_days: URGENCY_WINDOW_DAYS,
            log_level: "warn".to_string(),
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hwtrack")
        .join("hwtrack.db")
}

impl Config {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .hwtrack.yml in current directory
    /// 3. ~/.config/hwtrack/hwtrack.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(".hwtrack.yml");
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    info!("Loaded config from .hwtrack.yml");
                    return Ok(config);
                }
                Err(e) => warn!("Failed to load .hwtrack.yml: {}", e),
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("hwtrack").join("hwtrack.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => warn!("Failed to load {}: {}", user_config.display(), e),
                }
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Parsed `log_level`
    pub fn log_level(&self) -> std::result::Result<tracing::Level, TrackerError> {
        self.log_level
            .parse()
            .map_err(|_| TrackerError::Config(format!("invalid log level: {}", self.log_level)))
    }

    fn validate(&self) -> std::result::Result<(), TrackerError> {
        if self.database.as_os_str().is_empty() {
            return Err(TrackerError::Config("database path cannot be empty".to_string()));
        }
        self.log_level()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.urgency_window_days, 3);
        assert!(config.database.ends_with("hwtrack/hwtrack.db"));
        assert_eq!(config.log_level().unwrap(), tracing::Level::WARN);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "database: /tmp/tracker.db\nurgency_window_days: 5\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.database, PathBuf::from("/tmp/tracker.db"));
        assert_eq!(config.urgency_window_days, 5);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "log_level: loud\n").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_empty_database_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "database: \"\"\n").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_validation_errors_are_config_errors() {
        let config = Config {
            database: PathBuf::new(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, TrackerError::Config(ref msg) if msg.contains("database")));

        let config = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        let err = config.log_level().unwrap_err();
        assert_eq!(err.to_string(), "Config error: invalid log level: loud");
    }
}
