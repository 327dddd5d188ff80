//! # Shell Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PARKIT_DB_PATH=/var/lib/parkit/parkit.db                           │
//! │     PARKIT_LOG=parkit_core=debug                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $PARKIT_CONFIG, or                                                 │
//! │     ~/.config/parkit/parkit.toml (Linux)                               │
//! │     ~/Library/Application Support/com.parkit.parkit/parkit.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     standard tariff, database in the platform data dir                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/parkit/parkit.db"
//!
//! [logging]
//! filter = "info,parkit_db=debug"
//!
//! [fare]
//! car_rate_per_hour = 1.5
//! bike_rate_per_hour = 1.0
//! recurring_discount = 0.05
//! free_minutes = 30
//!
//! [service]
//! release_spot_on_failure = true
//! in_time_offset_secs = 0
//! ```

use std::path::{Path, PathBuf};

use chrono::Duration;
use parkit_core::{FareSchedule, ServiceOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const ENV_CONFIG: &str = "PARKIT_CONFIG";
pub const ENV_DB_PATH: &str = "PARKIT_DB_PATH";
pub const ENV_LOG: &str = "PARKIT_LOG";

/// Largest accepted `service.in_time_offset_secs`, one hour.
pub const MAX_IN_TIME_OFFSET_SECS: i64 = 3_600;

const CONFIG_FILE_NAME: &str = "parkit.toml";
const DB_FILE_NAME: &str = "parkit.db";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SQLite file. Defaults to `<data dir>/parkit.db`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `EnvFilter` directive string.
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        LoggingSection {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSection {
    pub release_spot_on_failure: bool,
    pub in_time_offset_secs: i64,
}

impl Default for ServiceSection {
    fn default() -> Self {
        ServiceSection {
            release_spot_on_failure: true,
            in_time_offset_secs: 0,
        }
    }
}

// =============================================================================
// Shell Config
// =============================================================================

/// Resolved shell configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub database: DatabaseSection,
    pub logging: LoggingSection,
    pub fare: FareSchedule,
    pub service: ServiceSection,
}

impl ShellConfig {
    /// Loads configuration from file and environment.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(ENV_CONFIG)
            .ok()
            .map(PathBuf::from)
            .or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!(?path, "Loading config file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies overrides from an environment lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(filter) = lookup(ENV_LOG) {
            self.logging.filter = filter;
        }
    }

    /// Checks the tariff and service settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fare
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: "fare".to_string(),
                reason: e.to_string(),
            })?;

        if self.service.in_time_offset_secs < 0 {
            return Err(ConfigError::InvalidValue {
                key: "service.in_time_offset_secs".to_string(),
                reason: "must not be negative".to_string(),
            });
        }

        if self.service.in_time_offset_secs > MAX_IN_TIME_OFFSET_SECS {
            return Err(ConfigError::InvalidValue {
                key: "service.in_time_offset_secs".to_string(),
                reason: format!("must be at most {} seconds", MAX_IN_TIME_OFFSET_SECS),
            });
        }

        Ok(())
    }

    /// Database file to open.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("com", "parkit", "parkit")
                    .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
            })
            .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
    }

    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            release_spot_on_failure: self.service.release_spot_on_failure,
            in_time_offset: Duration::seconds(self.service.in_time_offset_secs),
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "parkit", "parkit")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
