//! Loading and validating the monitor configuration

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::types::MonitorConfig;

/// Top-level keys every config file must carry
pub const REQUIRED_SECTIONS: [&str; 5] =
    ["urls", "refresh_interval", "database_location", "smtp", "fcm"];

/// Default config path, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Environment variable overriding the config path
pub const CONFIG_PATH_ENV: &str = "SITEWATCH_CONFIG";

/// Source of configuration snapshots.
///
/// Implementations only produce the raw JSON document; parsing and
/// validation are shared.
pub trait ConfigProvider: Send + Sync {
    /// Read the raw configuration document
    fn load_raw(&self) -> Result<Value, ConfigError>;

    /// Read and parse a snapshot without validating it
    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let raw = self.load_raw()?;
        parse_config(raw)
    }

    /// Read, validate and parse a snapshot
    fn load_validated(&self) -> Result<MonitorConfig, ConfigError> {
        let raw = self.load_raw()?;
        check_config(&raw)?;
        parse_config(raw)
    }
}

/// Reads the configuration from a JSON file on every call
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Provider for `SITEWATCH_CONFIG`, falling back to `config.json`
    pub fn from_env() -> Self {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for FileConfigProvider {
    fn load_raw(&self) -> Result<Value, ConfigError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Io {
            path: self.path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(ConfigError::Parse)
    }
}

fn parse_config(raw: Value) -> Result<MonitorConfig, ConfigError> {
    serde_json::from_value(raw).map_err(ConfigError::Parse)
}

/// Check a raw config document, returning the first problem found
pub fn check_config(raw: &Value) -> Result<(), ConfigError> {
    let missing: Vec<String> = REQUIRED_SECTIONS
        .iter()
        .filter(|section| raw.get(**section).is_none())
        .map(|section| section.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::MissingSections(missing));
    }

    match raw.get("urls").and_then(Value::as_array) {
        Some(urls) if !urls.is_empty() => {}
        _ => return Err(ConfigError::InvalidUrls),
    }

    match raw.get("refresh_interval").and_then(Value::as_u64) {
        Some(secs) if secs > 0 => {}
        _ => return Err(ConfigError::InvalidRefreshInterval),
    }

    Ok(())
}

/// Validate a raw config document, logging the reason on failure
pub fn validate_config(raw: &Value) -> bool {
    match check_config(raw) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            false
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Missing required configuration sections: {}", .0.join(", "))]
    MissingSections(Vec<String>),

    #[error("'urls' must be a non-empty list")]
    InvalidUrls,

    #[error("'refresh_interval' must be a positive integer")]
    InvalidRefreshInterval,
}
