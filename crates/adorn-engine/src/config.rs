//! Runtime configuration (adorn.toml)
//!
//! ```toml
//! [log]
//! filter = "adorn=debug"
//! format = "json"
//!
//! [deprecation]
//! action = "once"
//! ```
//!
//! Every field has a default, so an empty document is a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors that can occur while loading configuration or installing logging
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parse error
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Semantically invalid configuration
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A global subscriber could not be installed
    #[error("Logging error: {0}")]
    LoggingError(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log output settings
    pub log: LogConfig,

    /// Deprecation notice handling
    pub deprecation: DeprecationConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        EnvFilter::try_new(&self.log.filter).map_err(|e| {
            ConfigError::ValidationError(format!("invalid log filter '{}': {}", self.log.filter, e))
        })?;
        Ok(())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable output
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// `[log]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directives, in `EnvFilter` syntax
    pub filter: String,

    /// Output format
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::Compact,
        }
    }
}

fn default_log_filter() -> String {
    "warn".to_string()
}

/// What to do with a deprecation notice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeprecationAction {
    /// Report every notice
    #[default]
    Always,
    /// Report the first notice for each decoration site
    Once,
    /// Drop notices
    Ignore,
}

/// `[deprecation]` section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeprecationConfig {
    /// Reporting policy
    pub action: DeprecationAction,
}
