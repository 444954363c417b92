//! Global tracing subscriber setup
//!
//! `ADORN_LOG` takes precedence over the configured filter.

use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{ConfigError, LogConfig, LogFormat};

/// Environment variable overriding [`LogConfig::filter`]
pub const LOG_ENV: &str = "ADORN_LOG";

/// Build the effective filter for `config`
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter, ConfigError> {
    let directives = std::env::var(LOG_ENV).unwrap_or_else(|_| config.filter.clone());
    EnvFilter::try_new(&directives)
        .map_err(|e| ConfigError::ValidationError(format!("invalid log filter '{directives}': {e}")))
}

/// Install a global tracing subscriber using the provided settings
pub fn init(config: &LogConfig) -> Result<(), ConfigError> {
    let env_filter = env_filter(config)?;

    let fmt_layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| ConfigError::LoggingError(format!("failed to install tracing subscriber: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_filter_is_used() {
        if std::env::var(LOG_ENV).is_ok() {
            return;
        }
        let config = LogConfig {
            filter: "adorn=debug".to_string(),
            ..LogConfig::default()
        };
        let filter = env_filter(&config).unwrap();
        assert_eq!(filter.to_string(), "adorn=debug");
    }
}
