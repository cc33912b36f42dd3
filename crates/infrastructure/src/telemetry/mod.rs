//! Tracing subscriber setup
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a fmt
//! layer. `RUST_LOG` wins over the configured filter; `json = true` switches
//! the fmt layer to JSON lines.

use thiserror::Error;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Telemetry initialization error
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive does not parse
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    /// A global subscriber is already installed
    #[error("failed to initialize tracing: {0}")]
    Init(String),
}

/// Resolve the filter: `RUST_LOG` if set and valid, else the configured one
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|e| TelemetryError::InvalidFilter {
        filter: config.filter.clone(),
        message: e.to_string(),
    })
}

/// Install the global subscriber
///
/// Fails (instead of panicking) if a subscriber is already set, which lets
/// tests and embedding applications call this more than once.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true),
            )
            .try_init()
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))?;

    info!(json = config.json, "Tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        // Only meaningful when RUST_LOG does not override the config.
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            filter: "weather=loudest".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(
            build_filter(&config),
            Err(TelemetryError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn accepts_module_directives() {
        let config = LoggingConfig {
            filter: "infrastructure=debug,application=info".to_string(),
            ..LoggingConfig::default()
        };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn second_init_is_an_error_not_a_panic() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        assert!(matches!(init_tracing(&config), Err(TelemetryError::Init(_))));
    }
}
