//! Application configuration
//!
//! Split into focused sub-modules:
//! - `providers`: upstream provider entries
//! - `resilience`: retry, circuit breaker and timeout policy
//! - `rate_limit`: token bucket settings
//! - `cache`: aggregate cache TTL and size
//! - `logging`: tracing filter and output format
//! - `reload`: hot-reloadable snapshot handle

mod cache;
mod logging;
mod providers;
mod rate_limit;
mod reload;
mod resilience;

use std::collections::BTreeMap;
use std::path::Path;

use application::{ApplicationError, PriorityTable};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use cache::CacheConfig;
pub use logging::LoggingConfig;
pub use providers::{ProviderConfig, ProviderKind};
pub use rate_limit::RateLimitConfig;
pub use reload::{ReloadableConfig, spawn_config_reload_handler};
pub use resilience::HttpPolicyConfig;

/// Environment variable prefix (`WEATHER__RATE_LIMIT__CAPACITY=20`)
pub const ENV_PREFIX: &str = "WEATHER";

/// Default configuration file name, without extension
pub const DEFAULT_CONFIG_FILE: &str = "config";

/// Complete configuration snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Providers keyed by name; the name selects the vendor adapter
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,

    #[serde(default)]
    pub http_policies: HttpPolicyConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `config.*` (if present) and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file (or `config.*`) and environment
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            // Override with environment variables (e.g., WEATHER__CACHE__TTL_SECS)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(providers = config.providers.len(), "Configuration loaded");
        Ok(config)
    }

    /// Load and validate
    pub fn load_validated(path: Option<&Path>) -> Result<Self, ApplicationError> {
        let config =
            Self::load_from(path).map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the snapshot for values the runtime cannot work with
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let invalid = |msg: String| Err(ApplicationError::Configuration(msg));

        if self.providers.is_empty() {
            return invalid("at least one provider must be configured".into());
        }
        for (name, provider) in &self.providers {
            if ProviderKind::from_name(name).is_none() {
                return invalid(format!(
                    "provider '{name}' has no adapter (expected openweather or weatherapi)"
                ));
            }
            let url = provider.base_url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return invalid(format!(
                    "provider '{name}' base_url must start with http:// or https://"
                ));
            }
        }

        let policies = &self.http_policies;
        if !is_non_negative(policies.retry_base_delay_secs) {
            return invalid("http_policies.retry_base_delay_secs must be >= 0".into());
        }
        if policies
            .retry_max_delay_secs
            .is_some_and(|max| !is_non_negative(max))
        {
            return invalid("http_policies.retry_max_delay_secs must be >= 0".into());
        }
        if policies.circuit_breaker_allowed_errors == 0 {
            return invalid("http_policies.circuit_breaker_allowed_errors must be > 0".into());
        }
        if policies.request_timeout_secs == 0 {
            return invalid("http_policies.request_timeout_secs must be > 0".into());
        }

        if self.rate_limit.capacity == 0 {
            return invalid("rate_limit.capacity must be > 0".into());
        }
        if !is_non_negative(self.rate_limit.refill_per_second) {
            return invalid("rate_limit.refill_per_second must be >= 0".into());
        }
        if self.rate_limit.caller_id.trim().is_empty() {
            return invalid("rate_limit.caller_id must not be empty".into());
        }

        if self.cache.ttl_secs == 0 {
            return invalid("cache.ttl_secs must be > 0".into());
        }

        Ok(())
    }

    /// Priority table for the provider selector
    #[must_use]
    pub fn priority_table(&self) -> PriorityTable {
        PriorityTable::new(
            self.providers
                .iter()
                .map(|(name, provider)| (name.clone(), provider.priority)),
        )
    }
}

/// False for negative values and NaN
fn is_non_negative(value: f64) -> bool {
    value >= 0.0
}
