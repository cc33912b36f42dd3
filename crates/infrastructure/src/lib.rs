//! Infrastructure layer - Adapters for external systems
//!
//! Implements the ports defined in the application layer: vendor weather
//! adapters over resilience-wrapped HTTP clients, the fallback provider,
//! logging decorators, the token bucket limiter and the moka cache. Also
//! owns configuration, hot reload, tracing setup and the runtime wiring.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod http;
pub mod rate_limit;
pub mod resilience;
pub mod retry;
pub mod runtime;
pub mod telemetry;

pub use adapters::*;
pub use cache::MokaLocationWeatherCache;
pub use config::{AppConfig, ReloadableConfig, spawn_config_reload_handler};
pub use http::{ProviderClientFactory, ProviderHttpClient};
pub use rate_limit::TokenBucketRateLimiter;
pub use resilience::{CombinedPolicy, ResiliencePolicyFactory};
pub use retry::{RetryPolicy, RetryResult, with_retry};
pub use runtime::WeatherRuntime;
pub use telemetry::{TelemetryError, init_tracing};
