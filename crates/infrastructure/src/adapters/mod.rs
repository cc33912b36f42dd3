//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod circuit_breaker;
mod fallback_provider;
mod logging_weather;
mod openweather_adapter;
mod weatherapi_adapter;

use application::ApplicationError;
use integration_weather::MappingError;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use fallback_provider::{FALLBACK_PROVIDER_NAME, FallbackWeatherProvider};
pub use logging_weather::{LoggingWeatherProvider, LoggingWeatherService};
pub use openweather_adapter::OpenWeatherAdapter;
pub use weatherapi_adapter::WeatherApiAdapter;

/// A payload the vendor sent but we cannot use counts against the provider,
/// so the orchestrator moves on instead of failing the request.
fn mapping_failure(provider: &str, err: &MappingError) -> ApplicationError {
    ApplicationError::permanent(provider, err.to_string())
}
