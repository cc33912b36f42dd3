//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod cache_port;
mod provider_selector_port;
mod rate_limiter_port;
mod weather_port;
mod weather_service_port;

pub use cache_port::{CacheStats, LocationWeatherCachePort, LocationWeatherKey, ttl};
pub use provider_selector_port::ProviderSelectorPort;
#[cfg(test)]
pub use rate_limiter_port::MockRateLimiterPort;
pub use rate_limiter_port::RateLimiterPort;
pub use weather_port::WeatherProviderPort;
#[cfg(test)]
pub use weather_service_port::MockWeatherServicePort;
pub use weather_service_port::{WeatherBundle, WeatherServicePort};
