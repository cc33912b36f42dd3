//! Cache implementations
//!
//! - `MokaLocationWeatherCache`: in-memory TTL cache for `LocationWeather`
//!   aggregates

mod moka_cache;

pub use moka_cache::MokaLocationWeatherCache;
