//! Cache port definition
//!
//! Storage for fully built `LocationWeather` aggregates. Implementations
//! own the expiry policy; entries vanish passively once their TTL elapses.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{Location, LocationWeather};

/// Cache key: location plus forecast window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationWeatherKey {
    city: String,
    country_code: Option<String>,
    forecast_days: u8,
}

impl LocationWeatherKey {
    /// Build the key for a request
    #[must_use]
    pub fn new(location: &Location, forecast_days: u8) -> Self {
        Self {
            city: location.city_name().to_string(),
            country_code: location.country_code().map(str::to_string),
            forecast_days,
        }
    }

    #[must_use]
    pub const fn forecast_days(&self) -> u8 {
        self.forecast_days
    }
}

impl fmt::Display for LocationWeatherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.city,
            self.country_code.as_deref().unwrap_or(""),
            self.forecast_days
        )
    }
}

/// Cache port for location weather aggregates
#[async_trait]
pub trait LocationWeatherCachePort: Send + Sync + fmt::Debug {
    /// Get a cached aggregate; `None` if absent or expired
    async fn get(&self, key: &LocationWeatherKey) -> Option<Arc<LocationWeather>>;

    /// Store an aggregate under the cache's configured TTL
    async fn insert(&self, key: LocationWeatherKey, value: Arc<LocationWeather>);

    /// Get cache statistics (hits, misses, size)
    fn stats(&self) -> CacheStats;
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Current number of entries
    pub entries: u64,
}

impl CacheStats {
    /// Calculate the hit rate as a fraction (0.0 - 1.0)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            // Precision loss is acceptable for statistics display
            self.hits as f64 / total as f64
        }
    }
}

/// Standard TTL values
pub mod ttl {
    use std::time::Duration;

    /// Lifetime of a cached `LocationWeather` (30 minutes)
    pub const LOCATION_WEATHER: Duration = Duration::from_secs(30 * 60);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display_matches_city_country_days() {
        let loc = Location::new("London", Some("gb")).unwrap();
        assert_eq!(LocationWeatherKey::new(&loc, 3).to_string(), "London_GB_3");

        let no_country = Location::city("Oslo").unwrap();
        assert_eq!(LocationWeatherKey::new(&no_country, 5).to_string(), "Oslo__5");
    }

    #[test]
    fn keys_differ_by_forecast_window() {
        let loc = Location::new("London", Some("GB")).unwrap();
        assert_ne!(LocationWeatherKey::new(&loc, 3), LocationWeatherKey::new(&loc, 5));
        assert_eq!(LocationWeatherKey::new(&loc, 3), LocationWeatherKey::new(&loc, 3));
    }

    #[test]
    fn cache_stats_hit_rate_zero_when_empty() {
        let stats = CacheStats::default();
        assert!(stats.hit_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn cache_stats_hit_rate_calculates_correctly() {
        let stats = CacheStats {
            hits: 75,
            misses: 25,
            entries: 100,
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn default_ttl_is_thirty_minutes() {
        assert_eq!(ttl::LOCATION_WEATHER.as_secs(), 1800);
    }
}
