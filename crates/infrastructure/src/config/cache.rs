//! Aggregate cache settings (`[cache]`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of a cached `LocationWeather` in seconds (default: 30 minutes)
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Maximum number of cached aggregates
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

const fn default_ttl() -> u64 {
    30 * 60 // 30 minutes
}

const fn default_max_entries() -> u64 {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_matches_port_constant() {
        assert_eq!(CacheConfig::default().ttl(), application::ttl::LOCATION_WEATHER);
    }
}
