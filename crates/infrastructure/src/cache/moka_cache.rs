//! Moka in-memory cache for location weather aggregates
//!
//! Thread-safe, bounded by entry count, with a cache-wide TTL. Entries expire
//! passively; nothing refreshes them in the background.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use application::{CacheStats, LocationWeatherCachePort, LocationWeatherKey};
use async_trait::async_trait;
use domain::LocationWeather;
use moka::future::Cache;
use tracing::{debug, instrument};

use crate::config::CacheConfig;

/// Moka-backed `LocationWeatherCachePort`
///
/// Values are stored as `Arc`s, so a hit hands out the same aggregate
/// instance without cloning it.
pub struct MokaLocationWeatherCache {
    cache: Cache<LocationWeatherKey, Arc<LocationWeather>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for MokaLocationWeatherCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaLocationWeatherCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.cache.entry_count())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl MokaLocationWeatherCache {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), config.max_entries)
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[async_trait]
impl LocationWeatherCachePort for MokaLocationWeatherCache {
    #[instrument(skip_all, level = "debug", fields(key = %key))]
    async fn get(&self, key: &LocationWeatherKey) -> Option<Arc<LocationWeather>> {
        let value = self.cache.get(key).await;
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("Cache miss");
        }
        value
    }

    #[instrument(skip_all, level = "debug", fields(key = %key))]
    async fn insert(&self, key: LocationWeatherKey, value: Arc<LocationWeather>) {
        self.cache.insert(key, value).await;
        debug!(ttl_secs = self.ttl.as_secs(), "Cache set");
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.entry_count(),
        }
    }
}
