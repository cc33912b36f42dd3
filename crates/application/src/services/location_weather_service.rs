//! Cached `LocationWeather` aggregation
//!
//! Read-through cache in front of a [`WeatherServicePort`]: on a miss the
//! current conditions, forecast and alerts are fetched as one bundle request,
//! the aggregate is validated and stored, and every caller within the TTL
//! gets the same `Arc`.

use std::fmt;
use std::sync::Arc;

use domain::{Location, LocationWeather};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::error::ApplicationError;
use crate::ports::{LocationWeatherCachePort, LocationWeatherKey, WeatherServicePort};

/// Builds and caches `LocationWeather` aggregates
pub struct LocationWeatherService {
    weather: Arc<dyn WeatherServicePort>,
    cache: Arc<dyn LocationWeatherCachePort>,
}

impl fmt::Debug for LocationWeatherService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationWeatherService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl LocationWeatherService {
    #[must_use]
    pub fn new(
        weather: Arc<dyn WeatherServicePort>,
        cache: Arc<dyn LocationWeatherCachePort>,
    ) -> Self {
        Self { weather, cache }
    }

    /// Return the cached aggregate or build and cache a fresh one
    ///
    /// Concurrent misses for the same key may each build an aggregate; the
    /// last insert wins. Failures are never cached.
    ///
    /// # Errors
    ///
    /// Returns the bundle request's error, or a domain
    /// error if the assembled aggregate is invalid.
    #[instrument(skip_all, fields(location = %location, days))]
    pub async fn get_or_compute(
        &self,
        location: &Location,
        days: u8,
        cancel: &CancellationToken,
    ) -> Result<Arc<LocationWeather>, ApplicationError> {
        let key = LocationWeatherKey::new(location, days);

        if let Some(cached) = self.cache.get(&key).await {
            debug!(key = %key, "Location weather cache hit");
            return Ok(cached);
        }

        let bundle = self.weather.get_bundle(location, days, cancel).await?;

        let aggregate = Arc::new(LocationWeather::new(
            location.clone(),
            bundle.current,
            bundle.forecasts,
            bundle.alerts,
        )?);

        if aggregate.is_degraded() {
            info!(key = %key, "Caching degraded location weather");
        }
        self.cache.insert(key, Arc::clone(&aggregate)).await;

        Ok(aggregate)
    }
}
