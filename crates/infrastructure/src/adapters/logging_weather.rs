//! Logging decorators for weather providers and the weather service
//!
//! Both wrappers forward every call unchanged and only add tracing spans and
//! events around it.

use std::sync::Arc;

use application::{ApplicationError, WeatherBundle, WeatherProviderPort, WeatherServicePort};
use async_trait::async_trait;
use domain::{Location, WeatherAlert, WeatherForecast, WeatherInfo};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Wraps one provider; logs at `debug`, failures at `warn`
#[derive(Debug)]
pub struct LoggingWeatherProvider {
    inner: Arc<dyn WeatherProviderPort>,
}

impl LoggingWeatherProvider {
    #[must_use]
    pub fn new(inner: Arc<dyn WeatherProviderPort>) -> Self {
        Self { inner }
    }

    fn failed(&self, operation: &str, error: &ApplicationError) {
        warn!(provider = %self.inner.name(), operation, error = %error, "Provider call failed");
    }
}

#[async_trait]
impl WeatherProviderPort for LoggingWeatherProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    #[instrument(skip_all, fields(provider = %self.inner.name(), location = %location))]
    async fn get_current_weather(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<WeatherInfo, ApplicationError> {
        debug!("Fetching current weather");
        let result = self.inner.get_current_weather(location, cancel).await;
        match &result {
            Ok(info) => debug!(
                temperature_c = info.temperature_c(),
                humidity = info.humidity().value(),
                "Fetched current weather"
            ),
            Err(e) => self.failed("current", e),
        }
        result
    }

    #[instrument(skip_all, fields(provider = %self.inner.name(), location = %location, days))]
    async fn get_forecast(
        &self,
        location: &Location,
        days: u8,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherForecast>, ApplicationError> {
        debug!("Fetching forecast");
        let result = self.inner.get_forecast(location, days, cancel).await;
        match &result {
            Ok(forecasts) => debug!(count = forecasts.len(), "Fetched forecast"),
            Err(e) => self.failed("forecast", e),
        }
        result
    }

    #[instrument(skip_all, fields(provider = %self.inner.name(), location = %location))]
    async fn get_alerts(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherAlert>, ApplicationError> {
        debug!("Fetching alerts");
        let result = self.inner.get_alerts(location, cancel).await;
        match &result {
            Ok(alerts) => debug!(count = alerts.len(), "Fetched alerts"),
            Err(e) => self.failed("alerts", e),
        }
        result
    }
}

/// Wraps the orchestrator; logs at `info`, failures at `warn`
pub struct LoggingWeatherService {
    inner: Arc<dyn WeatherServicePort>,
}

impl std::fmt::Debug for LoggingWeatherService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingWeatherService").finish_non_exhaustive()
    }
}

impl LoggingWeatherService {
    #[must_use]
    pub fn new(inner: Arc<dyn WeatherServicePort>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl WeatherServicePort for LoggingWeatherService {
    #[instrument(skip_all, fields(location = %location))]
    async fn get_current_weather(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<WeatherInfo, ApplicationError> {
        info!("Current weather requested");
        let result = self.inner.get_current_weather(location, cancel).await;
        match &result {
            Ok(info) => info!(
                temperature_c = info.temperature_c(),
                source = ?info.source(),
                "Current weather served"
            ),
            Err(e) => warn!(error = %e, provider = ?e.provider(), "Current weather failed"),
        }
        result
    }

    #[instrument(skip_all, fields(location = %location, days))]
    async fn get_forecast(
        &self,
        location: &Location,
        days: u8,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherForecast>, ApplicationError> {
        info!("Forecast requested");
        let result = self.inner.get_forecast(location, days, cancel).await;
        match &result {
            Ok(forecasts) => info!(count = forecasts.len(), "Forecast served"),
            Err(e) => warn!(error = %e, provider = ?e.provider(), "Forecast failed"),
        }
        result
    }

    #[instrument(skip_all, fields(location = %location))]
    async fn get_alerts(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherAlert>, ApplicationError> {
        info!("Alerts requested");
        let result = self.inner.get_alerts(location, cancel).await;
        match &result {
            Ok(alerts) => info!(count = alerts.len(), "Alerts served"),
            Err(e) => warn!(error = %e, provider = ?e.provider(), "Alerts failed"),
        }
        result
    }

    #[instrument(skip_all, fields(location = %location, days))]
    async fn get_bundle(
        &self,
        location: &Location,
        days: u8,
        cancel: &CancellationToken,
    ) -> Result<WeatherBundle, ApplicationError> {
        info!("Weather bundle requested");
        let result = self.inner.get_bundle(location, days, cancel).await;
        match &result {
            Ok(bundle) => info!(
                source = ?bundle.current.source(),
                forecasts = bundle.forecasts.len(),
                alerts = bundle.alerts.len(),
                "Weather bundle served"
            ),
            Err(e) => warn!(error = %e, provider = ?e.provider(), "Weather bundle failed"),
        }
        result
    }
}
