//! Fallback weather provider
//!
//! Deterministic mock data used only after every configured provider failed.
//! Never touches the network; every value is tagged `DataSource::Fallback`.

use application::{ApplicationError, WeatherProviderPort};
use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use domain::{DataSource, Location, WeatherAlert, WeatherForecast, WeatherInfo};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Name the fallback provider reports
pub const FALLBACK_PROVIDER_NAME: &str = "fallback";

const CURRENT_DESCRIPTION: &str = "Clear (mock)";
const FORECAST_DESCRIPTION: &str = "Partly cloudy (mock)";
const BASE_TEMPERATURE_C: f64 = 20.0;
const HUMIDITY_PERCENT: u8 = 50;

/// Provider of last resort
#[derive(Debug, Clone, Default)]
pub struct FallbackWeatherProvider;

impl FallbackWeatherProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn source() -> DataSource {
        DataSource::Fallback(FALLBACK_PROVIDER_NAME.to_string())
    }

    /// `days` forecasts starting at `today`, warming by one degree per day
    fn forecast_from(today: NaiveDate, days: u8) -> Result<Vec<WeatherForecast>, ApplicationError> {
        (0..days)
            .map(|i| {
                let date = today
                    .checked_add_days(Days::new(u64::from(i)))
                    .ok_or_else(|| ApplicationError::Internal("forecast date overflow".into()))?;
                let forecast = WeatherForecast::new_unchecked(
                    date,
                    FORECAST_DESCRIPTION,
                    BASE_TEMPERATURE_C + f64::from(i),
                )?;
                Ok(forecast.with_source(Self::source()))
            })
            .collect()
    }
}

#[async_trait]
impl WeatherProviderPort for FallbackWeatherProvider {
    fn name(&self) -> &str {
        FALLBACK_PROVIDER_NAME
    }

    async fn get_current_weather(
        &self,
        location: &Location,
        _cancel: &CancellationToken,
    ) -> Result<WeatherInfo, ApplicationError> {
        info!(location = %location, "Serving mock current weather");
        let info = WeatherInfo::new(
            CURRENT_DESCRIPTION,
            BASE_TEMPERATURE_C,
            BASE_TEMPERATURE_C,
            HUMIDITY_PERCENT,
        )?;
        Ok(info.with_source(Self::source()))
    }

    async fn get_forecast(
        &self,
        location: &Location,
        days: u8,
        _cancel: &CancellationToken,
    ) -> Result<Vec<WeatherForecast>, ApplicationError> {
        info!(location = %location, days, "Serving mock forecast");
        Self::forecast_from(Utc::now().date_naive(), days)
    }

    async fn get_alerts(
        &self,
        _location: &Location,
        _cancel: &CancellationToken,
    ) -> Result<Vec<WeatherAlert>, ApplicationError> {
        Ok(Vec::new())
    }
}
