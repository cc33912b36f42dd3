//! WeatherAPI.com adapter - Implements WeatherProviderPort

use std::sync::Arc;

use application::{ApplicationError, WeatherProviderPort};
use async_trait::async_trait;
use chrono::Utc;
use domain::{DataSource, Location, WeatherAlert, WeatherForecast, WeatherInfo};
use integration_weather::weatherapi::{
    self, CURRENT_PATH, CurrentResponse, FORECAST_PATH, ForecastResponse, MAX_DAYS,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::mapping_failure;
use crate::http::{ProviderClientFactory, ProviderHttpClient};

const KEY_PARAM: &str = "key";

/// Adapter for the WeatherAPI.com API
#[derive(Debug)]
pub struct WeatherApiAdapter {
    name: String,
    clients: Arc<ProviderClientFactory>,
}

impl WeatherApiAdapter {
    #[must_use]
    pub fn new(name: impl Into<String>, clients: Arc<ProviderClientFactory>) -> Self {
        Self {
            name: name.into(),
            clients,
        }
    }

    fn source(&self) -> DataSource {
        DataSource::Provider(self.name.clone())
    }

    fn client(&self) -> Result<Arc<ProviderHttpClient>, ApplicationError> {
        self.clients.get_client(&self.name)
    }

    /// `/forecast.json` with alerts; the vendor caps `days` at 14
    async fn fetch_forecast(
        &self,
        location: &Location,
        days: u8,
        cancel: &CancellationToken,
    ) -> Result<ForecastResponse, ApplicationError> {
        let client = self.client()?;
        let mut query = vec![
            ("q", location.query()),
            ("days", days.clamp(1, MAX_DAYS).to_string()),
            ("alerts", "yes".to_string()),
        ];
        client.attach_api_key(KEY_PARAM, &mut query);
        client.get_json(FORECAST_PATH, &query, cancel).await
    }
}

#[async_trait]
impl WeatherProviderPort for WeatherApiAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, cancel), fields(provider = %self.name, location = %location))]
    async fn get_current_weather(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<WeatherInfo, ApplicationError> {
        let client = self.client()?;
        let mut query = vec![("q", location.query())];
        client.attach_api_key(KEY_PARAM, &mut query);
        let response: CurrentResponse = client.get_json(CURRENT_PATH, &query, cancel).await?;

        weatherapi::map_current(&response, self.source())
            .map_err(|e| mapping_failure(&self.name, &e))
    }

    #[instrument(skip(self, cancel), fields(provider = %self.name, location = %location, days))]
    async fn get_forecast(
        &self,
        location: &Location,
        days: u8,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherForecast>, ApplicationError> {
        let response = self.fetch_forecast(location, days, cancel).await?;
        weatherapi::map_forecast(&response, days, Utc::now().date_naive(), &self.source())
            .map_err(|e| mapping_failure(&self.name, &e))
    }

    #[instrument(skip(self, cancel), fields(provider = %self.name, location = %location))]
    async fn get_alerts(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherAlert>, ApplicationError> {
        let response = self.fetch_forecast(location, 1, cancel).await?;
        let alerts =
            weatherapi::map_alerts(&response).map_err(|e| mapping_failure(&self.name, &e))?;
        debug!(count = alerts.len(), "Mapped alerts");
        Ok(alerts)
    }
}
