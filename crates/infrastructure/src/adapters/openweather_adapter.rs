//! OpenWeatherMap adapter - Implements WeatherProviderPort
//!
//! Current weather comes from `/data/2.5/weather?q=`. The 5-day/3-hour
//! forecast is keyed by coordinates, so forecasts first resolve the location
//! through the direct geocoding endpoint. The free plan has no alerts
//! endpoint.

use std::sync::Arc;

use application::{ApplicationError, WeatherProviderPort};
use async_trait::async_trait;
use chrono::Utc;
use domain::{DataSource, Location, WeatherAlert, WeatherForecast, WeatherInfo};
use integration_weather::openweather::{
    self, CURRENT_PATH, CurrentResponse, FORECAST_PATH, ForecastResponse, GEOCODING_PATH,
    GeocodingMatch,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::mapping_failure;
use crate::http::{ProviderClientFactory, ProviderHttpClient};

/// Query parameter carrying the API key
const KEY_PARAM: &str = "appid";

/// Geocoding candidates requested per lookup
const GEOCODING_LIMIT: &str = "5";

/// Adapter for the OpenWeatherMap API
#[derive(Debug)]
pub struct OpenWeatherAdapter {
    name: String,
    clients: Arc<ProviderClientFactory>,
}

impl OpenWeatherAdapter {
    /// `name` is the provider's configuration key
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

    /// Resolved per call so a reload takes effect on the next request
    fn client(&self) -> Result<Arc<ProviderHttpClient>, ApplicationError> {
        self.clients.get_client(&self.name)
    }

    fn query(
        client: &ProviderHttpClient,
        mut params: Vec<(&'static str, String)>,
    ) -> Vec<(&'static str, String)> {
        client.attach_api_key(KEY_PARAM, &mut params);
        params
    }

    async fn geocode(
        &self,
        client: &ProviderHttpClient,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<GeocodingMatch, ApplicationError> {
        let query = Self::query(
            client,
            vec![("q", location.query()), ("limit", GEOCODING_LIMIT.to_string())],
        );
        let matches: Vec<GeocodingMatch> = client.get_json(GEOCODING_PATH, &query, cancel).await?;

        let found = matches
            .into_iter()
            .next()
            .ok_or_else(|| ApplicationError::permanent(&self.name, "location not found"))?;
        debug!(
            name = %found.name,
            lat = found.lat,
            lon = found.lon,
            "Resolved location coordinates"
        );
        Ok(found)
    }
}

#[async_trait]
impl WeatherProviderPort for OpenWeatherAdapter {
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
        let query = Self::query(
            &client,
            vec![("q", location.query()), ("units", "metric".to_string())],
        );
        let response: CurrentResponse = client.get_json(CURRENT_PATH, &query, cancel).await?;

        openweather::map_current(&response, self.source())
            .map_err(|e| mapping_failure(&self.name, &e))
    }

    #[instrument(skip(self, cancel), fields(provider = %self.name, location = %location, days))]
    async fn get_forecast(
        &self,
        location: &Location,
        days: u8,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherForecast>, ApplicationError> {
        let client = self.client()?;
        let place = self.geocode(&client, location, cancel).await?;

        let query = Self::query(
            &client,
            vec![
                ("lat", place.lat.to_string()),
                ("lon", place.lon.to_string()),
                ("units", "metric".to_string()),
            ],
        );
        let response: ForecastResponse = client.get_json(FORECAST_PATH, &query, cancel).await?;

        let forecasts =
            openweather::map_forecast(&response, days, Utc::now().date_naive(), &self.source())
                .map_err(|e| mapping_failure(&self.name, &e))?;
        debug!(samples = response.list.len(), days = forecasts.len(), "Aggregated forecast");
        Ok(forecasts)
    }

    async fn get_alerts(
        &self,
        _location: &Location,
        _cancel: &CancellationToken,
    ) -> Result<Vec<WeatherAlert>, ApplicationError> {
        self.client()?;
        Ok(Vec::new())
    }
}
