//! Weather service port
//!
//! The boundary exposed to callers: one answer per request, whichever
//! provider produced it.

use async_trait::async_trait;
use domain::{Location, WeatherAlert, WeatherForecast, WeatherInfo};
#[cfg(test)]
use mockall::automock;
use tokio_util::sync::CancellationToken;

use crate::error::ApplicationError;

/// Current conditions, forecast and alerts answered as one request
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherBundle {
    pub current: WeatherInfo,
    pub forecasts: Vec<WeatherForecast>,
    pub alerts: Vec<WeatherAlert>,
}

/// Port for resilient weather lookups
#[allow(clippy::struct_field_names)] // automock generates struct with `get_*` prefixes
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherServicePort: Send + Sync {
    /// Get current weather for a location
    async fn get_current_weather(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<WeatherInfo, ApplicationError>;

    /// Get daily forecasts for the next `days` days
    async fn get_forecast(
        &self,
        location: &Location,
        days: u8,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherForecast>, ApplicationError>;

    /// Get alerts for a location
    async fn get_alerts(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherAlert>, ApplicationError>;

    /// Get all three for one location, admitted as a single request
    async fn get_bundle(
        &self,
        location: &Location,
        days: u8,
        cancel: &CancellationToken,
    ) -> Result<WeatherBundle, ApplicationError>;
}
