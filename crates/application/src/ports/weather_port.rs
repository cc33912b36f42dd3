//! Weather provider port
//!
//! Defines the capability set every upstream weather source implements,
//! whether a real vendor adapter, the fallback provider or a decorator.

use async_trait::async_trait;
use domain::{Location, WeatherAlert, WeatherForecast, WeatherInfo};
use tokio_util::sync::CancellationToken;

use crate::error::ApplicationError;

/// Port for a single weather data source
///
/// Implementations report their own failures as
/// `ApplicationError::ProviderTransient`/`ProviderPermanent`/`CircuitOpen`;
/// the orchestrator uses those to move on to the next provider.
#[async_trait]
pub trait WeatherProviderPort: Send + Sync + std::fmt::Debug {
    /// Stable provider name, matching its configuration key
    fn name(&self) -> &str;

    /// Get current weather for a location
    async fn get_current_weather(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<WeatherInfo, ApplicationError>;

    /// Get daily forecasts for the next `days` days, starting today
    async fn get_forecast(
        &self,
        location: &Location,
        days: u8,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherForecast>, ApplicationError>;

    /// Get alerts currently issued for a location
    async fn get_alerts(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherAlert>, ApplicationError>;
}
