//! Application services - Use case implementations

mod location_weather_service;
mod provider_selector;
mod weather_orchestrator;

pub use location_weather_service::LocationWeatherService;
pub use provider_selector::{PriorityProviderSelector, PriorityTable, order_by_priority};
pub use weather_orchestrator::{DEFAULT_CALLER_ID, MAX_FORECAST_DAYS, WeatherOrchestrator};
