//! OpenWeatherMap schemas and mapping
//!
//! Covers the three endpoints the adapter uses:
//! `geo/1.0/direct` (city to coordinates), `data/2.5/weather` (current
//! conditions) and `data/2.5/forecast` (5 days in 3-hour steps). All requests
//! use `units=metric`.

use chrono::{DateTime, NaiveDate, Utc};
use domain::{DataSource, WeatherForecast, WeatherInfo};
use serde::Deserialize;

use crate::daily::{Sample, aggregate_daily};
use crate::error::MappingError;

/// Description used when a payload carries no condition entry
pub const NO_DESCRIPTION: &str = "No description";

/// Path of the current conditions endpoint
pub const CURRENT_PATH: &str = "/data/2.5/weather";
/// Path of the 3-hour forecast endpoint
pub const FORECAST_PATH: &str = "/data/2.5/forecast";
/// Path of the direct geocoding endpoint
pub const GEOCODING_PATH: &str = "/geo/1.0/direct";

/// Condition entry (`weather[]`)
#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub main: String,
    pub description: String,
}

/// Measurements block (`main`)
#[derive(Debug, Clone, Deserialize)]
pub struct Main {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub humidity: Option<u8>,
}

/// Response of `data/2.5/weather`
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentResponse {
    #[serde(default)]
    pub weather: Vec<Condition>,
    pub main: Main,
    #[serde(default)]
    pub name: Option<String>,
}

/// One 3-hour step of `data/2.5/forecast`
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastItem {
    /// Unix timestamp of the step (UTC)
    pub dt: i64,
    pub main: Main,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

/// Response of `data/2.5/forecast`
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastItem>,
}

/// One match of `geo/1.0/direct`
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingMatch {
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
}

fn first_description(conditions: &[Condition]) -> &str {
    conditions
        .first()
        .map(|c| c.description.as_str())
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(NO_DESCRIPTION)
}

/// Map current conditions
///
/// A missing `feels_like` falls back to `temp`; a missing humidity is an
/// error.
pub fn map_current(
    response: &CurrentResponse,
    source: DataSource,
) -> Result<WeatherInfo, MappingError> {
    let humidity = response
        .main
        .humidity
        .ok_or(MappingError::MissingField("main.humidity"))?;
    let info = WeatherInfo::new(
        first_description(&response.weather),
        response.main.temp,
        response.main.feels_like.unwrap_or(response.main.temp),
        humidity,
    )?;
    Ok(info.with_source(source))
}

/// Map the 3-hour forecast into at most `days` daily forecasts
pub fn map_forecast(
    response: &ForecastResponse,
    days: u8,
    today: NaiveDate,
    source: &DataSource,
) -> Result<Vec<WeatherForecast>, MappingError> {
    let samples = response
        .list
        .iter()
        .map(|item| {
            let at = DateTime::<Utc>::from_timestamp(item.dt, 0)
                .ok_or_else(|| MappingError::InvalidTimestamp(item.dt.to_string()))?;
            Ok(Sample::new(
                at,
                item.main.temp,
                first_description(&item.weather),
            ))
        })
        .collect::<Result<Vec<_>, MappingError>>()?;

    aggregate_daily(samples, days, today, source)
}
