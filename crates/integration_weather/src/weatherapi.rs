//! WeatherAPI.com schemas and mapping
//!
//! `current.json` for current conditions and `forecast.json` (with
//! `alerts=yes`) for hourly forecasts and alerts.

use chrono::{DateTime, NaiveDate, Utc};
use domain::{AlertSeverity, DataSource, WeatherAlert, WeatherForecast, WeatherInfo};
use serde::Deserialize;

use crate::daily::{Sample, aggregate_daily};
use crate::error::MappingError;

/// Path of the current conditions endpoint
pub const CURRENT_PATH: &str = "/current.json";
/// Path of the forecast endpoint (also carries alerts)
pub const FORECAST_PATH: &str = "/forecast.json";
/// Days the API returns at most
pub const MAX_DAYS: u8 = 14;

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub text: String,
}

/// `current` block
#[derive(Debug, Clone, Deserialize)]
pub struct Current {
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub humidity: u8,
    pub condition: Condition,
}

/// Response of `current.json`
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentResponse {
    pub current: Current,
}

/// One hour of `forecastday[].hour[]`
#[derive(Debug, Clone, Deserialize)]
pub struct Hour {
    pub time_epoch: i64,
    pub temp_c: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastDay {
    #[serde(default)]
    pub hour: Vec<Hour>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

/// One entry of `alerts.alert[]`
#[derive(Debug, Clone, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub desc: String,
    pub effective: String,
    pub expires: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Alerts {
    #[serde(default)]
    pub alert: Vec<Alert>,
}

/// Response of `forecast.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub forecast: Forecast,
    #[serde(default)]
    pub alerts: Alerts,
}

/// Map vendor severity wording onto the three domain levels
#[must_use]
pub fn map_severity(severity: &str) -> AlertSeverity {
    match severity.trim().to_ascii_lowercase().as_str() {
        "extreme" | "severe" => AlertSeverity::Warning,
        "moderate" => AlertSeverity::Watch,
        _ => AlertSeverity::Advisory,
    }
}

pub fn map_current(
    response: &CurrentResponse,
    source: DataSource,
) -> Result<WeatherInfo, MappingError> {
    let current = &response.current;
    let info = WeatherInfo::new(
        current.condition.text.as_str(),
        current.temp_c,
        current.feelslike_c,
        current.humidity,
    )?;
    Ok(info.with_source(source))
}

/// Fold hourly data into at most `days` daily forecasts
pub fn map_forecast(
    response: &ForecastResponse,
    days: u8,
    today: NaiveDate,
    source: &DataSource,
) -> Result<Vec<WeatherForecast>, MappingError> {
    let samples = response
        .forecast
        .forecastday
        .iter()
        .flat_map(|day| &day.hour)
        .map(|hour| {
            let at = DateTime::<Utc>::from_timestamp(hour.time_epoch, 0)
                .ok_or_else(|| MappingError::InvalidTimestamp(hour.time_epoch.to_string()))?;
            Ok(Sample::new(at, hour.temp_c, hour.condition.text.as_str()))
        })
        .collect::<Result<Vec<_>, MappingError>>()?;

    aggregate_daily(samples, days, today, source)
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, MappingError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| MappingError::InvalidTimestamp(format!("{raw}: {e}")))
}

fn first_non_blank<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|s| !s.trim().is_empty())
        .unwrap_or_default()
}

/// Map issued alerts
pub fn map_alerts(response: &ForecastResponse) -> Result<Vec<WeatherAlert>, MappingError> {
    response
        .alerts
        .alert
        .iter()
        .map(|alert| {
            let title = first_non_blank(&[alert.headline.as_str(), alert.event.as_str()]);
            let description = first_non_blank(&[
                alert.desc.as_str(),
                alert.event.as_str(),
                alert.headline.as_str(),
            ]);
            Ok(WeatherAlert::new(
                title,
                description,
                map_severity(&alert.severity),
                parse_time(&alert.effective)?,
                parse_time(&alert.expires)?,
            )?)
        })
        .collect()
}
