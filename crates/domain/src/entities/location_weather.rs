//! `LocationWeather` aggregate root
//!
//! Bundles the current conditions, the daily forecast and the active alerts
//! for one location. The only way to obtain a value is [`LocationWeather::new`]
//! (or [`LocationWeather::new_at`]), which validates every child before the
//! aggregate exists.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::{WeatherAlert, WeatherForecast, WeatherInfo};
use crate::errors::DomainError;
use crate::value_objects::Location;

/// Complete weather picture for a location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationWeather {
    location: Location,
    current: WeatherInfo,
    forecasts: Vec<WeatherForecast>,
    alerts: Vec<WeatherAlert>,
}

impl LocationWeather {
    /// Build the aggregate, validating against the current UTC date
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ForecastInPast` if any forecast is dated before
    /// today, or `DomainError::InvertedAlertWindow` if any alert ends before
    /// it starts.
    pub fn new(
        location: Location,
        current: WeatherInfo,
        forecasts: Vec<WeatherForecast>,
        alerts: Vec<WeatherAlert>,
    ) -> Result<Self, DomainError> {
        Self::new_at(Utc::now().date_naive(), location, current, forecasts, alerts)
    }

    /// Build the aggregate, treating `today` as the current date
    pub fn new_at(
        today: NaiveDate,
        location: Location,
        current: WeatherInfo,
        mut forecasts: Vec<WeatherForecast>,
        alerts: Vec<WeatherAlert>,
    ) -> Result<Self, DomainError> {
        for forecast in &forecasts {
            forecast.ensure_not_before(today)?;
        }
        for alert in &alerts {
            alert.ensure_window()?;
        }

        // Chronological order; stable for equal dates.
        forecasts.sort_by_key(WeatherForecast::date);

        Ok(Self {
            location,
            current,
            forecasts,
            alerts,
        })
    }

    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub const fn current(&self) -> &WeatherInfo {
        &self.current
    }

    /// Forecasts in chronological order
    #[must_use]
    pub fn forecasts(&self) -> &[WeatherForecast] {
        &self.forecasts
    }

    #[must_use]
    pub fn alerts(&self) -> &[WeatherAlert] {
        &self.alerts
    }

    /// Returns true if any part of the aggregate is fallback data
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.current.is_fallback() || self.forecasts.iter().any(WeatherForecast::is_fallback)
    }
}
