//! Daily forecast entry

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::errors::DomainError;
use crate::value_objects::{Celsius, DataSource};

/// Summary of the expected weather for one calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherForecast {
    date: NaiveDate,
    description: String,
    temperature: Celsius,
    temperature_min: Option<Celsius>,
    temperature_max: Option<Celsius>,
    source: DataSource,
}

impl WeatherForecast {
    /// Create a validated forecast for `date`
    ///
    /// # Errors
    ///
    /// Fails if the date lies before today (UTC), the description is blank
    /// or the temperature is outside [-100, 100] °C.
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        temperature_c: f64,
    ) -> Result<Self, DomainError> {
        let forecast = Self::build(date, description.into(), temperature_c)?;
        forecast.ensure_not_before(Utc::now().date_naive())?;
        Ok(forecast)
    }

    /// Create a forecast without the date check (for trusted replays)
    ///
    /// Description and temperature are still validated.
    /// `LocationWeather::new` re-checks the date before such a value can
    /// become part of an aggregate.
    pub fn new_unchecked(
        date: NaiveDate,
        description: impl Into<String>,
        temperature_c: f64,
    ) -> Result<Self, DomainError> {
        Self::build(date, description.into(), temperature_c)
    }

    fn build(
        date: NaiveDate,
        description: String,
        temperature_c: f64,
    ) -> Result<Self, DomainError> {
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(DomainError::validation(
                "forecast description must not be empty",
            ));
        }
        Ok(Self {
            date,
            description,
            temperature: Celsius::new("temperature", temperature_c)?,
            temperature_min: None,
            temperature_max: None,
            source: DataSource::Unattributed,
        })
    }

    /// Attach the day's temperature range
    ///
    /// # Errors
    ///
    /// Fails if either bound is out of range or `min > max`.
    pub fn with_range(mut self, min_c: f64, max_c: f64) -> Result<Self, DomainError> {
        let min = Celsius::new("temperature_min", min_c)?;
        let max = Celsius::new("temperature_max", max_c)?;
        if min > max {
            return Err(DomainError::validation(format!(
                "forecast minimum {min} is above maximum {max}"
            )));
        }
        self.temperature_min = Some(min);
        self.temperature_max = Some(max);
        Ok(self)
    }

    /// Attribute the forecast to a source
    #[must_use]
    pub fn with_source(mut self, source: DataSource) -> Self {
        self.source = source;
        self
    }

    /// Checks the date against `today`
    pub fn ensure_not_before(&self, today: NaiveDate) -> Result<(), DomainError> {
        if self.date < today {
            Err(DomainError::ForecastInPast {
                date: self.date,
                today,
            })
        } else {
            Ok(())
        }
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Mean temperature for the day
    #[must_use]
    pub const fn temperature_c(&self) -> f64 {
        self.temperature.value()
    }

    #[must_use]
    pub fn temperature_min_c(&self) -> Option<f64> {
        self.temperature_min.map(Celsius::value)
    }

    #[must_use]
    pub fn temperature_max_c(&self) -> Option<f64> {
        self.temperature_max.map(Celsius::value)
    }

    #[must_use]
    pub const fn source(&self) -> &DataSource {
        &self.source
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.source.is_fallback()
    }
}
