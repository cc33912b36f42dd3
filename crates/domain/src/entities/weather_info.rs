//! Current weather conditions

use serde::Serialize;

use crate::errors::DomainError;
use crate::value_objects::{Celsius, DataSource, Humidity};

/// Current conditions at a location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherInfo {
    description: String,
    temperature: Celsius,
    feels_like: Celsius,
    humidity: Humidity,
    source: DataSource,
}

impl WeatherInfo {
    /// Create validated current conditions
    ///
    /// # Errors
    ///
    /// Fails if the description is blank, either temperature lies outside
    /// [-100, 100] °C or the humidity exceeds 100%.
    pub fn new(
        description: impl Into<String>,
        temperature_c: f64,
        feels_like_c: f64,
        humidity: u8,
    ) -> Result<Self, DomainError> {
        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(DomainError::validation(
                "weather description must not be empty",
            ));
        }

        Ok(Self {
            description,
            temperature: Celsius::new("temperature", temperature_c)?,
            feels_like: Celsius::new("feels_like", feels_like_c)?,
            humidity: Humidity::new(humidity)?,
            source: DataSource::Unattributed,
        })
    }

    /// Attribute the conditions to a source
    #[must_use]
    pub fn with_source(mut self, source: DataSource) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn temperature_c(&self) -> f64 {
        self.temperature.value()
    }

    #[must_use]
    pub const fn feels_like_c(&self) -> f64 {
        self.feels_like.value()
    }

    #[must_use]
    pub const fn humidity(&self) -> Humidity {
        self.humidity
    }

    #[must_use]
    pub const fn source(&self) -> &DataSource {
        &self.source
    }

    /// Returns true if this is degraded fallback data
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.source.is_fallback()
    }
}
