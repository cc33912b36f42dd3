//! Domain-level errors

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Errors that can occur in the domain layer
///
/// Every variant is a validation failure: a value or aggregate was rejected
/// by its constructor and no instance exists afterwards.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Invalid location (empty city, malformed country code)
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// Temperature outside the plausible range
    #[error("Invalid temperature: {field} = {value}°C is outside [-100, 100]")]
    InvalidTemperature { field: &'static str, value: f64 },

    /// Humidity outside 0-100%
    #[error("Invalid humidity: {0}% is out of range (must be 0-100)")]
    InvalidHumidity(u8),

    /// Forecast dated before the current UTC day
    #[error("Forecast date {date} is before {today}")]
    ForecastInPast { date: NaiveDate, today: NaiveDate },

    /// Alert whose validity window ends before it starts
    #[error("Alert '{title}' ends at {to} before it starts at {from}")]
    InvertedAlertWindow {
        title: String,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create a generic validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_creates_correct_error() {
        let err = DomainError::validation("description must not be empty");
        assert_eq!(
            err,
            DomainError::ValidationError("description must not be empty".to_string())
        );
    }

    #[test]
    fn temperature_error_display() {
        let err = DomainError::InvalidTemperature {
            field: "temperature",
            value: 140.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("temperature"));
        assert!(msg.contains("140"));
    }

    #[test]
    fn forecast_in_past_display() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let err = DomainError::ForecastInPast { date, today };
        assert_eq!(err.to_string(), "Forecast date 2024-06-01 is before 2024-06-02");
    }

    #[test]
    fn humidity_error_display() {
        assert!(DomainError::InvalidHumidity(120).to_string().contains("120%"));
    }
}
