//! Temperature value object

use serde::Serialize;
use std::fmt;

use crate::errors::DomainError;

/// A temperature in degrees Celsius within the plausible range [-100, 100]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Celsius(f64);

impl Celsius {
    /// Lowest accepted value
    pub const MIN: f64 = -100.0;
    /// Highest accepted value
    pub const MAX: f64 = 100.0;

    /// Create a validated temperature
    ///
    /// `field` names the value in the error (e.g. `"feels_like"`).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTemperature` for values outside
    /// [-100, 100] and for NaN.
    pub fn new(field: &'static str, value: f64) -> Result<Self, DomainError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidTemperature { field, value })
        }
    }

    /// Get the value in degrees Celsius
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive() {
        assert!(Celsius::new("t", -100.0).is_ok());
        assert!(Celsius::new("t", 100.0).is_ok());
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(Celsius::new("t", 100.1).is_err());
        assert!(Celsius::new("t", -273.15).is_err());
    }

    #[test]
    fn nan_rejected() {
        assert!(Celsius::new("t", f64::NAN).is_err());
    }

    #[test]
    fn error_names_the_field() {
        let err = Celsius::new("feels_like", 150.0).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTemperature {
                field: "feels_like",
                value: 150.0
            }
        );
    }

    #[test]
    fn display_one_decimal() {
        assert_eq!(Celsius::new("t", 12.345).unwrap().to_string(), "12.3°C");
    }
}
