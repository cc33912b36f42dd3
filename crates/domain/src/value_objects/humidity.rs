//! Humidity value object
//!
//! Represents a validated relative humidity percentage (0-100%).
//!
//! # Examples
//!
//! ```
//! use domain::value_objects::Humidity;
//!
//! let h = Humidity::new(65).expect("valid humidity");
//! assert_eq!(h.value(), 65);
//! assert!(Humidity::new(101).is_err());
//! ```

use serde::Serialize;
use std::fmt;

use crate::errors::DomainError;

/// Relative humidity percentage (0-100%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Humidity(u8);

impl Humidity {
    /// Maximum valid humidity percentage
    pub const MAX: u8 = 100;

    /// Create a new validated humidity value
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidHumidity` if the value is greater than 100.
    pub const fn new(value: u8) -> Result<Self, DomainError> {
        if value > Self::MAX {
            Err(DomainError::InvalidHumidity(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Get the humidity value as a u8
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Humidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Humidity {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Humidity> for u8 {
    fn from(h: Humidity) -> Self {
        h.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humidity_new_valid() {
        assert!(Humidity::new(0).is_ok());
        assert!(Humidity::new(50).is_ok());
        assert!(Humidity::new(100).is_ok());
    }

    #[test]
    fn test_humidity_new_invalid() {
        let result = Humidity::new(101);
        assert_eq!(result.unwrap_err(), DomainError::InvalidHumidity(101));
    }

    #[test]
    fn test_humidity_display() {
        assert_eq!(format!("{}", Humidity::new(65).unwrap()), "65%");
    }

    #[test]
    fn test_humidity_into_u8() {
        let v: u8 = Humidity::new(65).unwrap().into();
        assert_eq!(v, 65);
    }

    #[test]
    fn test_humidity_serialization() {
        let h = Humidity::new(65).unwrap();
        assert_eq!(serde_json::to_string(&h).unwrap(), "65");
    }
}
