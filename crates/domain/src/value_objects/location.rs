//! Location value object
//!
//! A city name with an optional ISO-3166-1 alpha-2 country code, as accepted
//! by the `q=` parameter of most weather APIs.

use serde::Serialize;
use std::fmt;

use crate::errors::DomainError;

/// A named place to fetch weather for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    city: String,
    country_code: Option<String>,
}

impl Location {
    /// Create a new location
    ///
    /// The city is trimmed and must not be empty. The country code, when
    /// given, is trimmed and uppercased and must be exactly two ASCII
    /// letters. A blank country code is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidLocation` if either part is malformed.
    pub fn new(city: impl AsRef<str>, country_code: Option<&str>) -> Result<Self, DomainError> {
        let city = city.as_ref().trim();
        if city.is_empty() {
            return Err(DomainError::InvalidLocation(
                "city must not be empty".to_string(),
            ));
        }

        let country_code = match country_code.map(str::trim) {
            None | Some("") => None,
            Some(code) => {
                if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(DomainError::InvalidLocation(format!(
                        "country code '{code}' must be two letters"
                    )));
                }
                Some(code.to_ascii_uppercase())
            },
        };

        Ok(Self {
            city: city.to_string(),
            country_code,
        })
    }

    /// Create a location from a city only
    pub fn city(city: impl AsRef<str>) -> Result<Self, DomainError> {
        Self::new(city, None)
    }

    /// The trimmed city name
    #[must_use]
    pub fn city_name(&self) -> &str {
        &self.city
    }

    /// The uppercased country code, if any
    #[must_use]
    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    /// Query string understood by vendor APIs (`London,GB` or `London`)
    #[must_use]
    pub fn query(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country_code {
            Some(code) => write!(f, "{},{code}", self.city),
            None => write!(f, "{}", self.city),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_uppercases() {
        let loc = Location::new("  London ", Some(" gb")).unwrap();
        assert_eq!(loc.city_name(), "London");
        assert_eq!(loc.country_code(), Some("GB"));
    }

    #[test]
    fn empty_city_rejected() {
        assert!(matches!(
            Location::new("   ", Some("GB")),
            Err(DomainError::InvalidLocation(_))
        ));
    }

    #[test]
    fn country_code_must_be_two_letters() {
        assert!(Location::new("London", Some("GBR")).is_err());
        assert!(Location::new("London", Some("G1")).is_err());
        assert!(Location::new("London", Some("G")).is_err());
    }

    #[test]
    fn blank_country_code_is_absent() {
        let loc = Location::new("Paris", Some("  ")).unwrap();
        assert_eq!(loc.country_code(), None);
    }

    #[test]
    fn display_and_query() {
        assert_eq!(Location::new("London", Some("gb")).unwrap().to_string(), "London,GB");
        assert_eq!(Location::city("Oslo").unwrap().query(), "Oslo");
    }

    #[test]
    fn equal_after_normalisation() {
        assert_eq!(
            Location::new("Berlin", Some("de")).unwrap(),
            Location::new(" Berlin", Some("DE")).unwrap()
        );
    }
}
