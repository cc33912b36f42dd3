//! Severe weather alerts

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::errors::DomainError;

/// Alert severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Be aware
    Advisory,
    /// Conditions are favourable for hazardous weather
    Watch,
    /// Hazardous weather is occurring or imminent
    Warning,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Advisory => write!(f, "advisory"),
            Self::Watch => write!(f, "watch"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// An alert issued for a location with a validity window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherAlert {
    title: String,
    description: String,
    severity: AlertSeverity,
    effective_from: DateTime<Utc>,
    effective_to: DateTime<Utc>,
}

impl WeatherAlert {
    /// Create a validated alert
    ///
    /// # Errors
    ///
    /// Fails if title or description is blank, or if the window ends before
    /// it starts.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: AlertSeverity,
        effective_from: DateTime<Utc>,
        effective_to: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let title = title.into().trim().to_string();
        let description = description.into().trim().to_string();

        if title.is_empty() {
            return Err(DomainError::validation("alert title must not be empty"));
        }
        if description.is_empty() {
            return Err(DomainError::validation(
                "alert description must not be empty",
            ));
        }

        let alert = Self {
            title,
            description,
            severity,
            effective_from,
            effective_to,
        };
        alert.ensure_window()?;
        Ok(alert)
    }

    /// Checks that the window is not inverted
    pub fn ensure_window(&self) -> Result<(), DomainError> {
        if self.effective_from > self.effective_to {
            Err(DomainError::InvertedAlertWindow {
                title: self.title.clone(),
                from: self.effective_from,
                to: self.effective_to,
            })
        } else {
            Ok(())
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn severity(&self) -> AlertSeverity {
        self.severity
    }

    #[must_use]
    pub const fn effective_from(&self) -> DateTime<Utc> {
        self.effective_from
    }

    #[must_use]
    pub const fn effective_to(&self) -> DateTime<Utc> {
        self.effective_to
    }

    /// Returns true if `at` falls inside the validity window
    #[must_use]
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.effective_from <= at && at <= self.effective_to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn valid_alert() {
        let alert =
            WeatherAlert::new("Gale", "Strong winds", AlertSeverity::Warning, at(6), at(18))
                .unwrap();
        assert_eq!(alert.title(), "Gale");
        assert_eq!(alert.severity(), AlertSeverity::Warning);
        assert!(alert.is_active_at(at(12)));
        assert!(!alert.is_active_at(at(19)));
    }

    #[test]
    fn inverted_window_rejected() {
        let err = WeatherAlert::new("Gale", "Strong winds", AlertSeverity::Watch, at(18), at(6))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvertedAlertWindow { .. }));
    }

    #[test]
    fn instant_window_accepted() {
        assert!(
            WeatherAlert::new("Flash", "Brief", AlertSeverity::Advisory, at(6), at(6)).is_ok()
        );
    }

    #[test]
    fn blank_text_rejected() {
        let from = at(1);
        let to = from + Duration::hours(1);
        assert!(WeatherAlert::new(" ", "desc", AlertSeverity::Advisory, from, to).is_err());
        assert!(WeatherAlert::new("title", "", AlertSeverity::Advisory, from, to).is_err());
    }

    #[test]
    fn severity_ordering() {
        assert!(AlertSeverity::Advisory < AlertSeverity::Watch);
        assert!(AlertSeverity::Watch < AlertSeverity::Warning);
        assert_eq!(AlertSeverity::Watch.to_string(), "watch");
    }
}
