//! Provenance of a weather value

use serde::Serialize;
use std::fmt;

/// Where a piece of weather data came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "provider", rename_all = "snake_case")]
pub enum DataSource {
    /// Built directly, not attributed to any provider
    #[default]
    Unattributed,
    /// Returned by a configured upstream provider
    Provider(String),
    /// Mock data from the fallback provider (degraded)
    Fallback(String),
}

impl DataSource {
    /// Returns true if the value is degraded fallback data
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Name of the provider that produced the value, if attributed
    #[must_use]
    pub fn provider_name(&self) -> Option<&str> {
        match self {
            Self::Unattributed => None,
            Self::Provider(name) | Self::Fallback(name) => Some(name),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unattributed => write!(f, "unattributed"),
            Self::Provider(name) => write!(f, "{name}"),
            Self::Fallback(name) => write!(f, "{name} (fallback)"),
        }
    }
}
