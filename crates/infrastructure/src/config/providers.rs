//! Upstream provider entries (`[providers.<name>]`).

use serde::{Deserialize, Serialize};

/// One upstream weather provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API root, e.g. `https://api.openweathermap.org`
    pub base_url: String,

    /// Name of the environment variable holding the API key
    #[serde(default)]
    pub api_key_ref: Option<String>,

    /// Relative weight (informational, default: 1)
    #[serde(default = "default_weight")]
    pub weight: u32,

    /// Lower numbers are tried first (default: 100)
    #[serde(default = "default_priority")]
    pub priority: u32,
}

const fn default_weight() -> u32 {
    1
}

const fn default_priority() -> u32 {
    100
}

impl ProviderConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, priority: u32) -> Self {
        Self {
            base_url: base_url.into(),
            api_key_ref: None,
            weight: default_weight(),
            priority,
        }
    }

    /// Set the environment variable the API key is read from
    #[must_use]
    pub fn with_api_key_ref(mut self, env_var: impl Into<String>) -> Self {
        self.api_key_ref = Some(env_var.into());
        self
    }
}

/// Vendor protocol spoken by a provider, inferred from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenWeatherMap (`/data/2.5/*`)
    OpenWeather,
    /// WeatherAPI.com (`/current.json`, `/forecast.json`)
    WeatherApi,
}

impl ProviderKind {
    /// Infer the kind from a provider name (case-insensitive)
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openweather" | "openweathermap" => Some(Self::OpenWeather),
            "weatherapi" => Some(Self::WeatherApi),
            _ => None,
        }
    }
}
