//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level validation error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request throttled before any provider was contacted
    #[error("rate limited")]
    RateLimited,

    /// Network error, timeout, 5xx or 429 from a provider
    #[error("provider '{provider}' transient failure: {message}")]
    ProviderTransient { provider: String, message: String },

    /// Non-transient provider failure (e.g. location not found)
    #[error("provider '{provider}' failed: {message}")]
    ProviderPermanent { provider: String, message: String },

    /// Circuit breaker is open for the provider
    #[error("circuit breaker open for provider '{provider}'")]
    CircuitOpen { provider: String },

    /// No client or configuration exists for the provider
    #[error("provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// Every provider, including the fallback, failed
    #[error("no data from fallback provider")]
    AllProvidersExhausted {
        #[source]
        source: Box<ApplicationError>,
    },

    /// The operation was cancelled by the caller
    #[error("operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Create a transient provider failure
    pub fn transient(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderTransient {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a permanent provider failure
    pub fn permanent(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderPermanent {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderTransient { .. })
    }

    /// Check if this error is a recognised provider failure
    ///
    /// These advance the fallback chain to the next provider. Everything
    /// else (validation, cancellation, internal errors) propagates.
    pub const fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::ProviderTransient { .. }
                | Self::ProviderPermanent { .. }
                | Self::CircuitOpen { .. }
                | Self::ProviderNotConfigured(_)
        )
    }

    /// Name of the provider that failed, if known
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::ProviderTransient { provider, .. }
            | Self::ProviderPermanent { provider, .. }
            | Self::CircuitOpen { provider } => Some(provider),
            Self::ProviderNotConfigured(name) => Some(name),
            _ => None,
        }
    }

    /// Short description safe to show to callers
    ///
    /// Never includes upstream response bodies, URLs or keys.
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "invalid weather data",
            Self::RateLimited => "rate limited",
            Self::ProviderTransient { .. } | Self::CircuitOpen { .. } => {
                "weather provider temporarily unavailable"
            },
            Self::ProviderPermanent { .. } => "weather provider could not answer the request",
            Self::ProviderNotConfigured(_) => "weather provider not configured",
            Self::AllProvidersExhausted { .. } => "no data from fallback provider",
            Self::Cancelled => "operation cancelled",
            Self::Configuration(_) | Self::Internal(_) => "internal error",
        }
    }
}
