//! HTTP resilience settings (`[http_policies]`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapters::CircuitBreakerConfig;
use crate::retry::RetryPolicy;

/// Retry, circuit breaker and timeout settings shared by all provider clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpPolicyConfig {
    /// Retries after the first attempt (default: 3)
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base; attempt `n` waits `base^n` seconds (default: 2.0)
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_secs: f64,

    /// Upper bound for a single backoff sleep
    #[serde(default)]
    pub retry_max_delay_secs: Option<f64>,

    /// Consecutive transient failures that open the circuit (default: 5)
    #[serde(default = "default_allowed_errors")]
    pub circuit_breaker_allowed_errors: u32,

    /// Seconds the circuit stays open before a trial call (default: 30)
    #[serde(default = "default_break_duration")]
    pub circuit_breaker_duration_secs: u64,

    /// Per-request timeout in seconds (default: 10)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

const fn default_retry_count() -> u32 {
    3
}

const fn default_retry_base_delay() -> f64 {
    2.0
}

const fn default_allowed_errors() -> u32 {
    5
}

const fn default_break_duration() -> u64 {
    30
}

const fn default_request_timeout() -> u64 {
    10
}

impl Default for HttpPolicyConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_base_delay_secs: default_retry_base_delay(),
            retry_max_delay_secs: None,
            circuit_breaker_allowed_errors: default_allowed_errors(),
            circuit_breaker_duration_secs: default_break_duration(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl HttpPolicyConfig {
    #[must_use]
    pub fn to_retry_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::new(self.retry_count, self.retry_base_delay_secs);
        match self.retry_max_delay_secs {
            Some(max) => policy.with_max_delay(
                Duration::try_from_secs_f64(max.max(0.0)).unwrap_or(Duration::MAX),
            ),
            None => policy,
        }
    }

    #[must_use]
    pub const fn to_circuit_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig::new(
            self.circuit_breaker_allowed_errors,
            Duration::from_secs(self.circuit_breaker_duration_secs),
        )
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = HttpPolicyConfig::default();
        assert_eq!(config.retry_count, 3);
        assert!((config.retry_base_delay_secs - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.circuit_breaker_allowed_errors, 5);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn converts_to_policies() {
        let config = HttpPolicyConfig {
            retry_max_delay_secs: Some(5.0),
            ..HttpPolicyConfig::default()
        };
        let retry = config.to_retry_policy();
        assert_eq!(retry.max_retries(), 3);
        assert_eq!(retry.delay_for_attempt(3), Duration::from_secs(5));

        let breaker = config.to_circuit_breaker_config();
        assert_eq!(breaker.failure_threshold, 5);
        assert_eq!(breaker.open_duration, Duration::from_secs(30));
    }
}
