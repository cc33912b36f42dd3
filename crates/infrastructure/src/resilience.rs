//! Resilience policy factory
//!
//! Builds the retry policy, per-provider circuit breakers and the combined
//! policy every provider HTTP call runs through. In the combined policy the
//! retry loop is outermost and each attempt passes the breaker, so an open
//! circuit ends the retries immediately (`CircuitOpen` is not retryable).

use std::future::Future;
use std::sync::Arc;

use application::ApplicationError;
use tokio_util::sync::CancellationToken;

use crate::adapters::{CircuitBreaker, CircuitBreakerConfig};
use crate::config::HttpPolicyConfig;
use crate::retry::{RetryPolicy, with_retry};

/// Creates resilience policies from `[http_policies]`
#[derive(Debug, Clone)]
pub struct ResiliencePolicyFactory {
    retry: RetryPolicy,
    breaker: CircuitBreakerConfig,
}

impl ResiliencePolicyFactory {
    #[must_use]
    pub fn new(config: &HttpPolicyConfig) -> Self {
        Self {
            retry: config.to_retry_policy(),
            breaker: config.to_circuit_breaker_config(),
        }
    }

    #[must_use]
    pub fn create_retry_policy(&self) -> RetryPolicy {
        self.retry.clone()
    }

    /// A fresh breaker for one provider
    #[must_use]
    pub fn create_circuit_breaker_policy(&self, name: &str) -> CircuitBreaker {
        CircuitBreaker::with_config(name, self.breaker.clone())
    }

    #[must_use]
    pub fn create_combined_policy(&self, name: &str) -> CombinedPolicy {
        CombinedPolicy {
            retry: self.create_retry_policy(),
            breaker: Arc::new(self.create_circuit_breaker_policy(name)),
        }
    }
}

/// Retry wrapped around a circuit breaker
#[derive(Debug, Clone)]
pub struct CombinedPolicy {
    retry: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
}

impl CombinedPolicy {
    #[must_use]
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Run `operation` (once per attempt) under both policies
    pub async fn execute<F, Fut, T>(
        &self,
        cancel: &CancellationToken,
        operation: F,
    ) -> Result<T, ApplicationError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApplicationError>>,
    {
        let operation = &operation;
        with_retry(&self.retry, cancel, || self.breaker.call(operation))
            .await
            .into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn config(retries: u32, allowed_errors: u32) -> HttpPolicyConfig {
        HttpPolicyConfig {
            retry_count: retries,
            retry_base_delay_secs: 0.0,
            circuit_breaker_allowed_errors: allowed_errors,
            ..HttpPolicyConfig::default()
        }
    }

    #[tokio::test]
    async fn open_circuit_stops_retrying() {
        let policy = ResiliencePolicyFactory::new(&config(10, 2)).create_combined_policy("p");
        let calls = AtomicU32::new(0);

        let err = policy
            .execute(&CancellationToken::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(ApplicationError::transient("p", "HTTP 503")) }
            })
            .await
            .unwrap_err();

        // Two real attempts open the circuit; the third attempt is rejected.
        assert!(matches!(err, ApplicationError::CircuitOpen { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(policy.breaker().is_open());
    }

    #[tokio::test]
    async fn transient_then_success() {
        let policy = ResiliencePolicyFactory::new(&config(3, 5)).create_combined_policy("p");
        let calls = AtomicU32::new(0);

        let value = policy
            .execute(&CancellationToken::new(), || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(ApplicationError::transient("p", "timeout"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 1);
        assert!(!policy.breaker().is_open());
    }

    #[test]
    fn each_provider_gets_its_own_breaker() {
        let factory = ResiliencePolicyFactory::new(&HttpPolicyConfig::default());
        let a = factory.create_combined_policy("a");
        let b = factory.create_combined_policy("b");
        assert_eq!(a.breaker().name(), "a");
        assert_eq!(b.breaker().name(), "b");
        assert_eq!(factory.create_retry_policy().max_retries(), 3);
    }
}
