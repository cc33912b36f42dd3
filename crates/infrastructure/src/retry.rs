//! Generic retry logic with exponential backoff
//!
//! Retries transient failures with `delay = base^attempt` seconds, where
//! `attempt` counts retries from 1. With the default base of 2 the waits are
//! 2s, 4s, 8s. A pending backoff sleep is abandoned as soon as the caller's
//! cancellation token fires.
//!
//! # Example
//!
//! ```rust,ignore
//! use infrastructure::retry::{RetryPolicy, with_retry};
//!
//! let policy = RetryPolicy::new(3, 2.0);
//! let result = with_retry(&policy, &cancel, || async {
//!     provider.call().await
//! }).await;
//! ```

use std::future::Future;
use std::time::{Duration, Instant};

use application::ApplicationError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Backoff schedule and attempt bound
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay_secs: f64,
    max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 2.0)
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_retries: u32, base_delay_secs: f64) -> Self {
        Self {
            max_retries,
            base_delay_secs,
            max_delay: None,
        }
    }

    /// Cap every single sleep at `max`
    #[must_use]
    pub const fn with_max_delay(mut self, max: Duration) -> Self {
        self.max_delay = Some(max);
        self
    }

    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry number `attempt` (1-based)
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let secs = self.base_delay_secs.max(0.0).powi(exponent);
        let delay = Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX);
        self.max_delay.map_or(delay, |max| delay.min(max))
    }
}

/// Retry result containing either success or the last error
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The result of the operation
    pub result: Result<T, E>,
    /// Number of attempts made (1 = no retries, 2 = one retry, etc.)
    pub attempts: u32,
    /// Total time spent including retries
    pub total_duration: Duration,
}

impl<T, E> RetryResult<T, E> {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Convert to standard Result, discarding metadata
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Execute an async operation with retry logic
///
/// Non-retryable errors return immediately. If `cancel` fires during a
/// backoff sleep the result is `ApplicationError::Cancelled`.
#[allow(clippy::cast_possible_truncation)]
pub async fn with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> RetryResult<T, ApplicationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApplicationError>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let err = match operation().await {
            Ok(value) => {
                if attempts > 1 {
                    debug!(
                        attempts,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Operation succeeded after retries"
                    );
                }
                return RetryResult {
                    result: Ok(value),
                    attempts,
                    total_duration: start.elapsed(),
                };
            },
            Err(err) => err,
        };

        let retry = attempts; // 1-based retry number
        if !err.is_retryable() || retry > policy.max_retries {
            if err.is_retryable() {
                warn!(
                    attempts,
                    max_retries = policy.max_retries,
                    error = %err,
                    "Operation failed after max retries"
                );
            }
            return RetryResult {
                result: Err(err),
                attempts,
                total_duration: start.elapsed(),
            };
        }

        let delay = policy.delay_for_attempt(retry);
        warn!(
            attempt = attempts,
            max_retries = policy.max_retries,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Operation failed, retrying"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return RetryResult {
                    result: Err(ApplicationError::Cancelled),
                    attempts,
                    total_duration: start.elapsed(),
                };
            },
            () = tokio::time::sleep(delay) => {},
        }
    }
}
