//! Rate limiter port

#[cfg(test)]
use mockall::automock;

/// Admission control keyed by caller id
#[cfg_attr(test, automock)]
pub trait RateLimiterPort: Send + Sync {
    /// Returns true and consumes one token if `caller_id` may proceed
    fn allowed(&self, caller_id: &str) -> bool;
}
