//! Rate limiting settings (`[rate_limit]`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Bucket size, also the burst allowance (default: 10)
    #[serde(default = "default_capacity")]
    pub capacity: u32,

    /// Tokens added per second; 0 disables refill (default: 1.0)
    #[serde(default = "default_refill")]
    pub refill_per_second: f64,

    /// Caller id the orchestrator charges (default: "global")
    #[serde(default = "default_caller_id")]
    pub caller_id: String,
}

const fn default_capacity() -> u32 {
    10
}

const fn default_refill() -> f64 {
    1.0
}

fn default_caller_id() -> String {
    application::DEFAULT_CALLER_ID.to_string()
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            refill_per_second: default_refill(),
            caller_id: default_caller_id(),
        }
    }
}
