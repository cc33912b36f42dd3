//! Token bucket rate limiter
//!
//! One bucket per caller id. Buckets start full and refill continuously at
//! `refill_per_second` up to `capacity`. The whole refill-and-consume step
//! runs under a single lock, so concurrent callers sharing an id can never
//! spend the same token twice.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use application::RateLimiterPort;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::config::RateLimitConfig;

/// How often idle buckets are swept
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Buckets untouched for this long are dropped
pub const IDLE_BUCKET_TTL: Duration = Duration::from_secs(3600);

/// Token bucket entry for a single caller
#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    const fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    /// Refill, then try to consume a token
    ///
    /// A denied call still stores the refilled count.
    fn try_consume(&mut self, now: Instant, refill_per_second: f64, capacity: f64) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = elapsed.mul_add(refill_per_second, self.tokens).min(capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Per-caller token bucket limiter
#[derive(Debug)]
pub struct TokenBucketRateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    capacity: f64,
    refill_per_second: f64,
}

impl TokenBucketRateLimiter {
    /// Create a limiter; negative or NaN refill rates are treated as 0
    #[must_use]
    pub fn new(capacity: u32, refill_per_second: f64) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            capacity: f64::from(capacity),
            refill_per_second: refill_per_second.max(0.0),
        }
    }

    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.capacity, config.refill_per_second)
    }

    /// Admission check against an explicit clock reading
    pub fn check_at(&self, caller_id: &str, now: Instant) -> bool {
        let mut buckets = self.buckets.lock();
        let bucket = buckets
            .entry(caller_id.to_string())
            .or_insert_with(|| TokenBucket::full(self.capacity, now));

        let allowed = bucket.try_consume(now, self.refill_per_second, self.capacity);
        trace!(caller_id, allowed, tokens = bucket.tokens, "Rate limit check");
        allowed
    }

    /// Drop buckets idle for longer than `older_than`
    pub fn cleanup(&self, older_than: Duration) {
        let now = Instant::now();
        let mut buckets = self.buckets.lock();
        let before = buckets.len();
        buckets.retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < older_than);
        let removed = before - buckets.len();
        if removed > 0 {
            debug!(removed, remaining = buckets.len(), "Removed idle rate limit buckets");
        }
    }

    /// Sweep idle buckets every `interval` until `shutdown` fires
    ///
    /// The first sweep runs one `interval` after start.
    pub fn spawn_cleanup_task(
        self: &Arc<Self>,
        interval: Duration,
        idle_after: Duration,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        info!(
            interval_secs = interval.as_secs(),
            idle_secs = idle_after.as_secs(),
            "Starting rate limit cleanup task"
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    _ = ticker.tick() => limiter.cleanup(idle_after),
                }
            }
        })
    }

    /// Number of tracked callers
    #[must_use]
    pub fn tracked_callers(&self) -> usize {
        self.buckets.lock().len()
    }
}

impl RateLimiterPort for TokenBucketRateLimiter {
    fn allowed(&self, caller_id: &str) -> bool {
        self.check_at(caller_id, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn denies_after_capacity_in_zero_time() {
        let limiter = TokenBucketRateLimiter::new(5, 1.0);
        let now = Instant::now();
        for _ in 0..5 {
            assert!(limiter.check_at("global", now));
        }
        assert!(!limiter.check_at("global", now));
        assert!(!limiter.check_at("global", now));
    }

    #[test]
    fn refills_after_one_over_rate() {
        let limiter = TokenBucketRateLimiter::new(2, 4.0);
        let now = Instant::now();
        assert!(limiter.check_at("global", now));
        assert!(limiter.check_at("global", now));
        assert!(!limiter.check_at("global", now));

        let later = now + Duration::from_millis(250);
        assert!(limiter.check_at("global", later));
        assert!(!limiter.check_at("global", later));
    }

    #[test]
    fn refill_is_capped_at_capacity() {
        let limiter = TokenBucketRateLimiter::new(2, 10.0);
        let now = Instant::now();
        assert!(limiter.check_at("global", now));

        let much_later = now + Duration::from_secs(3600);
        assert!(limiter.check_at("global", much_later));
        assert!(limiter.check_at("global", much_later));
        assert!(!limiter.check_at("global", much_later));
    }

    #[test]
    fn capacity_one_without_refill() {
        let limiter = TokenBucketRateLimiter::new(1, 0.0);
        assert!(limiter.allowed("global"));
        assert!(!limiter.allowed("global"));

        let later = Instant::now() + Duration::from_secs(60);
        assert!(!limiter.check_at("global", later));
    }

    #[test]
    fn callers_have_separate_buckets() {
        let limiter = TokenBucketRateLimiter::new(1, 0.0);
        assert!(limiter.allowed("alice"));
        assert!(limiter.allowed("bob"));
        assert!(!limiter.allowed("alice"));
        assert_eq!(limiter.tracked_callers(), 2);
    }

    #[test]
    fn denied_calls_keep_partial_refill() {
        let limiter = TokenBucketRateLimiter::new(1, 1.0);
        let now = Instant::now();
        assert!(limiter.check_at("global", now));
        assert!(!limiter.check_at("global", now + Duration::from_millis(500)));
        // 0.5 tokens were kept, another 0.5s completes the token.
        assert!(limiter.check_at("global", now + Duration::from_millis(1000)));
    }

    #[tokio::test]
    async fn cleanup_task_sweeps_idle_callers() {
        let limiter = Arc::new(TokenBucketRateLimiter::new(3, 1.0));
        assert!(limiter.allowed("tenant-a"));
        assert!(limiter.allowed("tenant-b"));
        assert_eq!(limiter.tracked_callers(), 2);

        let shutdown = CancellationToken::new();
        let task = limiter.spawn_cleanup_task(
            Duration::from_millis(20),
            Duration::from_millis(10),
            shutdown.clone(),
        );

        let swept = tokio::time::timeout(Duration::from_secs(2), async {
            while limiter.tracked_callers() > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(swept.is_ok());

        shutdown.cancel();
        task.await.unwrap();
    }

    #[test]
    fn cleanup_removes_idle_buckets() {
        let limiter = TokenBucketRateLimiter::new(3, 1.0);
        limiter.allowed("alice");
        limiter.cleanup(Duration::from_secs(3600));
        assert_eq!(limiter.tracked_callers(), 1);
        limiter.cleanup(Duration::ZERO);
        assert_eq!(limiter.tracked_callers(), 0);
    }

    #[test]
    fn from_config_uses_settings() {
        let config = RateLimitConfig {
            capacity: 2,
            refill_per_second: 0.0,
            ..RateLimitConfig::default()
        };
        let limiter = TokenBucketRateLimiter::from_config(&config);
        assert!(limiter.allowed("global"));
        assert!(limiter.allowed("global"));
        assert!(!limiter.allowed("global"));
    }

    #[test]
    fn concurrent_callers_never_overspend() {
        let limiter = Arc::new(TokenBucketRateLimiter::new(50, 0.0));
        let granted = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let granted = Arc::clone(&granted);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        if limiter.allowed("global") {
                            granted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(granted.load(Ordering::SeqCst), 50);
    }
}
