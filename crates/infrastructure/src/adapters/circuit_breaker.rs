//! Circuit breaker pattern for provider calls
//!
//! Implements the circuit breaker pattern to stop hammering a provider that
//! keeps failing.
//!
//! # States
//!
//! - **Closed**: Normal operation, requests pass through
//! - **Open**: Provider is down, requests fail fast without HTTP traffic
//! - **Half-Open**: One trial request tests whether the provider recovered
//!
//! Only transient failures (timeouts, connect errors, 5xx, 429) count
//! against the provider. A 404 or other permanent answer proves the provider
//! is up and resets the failure streak.
//!
//! # Example
//!
//! ```rust,ignore
//! use infrastructure::adapters::CircuitBreaker;
//!
//! let cb = CircuitBreaker::new("openweather");
//! let result = cb.call(|| async {
//!     client.send().await
//! }).await;
//! ```

use std::{
    fmt,
    time::{Duration, Instant},
};

use application::ApplicationError;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

/// Configuration for a circuit breaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive transient failures before opening the circuit
    pub failure_threshold: u32,
    /// Time the circuit stays open before a trial call is admitted
    pub open_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(30))
    }
}

impl CircuitBreakerConfig {
    #[must_use]
    pub const fn new(failure_threshold: u32, open_duration: Duration) -> Self {
        Self {
            failure_threshold,
            open_duration,
        }
    }
}

/// State of a circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, requests pass through
    Closed,
    /// Provider is down, requests fail fast
    Open,
    /// Testing if the provider has recovered
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Internal state tracking
struct CircuitBreakerState {
    state: CircuitState,
    failure_count: u32,
    opened_at: Option<Instant>,
    /// A half-open trial call is running
    trial_in_flight: bool,
}

/// Circuit breaker guarding one provider
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    state: RwLock<CircuitBreakerState>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Releases the half-open trial slot if the call never reports back
/// (e.g. its future was dropped on cancellation).
struct TrialGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.state.write().trial_in_flight = false;
        }
    }
}

impl CircuitBreaker {
    /// Creates a new circuit breaker with default configuration
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Creates a new circuit breaker with custom configuration
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: RwLock::new(CircuitBreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                opened_at: None,
                trial_in_flight: false,
            }),
        }
    }

    /// Returns the name of this circuit breaker
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current state, moving Open to HalfOpen once the break elapsed
    #[must_use]
    pub fn state(&self) -> CircuitState {
        let mut state = self.state.write();
        self.refresh(&mut state);
        state.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    fn refresh(&self, state: &mut CircuitBreakerState) {
        if state.state == CircuitState::Open
            && state
                .opened_at
                .is_some_and(|at| at.elapsed() >= self.config.open_duration)
        {
            debug!(provider = %self.name, "Circuit transitioning from Open to HalfOpen");
            state.state = CircuitState::HalfOpen;
            state.trial_in_flight = false;
        }
    }

    /// Decide whether a call may go through; `Ok(true)` marks a trial call
    fn admit(&self) -> Result<bool, ApplicationError> {
        let mut state = self.state.write();
        self.refresh(&mut state);
        match state.state {
            CircuitState::Closed => Ok(false),
            CircuitState::HalfOpen if !state.trial_in_flight => {
                state.trial_in_flight = true;
                Ok(true)
            },
            CircuitState::HalfOpen | CircuitState::Open => {
                warn!(
                    provider = %self.name,
                    state = %state.state,
                    "Circuit breaker preventing call to provider"
                );
                Err(ApplicationError::CircuitOpen {
                    provider: self.name.clone(),
                })
            },
        }
    }

    /// Records a healthy response
    fn on_success(&self) {
        let mut state = self.state.write();
        state.failure_count = 0;
        state.trial_in_flight = false;
        if state.state == CircuitState::HalfOpen {
            info!(provider = %self.name, "Circuit transitioning from HalfOpen to Closed");
            state.state = CircuitState::Closed;
            state.opened_at = None;
        }
    }

    /// Records a transient failure
    fn on_failure(&self) {
        let mut state = self.state.write();
        state.failure_count += 1;
        state.trial_in_flight = false;

        match state.state {
            CircuitState::Closed if state.failure_count >= self.config.failure_threshold => {
                warn!(
                    provider = %self.name,
                    failures = state.failure_count,
                    open_secs = self.config.open_duration.as_secs(),
                    "Circuit transitioning from Closed to Open"
                );
                state.state = CircuitState::Open;
                state.opened_at = Some(Instant::now());
                state.failure_count = 0;
            },
            CircuitState::HalfOpen => {
                warn!(
                    provider = %self.name,
                    "Circuit transitioning from HalfOpen to Open after failure"
                );
                state.state = CircuitState::Open;
                state.opened_at = Some(Instant::now());
                state.failure_count = 0;
            },
            CircuitState::Closed | CircuitState::Open => {},
        }
    }

    /// Calls an async operation through the circuit breaker
    ///
    /// Returns `ApplicationError::CircuitOpen` without running `f` while the
    /// circuit is open (or a half-open trial is already running).
    pub async fn call<F, Fut, T>(&self, f: F) -> Result<T, ApplicationError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, ApplicationError>>,
    {
        let trial = self.admit()?;
        let mut guard = TrialGuard {
            breaker: self,
            armed: trial,
        };

        let result = f().await;
        guard.armed = false;

        match &result {
            Err(e) if e.is_retryable() => self.on_failure(),
            Err(ApplicationError::Cancelled) => {
                // No verdict on the provider; just free the trial slot.
                self.state.write().trial_in_flight = false;
            },
            _ => self.on_success(),
        }
        result
    }
}
