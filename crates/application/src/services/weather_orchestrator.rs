//! Weather orchestrator
//!
//! Answers each request from the first provider that succeeds, in priority
//! order, and falls back to the mock provider when every real one failed.
//!
//! # Algorithm
//!
//! 1. Ask the rate limiter for the global caller id; deny with `RateLimited`.
//!    A bundle request is charged once for all three of its lookups.
//! 2. Try each selected provider strictly in sequence. The first `Ok` wins and
//!    no later provider is called. Recognised provider failures are logged and
//!    skipped; any other error propagates unchanged.
//! 3. If all failed, call the fallback. Its failure becomes
//!    `AllProvidersExhausted` carrying the fallback's error.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{DomainError, Location, WeatherAlert, WeatherForecast, WeatherInfo};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::ApplicationError;
use crate::ports::{
    ProviderSelectorPort, RateLimiterPort, WeatherBundle, WeatherProviderPort,
    WeatherServicePort,
};

/// Caller id charged by the orchestrator's rate limiter
pub const DEFAULT_CALLER_ID: &str = "global";

/// Longest forecast window accepted
pub const MAX_FORECAST_DAYS: u8 = 16;

/// Priority-ordered fallback over a fixed provider set
pub struct WeatherOrchestrator {
    providers: Vec<Arc<dyn WeatherProviderPort>>,
    fallback: Arc<dyn WeatherProviderPort>,
    selector: Arc<dyn ProviderSelectorPort>,
    rate_limiter: Arc<dyn RateLimiterPort>,
    caller_id: String,
}

impl fmt::Debug for WeatherOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherOrchestrator")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("fallback", &self.fallback.name())
            .field("caller_id", &self.caller_id)
            .finish_non_exhaustive()
    }
}

impl WeatherOrchestrator {
    /// Create an orchestrator; `providers` is the registration order
    #[must_use]
    pub fn new(
        providers: Vec<Arc<dyn WeatherProviderPort>>,
        fallback: Arc<dyn WeatherProviderPort>,
        selector: Arc<dyn ProviderSelectorPort>,
        rate_limiter: Arc<dyn RateLimiterPort>,
    ) -> Self {
        Self {
            providers,
            fallback,
            selector,
            rate_limiter,
            caller_id: DEFAULT_CALLER_ID.to_string(),
        }
    }

    /// Charge requests to a different caller id
    #[must_use]
    pub fn with_caller_id(mut self, caller_id: impl Into<String>) -> Self {
        self.caller_id = caller_id.into();
        self
    }

    /// Registered providers, in registration order
    #[must_use]
    pub fn providers(&self) -> &[Arc<dyn WeatherProviderPort>] {
        &self.providers
    }

    fn admit(&self, operation: &'static str) -> Result<(), ApplicationError> {
        if self.rate_limiter.allowed(&self.caller_id) {
            Ok(())
        } else {
            warn!(operation, caller_id = %self.caller_id, "Request rate limited");
            Err(ApplicationError::RateLimited)
        }
    }

    async fn execute<T, F, Fut>(
        &self,
        operation: &'static str,
        cancel: &CancellationToken,
        call: F,
    ) -> Result<T, ApplicationError>
    where
        F: Fn(Arc<dyn WeatherProviderPort>) -> Fut,
        Fut: Future<Output = Result<T, ApplicationError>>,
    {
        for provider in self.selector.select(&self.providers) {
            let name = provider.name().to_string();
            match guarded(cancel, call(provider)).await {
                Ok(value) => {
                    debug!(operation, provider = %name, "Provider answered");
                    return Ok(value);
                },
                Err(e) if e.is_provider_failure() => {
                    warn!(operation, provider = %name, error = %e, "Provider failed, trying next");
                },
                Err(e) => return Err(e),
            }
        }

        let fallback = Arc::clone(&self.fallback);
        warn!(
            operation,
            fallback = %fallback.name(),
            "All providers failed, using fallback provider"
        );
        match guarded(cancel, call(fallback)).await {
            Ok(value) => Ok(value),
            Err(ApplicationError::Cancelled) => Err(ApplicationError::Cancelled),
            Err(e) => {
                error!(operation, error = %e, "Fallback provider failed");
                Err(ApplicationError::AllProvidersExhausted {
                    source: Box::new(e),
                })
            },
        }
    }
}

/// Run a provider call unless or until `cancel` fires
async fn guarded<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = Result<T, ApplicationError>>,
) -> Result<T, ApplicationError> {
    if cancel.is_cancelled() {
        return Err(ApplicationError::Cancelled);
    }
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ApplicationError::Cancelled),
        result = call => result,
    }
}

fn check_window(days: u8) -> Result<(), ApplicationError> {
    if days == 0 || days > MAX_FORECAST_DAYS {
        return Err(DomainError::validation(format!(
            "forecast days must be between 1 and {MAX_FORECAST_DAYS}, got {days}"
        ))
        .into());
    }
    Ok(())
}

// Unmetered lookups; callers charge the limiter first.
impl WeatherOrchestrator {
    async fn current(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<WeatherInfo, ApplicationError> {
        self.execute("current_weather", cancel, |provider| {
            let location = location.clone();
            let cancel = cancel.clone();
            async move { provider.get_current_weather(&location, &cancel).await }
        })
        .await
    }

    async fn forecast(
        &self,
        location: &Location,
        days: u8,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherForecast>, ApplicationError> {
        self.execute("forecast", cancel, |provider| {
            let location = location.clone();
            let cancel = cancel.clone();
            async move { provider.get_forecast(&location, days, &cancel).await }
        })
        .await
    }

    async fn alerts(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherAlert>, ApplicationError> {
        self.execute("alerts", cancel, |provider| {
            let location = location.clone();
            let cancel = cancel.clone();
            async move { provider.get_alerts(&location, &cancel).await }
        })
        .await
    }
}

#[async_trait]
impl WeatherServicePort for WeatherOrchestrator {
    async fn get_current_weather(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<WeatherInfo, ApplicationError> {
        self.admit("current_weather")?;
        self.current(location, cancel).await
    }

    async fn get_forecast(
        &self,
        location: &Location,
        days: u8,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherForecast>, ApplicationError> {
        check_window(days)?;
        self.admit("forecast")?;
        self.forecast(location, days, cancel).await
    }

    async fn get_alerts(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherAlert>, ApplicationError> {
        self.admit("alerts")?;
        self.alerts(location, cancel).await
    }

    async fn get_bundle(
        &self,
        location: &Location,
        days: u8,
        cancel: &CancellationToken,
    ) -> Result<WeatherBundle, ApplicationError> {
        check_window(days)?;
        self.admit("bundle")?;
        let (current, forecasts, alerts) = tokio::try_join!(
            self.current(location, cancel),
            self.forecast(location, days, cancel),
            self.alerts(location, cancel),
        )?;
        Ok(WeatherBundle {
            current,
            forecasts,
            alerts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockRateLimiterPort;
    use crate::services::{PriorityProviderSelector, PriorityTable};
    use crate::testing::{Outcome, ScriptedProvider, london};
    use domain::DataSource;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    struct Fixture {
        providers: Vec<Arc<ScriptedProvider>>,
        fallback: Arc<ScriptedProvider>,
        orchestrator: WeatherOrchestrator,
    }

    fn allow_all() -> MockRateLimiterPort {
        let mut limiter = MockRateLimiterPort::new();
        limiter.expect_allowed().return_const(true);
        limiter
    }

    /// Providers named p1, p2, ... with the given priorities and outcomes
    fn fixture(
        specs: &[(u32, Outcome)],
        fallback: Outcome,
        limiter: MockRateLimiterPort,
    ) -> Fixture {
        let providers: Vec<_> = specs
            .iter()
            .enumerate()
            .map(|(i, (_, outcome))| Arc::new(ScriptedProvider::new(&format!("p{}", i + 1), *outcome)))
            .collect();
        let table = PriorityTable::new(
            specs
                .iter()
                .enumerate()
                .map(|(i, (priority, _))| (format!("p{}", i + 1), *priority)),
        );
        let fallback = Arc::new(ScriptedProvider::new("fallback", fallback));

        let orchestrator = WeatherOrchestrator::new(
            providers
                .iter()
                .map(|p| Arc::clone(p) as Arc<dyn WeatherProviderPort>)
                .collect(),
            Arc::clone(&fallback) as Arc<dyn WeatherProviderPort>,
            Arc::new(PriorityProviderSelector::new(table)),
            Arc::new(limiter),
        );

        Fixture {
            providers,
            fallback,
            orchestrator,
        }
    }

    fn calls(fx: &Fixture) -> Vec<usize> {
        fx.providers.iter().map(|p| p.calls()).collect()
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let fx = fixture(
            &[(1, Outcome::Temperature(11.0)), (2, Outcome::Temperature(22.0))],
            Outcome::Temperature(20.0),
            allow_all(),
        );

        let info = assert_ok!(
            fx.orchestrator
                .get_current_weather(&london(), &CancellationToken::new())
                .await
        );
        assert!((info.temperature_c() - 11.0).abs() < f64::EPSILON);
        assert_eq!(calls(&fx), [1, 0]);
        assert_eq!(fx.fallback.calls(), 0);
    }

    #[tokio::test]
    async fn falls_through_failing_providers_in_priority_order() {
        // Registered out of order: p1 has priority 3, p2 priority 1, p3 priority 2.
        let fx = fixture(
            &[
                (3, Outcome::Temperature(10.0)),
                (1, Outcome::Transient),
                (2, Outcome::Permanent),
            ],
            Outcome::Temperature(20.0),
            allow_all(),
        );

        let info = fx
            .orchestrator
            .get_current_weather(&london(), &CancellationToken::new())
            .await
            .unwrap();

        assert!((info.temperature_c() - 10.0).abs() < f64::EPSILON);
        assert_eq!(info.source(), &DataSource::Provider("p1".into()));
        assert_eq!(calls(&fx), [1, 1, 1]);
        assert_eq!(fx.fallback.calls(), 0);
    }

    #[tokio::test]
    async fn all_failing_uses_fallback() {
        let fx = fixture(
            &[(1, Outcome::Transient), (2, Outcome::Permanent)],
            Outcome::Temperature(20.0),
            allow_all(),
        );

        let forecasts = fx
            .orchestrator
            .get_forecast(&london(), 3, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(forecasts.len(), 3);
        assert_eq!(calls(&fx), [1, 1]);
        assert_eq!(fx.fallback.calls(), 1);
    }

    #[tokio::test]
    async fn fallback_failure_is_exhaustion() {
        let fx = fixture(
            &[(1, Outcome::Transient)],
            Outcome::Transient,
            allow_all(),
        );

        let err = assert_err!(
            fx.orchestrator
                .get_alerts(&london(), &CancellationToken::new())
                .await
        );
        assert!(matches!(err, ApplicationError::AllProvidersExhausted { .. }));
        assert_eq!(err.to_string(), "no data from fallback provider");
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string),
            Some("provider 'fallback' transient failure: HTTP 503".to_string())
        );
    }

    #[tokio::test]
    async fn rate_limited_before_any_provider() {
        let mut limiter = MockRateLimiterPort::new();
        limiter
            .expect_allowed()
            .withf(|caller| caller == DEFAULT_CALLER_ID)
            .times(1)
            .return_const(false);
        let fx = fixture(
            &[(1, Outcome::Temperature(10.0))],
            Outcome::Temperature(20.0),
            limiter,
        );

        let err = fx
            .orchestrator
            .get_current_weather(&london(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::RateLimited));
        assert_eq!(calls(&fx), [0]);
        assert_eq!(fx.fallback.calls(), 0);
    }

    #[tokio::test]
    async fn custom_caller_id_is_charged() {
        let mut limiter = MockRateLimiterPort::new();
        limiter
            .expect_allowed()
            .withf(|caller| caller == "tenant-7")
            .times(1)
            .return_const(true);
        let fx = fixture(&[(1, Outcome::Temperature(5.0))], Outcome::Temperature(20.0), limiter);
        let orchestrator = fx.orchestrator.with_caller_id("tenant-7");

        assert!(
            orchestrator
                .get_current_weather(&london(), &CancellationToken::new())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn internal_errors_propagate_without_fallback() {
        let fx = fixture(
            &[(1, Outcome::Internal), (2, Outcome::Temperature(10.0))],
            Outcome::Temperature(20.0),
            allow_all(),
        );

        let err = fx
            .orchestrator
            .get_current_weather(&london(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Internal(_)));
        assert_eq!(calls(&fx), [1, 0]);
        assert_eq!(fx.fallback.calls(), 0);
    }

    #[tokio::test]
    async fn validation_errors_propagate() {
        let fx = fixture(
            &[(1, Outcome::Invalid), (2, Outcome::Temperature(10.0))],
            Outcome::Temperature(20.0),
            allow_all(),
        );

        let err = fx
            .orchestrator
            .get_current_weather(&london(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Domain(_)));
        assert_eq!(calls(&fx), [1, 0]);
    }

    #[tokio::test]
    async fn cancellation_aborts_hanging_provider() {
        let fx = fixture(
            &[(1, Outcome::Hang), (2, Outcome::Temperature(10.0))],
            Outcome::Temperature(20.0),
            allow_all(),
        );
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = fx
            .orchestrator
            .get_current_weather(&london(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Cancelled));
        assert_eq!(calls(&fx), [1, 0]);
        assert_eq!(fx.fallback.calls(), 0);
    }

    #[tokio::test]
    async fn already_cancelled_calls_nobody() {
        let fx = fixture(
            &[(1, Outcome::Temperature(10.0))],
            Outcome::Temperature(20.0),
            allow_all(),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = fx
            .orchestrator
            .get_forecast(&london(), 2, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Cancelled));
        assert_eq!(calls(&fx), [0]);
    }

    #[tokio::test]
    async fn forecast_window_is_validated() {
        let fx = fixture(
            &[(1, Outcome::Temperature(10.0))],
            Outcome::Temperature(20.0),
            allow_all(),
        );

        for days in [0, MAX_FORECAST_DAYS + 1] {
            let err = fx
                .orchestrator
                .get_forecast(&london(), days, &CancellationToken::new())
                .await
                .unwrap_err();
            assert!(matches!(err, ApplicationError::Domain(_)));
        }
        assert_eq!(calls(&fx), [0]);
    }

    #[tokio::test]
    async fn empty_provider_set_goes_straight_to_fallback() {
        let fx = fixture(&[], Outcome::Temperature(20.0), allow_all());

        let info = fx
            .orchestrator
            .get_current_weather(&london(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(info.source(), &DataSource::Provider("fallback".into()));
        assert_eq!(fx.fallback.calls(), 1);
    }

    #[tokio::test]
    async fn bundle_is_charged_once() {
        let mut limiter = MockRateLimiterPort::new();
        limiter.expect_allowed().times(1).return_const(true);
        let fx = fixture(
            &[(1, Outcome::Temperature(14.0))],
            Outcome::Temperature(20.0),
            limiter,
        );

        let bundle = fx
            .orchestrator
            .get_bundle(&london(), 2, &CancellationToken::new())
            .await
            .unwrap();
        assert!((bundle.current.temperature_c() - 14.0).abs() < f64::EPSILON);
        assert_eq!(bundle.forecasts.len(), 2);
        assert!(bundle.alerts.is_empty());
        assert_eq!(calls(&fx), [3]);
    }

    #[tokio::test]
    async fn denied_bundle_calls_nobody() {
        let mut limiter = MockRateLimiterPort::new();
        limiter.expect_allowed().times(1).return_const(false);
        let fx = fixture(
            &[(1, Outcome::Temperature(14.0))],
            Outcome::Temperature(20.0),
            limiter,
        );

        let err = fx
            .orchestrator
            .get_bundle(&london(), 2, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::RateLimited));
        assert_eq!(calls(&fx), [0]);
        assert_eq!(fx.fallback.calls(), 0);
    }

    #[tokio::test]
    async fn bundle_window_is_validated_before_charging() {
        let mut limiter = MockRateLimiterPort::new();
        limiter.expect_allowed().times(0);
        let fx = fixture(
            &[(1, Outcome::Temperature(14.0))],
            Outcome::Temperature(20.0),
            limiter,
        );

        let err = fx
            .orchestrator
            .get_bundle(&london(), 0, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Domain(_)));
    }

    #[test]
    fn debug_lists_provider_names() {
        let fx = fixture(
            &[(1, Outcome::Transient), (2, Outcome::Transient)],
            Outcome::Temperature(20.0),
            allow_all(),
        );
        let debug = format!("{:?}", fx.orchestrator);
        assert!(debug.contains("p1"));
        assert!(debug.contains("fallback"));
    }
}
