//! Test doubles shared by the service tests

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Days, Utc};
use domain::{DataSource, DomainError, Location, WeatherAlert, WeatherForecast, WeatherInfo};
use tokio_util::sync::CancellationToken;

use crate::error::ApplicationError;
use crate::ports::WeatherProviderPort;

/// What a scripted provider does on every call
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    /// Succeed with this temperature
    Temperature(f64),
    /// Fail with a transient error
    Transient,
    /// Fail with a permanent error
    Permanent,
    /// Fail with an internal (programming) error
    Internal,
    /// Fail with a domain validation error
    Invalid,
    /// Never complete
    Hang,
}

/// A provider whose behaviour is fixed up front and which counts calls
#[derive(Debug)]
pub struct ScriptedProvider {
    name: String,
    outcome: Outcome,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(name: &str, outcome: Outcome) -> Self {
        Self {
            name: name.to_string(),
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn run<T>(&self, ok: impl FnOnce(f64) -> T) -> Result<T, ApplicationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Temperature(t) => Ok(ok(t)),
            Outcome::Transient => Err(ApplicationError::transient(&self.name, "HTTP 503")),
            Outcome::Permanent => Err(ApplicationError::permanent(&self.name, "HTTP 404")),
            Outcome::Internal => Err(ApplicationError::Internal("unexpected state".into())),
            Outcome::Invalid => Err(DomainError::validation("humidity 140").into()),
            Outcome::Hang => std::future::pending().await,
        }
    }

    fn source(&self) -> DataSource {
        DataSource::Provider(self.name.clone())
    }
}

#[async_trait]
impl WeatherProviderPort for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_current_weather(
        &self,
        _location: &Location,
        _cancel: &CancellationToken,
    ) -> Result<WeatherInfo, ApplicationError> {
        let info = self
            .run(|t| WeatherInfo::new("scripted", t, t, 50))
            .await??;
        Ok(info.with_source(self.source()))
    }

    async fn get_forecast(
        &self,
        _location: &Location,
        days: u8,
        _cancel: &CancellationToken,
    ) -> Result<Vec<WeatherForecast>, ApplicationError> {
        let today = Utc::now().date_naive();
        let source = self.source();
        self.run(|t| {
            (0..u64::from(days))
                .map(|i| {
                    WeatherForecast::new(today + Days::new(i), "scripted", t)
                        .map(|f| f.with_source(source.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .await?
        .map_err(Into::into)
    }

    async fn get_alerts(
        &self,
        _location: &Location,
        _cancel: &CancellationToken,
    ) -> Result<Vec<WeatherAlert>, ApplicationError> {
        self.run(|_| Vec::new()).await
    }
}

pub fn london() -> Location {
    Location::new("London", Some("GB")).unwrap()
}
