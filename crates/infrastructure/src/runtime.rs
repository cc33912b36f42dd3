//! Runtime wiring
//!
//! Builds the full stack from one configuration snapshot:
//! vendor adapters (each wrapped in a logging decorator), the fallback
//! provider, the priority selector, the token bucket limiter, the
//! orchestrator behind a logging decorator and the cached
//! `LocationWeatherService`.
//!
//! The provider set and the limiter and cache settings are fixed at startup.
//! Background work (config reload, idle bucket cleanup) is started
//! explicitly and stops with the shutdown token.
//! Reloads rebuild the HTTP clients and replace the priority table; adapters
//! look their client up per call, so a changed base URL is used by the next
//! request.

use std::path::Path;
use std::sync::Arc;

use application::{
    ApplicationError, CacheStats, LocationWeatherCachePort, LocationWeatherService,
    PriorityProviderSelector, ProviderSelectorPort, RateLimiterPort, WeatherOrchestrator,
    WeatherProviderPort, WeatherServicePort,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::adapters::{
    FallbackWeatherProvider, LoggingWeatherProvider, LoggingWeatherService, OpenWeatherAdapter,
    WeatherApiAdapter,
};
use crate::cache::MokaLocationWeatherCache;
use crate::config::{AppConfig, ProviderKind, ReloadableConfig};
use crate::http::ProviderClientFactory;
use crate::rate_limit::{CLEANUP_INTERVAL, IDLE_BUCKET_TTL, TokenBucketRateLimiter};

/// Fully wired weather stack
pub struct WeatherRuntime {
    config: ReloadableConfig,
    clients: Arc<ProviderClientFactory>,
    selector: Arc<PriorityProviderSelector>,
    rate_limiter: Arc<TokenBucketRateLimiter>,
    cache: Arc<MokaLocationWeatherCache>,
    service: Arc<dyn WeatherServicePort>,
    location_weather: Arc<LocationWeatherService>,
    provider_names: Vec<String>,
}

impl std::fmt::Debug for WeatherRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherRuntime")
            .field("providers", &self.provider_names)
            .field("config_version", &self.config.version())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl WeatherRuntime {
    /// Load and validate `path` (or `config.*` plus environment) and build
    pub fn from_path(path: Option<&Path>) -> Result<Self, ApplicationError> {
        let config = AppConfig::load_validated(path)?;
        let reloadable = match path {
            Some(path) => ReloadableConfig::new(config).with_path(path),
            None => ReloadableConfig::new(config),
        };
        Self::new(reloadable)
    }

    /// Build from the current snapshot of `config`
    pub fn new(config: ReloadableConfig) -> Result<Self, ApplicationError> {
        let snapshot = config.load();
        snapshot.validate()?;

        let clients = Arc::new(ProviderClientFactory::new(&snapshot)?);
        let selector = Arc::new(PriorityProviderSelector::new(snapshot.priority_table()));
        let rate_limiter = Arc::new(TokenBucketRateLimiter::from_config(&snapshot.rate_limit));
        let cache = Arc::new(MokaLocationWeatherCache::from_config(&snapshot.cache));

        let providers = Self::build_providers(&snapshot, &clients)?;
        let provider_names = providers.iter().map(|p| p.name().to_string()).collect();

        let orchestrator = WeatherOrchestrator::new(
            providers,
            Arc::new(FallbackWeatherProvider::new()),
            Arc::clone(&selector) as Arc<dyn ProviderSelectorPort>,
            Arc::clone(&rate_limiter) as Arc<dyn RateLimiterPort>,
        )
        .with_caller_id(snapshot.rate_limit.caller_id.clone());

        let service: Arc<dyn WeatherServicePort> =
            Arc::new(LoggingWeatherService::new(Arc::new(orchestrator)));
        let location_weather = Arc::new(LocationWeatherService::new(
            Arc::clone(&service),
            Arc::clone(&cache) as Arc<dyn LocationWeatherCachePort>,
        ));

        info!(providers = ?provider_names, "Weather runtime ready");
        Ok(Self {
            config,
            clients,
            selector,
            rate_limiter,
            cache,
            service,
            location_weather,
            provider_names,
        })
    }

    fn build_providers(
        config: &AppConfig,
        clients: &Arc<ProviderClientFactory>,
    ) -> Result<Vec<Arc<dyn WeatherProviderPort>>, ApplicationError> {
        config
            .providers
            .keys()
            .map(|name| {
                let adapter: Arc<dyn WeatherProviderPort> = match ProviderKind::from_name(name) {
                    Some(ProviderKind::OpenWeather) => {
                        Arc::new(OpenWeatherAdapter::new(name.clone(), Arc::clone(clients)))
                    },
                    Some(ProviderKind::WeatherApi) => {
                        Arc::new(WeatherApiAdapter::new(name.clone(), Arc::clone(clients)))
                    },
                    None => {
                        return Err(ApplicationError::Configuration(format!(
                            "provider '{name}' has no adapter"
                        )));
                    },
                };
                Ok(Arc::new(LoggingWeatherProvider::new(adapter)) as Arc<dyn WeatherProviderPort>)
            })
            .collect()
    }

    /// Apply a new snapshot to the reloadable parts
    ///
    /// On error nothing changes.
    pub fn apply(&self, snapshot: &AppConfig) -> Result<(), ApplicationError> {
        snapshot.validate()?;
        self.clients.rebuild(snapshot)?;
        self.selector.update(snapshot.priority_table());
        debug!(providers = snapshot.providers.len(), "Runtime applied new configuration");
        Ok(())
    }

    /// Apply every new configuration version until `shutdown` fires
    pub fn spawn_reload_watcher(
        self: &Arc<Self>,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let runtime = Arc::clone(self);
        let mut versions = self.config.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    changed = versions.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let version = *versions.borrow_and_update();
                        let snapshot = runtime.config.load();
                        match runtime.apply(&snapshot) {
                            Ok(()) => info!(version, "Runtime reconfigured"),
                            Err(e) => error!(version, error = %e, "Failed to apply configuration"),
                        }
                    },
                }
            }
        })
    }

    /// Periodically drop idle rate limit buckets until `shutdown` fires
    pub fn spawn_rate_limit_cleanup(
        &self,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        self.rate_limiter
            .spawn_cleanup_task(CLEANUP_INTERVAL, IDLE_BUCKET_TTL, shutdown)
    }

    /// The orchestrated weather service (with logging)
    #[must_use]
    pub fn weather_service(&self) -> Arc<dyn WeatherServicePort> {
        Arc::clone(&self.service)
    }

    /// Cached combined lookups
    #[must_use]
    pub fn location_weather(&self) -> Arc<LocationWeatherService> {
        Arc::clone(&self.location_weather)
    }

    #[must_use]
    pub const fn config(&self) -> &ReloadableConfig {
        &self.config
    }

    #[must_use]
    pub fn clients(&self) -> &ProviderClientFactory {
        &self.clients
    }

    #[must_use]
    pub fn selector(&self) -> &PriorityProviderSelector {
        &self.selector
    }

    #[must_use]
    pub fn rate_limiter(&self) -> &TokenBucketRateLimiter {
        &self.rate_limiter
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Registered provider names in registration order
    #[must_use]
    pub fn provider_names(&self) -> &[String] {
        &self.provider_names
    }
}
