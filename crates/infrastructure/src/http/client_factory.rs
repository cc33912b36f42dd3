//! Provider HTTP clients and their factory
//!
//! Every configured provider gets one [`ProviderHttpClient`]: a `reqwest`
//! client bound to the provider's base URL and request timeout, its API key,
//! and a combined retry/circuit-breaker policy. The factory keeps the set in
//! an `ArcSwap`, so a config reload replaces it atomically while in-flight
//! requests finish on the clients they already hold.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use application::ApplicationError;
use arc_swap::ArcSwap;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::{AppConfig, ProviderConfig};
use crate::resilience::{CombinedPolicy, ResiliencePolicyFactory};

/// User agent sent with every provider request
pub const USER_AGENT: &str = concat!("weather-orchestrator/", env!("CARGO_PKG_VERSION"));

/// Resilience-wrapped HTTP client for one provider
pub struct ProviderHttpClient {
    name: String,
    base_url: String,
    client: Client,
    api_key: Option<SecretString>,
    policy: CombinedPolicy,
}

impl fmt::Debug for ProviderHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHttpClient")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("breaker", &self.policy.breaker().state())
            .finish_non_exhaustive()
    }
}

impl ProviderHttpClient {
    /// Build the client for one provider entry
    pub fn new(
        name: &str,
        provider: &ProviderConfig,
        policies: &ResiliencePolicyFactory,
        timeout: std::time::Duration,
    ) -> Result<Self, ApplicationError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                ApplicationError::Configuration(format!("HTTP client for '{name}': {e}"))
            })?;

        Ok(Self {
            name: name.to_string(),
            base_url: provider.base_url.trim().trim_end_matches('/').to_string(),
            client,
            api_key: provider.api_key_ref.as_deref().and_then(|var| resolve_key(name, var)),
            policy: policies.create_combined_policy(name),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The combined policy guarding this provider
    #[must_use]
    pub const fn policy(&self) -> &CombinedPolicy {
        &self.policy
    }

    /// Append the API key under the vendor's query parameter name
    pub fn attach_api_key(&self, param: &'static str, query: &mut Vec<(&'static str, String)>) {
        if let Some(key) = &self.api_key {
            query.push((param, key.expose_secret().to_string()));
        }
    }

    /// GET `path` and decode the JSON body, through retry and circuit breaker
    #[instrument(skip(self, query, cancel), fields(provider = %self.name))]
    pub async fn get_json<T>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        cancel: &CancellationToken,
    ) -> Result<T, ApplicationError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        self.policy
            .execute(cancel, || self.send_once(&url, query, cancel))
            .await
    }

    async fn send_once<T>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
        cancel: &CancellationToken,
    ) -> Result<T, ApplicationError>
    where
        T: DeserializeOwned,
    {
        let request = self.client.get(url).query(query).send();
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ApplicationError::Cancelled),
            response = request => response.map_err(|e| self.transport_error(e))?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status));
        }

        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ApplicationError::Cancelled),
            body = response.bytes() => body.map_err(|e| self.transport_error(e))?,
        };
        debug!(status = status.as_u16(), bytes = body.len(), "Provider responded");

        serde_json::from_slice(&body).map_err(|e| {
            ApplicationError::permanent(&self.name, format!("invalid response body: {e}"))
        })
    }

    /// Timeouts and connection problems are worth retrying; the URL (which
    /// carries the key) is stripped from the message.
    fn transport_error(&self, err: reqwest::Error) -> ApplicationError {
        let transient = err.is_timeout() || err.is_connect() || err.is_request() || err.is_body();
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.without_url().to_string()
        };
        if transient {
            ApplicationError::transient(&self.name, message)
        } else {
            ApplicationError::permanent(&self.name, message)
        }
    }

    fn status_error(&self, status: StatusCode) -> ApplicationError {
        match status {
            StatusCode::NOT_FOUND => ApplicationError::permanent(&self.name, "location not found"),
            StatusCode::TOO_MANY_REQUESTS => {
                ApplicationError::transient(&self.name, "HTTP 429 too many requests")
            },
            s if s.is_server_error() => {
                ApplicationError::transient(&self.name, format!("HTTP {}", s.as_u16()))
            },
            s => ApplicationError::permanent(&self.name, format!("HTTP {}", s.as_u16())),
        }
    }
}

fn resolve_key(provider: &str, env_var: &str) -> Option<SecretString> {
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Some(SecretString::from(value)),
        _ => {
            warn!(provider, env_var, "API key environment variable is not set");
            None
        },
    }
}

/// One immutable generation of clients
#[derive(Debug, Default)]
struct ClientSet {
    clients: HashMap<String, Arc<ProviderHttpClient>>,
    preferred: Option<String>,
}

impl ClientSet {
    fn build(config: &AppConfig) -> Result<Self, ApplicationError> {
        let policies = ResiliencePolicyFactory::new(&config.http_policies);
        let timeout = config.http_policies.request_timeout();

        let mut clients = HashMap::with_capacity(config.providers.len());
        for (name, provider) in &config.providers {
            let client = ProviderHttpClient::new(name, provider, &policies, timeout)?;
            clients.insert(name.clone(), Arc::new(client));
        }

        // BTreeMap order breaks priority ties by name; min_by_key keeps the first.
        let preferred = config
            .providers
            .iter()
            .min_by_key(|(_, provider)| provider.priority)
            .map(|(name, _)| name.clone());

        Ok(Self { clients, preferred })
    }
}

/// Cached provider clients, rebuilt on configuration reload
#[derive(Debug)]
pub struct ProviderClientFactory {
    current: ArcSwap<ClientSet>,
}

impl ProviderClientFactory {
    pub fn new(config: &AppConfig) -> Result<Self, ApplicationError> {
        let set = ClientSet::build(config)?;
        info!(providers = set.clients.len(), "Provider clients created");
        Ok(Self {
            current: ArcSwap::from_pointee(set),
        })
    }

    /// Client for a configured provider
    pub fn get_client(&self, name: &str) -> Result<Arc<ProviderHttpClient>, ApplicationError> {
        self.current
            .load()
            .clients
            .get(name)
            .cloned()
            .ok_or_else(|| ApplicationError::ProviderNotConfigured(name.to_string()))
    }

    /// Client of the provider with the lowest priority number
    pub fn get_preferred_client(&self) -> Result<Arc<ProviderHttpClient>, ApplicationError> {
        let set = self.current.load();
        set.preferred
            .as_ref()
            .and_then(|name| set.clients.get(name))
            .cloned()
            .ok_or_else(|| ApplicationError::ProviderNotConfigured("<none>".to_string()))
    }

    /// Replace every client (and breaker) from a new snapshot
    ///
    /// On error the previous clients stay in place.
    pub fn rebuild(&self, config: &AppConfig) -> Result<(), ApplicationError> {
        let set = ClientSet::build(config)?;
        info!(providers = set.clients.len(), "Provider clients rebuilt");
        self.current.store(Arc::new(set));
        Ok(())
    }

    /// Names of the providers in the current generation, sorted
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.current.load().clients.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    fn config(entries: &[(&str, &str, u32)]) -> AppConfig {
        let mut config = AppConfig::default();
        for (name, url, priority) in entries {
            config
                .providers
                .insert((*name).to_string(), ProviderConfig::new(*url, *priority));
        }
        config
    }

    #[test]
    fn unknown_provider_is_not_configured() {
        let factory =
            ProviderClientFactory::new(&config(&[("openweather", "https://a.example", 1)]))
                .unwrap();
        let err = factory.get_client("accuweather").unwrap_err();
        assert!(matches!(err, ApplicationError::ProviderNotConfigured(ref n) if n == "accuweather"));
    }

    #[test]
    fn client_is_cached() {
        let factory =
            ProviderClientFactory::new(&config(&[("openweather", "https://a.example/", 1)]))
                .unwrap();
        let a = factory.get_client("openweather").unwrap();
        let b = factory.get_client("openweather").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.base_url(), "https://a.example");
    }

    #[test]
    fn preferred_is_lowest_priority_with_name_tiebreak() {
        let factory = ProviderClientFactory::new(&config(&[
            ("weatherapi", "https://w.example", 1),
            ("openweather", "https://o.example", 1),
        ]))
        .unwrap();
        assert_eq!(factory.get_preferred_client().unwrap().name(), "openweather");

        let factory = ProviderClientFactory::new(&config(&[
            ("weatherapi", "https://w.example", 1),
            ("openweather", "https://o.example", 2),
        ]))
        .unwrap();
        assert_eq!(factory.get_preferred_client().unwrap().name(), "weatherapi");
    }

    #[test]
    fn empty_factory_has_no_preferred_client() {
        let factory = ProviderClientFactory::new(&AppConfig::default()).unwrap();
        assert!(factory.get_preferred_client().is_err());
        assert!(factory.provider_names().is_empty());
    }

    #[test]
    fn rebuild_swaps_clients_but_held_ones_stay_valid() {
        let factory =
            ProviderClientFactory::new(&config(&[("openweather", "https://old.example", 1)]))
                .unwrap();
        let held = factory.get_client("openweather").unwrap();

        factory
            .rebuild(&config(&[
                ("openweather", "https://new.example", 1),
                ("weatherapi", "https://w.example", 2),
            ]))
            .unwrap();

        assert_eq!(held.base_url(), "https://old.example");
        assert_eq!(
            factory.get_client("openweather").unwrap().base_url(),
            "https://new.example"
        );
        assert_eq!(factory.provider_names(), ["openweather", "weatherapi"]);
    }

    #[test]
    fn missing_key_variable_leaves_client_without_key() {
        let provider = ProviderConfig::new("https://a.example", 1)
            .with_api_key_ref("WEATHER_TEST_KEY_THAT_IS_NEVER_SET");
        let policies = ResiliencePolicyFactory::new(&Default::default());
        let client = ProviderHttpClient::new(
            "openweather",
            &provider,
            &policies,
            std::time::Duration::from_secs(1),
        )
        .unwrap();
        assert!(!client.has_api_key());

        let mut query = vec![("q", "London".to_string())];
        client.attach_api_key("appid", &mut query);
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn debug_redacts_key() {
        let factory =
            ProviderClientFactory::new(&config(&[("openweather", "https://a.example", 1)]))
                .unwrap();
        let debug = format!("{:?}", factory.get_client("openweather").unwrap());
        assert!(debug.contains("openweather"));
        assert!(debug.contains("closed"));
    }

    #[test]
    fn user_agent_names_the_crate_version() {
        assert!(USER_AGENT.starts_with("weather-orchestrator/"));
    }
}
