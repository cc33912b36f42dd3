//! Provider selection port

use std::sync::Arc;

use super::WeatherProviderPort;

/// Orders providers into the sequence the orchestrator tries them in
pub trait ProviderSelectorPort: Send + Sync {
    /// Return `providers` in attempt order
    fn select(
        &self,
        providers: &[Arc<dyn WeatherProviderPort>],
    ) -> Vec<Arc<dyn WeatherProviderPort>>;
}
