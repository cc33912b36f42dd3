//! Priority-based provider selection

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use crate::ports::{ProviderSelectorPort, WeatherProviderPort};

/// Configured priority per provider name (lower is tried first)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityTable {
    priorities: HashMap<String, u32>,
}

impl PriorityTable {
    /// Build a table from `(name, priority)` pairs
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self {
            priorities: entries
                .into_iter()
                .map(|(name, priority)| (name.into(), priority))
                .collect(),
        }
    }

    /// Priority of a provider, if configured
    #[must_use]
    pub fn priority(&self, name: &str) -> Option<u32> {
        self.priorities.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.priorities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.priorities.is_empty()
    }
}

/// Order providers ascending by priority
///
/// The sort is stable, so equal priorities keep registration order.
/// Providers missing from the table go last.
#[must_use]
pub fn order_by_priority(
    table: &PriorityTable,
    providers: &[Arc<dyn WeatherProviderPort>],
) -> Vec<Arc<dyn WeatherProviderPort>> {
    let mut ordered = providers.to_vec();
    ordered.sort_by_key(|p| table.priority(p.name()).unwrap_or(u32::MAX));
    ordered
}

/// Selector reading a hot-swappable priority table
///
/// Each `select` call loads one snapshot, so a reload never reorders a
/// request that is already in flight.
#[derive(Debug)]
pub struct PriorityProviderSelector {
    table: ArcSwap<PriorityTable>,
}

impl PriorityProviderSelector {
    #[must_use]
    pub fn new(table: PriorityTable) -> Self {
        Self {
            table: ArcSwap::from_pointee(table),
        }
    }

    /// Replace the priority table
    pub fn update(&self, table: PriorityTable) {
        debug!(providers = table.len(), "Provider priorities updated");
        self.table.store(Arc::new(table));
    }

    /// Current priority table
    #[must_use]
    pub fn table(&self) -> Arc<PriorityTable> {
        self.table.load_full()
    }
}

impl ProviderSelectorPort for PriorityProviderSelector {
    fn select(
        &self,
        providers: &[Arc<dyn WeatherProviderPort>],
    ) -> Vec<Arc<dyn WeatherProviderPort>> {
        order_by_priority(&self.table.load(), providers)
    }
}
