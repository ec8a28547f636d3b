//! Adapter registry for runtime provider lookup.
//!
//! Holds at most one adapter per [`ProviderId`] together with the dispatch
//! settings derived from that provider's configuration. Built once at
//! startup and read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parley_types::config::ProviderConfig;
use parley_types::llm::ProviderId;

use super::box_provider::BoxProviderAdapter;

/// Per-provider limits applied by the dispatch orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Independent deadline for one call to this provider.
    pub timeout: Duration,
    /// Maximum output tokens requested from this provider.
    pub token_ceiling: u32,
}

impl From<&ProviderConfig> for DispatchSettings {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            timeout: config.timeout(),
            token_ceiling: config.max_tokens,
        }
    }
}

/// An adapter plus the limits it runs under.
#[derive(Debug, Clone)]
pub struct RegisteredAdapter {
    pub adapter: Arc<BoxProviderAdapter>,
    pub settings: DispatchSettings,
}

/// Registry of configured adapters, indexed by provider.
///
/// A provider is "configured" exactly when it has an entry here; providers
/// whose credentials could not be resolved are never registered.
#[derive(Debug, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<ProviderId, RegisteredAdapter>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own provider id.
    ///
    /// If an adapter for this provider already exists, it is replaced.
    pub fn register(&mut self, adapter: BoxProviderAdapter, settings: DispatchSettings) {
        let id = adapter.id();
        self.adapters.insert(
            id,
            RegisteredAdapter {
                adapter: Arc::new(adapter),
                settings,
            },
        );
    }

    pub fn get(&self, id: ProviderId) -> Option<&RegisteredAdapter> {
        self.adapters.get(&id)
    }

    pub fn contains(&self, id: ProviderId) -> bool {
        self.adapters.contains_key(&id)
    }

    /// Configured providers in canonical order.
    pub fn ids(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.adapters.contains_key(id))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockAdapter;

    fn settings() -> DispatchSettings {
        DispatchSettings {
            timeout: Duration::from_secs(5),
            token_ceiling: 300,
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = AdapterRegistry::new();
        assert!(registry.is_empty());

        registry.register(
            BoxProviderAdapter::new(MockAdapter::text(ProviderId::Anthropic, "hi")),
            settings(),
        );

        assert!(registry.contains(ProviderId::Anthropic));
        assert!(!registry.contains(ProviderId::OpenAi));
        let entry = registry.get(ProviderId::Anthropic).unwrap();
        assert_eq!(entry.adapter.id(), ProviderId::Anthropic);
        assert_eq!(entry.settings.token_ceiling, 300);
    }

    #[test]
    fn test_ids_in_canonical_order() {
        let mut registry = AdapterRegistry::new();
        registry.register(
            BoxProviderAdapter::new(MockAdapter::image(ProviderId::ImageGen, "https://img")),
            settings(),
        );
        registry.register(
            BoxProviderAdapter::new(MockAdapter::text(ProviderId::OpenAi, "a")),
            settings(),
        );
        assert_eq!(registry.ids(), vec![ProviderId::OpenAi, ProviderId::ImageGen]);
    }

    #[test]
    fn test_settings_from_config() {
        let config = ProviderConfig::defaults_for(ProviderId::ImageGen);
        let settings = DispatchSettings::from(&config);
        assert_eq!(settings.timeout, Duration::from_secs(120));
        assert_eq!(settings.token_ceiling, 0);
    }
}
