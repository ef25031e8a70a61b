//! Central lookup from credential type to provider implementation.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::core::traits::ApiKeyProvider;
use crate::core::types::ApiType;
use crate::providers;

/// Immutable provider set, built once at startup. Both engines dispatch
/// through it; neither ever constructs a provider directly.
pub struct ProviderRegistry {
    providers: HashMap<ApiType, Arc<dyn ApiKeyProvider>>,
    /// Registration order, kept so listings are stable.
    order: Vec<ApiType>,
}

impl ProviderRegistry {
    /// Registry over the full built-in provider set.
    pub fn with_builtins() -> Self {
        Self::from_providers(providers::all_providers())
    }

    pub fn from_providers(list: Vec<Arc<dyn ApiKeyProvider>>) -> Self {
        let mut providers = HashMap::new();
        let mut order = Vec::new();
        for provider in list {
            let api_type = provider.descriptor().api_type;
            debug!(provider = provider.descriptor().name, "registering provider");
            if providers.insert(api_type, provider).is_none() {
                order.push(api_type);
            }
        }
        Self { providers, order }
    }

    pub fn get(&self, api_type: ApiType) -> Option<&Arc<dyn ApiKeyProvider>> {
        self.providers.get(&api_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ApiKeyProvider>> {
        self.order.iter().filter_map(|t| self.providers.get(t))
    }

    /// Providers the extraction engine mines for.
    pub fn scraper_providers(&self) -> Vec<&Arc<dyn ApiKeyProvider>> {
        self.iter().filter(|p| p.descriptor().scraper_use).collect()
    }

    /// Providers the verification engine can probe.
    pub fn verifier_providers(&self) -> Vec<&Arc<dyn ApiKeyProvider>> {
        self.iter().filter(|p| p.descriptor().verification_use).collect()
    }

    /// Types eligible for claim passes.
    pub fn verifiable_types(&self) -> Vec<ApiType> {
        self.verifier_providers()
            .iter()
            .map(|p| p.descriptor().api_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::OutcomeKind;
    use crate::utils::HttpResponse;

    #[test]
    fn test_builtin_registry_is_complete() {
        let registry = ProviderRegistry::with_builtins();
        assert_eq!(registry.len(), 26);
        assert!(registry.get(ApiType::OpenAi).is_some());
        assert!(registry.get(ApiType::Mapbox).is_some());
    }

    #[test]
    fn test_capability_filters() {
        let registry = ProviderRegistry::with_builtins();
        let scrapers = registry.scraper_providers();
        let verifiers = registry.verifier_providers();

        assert!(scrapers.iter().all(|p| p.descriptor().scraper_use));
        assert!(verifiers.iter().all(|p| p.descriptor().verification_use));
        // Some providers are deliberately out of each set.
        assert!(scrapers.len() < registry.len());
        assert!(verifiers.len() < registry.len());
    }

    #[test]
    fn test_no_provider_rejects_on_rate_limit() {
        // HTTP 429 proves the credential authenticated before being
        // throttled; no classification may turn it into a rejection.
        let registry = ProviderRegistry::with_builtins();
        let resp = HttpResponse::synthetic(429, &[], "rate limited");
        for provider in registry.iter() {
            let outcome = provider.classify(&resp);
            assert!(
                !matches!(outcome.kind, OutcomeKind::Unauthorized),
                "{} rejected a rate-limited response",
                provider.descriptor().name
            );
        }
    }

    #[test]
    fn test_stable_iteration_order() {
        let registry = ProviderRegistry::with_builtins();
        let first: Vec<_> = registry.iter().map(|p| p.descriptor().api_type).collect();
        let second: Vec<_> = registry.iter().map(|p| p.descriptor().api_type).collect();
        assert_eq!(first, second);
    }
}
