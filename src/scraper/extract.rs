//! Pattern extraction over search result text blobs.

use tracing::trace;

use crate::core::types::ApiType;
use crate::registry::ProviderRegistry;

/// One extracted credential occurrence, before storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extraction {
    pub api_type: ApiType,
    pub text: String,
}

/// Runs every scraper-enabled provider's patterns over text blobs. Matching
/// and the structural format check happen here; network never does.
pub struct ExtractionEngine<'a> {
    registry: &'a ProviderRegistry,
}

impl<'a> ExtractionEngine<'a> {
    pub fn new(registry: &'a ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Extract every plausible credential occurrence from one blob. Repeated
    /// occurrences of the same (type, text) pair each count; the store's
    /// uniqueness turns them into one row with a bumped found-count.
    pub fn extract(&self, blob: &str) -> Vec<Extraction> {
        let mut out = Vec::new();

        for provider in self.registry.scraper_providers() {
            let api_type = provider.descriptor().api_type;
            for pattern in provider.patterns() {
                for m in pattern.find_iter(blob) {
                    let text = m.as_str();
                    if !provider.is_plausible_format(text) {
                        trace!(api_type = %api_type, "match failed format check");
                        continue;
                    }
                    out.push(Extraction {
                        api_type,
                        text: text.to_string(),
                    });
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_fixture() -> ProviderRegistry {
        ProviderRegistry::with_builtins()
    }

    #[test]
    fn test_extracts_github_token_from_env_blob() {
        let registry = engine_fixture();
        let engine = ExtractionEngine::new(&registry);
        let blob = format!("GITHUB_TOKEN=ghp_{}\n", "a1B2".repeat(9));
        let found = engine.extract(&blob);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].api_type, ApiType::GitHub);
    }

    #[test]
    fn test_each_occurrence_counts() {
        let registry = engine_fixture();
        let engine = ExtractionEngine::new(&registry);
        let token = format!("ghp_{}", "a1B2".repeat(9));
        let blob = format!("{}\n{}\n{}\n", token, token, token);
        let found = engine.extract(&blob);
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|e| e.text == token));
    }

    #[test]
    fn test_mixed_blob_yields_occurrences_per_type() {
        let registry = engine_fixture();
        let engine = ExtractionEngine::new(&registry);
        let ghp = format!("ghp_{}", "a1B2".repeat(9));
        let glpat = format!("glpat-{}", "xY9z".repeat(5));
        let blob = format!("a={}\nb={}\nc={}\n", ghp, glpat, ghp);
        let found = engine.extract(&blob);
        assert_eq!(found.len(), 3);
        assert_eq!(
            found.iter().filter(|e| e.api_type == ApiType::GitHub).count(),
            2
        );
        assert_eq!(
            found.iter().filter(|e| e.api_type == ApiType::GitLab).count(),
            1
        );
    }

    #[test]
    fn test_retired_patterns_extract_nothing() {
        let registry = engine_fixture();
        let engine = ExtractionEngine::new(&registry);
        // Bare 64-hex was retired everywhere for matching SHA-256 hashes.
        let blob = format!("checksum={}\n", "ab".repeat(32));
        assert!(engine.extract(&blob).is_empty());
    }
}
