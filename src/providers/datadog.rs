use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::common;
use crate::core::error::Result;
use crate::core::outcome::ValidationOutcome;
use crate::core::traits::{ApiKeyProvider, ProviderDescriptor};
use crate::core::types::{ApiType, ProviderCategory};
use crate::utils::{HttpResponse, PatternUtils};

lazy_static! {
    static ref PATTERNS: Vec<Regex> = vec![
        // API keys (32 hex) and application keys (40 hex). Both shapes are
        // generic; the provider is retired via capability flags instead.
        Regex::new(r"\b[a-f0-9]{32}\b").unwrap(),
        Regex::new(r"\b[a-f0-9]{40}\b").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Datadog",
    api_type: ApiType::Datadog,
    category: ProviderCategory::Monitoring,
    scraper_use: false,
    verification_use: false,
    display_in_ui: false,
    scraper_disabled_reason: Some("Bare hex shapes drown the store in checksum false positives"),
    verification_disabled_reason: Some("Validation needs the paired application key and site"),
    hidden_from_ui_reason: Some("Provider retired"),
};

pub struct DatadogProvider;

impl DatadogProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DatadogProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for DatadogProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        (candidate.len() == 32 || candidate.len() == 40)
            && PatternUtils::is_hex(candidate)
            && PatternUtils::has_min_entropy(candidate, 3.0)
    }

    fn classify(&self, _response: &HttpResponse) -> ValidationOutcome {
        common::unverifiable(&DESCRIPTOR)
    }

    async fn validate(&self, _api_key: &str) -> Result<ValidationOutcome> {
        Ok(common::unverifiable(&DESCRIPTOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retired_via_capability_flags() {
        let provider = DatadogProvider::new();
        assert!(!provider.descriptor().scraper_use);
        assert!(!provider.descriptor().verification_use);
        // Patterns are retained but inert while the flags are off.
        assert!(!provider.patterns().is_empty());
    }
}
