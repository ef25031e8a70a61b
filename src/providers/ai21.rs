use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::common;
use crate::core::error::Result;
use crate::core::outcome::ValidationOutcome;
use crate::core::traits::{ApiKeyProvider, ProviderDescriptor};
use crate::core::types::{ApiType, ProviderCategory};
use crate::utils::HttpResponse;

lazy_static! {
    // AI21 keys have no unique prefix; the pattern list is empty on purpose
    // and the provider is scraper-inert by construction.
    static ref PATTERNS: Vec<Regex> = Vec::new();
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "AI21",
    api_type: ApiType::Ai21,
    category: ProviderCategory::AiLlm,
    scraper_use: false,
    verification_use: false,
    display_in_ui: false,
    scraper_disabled_reason: Some("Generic 40-80 char shape matches too many non-AI21 strings"),
    verification_disabled_reason: Some("CDN IP-based rate limiting blocks validation"),
    hidden_from_ui_reason: Some("Cannot reliably scrape or validate AI21 keys"),
};

pub struct Ai21Provider;

impl Ai21Provider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Ai21Provider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for Ai21Provider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        !candidate.is_empty()
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
    fn test_scraper_inert_by_construction() {
        let provider = Ai21Provider::new();
        assert!(provider.patterns().is_empty());
        assert!(!provider.descriptor().scraper_use);
        assert!(!provider.descriptor().verification_use);
    }
}
