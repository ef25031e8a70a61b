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
        // Azure OpenAI keys are 32-character hex strings
        Regex::new(r"\b[a-fA-F0-9]{32}\b").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Azure OpenAI",
    api_type: ApiType::AzureOpenAi,
    category: ProviderCategory::AiLlm,
    scraper_use: true,
    verification_use: false,
    display_in_ui: false,
    scraper_disabled_reason: None,
    verification_disabled_reason: Some(
        "Requires the Azure resource endpoint URL (https://{resource}.openai.azure.com/)",
    ),
    hidden_from_ui_reason: Some("Keys cannot be validated without the resource endpoint"),
};

/// Unverifiable by design: the key alone does not identify the Azure resource
/// to call, and guessing one would report working keys as Unauthorized.
pub struct AzureOpenAiProvider;

impl AzureOpenAiProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AzureOpenAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for AzureOpenAiProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        // The pattern is deliberately broad; require real key entropy and
        // reject strings that are likelier checksums than credentials.
        candidate.len() == 32
            && PatternUtils::is_hex(candidate)
            && PatternUtils::has_min_entropy(candidate, 3.0)
    }

    fn classify(&self, _response: &HttpResponse) -> ValidationOutcome {
        common::unverifiable(&DESCRIPTOR)
    }

    async fn validate(&self, _api_key: &str) -> Result<ValidationOutcome> {
        Ok(common::unverifiable(&DESCRIPTOR))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["AZURE_OPENAI_API_KEY".to_string(), "AZURE_OPENAI_KEY".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::OutcomeKind;

    #[test]
    fn test_format_requires_entropy() {
        let provider = AzureOpenAiProvider::new();
        assert!(provider.is_plausible_format("f3a91bc04de2785f61b20cd94ae07d13"));
        // A placeholder of repeated characters matches the regex but not the check.
        assert!(!provider.is_plausible_format("00000000000000000000000000000000"));
        assert!(!provider.is_plausible_format("f3a91bc04de2785f"));
    }

    #[tokio::test]
    async fn test_validate_is_defensive_no_op() {
        let provider = AzureOpenAiProvider::new();
        let outcome = provider.validate("f3a91bc04de2785f61b20cd94ae07d13").await.unwrap();
        assert_eq!(outcome.kind, OutcomeKind::ProviderSpecificError);
    }
}
