use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::common::{self, ClassifyRules};
use crate::core::error::Result;
use crate::core::outcome::ValidationOutcome;
use crate::core::traits::{ApiKeyProvider, ProviderDescriptor};
use crate::core::types::{ApiType, ProviderCategory};
use crate::utils::HttpResponse;

lazy_static! {
    static ref PATTERNS: Vec<Regex> = vec![
        Regex::new(r"xai-[a-zA-Z0-9]{20,80}").unwrap(),
        Regex::new(r"grok-[a-zA-Z0-9]{20,80}").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "xAI",
    api_type: ApiType::Xai,
    category: ProviderCategory::AiLlm,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

pub struct XaiProvider;

impl XaiProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for XaiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for XaiProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        (candidate.starts_with("xai-") || candidate.starts_with("grok-"))
            && candidate.len() >= 24
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        common::classify_with(response, &ClassifyRules::default())
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        // OpenAI-compatible API surface.
        let response = common::probe_get(
            "https://api.x.ai/v1/models".to_string(),
            vec![("Authorization".to_string(), format!("Bearer {}", api_key))],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["XAI_API_KEY".to_string(), "xai- extension:env".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::OutcomeKind;

    #[test]
    fn test_both_prefixes_accepted() {
        let provider = XaiProvider::new();
        assert!(provider.is_plausible_format(&format!("xai-{}", "a".repeat(30))));
        assert!(provider.is_plausible_format(&format!("grok-{}", "a".repeat(30))));
        assert!(!provider.is_plausible_format("xai-short"));
    }

    #[test]
    fn test_402_billing_wall_is_valid_no_credits() {
        let provider = XaiProvider::new();
        let resp = HttpResponse::synthetic(402, &[], "payment required");
        assert_eq!(provider.classify(&resp).kind, OutcomeKind::ValidNoCredits);
    }
}
