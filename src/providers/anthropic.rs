use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::common::{self, ClassifyRules, RateLimited};
use crate::core::error::Result;
use crate::core::outcome::ValidationOutcome;
use crate::core::traits::{ApiKeyProvider, ProviderDescriptor};
use crate::core::types::{ApiType, ProviderCategory};
use crate::utils::HttpResponse;

lazy_static! {
    static ref PATTERNS: Vec<Regex> = vec![
        Regex::new(r"sk-ant-api\d{2}-[A-Za-z0-9_-]{80,120}").unwrap(),
        Regex::new(r"sk-ant-[A-Za-z0-9_-]{80,120}").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Anthropic Claude",
    api_type: ApiType::AnthropicClaude,
    category: ProviderCategory::AiLlm,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

const RULES: ClassifyRules = ClassifyRules {
    forbidden_is_unauthorized: true,
    on_rate_limited: RateLimited::ValidNoCredits,
    not_found_is_success: false,
};

pub struct AnthropicProvider;

impl AnthropicProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnthropicProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for AnthropicProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        candidate.starts_with("sk-ant-") && candidate.len() >= 87
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        common::classify_with(response, &RULES)
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        // The models endpoint is free and consumes no tokens.
        let response = common::probe_get(
            "https://api.anthropic.com/v1/models".to_string(),
            vec![
                ("x-api-key".to_string(), api_key.to_string()),
                ("anthropic-version".to_string(), "2023-06-01".to_string()),
            ],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec![
            "ANTHROPIC_API_KEY".to_string(),
            "sk-ant- extension:env".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::OutcomeKind;

    #[test]
    fn test_pattern_matches_api_key() {
        let provider = AnthropicProvider::new();
        let key = format!("sk-ant-api03-{}", "a".repeat(95));
        assert!(provider.patterns().iter().any(|p| p.is_match(&key)));
        assert!(provider.is_plausible_format(&key));
    }

    #[test]
    fn test_format_rejects_wrong_prefix() {
        let provider = AnthropicProvider::new();
        assert!(!provider.is_plausible_format(&format!("sk-{}", "a".repeat(90))));
    }

    #[test]
    fn test_401_is_unauthorized() {
        let provider = AnthropicProvider::new();
        let resp = HttpResponse::synthetic(401, &[], r#"{"error":{"type":"authentication_error"}}"#);
        assert_eq!(provider.classify(&resp).kind, OutcomeKind::Unauthorized);
    }
}
