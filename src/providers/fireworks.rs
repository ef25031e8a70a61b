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
        Regex::new(r"fw_[a-zA-Z0-9]{20,80}").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Fireworks AI",
    api_type: ApiType::FireworksAi,
    category: ProviderCategory::AiLlm,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

pub struct FireworksProvider;

impl FireworksProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FireworksProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for FireworksProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        candidate.starts_with("fw_") && candidate.len() >= 23
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        common::classify_with(response, &ClassifyRules::default())
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        let response = common::probe_get(
            "https://api.fireworks.ai/inference/v1/models".to_string(),
            vec![("Authorization".to_string(), format!("Bearer {}", api_key))],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["FIREWORKS_API_KEY".to_string(), "fw_ extension:env".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_length() {
        let provider = FireworksProvider::new();
        assert!(provider.is_plausible_format(&format!("fw_{}", "a".repeat(24))));
        assert!(!provider.is_plausible_format("fw_short"));
    }
}
