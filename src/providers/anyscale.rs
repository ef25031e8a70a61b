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
        Regex::new(r"esecret_[a-zA-Z0-9]{20,80}").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Anyscale",
    api_type: ApiType::Anyscale,
    category: ProviderCategory::AiLlm,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

pub struct AnyscaleProvider;

impl AnyscaleProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnyscaleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for AnyscaleProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        candidate.starts_with("esecret_") && candidate.len() >= 28
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        common::classify_with(response, &ClassifyRules::default())
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        let response = common::probe_get(
            "https://api.endpoints.anyscale.com/v1/models".to_string(),
            vec![("Authorization".to_string(), format!("Bearer {}", api_key))],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["ANYSCALE_API_KEY".to_string(), "esecret_".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_length() {
        let provider = AnyscaleProvider::new();
        assert!(provider.is_plausible_format(&format!("esecret_{}", "a".repeat(30))));
        assert!(!provider.is_plausible_format("esecret_short"));
    }
}
