use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use super::common::{self, ClassifyRules, RateLimited};
use crate::core::error::Result;
use crate::core::outcome::{KeyMetadata, OutcomeKind, ValidationOutcome};
use crate::core::traits::{ApiKeyProvider, ProviderDescriptor};
use crate::core::types::{ApiType, ProviderCategory};
use crate::utils::HttpResponse;

lazy_static! {
    static ref PATTERNS: Vec<Regex> = vec![
        Regex::new(r"sk-or-v1-[a-f0-9]{64}").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "OpenRouter",
    api_type: ApiType::OpenRouter,
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

#[derive(Debug, Deserialize)]
struct KeyInfoResponse {
    data: Option<KeyInfo>,
}

#[derive(Debug, Deserialize)]
struct KeyInfo {
    usage: Option<f64>,
    limit: Option<f64>,
}

pub struct OpenRouterProvider;

impl OpenRouterProvider {
    pub fn new() -> Self {
        Self
    }

    fn extract_metadata(response: &HttpResponse) -> Vec<KeyMetadata> {
        let mut metadata = Vec::new();
        if let Ok(info) = response.json::<KeyInfoResponse>() {
            if let Some(data) = info.data {
                if let Some(usage) = data.usage {
                    metadata.push(KeyMetadata::new("usage", "Usage (USD)", format!("{:.2}", usage)));
                }
                if let Some(limit) = data.limit {
                    metadata.push(KeyMetadata::new("limit", "Limit (USD)", format!("{:.2}", limit)));
                }
            }
        }
        metadata
    }
}

impl Default for OpenRouterProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for OpenRouterProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        candidate.starts_with("sk-or-v1-") && candidate.len() == 73
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        let mut outcome = common::classify_with(response, &RULES);
        if outcome.kind == OutcomeKind::Success {
            outcome.metadata = Self::extract_metadata(response);
        }
        outcome
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        // auth/key reports the key's own usage and limits without spending.
        let response = common::probe_get(
            "https://openrouter.ai/api/v1/auth/key".to_string(),
            vec![("Authorization".to_string(), format!("Bearer {}", api_key))],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec![
            "OPENROUTER_API_KEY".to_string(),
            "sk-or-v1- extension:env".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_key_length() {
        let provider = OpenRouterProvider::new();
        let key = format!("sk-or-v1-{}", "a1b2c3d4".repeat(8));
        assert_eq!(key.len(), 73);
        assert!(provider.is_plausible_format(&key));
        assert!(!provider.is_plausible_format("sk-or-v1-deadbeef"));
    }

    #[test]
    fn test_success_extracts_usage() {
        let provider = OpenRouterProvider::new();
        let resp = HttpResponse::synthetic(200, &[], r#"{"data":{"usage":1.5,"limit":10.0}}"#);
        let outcome = provider.classify(&resp);
        assert_eq!(outcome.kind, OutcomeKind::Success);
        assert!(outcome.metadata.iter().any(|m| m.name == "usage"));
    }

    #[test]
    fn test_402_is_valid_no_credits() {
        let provider = OpenRouterProvider::new();
        let resp = HttpResponse::synthetic(402, &[], r#"{"error":"Insufficient credits"}"#);
        assert_eq!(provider.classify(&resp).kind, OutcomeKind::ValidNoCredits);
    }
}
