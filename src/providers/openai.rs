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
        // Project-scoped keys
        Regex::new(r"sk-proj-[A-Za-z0-9_-]{20,}").unwrap(),
        // Legacy user keys, fixed 48 chars after the prefix
        Regex::new(r"sk-[A-Za-z0-9]{48}").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "OpenAI",
    api_type: ApiType::OpenAi,
    category: ProviderCategory::AiLlm,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

// OpenAI reports exhausted quota as a 429 body marker; the key still works.
const RULES: ClassifyRules = ClassifyRules {
    forbidden_is_unauthorized: true,
    on_rate_limited: RateLimited::ValidNoCredits,
    not_found_is_success: false,
};

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<Model>,
}

#[derive(Debug, Deserialize)]
struct Model {
    id: String,
}

pub struct OpenAiProvider;

impl OpenAiProvider {
    pub fn new() -> Self {
        Self
    }

    fn extract_metadata(response: &HttpResponse) -> Vec<KeyMetadata> {
        let mut metadata = Vec::new();
        if let Ok(models) = response.json::<ModelsResponse>() {
            metadata.push(KeyMetadata::new(
                "model_count",
                "Model Count",
                models.data.len().to_string(),
            ));
            let sample: Vec<String> = models.data.iter().take(3).map(|m| m.id.clone()).collect();
            if !sample.is_empty() {
                metadata.push(KeyMetadata::new("sample_models", "Sample Models", sample.join(", ")));
            }
        }
        metadata
    }
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for OpenAiProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        if candidate.starts_with("sk-proj-") {
            return candidate.len() >= 28;
        }
        // Legacy keys are exactly sk- plus 48 characters.
        candidate.starts_with("sk-") && candidate.len() == 51
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        let mut outcome = common::classify_with(response, &RULES);
        if outcome.kind == OutcomeKind::Success {
            outcome.metadata = Self::extract_metadata(response);
        }
        outcome
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        let response = common::probe_get(
            "https://api.openai.com/v1/models".to_string(),
            vec![
                ("Authorization".to_string(), format!("Bearer {}", api_key)),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec![
            "OPENAI_API_KEY".to_string(),
            "sk-proj- extension:env".to_string(),
            "openai api_key extension:py".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_key_length_check() {
        let provider = OpenAiProvider::new();
        let key = format!("sk-{}", "a".repeat(48));
        assert!(provider.is_plausible_format(&key));
        assert!(!provider.is_plausible_format("sk-tooshort"));
    }

    #[test]
    fn test_project_key_format() {
        let provider = OpenAiProvider::new();
        assert!(provider.is_plausible_format("sk-proj-abcdefghijklmnopqrstuvwxyz123456"));
    }

    #[test]
    fn test_quota_exhausted_body_is_valid_no_credits() {
        let provider = OpenAiProvider::new();
        let resp = HttpResponse::synthetic(
            429,
            &[],
            r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota"}}"#,
        );
        assert_eq!(provider.classify(&resp).kind, OutcomeKind::ValidNoCredits);
    }

    #[test]
    fn test_success_extracts_model_metadata() {
        let provider = OpenAiProvider::new();
        let resp = HttpResponse::synthetic(
            200,
            &[],
            r#"{"data":[{"id":"gpt-4o"},{"id":"gpt-4o-mini"}]}"#,
        );
        let outcome = provider.classify(&resp);
        assert_eq!(outcome.kind, OutcomeKind::Success);
        assert!(outcome.metadata.iter().any(|m| m.name == "model_count" && m.value == "2"));
    }
}
