use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::common::{self, truncate_response};
use crate::core::error::Result;
use crate::core::outcome::ValidationOutcome;
use crate::core::traits::{ApiKeyProvider, ProviderDescriptor};
use crate::core::types::{ApiType, ProviderCategory};
use crate::utils::HttpResponse;

lazy_static! {
    static ref PATTERNS: Vec<Regex> = vec![
        // Google API keys share one shape across services
        Regex::new(r"AIza[0-9A-Za-z_-]{35}").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Google AI",
    api_type: ApiType::GoogleAi,
    category: ProviderCategory::AiLlm,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

pub struct GoogleAiProvider;

impl GoogleAiProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GoogleAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for GoogleAiProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        candidate.starts_with("AIza") && candidate.len() == 39
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        if response.is_success() {
            return ValidationOutcome::success(response.status_code);
        }

        match response.status_code {
            // Key errors come back as 400 with an explicit reason, not 401.
            400 if response.body_contains("API_KEY_INVALID")
                || response.body_contains("API key not valid") =>
            {
                ValidationOutcome::unauthorized_with(response.status_code, "API key not valid")
            }
            401 | 403 => ValidationOutcome::unauthorized(response.status_code),
            429 => ValidationOutcome::valid_no_credits(response.status_code),
            status => ValidationOutcome::http_error(
                status,
                format!(
                    "Google AI API request failed with status {}. Response: {}",
                    status,
                    truncate_response(&response.text())
                ),
            ),
        }
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models?key={}",
            api_key
        );
        let response = common::probe_get(url, Vec::new()).await?;
        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec![
            "GEMINI_API_KEY".to_string(),
            "AIza extension:env".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::OutcomeKind;

    #[test]
    fn test_format_is_exact_length() {
        let provider = GoogleAiProvider::new();
        let key = format!("AIza{}", "a".repeat(35));
        assert!(provider.is_plausible_format(&key));
        assert!(!provider.is_plausible_format(&format!("AIza{}", "a".repeat(30))));
    }

    #[test]
    fn test_400_invalid_key_is_unauthorized() {
        let provider = GoogleAiProvider::new();
        let resp = HttpResponse::synthetic(
            400,
            &[],
            r#"{"error":{"status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#,
        );
        assert_eq!(provider.classify(&resp).kind, OutcomeKind::Unauthorized);
    }

    #[test]
    fn test_other_400_is_http_error() {
        let provider = GoogleAiProvider::new();
        let resp = HttpResponse::synthetic(400, &[], r#"{"error":{"status":"INVALID_ARGUMENT"}}"#);
        assert_eq!(provider.classify(&resp).kind, OutcomeKind::HttpError);
    }
}
