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
        // Full three-part keys
        Regex::new(r"\bSG\.[a-zA-Z0-9_-]{22}\.[a-zA-Z0-9_-]{43}\b").unwrap(),
        // Shorter variants
        Regex::new(r"\bSG\.[a-zA-Z0-9_-]{20,}\b").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "SendGrid",
    api_type: ApiType::SendGrid,
    category: ProviderCategory::Communication,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

pub struct SendGridProvider;

impl SendGridProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SendGridProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for SendGridProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        candidate.starts_with("SG.") && candidate.len() >= 23
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        common::classify_with(response, &ClassifyRules::default())
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        let response = common::probe_get(
            "https://api.sendgrid.com/v3/user/profile".to_string(),
            vec![("Authorization".to_string(), format!("Bearer {}", api_key))],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["SENDGRID_API_KEY".to_string(), "SG. extension:env".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shape() {
        let provider = SendGridProvider::new();
        let key = format!("SG.{}.{}", "a".repeat(22), "b".repeat(43));
        assert!(provider.patterns()[0].is_match(&key));
        assert!(provider.is_plausible_format(&key));
        assert!(!provider.is_plausible_format("SG.short"));
    }
}
