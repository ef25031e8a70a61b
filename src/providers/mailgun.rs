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
        // Private API keys
        Regex::new(r"\bkey-[a-f0-9]{32}\b").unwrap(),
        // Public validation keys
        Regex::new(r"\bpubkey-[a-f0-9]{32}\b").unwrap(),
        // Newer dashed format
        Regex::new(r"\b[a-f0-9]{32}-[a-f0-9]{8}-[a-f0-9]{8}\b").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Mailgun",
    api_type: ApiType::Mailgun,
    category: ProviderCategory::Communication,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

pub struct MailgunProvider;

impl MailgunProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MailgunProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for MailgunProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        if candidate.starts_with("key-") || candidate.starts_with("pubkey-") {
            return candidate.len() >= 36;
        }
        // Dashed format: 32-8-8 hex groups.
        let parts: Vec<&str> = candidate.split('-').collect();
        parts.len() == 3
            && parts[0].len() == 32
            && parts[1].len() == 8
            && parts[2].len() == 8
            && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_hexdigit()))
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        common::classify_with(response, &ClassifyRules::default())
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        // Mailgun authenticates with Basic auth, username "api".
        let response = common::probe_get_basic_auth(
            "https://api.mailgun.net/v3/domains".to_string(),
            "api".to_string(),
            api_key.to_string(),
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["MAILGUN_API_KEY".to_string(), "key- mailgun".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_key_format() {
        let provider = MailgunProvider::new();
        assert!(provider.is_plausible_format(&format!("key-{}", "ab01".repeat(8))));
        assert!(provider.is_plausible_format(&format!("pubkey-{}", "ab01".repeat(8))));
        assert!(!provider.is_plausible_format("key-deadbeef"));
    }

    #[test]
    fn test_dashed_key_format() {
        let provider = MailgunProvider::new();
        let key = format!("{}-{}-{}", "ab01".repeat(8), "cd23ef45", "67ab89cd");
        assert!(provider.is_plausible_format(&key));
        assert!(!provider.is_plausible_format("aaaa-bbbb-cccc"));
    }
}
