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
    // Generic 40-char and 37-hex patterns dropped for false positives.
    static ref PATTERNS: Vec<Regex> =
        vec![Regex::new(r"\bcf_[A-Za-z0-9_-]{37,}\b").unwrap()];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Cloudflare",
    api_type: ApiType::Cloudflare,
    category: ProviderCategory::CloudInfrastructure,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

pub struct CloudflareProvider;

impl CloudflareProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CloudflareProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for CloudflareProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        candidate.starts_with("cf_") && candidate.len() >= 40
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        common::classify_with(response, &ClassifyRules::default())
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        // Cloudflare has a dedicated token self-verification endpoint.
        let response = common::probe_get(
            "https://api.cloudflare.com/client/v4/user/tokens/verify".to_string(),
            vec![("Authorization".to_string(), format!("Bearer {}", api_key))],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["CLOUDFLARE_API_TOKEN".to_string(), "cf_ extension:env".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_length() {
        let provider = CloudflareProvider::new();
        assert!(provider.is_plausible_format(&format!("cf_{}", "a".repeat(37))));
        assert!(!provider.is_plausible_format("cf_tooshort"));
        assert!(!provider.is_plausible_format(&"a".repeat(40)));
    }
}
