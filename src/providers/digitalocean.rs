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
        // Personal access tokens
        Regex::new(r"\bdop_v1_[a-f0-9]{64}\b").unwrap(),
        // OAuth tokens
        Regex::new(r"\bdoo_v1_[a-f0-9]{64}\b").unwrap(),
        // Legacy bare 64-hex tokens are not scraped; they match SHA-256 hashes.
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "DigitalOcean",
    api_type: ApiType::DigitalOcean,
    category: ProviderCategory::CloudInfrastructure,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

pub struct DigitalOceanProvider;

impl DigitalOceanProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DigitalOceanProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for DigitalOceanProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        if !candidate.starts_with("dop_v1_") && !candidate.starts_with("doo_v1_") {
            return false;
        }
        let hex = &candidate[7..];
        hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit())
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        common::classify_with(response, &ClassifyRules::default())
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        let response = common::probe_get(
            "https://api.digitalocean.com/v2/account".to_string(),
            vec![("Authorization".to_string(), format!("Bearer {}", api_key))],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["dop_v1_".to_string(), "DIGITALOCEAN_TOKEN".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_tokens_only() {
        let provider = DigitalOceanProvider::new();
        let pat = format!("dop_v1_{}", "ab".repeat(32));
        let oauth = format!("doo_v1_{}", "cd".repeat(32));
        assert!(provider.is_plausible_format(&pat));
        assert!(provider.is_plausible_format(&oauth));
        // Bare hex never passes, regardless of length.
        assert!(!provider.is_plausible_format(&"ab".repeat(32)));
    }

    #[test]
    fn test_hex_portion_is_checked() {
        let provider = DigitalOceanProvider::new();
        let bad = format!("dop_v1_{}", "zz".repeat(32));
        assert!(!provider.is_plausible_format(&bad));
    }
}
