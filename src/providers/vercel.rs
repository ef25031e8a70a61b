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
    // Generic 24-char patterns dropped for false positives; prefix only.
    static ref PATTERNS: Vec<Regex> =
        vec![Regex::new(r"\bvercel_[A-Za-z0-9]{20,}\b").unwrap()];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Vercel",
    api_type: ApiType::Vercel,
    category: ProviderCategory::CloudInfrastructure,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

pub struct VercelProvider;

impl VercelProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VercelProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for VercelProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        candidate.starts_with("vercel_") && candidate.len() >= 27
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        common::classify_with(response, &ClassifyRules::default())
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        let response = common::probe_get(
            "https://api.vercel.com/v2/user".to_string(),
            vec![("Authorization".to_string(), format!("Bearer {}", api_key))],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["VERCEL_TOKEN".to_string(), "vercel_ extension:env".to_string()]
    }
}
