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
        // Service tokens
        Regex::new(r"\bpscale_tkn_[a-zA-Z0-9_]{30,}\b").unwrap(),
        // OAuth tokens
        Regex::new(r"\bpscale_oauth_[a-zA-Z0-9_]{30,}\b").unwrap(),
        // Database connection passwords
        Regex::new(r"\bpscale_pw_[a-zA-Z0-9_]{30,}\b").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "PlanetScale",
    api_type: ApiType::PlanetScale,
    category: ProviderCategory::DatabaseBackend,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

pub struct PlanetScaleProvider;

impl PlanetScaleProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlanetScaleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for PlanetScaleProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        candidate.starts_with("pscale_tkn_")
            || candidate.starts_with("pscale_oauth_")
            || candidate.starts_with("pscale_pw_")
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        common::classify_with(response, &ClassifyRules::default())
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        let response = common::probe_get(
            "https://api.planetscale.com/v1/organizations".to_string(),
            vec![("Authorization".to_string(), format!("Bearer {}", api_key))],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["pscale_tkn_".to_string(), "PLANETSCALE_TOKEN".to_string()]
    }
}
