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
        // Public tokens
        Regex::new(r"\bpk\.[a-zA-Z0-9_-]{60,}\b").unwrap(),
        // Secret tokens
        Regex::new(r"\bsk\.[a-zA-Z0-9_-]{60,}\b").unwrap(),
        // Temporary tokens
        Regex::new(r"\btk\.[a-zA-Z0-9_-]{60,}\b").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Mapbox",
    api_type: ApiType::Mapbox,
    category: ProviderCategory::MapsLocation,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

pub struct MapboxProvider;

impl MapboxProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MapboxProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for MapboxProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        (candidate.starts_with("pk.")
            || candidate.starts_with("sk.")
            || candidate.starts_with("tk."))
            && candidate.len() >= 80
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        common::classify_with(response, &ClassifyRules::default())
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        // Mapbox takes the token as a query parameter, not a header.
        let response = common::probe_get(
            format!("https://api.mapbox.com/tokens/v2?access_token={}", api_key),
            vec![],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["MAPBOX_ACCESS_TOKEN".to_string(), "sk. mapbox".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_prefixes() {
        let provider = MapboxProvider::new();
        for prefix in ["pk.", "sk.", "tk."] {
            let token = format!("{}{}", prefix, "a".repeat(78));
            assert!(provider.is_plausible_format(&token));
            assert!(provider.patterns().iter().any(|p| p.is_match(&token)));
        }
        assert!(!provider.is_plausible_format("pk.short"));
    }
}
