use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::common;
use crate::core::error::Result;
use crate::core::outcome::ValidationOutcome;
use crate::core::traits::{ApiKeyProvider, ProviderDescriptor};
use crate::core::types::{ApiType, ProviderCategory};
use crate::utils::HttpResponse;

lazy_static! {
    static ref PATTERNS: Vec<Regex> = vec![
        // Service role keys with the sbp_ prefix.
        // The generic JWT pattern was retired: it matches every JWT on earth.
        Regex::new(r"\bsbp_[a-f0-9]{40}\b").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Supabase",
    api_type: ApiType::Supabase,
    category: ProviderCategory::DatabaseBackend,
    scraper_use: true,
    verification_use: false,
    display_in_ui: false,
    scraper_disabled_reason: None,
    verification_disabled_reason: Some("Keys are project-scoped; validation needs the project URL"),
    hidden_from_ui_reason: Some("Cannot be validated without the owning project"),
};

pub struct SupabaseProvider;

impl SupabaseProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SupabaseProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for SupabaseProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        candidate.starts_with("sbp_")
            && candidate.len() == 44
            && candidate[4..].chars().all(|c| c.is_ascii_hexdigit())
    }

    fn classify(&self, _response: &HttpResponse) -> ValidationOutcome {
        common::unverifiable(&DESCRIPTOR)
    }

    async fn validate(&self, _api_key: &str) -> Result<ValidationOutcome> {
        Ok(common::unverifiable(&DESCRIPTOR))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["SUPABASE_SERVICE_ROLE_KEY".to_string(), "sbp_".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_key_format() {
        let provider = SupabaseProvider::new();
        assert!(provider.is_plausible_format(&format!("sbp_{}", "ab12cd34".repeat(5))));
        assert!(!provider.is_plausible_format("sbp_tooshort"));
        assert!(!provider.is_plausible_format(&format!("sbx_{}", "ab12cd34".repeat(5))));
    }
}
