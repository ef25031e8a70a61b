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
        // Account SID
        Regex::new(r"\bAC[a-f0-9]{32}\b").unwrap(),
        // API key SID
        Regex::new(r"\bSK[a-f0-9]{32}\b").unwrap(),
        // The generic 32-hex pattern was retired: too many false positives.
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Twilio",
    api_type: ApiType::Twilio,
    category: ProviderCategory::Communication,
    scraper_use: true,
    verification_use: false,
    display_in_ui: false,
    scraper_disabled_reason: None,
    verification_disabled_reason: Some("Requires the Account SID + auth token pair"),
    hidden_from_ui_reason: Some("SIDs without their paired secret are not actionable"),
};

/// A bare SID cannot authenticate; probing with a guessed secret would
/// misreport live accounts, so verification is structurally disabled.
pub struct TwilioProvider;

impl TwilioProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TwilioProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for TwilioProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        (candidate.starts_with("AC") || candidate.starts_with("SK"))
            && candidate.len() == 34
            && candidate[2..].chars().all(|c| c.is_ascii_hexdigit())
    }

    fn classify(&self, _response: &HttpResponse) -> ValidationOutcome {
        common::unverifiable(&DESCRIPTOR)
    }

    async fn validate(&self, _api_key: &str) -> Result<ValidationOutcome> {
        Ok(common::unverifiable(&DESCRIPTOR))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["TWILIO_ACCOUNT_SID".to_string(), "TWILIO_AUTH_TOKEN".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::OutcomeKind;

    #[test]
    fn test_sid_format() {
        let provider = TwilioProvider::new();
        assert!(provider.is_plausible_format(&format!("AC{}", "a0".repeat(16))));
        assert!(provider.is_plausible_format(&format!("SK{}", "a0".repeat(16))));
        assert!(!provider.is_plausible_format(&format!("XX{}", "a0".repeat(16))));
        assert!(!provider.is_plausible_format("ACdeadbeef"));
    }

    #[tokio::test]
    async fn test_validate_is_provider_specific_error() {
        let provider = TwilioProvider::new();
        let outcome = provider.validate(&format!("AC{}", "a0".repeat(16))).await.unwrap();
        assert_eq!(outcome.kind, OutcomeKind::ProviderSpecificError);
        assert!(outcome.detail.unwrap().contains("auth token pair"));
    }
}
