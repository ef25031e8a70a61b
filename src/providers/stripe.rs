use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use super::common::{self, ClassifyRules, RateLimited};
use crate::core::error::Result;
use crate::core::outcome::{KeyMetadata, OutcomeKind, ValidationOutcome};
use crate::core::traits::{ApiKeyProvider, ProviderDescriptor};
use crate::core::types::{ApiType, ProviderCategory};
use crate::utils::HttpResponse;

lazy_static! {
    static ref PATTERNS: Vec<Regex> = vec![
        // Live secret keys
        Regex::new(r"\bsk_live_[0-9a-zA-Z]{24,}\b").unwrap(),
        // Restricted keys
        Regex::new(r"\brk_live_[0-9a-zA-Z]{24,}\b").unwrap(),
        // Test-mode keys are worthless to an attacker and are not collected.
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Stripe",
    api_type: ApiType::Stripe,
    category: ProviderCategory::Other,
    scraper_use: true,
    verification_use: true,
    display_in_ui: false,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: Some("Payment keys are reported, never displayed"),
};

// A restricted key without the balance permission gets a 403 but is live.
const RULES: ClassifyRules = ClassifyRules {
    forbidden_is_unauthorized: false,
    on_rate_limited: RateLimited::Success,
    not_found_is_success: false,
};

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    livemode: Option<bool>,
    available: Option<Vec<BalanceAmount>>,
}

#[derive(Debug, Deserialize)]
struct BalanceAmount {
    currency: String,
}

pub struct StripeProvider;

impl StripeProvider {
    pub fn new() -> Self {
        Self
    }

    fn extract_metadata(response: &HttpResponse) -> Vec<KeyMetadata> {
        let mut metadata = Vec::new();
        if let Ok(balance) = response.json::<BalanceResponse>() {
            if let Some(livemode) = balance.livemode {
                metadata.push(KeyMetadata::new("livemode", "Live Mode", livemode.to_string()));
            }
            if let Some(first) = balance.available.and_then(|a| a.into_iter().next()) {
                metadata.push(KeyMetadata::new("currency", "Currency", first.currency));
            }
        }
        metadata
    }
}

impl Default for StripeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for StripeProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        (candidate.starts_with("sk_live_") || candidate.starts_with("rk_live_"))
            && candidate.len() >= 32
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        let mut outcome = common::classify_with(response, &RULES);
        if outcome.kind == OutcomeKind::Success && response.is_success() {
            outcome.metadata = Self::extract_metadata(response);
        }
        outcome
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        let response = common::probe_get(
            "https://api.stripe.com/v1/balance".to_string(),
            vec![("Authorization".to_string(), format!("Bearer {}", api_key))],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec![
            "STRIPE_SECRET_KEY".to_string(),
            "sk_live_ extension:env".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_keys_only() {
        let provider = StripeProvider::new();
        assert!(provider.is_plausible_format(&format!("sk_live_{}", "a".repeat(24))));
        assert!(provider.is_plausible_format(&format!("rk_live_{}", "a".repeat(24))));
        assert!(!provider.is_plausible_format(&format!("sk_test_{}", "a".repeat(24))));
    }

    #[test]
    fn test_restricted_key_403_is_live() {
        let provider = StripeProvider::new();
        let resp = HttpResponse::synthetic(403, &[], r#"{"error":{"type":"invalid_request_error"}}"#);
        assert_eq!(provider.classify(&resp).kind, OutcomeKind::Success);
    }

    #[test]
    fn test_success_metadata() {
        let provider = StripeProvider::new();
        let resp = HttpResponse::synthetic(
            200,
            &[],
            r#"{"livemode":true,"available":[{"currency":"usd","amount":0}]}"#,
        );
        let outcome = provider.classify(&resp);
        assert!(outcome.metadata.iter().any(|m| m.name == "livemode" && m.value == "true"));
        assert!(outcome.metadata.iter().any(|m| m.name == "currency" && m.value == "usd"));
    }
}
