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
        // DSN with public key only
        Regex::new(r"https://[a-f0-9]{32}@[a-z0-9.-]+\.sentry\.io/[0-9]+").unwrap(),
        // DSN with public and secret key
        Regex::new(r"https://[a-f0-9]{32}:[a-f0-9]{32}@[a-z0-9.-]+\.sentry\.io/[0-9]+").unwrap(),
        // API auth tokens
        Regex::new(r"\bsntrys_[a-zA-Z0-9]{60,}\b").unwrap(),
        // Legacy 64-hex auth tokens are not scraped; they match SHA-256 hashes.
    ];

    // DSN shape: https://<public_key>[:<secret_key>]@<host>/<project_id>
    static ref DSN_RE: Regex = Regex::new(
        r"(?i)^https://([a-f0-9]{32})(?::([a-f0-9]{32}))?@([a-z0-9.-]+)/(\d+)$"
    ).unwrap();
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Sentry",
    api_type: ApiType::Sentry,
    category: ProviderCategory::Monitoring,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

pub struct SentryProvider;

impl SentryProvider {
    pub fn new() -> Self {
        Self
    }

    /// Probe a DSN by posting a minimal event envelope to the ingest store
    /// endpoint. A valid DSN accepts the envelope; an invalid one answers
    /// 401 or 403. The event carries only a synthetic event_id, so nothing
    /// meaningful lands in the project.
    async fn validate_dsn(&self, dsn: &str) -> Result<ValidationOutcome> {
        let caps = match DSN_RE.captures(dsn) {
            Some(caps) => caps,
            None => {
                return Ok(ValidationOutcome::http_error(400, "Invalid DSN format".to_string()))
            }
        };
        let public_key = &caps[1];
        let host = &caps[3];
        let project_id = &caps[4];

        let store_url = format!("https://{}/api/{}/store/", host, project_id);
        let event_id = synthetic_event_id();
        let payload = format!(r#"{{"event_id":"{}"}}"#, event_id);

        let response = common::probe_post(
            store_url,
            vec![
                (
                    "X-Sentry-Auth".to_string(),
                    format!("Sentry sentry_version=7, sentry_key={}", public_key),
                ),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            payload,
        )
        .await?;

        Ok(self.classify(&response))
    }
}

/// 32 lowercase hex chars; Sentry only requires the shape of a UUID.
fn synthetic_event_id() -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0) as u128;
    format!("{:032x}", nanos)
}

impl Default for SentryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for SentryProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        if candidate.starts_with("https://") && candidate.contains("sentry.io") {
            return DSN_RE.is_match(candidate);
        }
        candidate.starts_with("sntrys_") && candidate.len() >= 65
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        common::classify_with(response, &ClassifyRules::default())
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        if api_key.starts_with("https://") && api_key.contains("sentry.io") {
            return self.validate_dsn(api_key).await;
        }

        if api_key.starts_with("sntrys_") {
            let response = common::probe_get(
                "https://sentry.io/api/0/".to_string(),
                vec![("Authorization".to_string(), format!("Bearer {}", api_key))],
            )
            .await?;
            return Ok(self.classify(&response));
        }

        Ok(ValidationOutcome::http_error(400, "Invalid Sentry credential format".to_string()))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["SENTRY_DSN".to_string(), "sntrys_".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dsn_format() {
        let provider = SentryProvider::new();
        let dsn = format!("https://{}@o12345.ingest.sentry.io/678", "a1".repeat(16));
        assert!(provider.is_plausible_format(&dsn));

        let with_secret = format!(
            "https://{}:{}@o12345.ingest.sentry.io/678",
            "a1".repeat(16),
            "b2".repeat(16)
        );
        assert!(provider.is_plausible_format(&with_secret));
        assert!(!provider.is_plausible_format("https://nothex@sentry.io/1"));
    }

    #[test]
    fn test_auth_token_format() {
        let provider = SentryProvider::new();
        assert!(provider.is_plausible_format(&format!("sntrys_{}", "a".repeat(60))));
        assert!(!provider.is_plausible_format("sntrys_short"));
        // Bare 64-hex never passes.
        assert!(!provider.is_plausible_format(&"ab".repeat(32)));
    }

    #[test]
    fn test_synthetic_event_id_shape() {
        let id = synthetic_event_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
