use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use super::common::{self, truncate_response};
use crate::core::error::Result;
use crate::core::outcome::{KeyMetadata, ValidationOutcome};
use crate::core::traits::{ApiKeyProvider, ProviderDescriptor};
use crate::core::types::{ApiType, ProviderCategory};
use crate::utils::HttpResponse;

lazy_static! {
    static ref PATTERNS: Vec<Regex> = vec![
        // Bot tokens
        Regex::new(r"\bxoxb-[0-9]{10,13}-[0-9]{10,13}-[a-zA-Z0-9]{24}\b").unwrap(),
        // User tokens
        Regex::new(r"\bxoxp-[0-9]{10,13}-[0-9]{10,13}-[a-zA-Z0-9]{24}\b").unwrap(),
        // App-level tokens
        Regex::new(r"\bxoxa-[0-9]+-[a-zA-Z0-9]+\b").unwrap(),
        // Legacy workspace tokens
        Regex::new(r"\bxoxs-[0-9]+-[0-9]+-[a-zA-Z0-9]+\b").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Slack",
    api_type: ApiType::Slack,
    category: ProviderCategory::Communication,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    ok: bool,
    error: Option<String>,
    team: Option<String>,
    user: Option<String>,
}

pub struct SlackProvider;

impl SlackProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SlackProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for SlackProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        candidate.starts_with("xox") && candidate.len() >= 20
    }

    // Slack answers HTTP 200 for everything; the verdict is in the body.
    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        if response.is_success() {
            match response.json::<AuthTestResponse>() {
                Ok(auth) if auth.ok => {
                    let mut metadata = Vec::new();
                    if let Some(team) = auth.team {
                        metadata.push(KeyMetadata::new("team", "Team", team));
                    }
                    if let Some(user) = auth.user {
                        metadata.push(KeyMetadata::new("user", "User", user));
                    }
                    return ValidationOutcome::success_with(response.status_code, metadata);
                }
                Ok(auth) => {
                    let error = auth.error.unwrap_or_else(|| "unknown".to_string());
                    if error == "ratelimited" {
                        return ValidationOutcome::valid_no_credits(response.status_code);
                    }
                    return ValidationOutcome::unauthorized_with(
                        response.status_code,
                        format!("Slack API returned error: {}", error),
                    );
                }
                Err(_) => {
                    return ValidationOutcome::http_error(
                        response.status_code,
                        format!("Unparseable Slack response: {}", truncate_response(&response.text())),
                    )
                }
            }
        }

        if response.status_code == 429 {
            return ValidationOutcome::success(response.status_code);
        }

        ValidationOutcome::http_error(
            response.status_code,
            format!(
                "API request failed with status {}. Response: {}",
                response.status_code,
                truncate_response(&response.text())
            ),
        )
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        let response = common::probe_post(
            "https://slack.com/api/auth.test".to_string(),
            vec![("Authorization".to_string(), format!("Bearer {}", api_key))],
            String::new(),
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec!["xoxb- extension:env".to_string(), "SLACK_BOT_TOKEN".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::OutcomeKind;

    #[test]
    fn test_bot_token_pattern() {
        let provider = SlackProvider::new();
        let token = format!("xoxb-{}-{}-{}", "1".repeat(12), "2".repeat(12), "a".repeat(24));
        assert!(provider.patterns()[0].is_match(&token));
        assert!(provider.is_plausible_format(&token));
    }

    #[test]
    fn test_ok_true_is_success_with_team() {
        let provider = SlackProvider::new();
        let resp = HttpResponse::synthetic(
            200,
            &[],
            r#"{"ok":true,"team":"acme","user":"bot"}"#,
        );
        let outcome = provider.classify(&resp);
        assert_eq!(outcome.kind, OutcomeKind::Success);
        assert!(outcome.metadata.iter().any(|m| m.name == "team" && m.value == "acme"));
    }

    #[test]
    fn test_ok_false_invalid_auth_is_unauthorized() {
        let provider = SlackProvider::new();
        let resp = HttpResponse::synthetic(200, &[], r#"{"ok":false,"error":"invalid_auth"}"#);
        assert_eq!(provider.classify(&resp).kind, OutcomeKind::Unauthorized);
    }

    #[test]
    fn test_ok_false_ratelimited_is_not_a_rejection() {
        let provider = SlackProvider::new();
        let resp = HttpResponse::synthetic(200, &[], r#"{"ok":false,"error":"ratelimited"}"#);
        assert!(provider.classify(&resp).is_live());
    }
}
