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
        // Three base64 segments: bot id, timestamp, HMAC
        Regex::new(r"\b[MN][A-Za-z0-9]{23,}\.[A-Za-z0-9_-]{6}\.[A-Za-z0-9_-]{27}\b").unwrap(),
        // Newer token shape
        Regex::new(r"\b[A-Za-z0-9_-]{24}\.[A-Za-z0-9_-]{6}\.[A-Za-z0-9_-]{27,38}\b").unwrap(),
    ];
}

static DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "Discord Bot",
    api_type: ApiType::DiscordBot,
    category: ProviderCategory::Communication,
    scraper_use: true,
    verification_use: true,
    display_in_ui: true,
    scraper_disabled_reason: None,
    verification_disabled_reason: None,
    hidden_from_ui_reason: None,
};

pub struct DiscordBotProvider;

impl DiscordBotProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DiscordBotProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyProvider for DiscordBotProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn is_plausible_format(&self, candidate: &str) -> bool {
        // Dot-separated triple, 59-72 chars in practice
        candidate.split('.').count() == 3 && (50..=80).contains(&candidate.len())
    }

    fn classify(&self, response: &HttpResponse) -> ValidationOutcome {
        common::classify_with(response, &ClassifyRules::default())
    }

    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome> {
        // Bot tokens use the "Bot" auth scheme, not "Bearer".
        let response = common::probe_get(
            "https://discord.com/api/v10/users/@me".to_string(),
            vec![("Authorization".to_string(), format!("Bot {}", api_key))],
        )
        .await?;

        Ok(self.classify(&response))
    }

    fn reference_queries(&self) -> Vec<String> {
        vec![
            "DISCORD_BOT_TOKEN".to_string(),
            "discord token extension:env".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_token_pattern() {
        let provider = DiscordBotProvider::new();
        let token = format!("M{}.{}.{}", "A1b2C3d4E5f6G7h8I9j0K1l".to_string(), "aBcDeF", "x".repeat(27));
        assert!(provider.patterns()[0].is_match(&token));
        assert!(provider.is_plausible_format(&token));
    }

    #[test]
    fn test_format_rejects_wrong_segment_count() {
        let provider = DiscordBotProvider::new();
        assert!(!provider.is_plausible_format("onlyonesegmentthatislongenoughtobeatokenmaybe1234567890"));
        assert!(!provider.is_plausible_format("a.b"));
    }
}
