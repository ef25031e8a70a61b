use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of credential types this system recognizes. Every candidate
/// references exactly one of these; the registry maps each to its provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiType {
    // AI / LLM
    OpenAi,
    AzureOpenAi,
    AnthropicClaude,
    GoogleAi,
    OpenRouter,
    Xai,
    Anyscale,
    FireworksAi,
    Ai21,
    AwsBedrock,
    // Cloud infrastructure
    DigitalOcean,
    Vercel,
    Cloudflare,
    // Source control
    GitHub,
    GitLab,
    // Common services
    Stripe,
    SendGrid,
    Mailgun,
    Slack,
    DiscordBot,
    Twilio,
    // Database / backend
    PlanetScale,
    Supabase,
    // Monitoring
    Datadog,
    Sentry,
    // Maps
    Mapbox,
}

impl ApiType {
    /// Stable lowercase identifier, used on the CLI and in stored JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiType::OpenAi => "openai",
            ApiType::AzureOpenAi => "azure_openai",
            ApiType::AnthropicClaude => "anthropic_claude",
            ApiType::GoogleAi => "google_ai",
            ApiType::OpenRouter => "openrouter",
            ApiType::Xai => "xai",
            ApiType::Anyscale => "anyscale",
            ApiType::FireworksAi => "fireworks_ai",
            ApiType::Ai21 => "ai21",
            ApiType::AwsBedrock => "aws_bedrock",
            ApiType::DigitalOcean => "digitalocean",
            ApiType::Vercel => "vercel",
            ApiType::Cloudflare => "cloudflare",
            ApiType::GitHub => "github",
            ApiType::GitLab => "gitlab",
            ApiType::Stripe => "stripe",
            ApiType::SendGrid => "sendgrid",
            ApiType::Mailgun => "mailgun",
            ApiType::Slack => "slack",
            ApiType::DiscordBot => "discord_bot",
            ApiType::Twilio => "twilio",
            ApiType::PlanetScale => "planetscale",
            ApiType::Supabase => "supabase",
            ApiType::Datadog => "datadog",
            ApiType::Sentry => "sentry",
            ApiType::Mapbox => "mapbox",
        }
    }
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ApiType::OpenAi),
            "azure_openai" | "azure-openai" => Ok(ApiType::AzureOpenAi),
            "anthropic_claude" | "anthropic" | "claude" => Ok(ApiType::AnthropicClaude),
            "google_ai" | "google" | "gemini" => Ok(ApiType::GoogleAi),
            "openrouter" => Ok(ApiType::OpenRouter),
            "xai" => Ok(ApiType::Xai),
            "anyscale" => Ok(ApiType::Anyscale),
            "fireworks_ai" | "fireworks" => Ok(ApiType::FireworksAi),
            "ai21" => Ok(ApiType::Ai21),
            "aws_bedrock" | "bedrock" => Ok(ApiType::AwsBedrock),
            "digitalocean" => Ok(ApiType::DigitalOcean),
            "vercel" => Ok(ApiType::Vercel),
            "cloudflare" => Ok(ApiType::Cloudflare),
            "github" => Ok(ApiType::GitHub),
            "gitlab" => Ok(ApiType::GitLab),
            "stripe" => Ok(ApiType::Stripe),
            "sendgrid" => Ok(ApiType::SendGrid),
            "mailgun" => Ok(ApiType::Mailgun),
            "slack" => Ok(ApiType::Slack),
            "discord_bot" | "discord" => Ok(ApiType::DiscordBot),
            "twilio" => Ok(ApiType::Twilio),
            "planetscale" => Ok(ApiType::PlanetScale),
            "supabase" => Ok(ApiType::Supabase),
            "datadog" => Ok(ApiType::Datadog),
            "sentry" => Ok(ApiType::Sentry),
            "mapbox" => Ok(ApiType::Mapbox),
            other => Err(format!("unknown provider type: {}", other)),
        }
    }
}

/// Lifecycle status of a stored candidate. `Removed` and `FlaggedForRemoval`
/// are set by external moderation and are terminal for the verification
/// engine: it must never write over them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    /// Scraped but not yet probed.
    Unverified,
    /// Last probe authenticated successfully.
    Valid,
    /// Probe was rejected and the key has never been seen working.
    Invalid,
    /// Removed by moderation; terminal.
    Removed,
    /// Flagged by the repo owner; terminal.
    FlaggedForRemoval,
    /// Authenticated at some point in the past, now rejected.
    NoLongerWorking,
    /// Probes kept failing with infrastructure errors past the ceiling.
    Error,
    /// Authenticates but has no usable quota, credits, or scope.
    ValidNoCredits,
}

impl KeyStatus {
    /// Terminal states owned by external moderation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, KeyStatus::Removed | KeyStatus::FlaggedForRemoval)
    }

    /// Whether the key authenticated on its most recent probe.
    pub fn is_working(&self) -> bool {
        matches!(self, KeyStatus::Valid | KeyStatus::ValidNoCredits)
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KeyStatus::Unverified => "unverified",
            KeyStatus::Valid => "valid",
            KeyStatus::Invalid => "invalid",
            KeyStatus::Removed => "removed",
            KeyStatus::FlaggedForRemoval => "flagged_for_removal",
            KeyStatus::NoLongerWorking => "no_longer_working",
            KeyStatus::Error => "error",
            KeyStatus::ValidNoCredits => "valid_no_credits",
        };
        f.write_str(s)
    }
}

/// Category used for grouping providers in listings and aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    AiLlm,
    CloudInfrastructure,
    Communication,
    DatabaseBackend,
    MapsLocation,
    Monitoring,
    SourceControl,
    Other,
}

impl fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderCategory::AiLlm => "AI/LLM",
            ProviderCategory::CloudInfrastructure => "Cloud",
            ProviderCategory::Communication => "Communication",
            ProviderCategory::DatabaseBackend => "Database",
            ProviderCategory::MapsLocation => "Maps",
            ProviderCategory::Monitoring => "Monitoring",
            ProviderCategory::SourceControl => "Source Control",
            ProviderCategory::Other => "Other",
        };
        f.write_str(s)
    }
}

/// Which code-search index a candidate was discovered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    GitHub,
    GitLab,
    BitBucket,
    SourceGraph,
}

impl fmt::Display for SearchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SearchSource::GitHub => "github",
            SearchSource::GitLab => "gitlab",
            SearchSource::BitBucket => "bitbucket",
            SearchSource::SourceGraph => "sourcegraph",
        };
        f.write_str(s)
    }
}
