//! One module per credential type, plus the shared classification and probe
//! plumbing in `common`.

pub mod common;

pub mod ai21;
pub mod anthropic;
pub mod anyscale;
pub mod aws_bedrock;
pub mod azure_openai;
pub mod cloudflare;
pub mod datadog;
pub mod digitalocean;
pub mod discord;
pub mod fireworks;
pub mod github;
pub mod gitlab;
pub mod google_ai;
pub mod mailgun;
pub mod mapbox;
pub mod openai;
pub mod openrouter;
pub mod planetscale;
pub mod sendgrid;
pub mod sentry;
pub mod slack;
pub mod stripe;
pub mod supabase;
pub mod twilio;
pub mod vercel;
pub mod xai;

use std::sync::Arc;

use crate::core::traits::ApiKeyProvider;

/// The full built-in provider set, disabled ones included; capability flags
/// on each descriptor decide where a provider participates.
pub fn all_providers() -> Vec<Arc<dyn ApiKeyProvider>> {
    vec![
        Arc::new(openai::OpenAiProvider::new()),
        Arc::new(azure_openai::AzureOpenAiProvider::new()),
        Arc::new(anthropic::AnthropicProvider::new()),
        Arc::new(google_ai::GoogleAiProvider::new()),
        Arc::new(openrouter::OpenRouterProvider::new()),
        Arc::new(xai::XaiProvider::new()),
        Arc::new(anyscale::AnyscaleProvider::new()),
        Arc::new(fireworks::FireworksProvider::new()),
        Arc::new(ai21::Ai21Provider::new()),
        Arc::new(aws_bedrock::AwsBedrockProvider::new()),
        Arc::new(digitalocean::DigitalOceanProvider::new()),
        Arc::new(vercel::VercelProvider::new()),
        Arc::new(cloudflare::CloudflareProvider::new()),
        Arc::new(github::GitHubProvider::new()),
        Arc::new(gitlab::GitLabProvider::new()),
        Arc::new(stripe::StripeProvider::new()),
        Arc::new(sendgrid::SendGridProvider::new()),
        Arc::new(mailgun::MailgunProvider::new()),
        Arc::new(slack::SlackProvider::new()),
        Arc::new(discord::DiscordBotProvider::new()),
        Arc::new(twilio::TwilioProvider::new()),
        Arc::new(planetscale::PlanetScaleProvider::new()),
        Arc::new(supabase::SupabaseProvider::new()),
        Arc::new(datadog::DatadogProvider::new()),
        Arc::new(sentry::SentryProvider::new()),
        Arc::new(mapbox::MapboxProvider::new()),
    ]
}
