use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use leakwatch::cli::{Cli, Commands, OutputFormatter};
use leakwatch::core::traits::CandidateStore;
use leakwatch::core::{Config, KeyStatus, LeakwatchError};
use leakwatch::registry::ProviderRegistry;
use leakwatch::scheduler::SchedulingCoordinator;
use leakwatch::scraper::Scraper;
use leakwatch::search::GitHubSearchClient;
use leakwatch::store::{load_store, save_store, MemoryStore};
use leakwatch::verifier::Verifier;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() {
    // Load .env file if it exists
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .init();

    OutputFormatter::print_banner();

    if let Err(e) = execute_command(cli.command).await {
        OutputFormatter::print_error(&format!("Error: {}", e));
        std::process::exit(1);
    }
}

async fn execute_command(command: Commands) -> leakwatch::Result<()> {
    match command {
        Commands::Scrape {
            query,
            github_tokens,
            continuous,
        } => scrape_command(query, github_tokens, continuous).await?,
        Commands::Verify { continuous } => verify_command(continuous).await?,
        Commands::Test { key, key_type } => test_command(key, key_type).await?,
        Commands::List { status, key_type } => list_command(status, key_type).await?,
        Commands::Stats => stats_command().await?,
        Commands::Providers => providers_command(),
    }

    Ok(())
}

fn resolve_tokens(arg: Option<String>) -> Vec<String> {
    let raw = arg
        .or_else(|| std::env::var("GITHUB_TOKENS").ok())
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .unwrap_or_default();
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

async fn scrape_command(
    query: Option<String>,
    github_tokens: Option<String>,
    continuous: bool,
) -> leakwatch::Result<()> {
    OutputFormatter::print_ethical_warning();

    let mut config = Config::load()?;
    let registry = ProviderRegistry::with_builtins();
    let store = load_store(&config.store.path)?;

    let tokens = resolve_tokens(github_tokens);
    if tokens.is_empty() {
        return Err(LeakwatchError::Config(
            "No GitHub tokens; pass --github-tokens or set GITHUB_TOKENS".to_string(),
        ));
    }

    // CLI query wins over configured queries over provider reference queries.
    let resolve_queries = |config: &Config, registry: &ProviderRegistry| match &query {
        Some(q) => vec![q.clone()],
        None if !config.scraper.queries.is_empty() => config.scraper.queries.clone(),
        None => Scraper::default_queries(registry),
    };

    let queries = resolve_queries(&config, &registry);
    info!("Scraping with {} queries, {} tokens", queries.len(), tokens.len());

    let coordinator = SchedulingCoordinator::new(queries, tokens, &config.scraper);
    let client = GitHubSearchClient::new(config.scraper.github_base_url.clone());
    let mut scraper = Scraper::new(&registry, &store, Box::new(client), coordinator);

    loop {
        let stats = scraper.run_pass().await?;
        save_store(&store, &config.store.path).await?;
        OutputFormatter::print_scrape_stats(&stats);

        if !continuous {
            break;
        }
        info!(
            "Sleeping {}s until next scrape pass",
            config.scraper.pass_interval_secs
        );
        tokio::time::sleep(Duration::from_secs(config.scraper.pass_interval_secs)).await;

        // Fresh config snapshot each cycle; scheduling state survives.
        config = Config::load()?;
        let queries = resolve_queries(&config, &registry);
        scraper.reload(queries, &config.scraper);
    }

    Ok(())
}

async fn verify_command(continuous: bool) -> leakwatch::Result<()> {
    let mut config = Config::load()?;
    let registry = ProviderRegistry::with_builtins();
    let store = Arc::new(load_store(&config.store.path)?);

    loop {
        // Verifier settings come from the cycle's config snapshot.
        let verifier = Verifier::new(
            store.clone() as Arc<dyn CandidateStore>,
            config.verifier.clone(),
        );

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Probing candidates...");
        spinner.enable_steady_tick(Duration::from_millis(120));

        let stats = verifier.run_pass(&registry).await?;
        spinner.finish_and_clear();

        save_store(&store, &config.store.path).await?;
        OutputFormatter::print_verify_stats(&stats);

        if !continuous {
            break;
        }
        info!(
            "Sleeping {}s until next verify pass",
            config.verifier.pass_interval_secs
        );
        tokio::time::sleep(Duration::from_secs(config.verifier.pass_interval_secs)).await;
        config = Config::load()?;
    }

    Ok(())
}

async fn test_command(key: String, key_type: String) -> leakwatch::Result<()> {
    let api_type = key_type
        .parse()
        .map_err(LeakwatchError::UnknownProvider)?;
    let registry = ProviderRegistry::with_builtins();
    let provider = registry
        .get(api_type)
        .ok_or_else(|| LeakwatchError::UnknownProvider(key_type.clone()))?;

    if !provider.is_plausible_format(&key) {
        OutputFormatter::print_error("Credential does not match the expected format");
    }

    let outcome = provider.validate(&key).await?;
    OutputFormatter::print_test_outcome(&key_type, &outcome);
    Ok(())
}

async fn list_command(status: Option<String>, key_type: Option<String>) -> leakwatch::Result<()> {
    let config = Config::load()?;
    let store = load_store(&config.store.path)?;
    let snapshot = store.snapshot().await?;

    let status_filter: Option<KeyStatus> = match status.as_deref() {
        Some(s) => Some(parse_status(s)?),
        None => None,
    };
    let type_filter = match key_type.as_deref() {
        Some(t) => Some(
            t.parse::<leakwatch::core::ApiType>()
                .map_err(LeakwatchError::UnknownProvider)?,
        ),
        None => None,
    };

    let mut shown = 0;
    for candidate in &snapshot {
        if let Some(s) = status_filter {
            if candidate.status != s {
                continue;
            }
        }
        if let Some(t) = type_filter {
            if candidate.api_type != t {
                continue;
            }
        }
        OutputFormatter::print_candidate(candidate);
        shown += 1;
    }
    println!("\n{} of {} candidates shown", shown, snapshot.len());
    Ok(())
}

async fn stats_command() -> leakwatch::Result<()> {
    let config = Config::load()?;
    let store = load_store(&config.store.path)?;
    let snapshot = store.snapshot().await?;

    let count_of = |s: KeyStatus| snapshot.iter().filter(|c| c.status == s).count();

    println!("  Candidates:        {}", snapshot.len());
    println!("  Unverified:        {}", count_of(KeyStatus::Unverified));
    println!("  Valid:             {}", count_of(KeyStatus::Valid));
    println!("  Valid, no credits: {}", count_of(KeyStatus::ValidNoCredits));
    println!("  Invalid:           {}", count_of(KeyStatus::Invalid));
    println!("  Stopped working:   {}", count_of(KeyStatus::NoLongerWorking));
    println!("  Errored out:       {}", count_of(KeyStatus::Error));

    let registry = ProviderRegistry::with_builtins();
    println!();
    println!("  Providers:         {}", registry.len());
    println!("  Scraping:          {}", registry.scraper_providers().len());
    println!("  Verifying:         {}", registry.verifier_providers().len());
    Ok(())
}

fn providers_command() {
    let registry = ProviderRegistry::with_builtins();
    for provider in registry.iter() {
        OutputFormatter::print_provider(provider.descriptor());
    }
}

fn parse_status(s: &str) -> leakwatch::Result<KeyStatus> {
    match s.to_lowercase().as_str() {
        "unverified" => Ok(KeyStatus::Unverified),
        "valid" => Ok(KeyStatus::Valid),
        "invalid" => Ok(KeyStatus::Invalid),
        "removed" => Ok(KeyStatus::Removed),
        "flagged_for_removal" | "flagged" => Ok(KeyStatus::FlaggedForRemoval),
        "no_longer_working" => Ok(KeyStatus::NoLongerWorking),
        "error" => Ok(KeyStatus::Error),
        "valid_no_credits" => Ok(KeyStatus::ValidNoCredits),
        other => Err(LeakwatchError::Config(format!("unknown status: {}", other))),
    }
}
