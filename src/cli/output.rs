use colored::Colorize;

use crate::core::candidate::ApiKeyCandidate;
use crate::core::outcome::ValidationOutcome;
use crate::core::traits::ProviderDescriptor;
use crate::core::types::KeyStatus;
use crate::scraper::ScrapeStats;
use crate::verifier::VerifyStats;

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn print_banner() {
        println!("{}", "=".repeat(70).bright_cyan());
        println!(
            "{}",
            "  leakwatch - Leaked Credential Scraper & Verifier"
                .bright_cyan()
                .bold()
        );
        println!("{}", "=".repeat(70).bright_cyan());
        println!();
    }

    pub fn print_ethical_warning() {
        println!("{}", "⚠️  ETHICAL USE ONLY ⚠️".yellow().bold());
        println!("This tool is for security research and responsible disclosure only.");
        println!("By using this tool, you agree to:");
        println!("  {} Use findings for research and awareness", "✓".green());
        println!("  {} Report all live credentials to their owners", "✓".green());
        println!("  {} Not use credentials for unauthorized purposes", "✓".green());
        println!();
    }

    pub fn print_error(msg: &str) {
        eprintln!("{} {}", "✗".bright_red().bold(), msg.red());
    }

    pub fn print_scrape_stats(stats: &ScrapeStats) {
        println!();
        println!("{}", "  Scrape Pass Summary".bright_cyan().bold());
        println!("  Queries run:     {}", stats.queries_run.to_string().bright_white());
        if stats.queries_failed > 0 {
            println!("  Queries failed:  {}", stats.queries_failed.to_string().bright_red());
        }
        println!("  Result blobs:    {}", stats.blobs.to_string().bright_white());
        println!("  Extracted:       {}", stats.extracted.to_string().bright_yellow());
        println!("  New candidates:  {}", stats.inserted.to_string().bright_green());
        println!("  Re-discovered:   {}", stats.refreshed.to_string().bright_white());
        println!();
    }

    pub fn print_verify_stats(stats: &VerifyStats) {
        println!();
        println!("{}", "  Verify Pass Summary".bright_cyan().bold());
        println!("  Claimed:           {}", stats.claimed.to_string().bright_white());
        println!("  Valid:             {}", stats.valid.to_string().bright_green());
        println!("  Valid, no credits: {}", stats.valid_no_credits.to_string().bright_yellow());
        println!("  Invalid:           {}", stats.invalid.to_string().bright_black());
        println!("  Stopped working:   {}", stats.no_longer_working.to_string().bright_black());
        println!("  Transport faults:  {}", stats.transport_faults.to_string().bright_red());
        if stats.parked_in_error > 0 {
            println!("  Parked in error:   {}", stats.parked_in_error.to_string().bright_red());
        }
        println!();
    }

    pub fn print_test_outcome(key_type: &str, outcome: &ValidationOutcome) {
        if outcome.is_live() {
            println!(
                "{} {} credential is {}",
                "✓".bright_green().bold(),
                key_type.bright_cyan(),
                "LIVE".bright_green().bold()
            );
        } else {
            println!(
                "{} {} credential is {}",
                "✗".bright_red().bold(),
                key_type.bright_cyan(),
                "not usable".bright_black()
            );
        }
        if let Some(status) = outcome.http_status {
            println!("  HTTP status: {}", status.to_string().bright_white());
        }
        if let Some(detail) = &outcome.detail {
            println!("  Detail: {}", detail.bright_white());
        }
        for m in &outcome.metadata {
            println!("  {}: {}", m.label.bright_cyan(), m.value.bright_white());
        }
    }

    pub fn print_candidate(candidate: &ApiKeyCandidate) {
        let status = Self::colored_status(candidate.status);
        println!(
            "  [{}] {} {} found {}x, last seen {}",
            status,
            candidate.api_type.to_string().bright_cyan(),
            candidate.redacted_key().bright_white(),
            candidate.times_found,
            candidate.last_seen.format("%Y-%m-%d %H:%M")
        );
    }

    pub fn print_provider(descriptor: &ProviderDescriptor) {
        let scrape = if descriptor.scraper_use {
            "scrape".green()
        } else {
            "scrape".bright_black().strikethrough()
        };
        let verify = if descriptor.verification_use {
            "verify".green()
        } else {
            "verify".bright_black().strikethrough()
        };
        println!(
            "  {:<18} {:<14} [{} {}]",
            descriptor.name.bright_cyan(),
            descriptor.category.to_string().bright_white(),
            scrape,
            verify
        );
        if let Some(reason) = descriptor.scraper_disabled_reason {
            println!("    {} {}", "scraping off:".bright_black(), reason.bright_black());
        }
        if let Some(reason) = descriptor.verification_disabled_reason {
            println!("    {} {}", "verification off:".bright_black(), reason.bright_black());
        }
    }

    fn colored_status(status: KeyStatus) -> colored::ColoredString {
        match status {
            KeyStatus::Valid => status.to_string().bright_green(),
            KeyStatus::ValidNoCredits => status.to_string().bright_yellow(),
            KeyStatus::Unverified => status.to_string().bright_white(),
            KeyStatus::Invalid | KeyStatus::NoLongerWorking => status.to_string().bright_black(),
            KeyStatus::Error => status.to_string().bright_red(),
            KeyStatus::Removed | KeyStatus::FlaggedForRemoval => status.to_string().red(),
        }
    }
}
