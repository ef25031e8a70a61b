use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "leakwatch")]
#[command(version, about = "Finds leaked API credentials in public code and verifies whether they are still live", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scrape passes against code search
    Scrape {
        /// Custom search query (overrides configured and reference queries)
        #[arg(short, long)]
        query: Option<String>,

        /// GitHub tokens for authenticated search, comma-separated
        /// (can also use GITHUB_TOKENS env var)
        #[arg(long)]
        github_tokens: Option<String>,

        /// Keep running passes until interrupted
        #[arg(short, long)]
        continuous: bool,
    },

    /// Run verification passes over stored candidates
    Verify {
        /// Keep running passes until interrupted
        #[arg(short, long)]
        continuous: bool,
    },

    /// Probe a single credential immediately
    Test {
        /// The credential to probe
        key: String,

        /// Credential type (openai, github, stripe, ...)
        #[arg(short = 't', long)]
        key_type: String,
    },

    /// List stored candidates
    List {
        /// Filter by status (valid, invalid, unverified, ...)
        #[arg(short, long)]
        status: Option<String>,

        /// Filter by credential type
        #[arg(short = 't', long)]
        key_type: Option<String>,
    },

    /// Show store and provider statistics
    Stats,

    /// List registered providers and their capabilities
    Providers,
}
