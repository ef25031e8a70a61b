use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::error::Result;

/// Runtime configuration. Continuous-mode loops re-read this at every cycle
/// boundary, so edits to the TOML file take effect on the next pass.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub verifier: VerifierConfig,
    pub store: StoreConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Search queries to cycle through. Empty means use every scraper-enabled
    /// provider's reference queries.
    pub queries: Vec<String>,
    /// Minutes before a query is due for re-execution.
    pub query_interval_mins: u64,
    /// Per-token quota window.
    pub token_window_secs: u64,
    /// Requests allowed per token per window.
    pub token_window_quota: u32,
    /// Seconds to sleep between continuous passes.
    pub pass_interval_secs: u64,
    pub github_base_url: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            queries: Vec::new(),
            query_interval_mins: 60,
            token_window_secs: 60,
            token_window_quota: 10,
            pass_interval_secs: 60,
            github_base_url: "https://api.github.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Concurrent in-flight probes per pass.
    pub parallelism: usize,
    /// Hard timeout on a single probe; a timeout is a transport fault, not a
    /// verdict on the key.
    pub probe_timeout_secs: u64,
    /// Consecutive infrastructure failures before a candidate is parked in
    /// `Error` and dropped from scheduling.
    pub error_ceiling: u32,
    /// Hours before a working key is due for a recheck.
    pub recheck_hours: i64,
    /// Candidates claimed per pass.
    pub batch_size: usize,
    /// Claim lease duration; an expired lease is reclaimable by the next pass.
    pub lease_secs: i64,
    /// Seconds to sleep between continuous passes.
    pub pass_interval_secs: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            parallelism: 8,
            probe_timeout_secs: 30,
            error_ceiling: 5,
            recheck_hours: 24,
            batch_size: 100,
            lease_secs: 300,
            pass_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Candidate store file shared by the scraper and verifier commands.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "candidates.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "leakwatch/0.1".to_string(),
        }
    }
}

impl Config {
    /// Load from the first config file that parses, falling back to defaults.
    pub fn load() -> Result<Config> {
        let paths = ["config/default.toml", "default.toml", ".leakwatch.toml"];

        for path in paths {
            if Path::new(path).exists() {
                match fs::read_to_string(path) {
                    Ok(contents) => match toml::from_str(&contents) {
                        Ok(config) => {
                            info!("Loaded config from {}", path);
                            return Ok(config);
                        }
                        Err(e) => warn!("Failed to parse config from {}: {}", path, e),
                    },
                    Err(e) => warn!("Failed to read config from {}: {}", path, e),
                }
            }
        }

        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = Config::default();
        assert!(config.verifier.parallelism > 0);
        assert!(config.verifier.error_ceiling > 0);
        assert!(config.verifier.lease_secs > 0);
        assert_eq!(config.store.path, "candidates.json");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [verifier]
            parallelism = 2
            error_ceiling = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.verifier.parallelism, 2);
        assert_eq!(config.verifier.error_ceiling, 3);
        assert_eq!(config.verifier.probe_timeout_secs, 30);
        assert_eq!(config.scraper.query_interval_mins, 60);
    }
}
