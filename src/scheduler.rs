//! Decides which search queries run when, and with which auth token.
//!
//! Queries become due on a fixed interval; tokens are checked out against a
//! per-token quota window. A due query with no token available this pass is
//! simply not dispatched and will be considered again next pass.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::time::Duration;

use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use tracing::{debug, warn};

use crate::core::config::ScraperConfig;

type TokenLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// A query the coordinator has decided to run now, with a checked-out token.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub query: String,
    pub token: String,
}

pub struct SchedulingCoordinator {
    queries: Vec<String>,
    tokens: Vec<String>,
    query_interval: chrono::Duration,
    last_run: HashMap<String, DateTime<Utc>>,
    limiter: TokenLimiter,
    window_secs: u64,
    window_quota: u32,
    /// Round-robin start point so one token does not absorb every dispatch.
    next_token: usize,
}

fn build_limiter(config: &ScraperConfig) -> TokenLimiter {
    let window = Duration::from_secs(config.token_window_secs.max(1));
    let quota_count = NonZeroU32::new(config.token_window_quota).unwrap_or(nonzero!(1u32));
    // Quota::with_period gives the replenish interval per cell; scale it
    // so `quota_count` requests fit in one window.
    let period = window / quota_count.get();
    let quota = Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_minute(quota_count))
        .allow_burst(quota_count);
    RateLimiter::keyed(quota)
}

impl SchedulingCoordinator {
    pub fn new(queries: Vec<String>, tokens: Vec<String>, config: &ScraperConfig) -> Self {
        Self {
            queries,
            tokens,
            query_interval: chrono::Duration::minutes(config.query_interval_mins as i64),
            last_run: HashMap::new(),
            limiter: build_limiter(config),
            window_secs: config.token_window_secs,
            window_quota: config.token_window_quota,
            next_token: 0,
        }
    }

    /// Apply a fresh config snapshot between passes. Dispatch stamps are
    /// kept so query intervals keep their meaning across reloads; the token
    /// limiter is rebuilt only when its window or quota actually changed.
    pub fn reload(&mut self, queries: Vec<String>, config: &ScraperConfig) {
        self.queries = queries;
        self.query_interval = chrono::Duration::minutes(config.query_interval_mins as i64);
        if config.token_window_secs != self.window_secs
            || config.token_window_quota != self.window_quota
        {
            self.limiter = build_limiter(config);
            self.window_secs = config.token_window_secs;
            self.window_quota = config.token_window_quota;
        }
    }

    /// Whether a query's interval has elapsed since its last dispatch.
    fn is_due(&self, query: &str, now: DateTime<Utc>) -> bool {
        match self.last_run.get(query) {
            Some(at) => now - *at >= self.query_interval,
            None => true,
        }
    }

    /// Check out a token with remaining quota, or `None` if every token is
    /// exhausted for the current window.
    fn checkout_token(&mut self) -> Option<String> {
        if self.tokens.is_empty() {
            return None;
        }
        for offset in 0..self.tokens.len() {
            let i = (self.next_token + offset) % self.tokens.len();
            let token = &self.tokens[i];
            if self.limiter.check_key(token).is_ok() {
                self.next_token = (i + 1) % self.tokens.len();
                return Some(token.clone());
            }
        }
        None
    }

    /// One scheduling pass: every due query that can get a token becomes a
    /// dispatch and is stamped as run. Due queries left without a token are
    /// not stamped, so they stay due.
    pub fn plan_pass(&mut self, now: DateTime<Utc>) -> Vec<Dispatch> {
        let mut dispatches = Vec::new();
        let due: Vec<String> = self
            .queries
            .iter()
            .filter(|q| self.is_due(q, now))
            .cloned()
            .collect();

        debug!("{} of {} queries due", due.len(), self.queries.len());

        for query in due {
            match self.checkout_token() {
                Some(token) => {
                    self.last_run.insert(query.clone(), now);
                    dispatches.push(Dispatch { query, token });
                }
                None => {
                    warn!("Token quotas exhausted, deferring remaining queries");
                    break;
                }
            }
        }

        dispatches
    }

    pub fn query_count(&self) -> usize {
        self.queries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(quota: u32, interval_mins: u64) -> ScraperConfig {
        ScraperConfig {
            token_window_secs: 60,
            token_window_quota: quota,
            query_interval_mins: interval_mins,
            ..ScraperConfig::default()
        }
    }

    #[test]
    fn test_all_queries_due_initially() {
        let mut coord = SchedulingCoordinator::new(
            vec!["q1".to_string(), "q2".to_string()],
            vec!["t1".to_string()],
            &config(10, 60),
        );
        let dispatches = coord.plan_pass(Utc::now());
        assert_eq!(dispatches.len(), 2);
    }

    #[test]
    fn test_dispatched_query_not_due_until_interval_elapses() {
        let mut coord = SchedulingCoordinator::new(
            vec!["q1".to_string()],
            vec!["t1".to_string()],
            &config(10, 60),
        );
        let now = Utc::now();
        assert_eq!(coord.plan_pass(now).len(), 1);
        assert_eq!(coord.plan_pass(now + chrono::Duration::minutes(30)).len(), 0);
        assert_eq!(coord.plan_pass(now + chrono::Duration::minutes(61)).len(), 1);
    }

    #[test]
    fn test_quota_exhaustion_defers_queries() {
        let queries: Vec<String> = (0..5).map(|i| format!("q{}", i)).collect();
        let mut coord =
            SchedulingCoordinator::new(queries, vec!["t1".to_string()], &config(2, 60));
        let now = Utc::now();
        let dispatches = coord.plan_pass(now);
        // Single token with quota 2: only two queries dispatch this pass.
        assert_eq!(dispatches.len(), 2);

        // Deferred queries are still due next pass (they were not stamped).
        let again = coord.plan_pass(now + chrono::Duration::seconds(1));
        assert!(again.len() <= 3);
    }

    #[test]
    fn test_tokens_rotate_across_dispatches() {
        let queries: Vec<String> = (0..4).map(|i| format!("q{}", i)).collect();
        let mut coord = SchedulingCoordinator::new(
            queries,
            vec!["t1".to_string(), "t2".to_string()],
            &config(10, 60),
        );
        let dispatches = coord.plan_pass(Utc::now());
        let t1_count = dispatches.iter().filter(|d| d.token == "t1").count();
        let t2_count = dispatches.iter().filter(|d| d.token == "t2").count();
        assert_eq!(t1_count, 2);
        assert_eq!(t2_count, 2);
    }

    #[test]
    fn test_reload_keeps_dispatch_stamps() {
        let mut coord = SchedulingCoordinator::new(
            vec!["q1".to_string()],
            vec!["t1".to_string()],
            &config(10, 60),
        );
        let now = Utc::now();
        assert_eq!(coord.plan_pass(now).len(), 1);

        // Same query set under a fresh snapshot: q1 was just run, so it must
        // not become due again merely because config was re-read.
        coord.reload(vec!["q1".to_string()], &config(10, 60));
        assert_eq!(coord.plan_pass(now + chrono::Duration::minutes(30)).len(), 0);
    }

    #[test]
    fn test_reload_applies_new_interval_and_queries() {
        let mut coord = SchedulingCoordinator::new(
            vec!["q1".to_string()],
            vec!["t1".to_string()],
            &config(10, 60),
        );
        let now = Utc::now();
        assert_eq!(coord.plan_pass(now).len(), 1);

        // Shorter interval plus a brand-new query, both from the snapshot.
        coord.reload(vec!["q1".to_string(), "q2".to_string()], &config(10, 15));
        let dispatches = coord.plan_pass(now + chrono::Duration::minutes(20));
        assert_eq!(dispatches.len(), 2);
    }

    #[test]
    fn test_no_tokens_means_no_dispatches() {
        let mut coord = SchedulingCoordinator::new(
            vec!["q1".to_string()],
            Vec::new(),
            &config(10, 60),
        );
        assert!(coord.plan_pass(Utc::now()).is_empty());
    }
}
