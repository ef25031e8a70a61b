//! Scrape passes: due queries go out through the search client, result blobs
//! run through the extraction engine, extractions land in the store.

pub mod extract;

pub use extract::{Extraction, ExtractionEngine};

use chrono::Utc;
use tracing::{info, warn};

use crate::core::candidate::SearchOrigin;
use crate::core::config::ScraperConfig;
use crate::core::error::Result;
use crate::core::traits::{CandidateStore, SearchClient, UpsertOutcome};
use crate::registry::ProviderRegistry;
use crate::scheduler::SchedulingCoordinator;

/// Counters for one scrape pass.
#[derive(Debug, Default, Clone)]
pub struct ScrapeStats {
    pub queries_run: usize,
    pub queries_failed: usize,
    pub blobs: usize,
    pub extracted: usize,
    pub inserted: usize,
    pub refreshed: usize,
}

pub struct Scraper<'a> {
    registry: &'a ProviderRegistry,
    store: &'a dyn CandidateStore,
    client: Box<dyn SearchClient>,
    coordinator: SchedulingCoordinator,
}

impl<'a> Scraper<'a> {
    pub fn new(
        registry: &'a ProviderRegistry,
        store: &'a dyn CandidateStore,
        client: Box<dyn SearchClient>,
        coordinator: SchedulingCoordinator,
    ) -> Self {
        Self {
            registry,
            store,
            client,
            coordinator,
        }
    }

    /// Queries to run when the operator configures none: every
    /// scraper-enabled provider's reference queries.
    pub fn default_queries(registry: &ProviderRegistry) -> Vec<String> {
        registry
            .scraper_providers()
            .iter()
            .flat_map(|p| p.reference_queries())
            .collect()
    }

    /// Apply a fresh config snapshot between passes; scheduling state
    /// survives the reload.
    pub fn reload(&mut self, queries: Vec<String>, config: &ScraperConfig) {
        self.coordinator.reload(queries, config);
    }

    /// One pass: plan, search, extract, upsert.
    pub async fn run_pass(&mut self) -> Result<ScrapeStats> {
        let mut stats = ScrapeStats::default();
        let engine = ExtractionEngine::new(self.registry);
        let dispatches = self.coordinator.plan_pass(Utc::now());

        if dispatches.is_empty() {
            info!("No queries due this pass");
            return Ok(stats);
        }

        for dispatch in dispatches {
            let hits = match self.client.search(&dispatch.query, &dispatch.token).await {
                Ok(hits) => hits,
                Err(e) => {
                    warn!("Query '{}' failed: {}", dispatch.query, e);
                    stats.queries_failed += 1;
                    continue;
                }
            };
            stats.queries_run += 1;
            stats.blobs += hits.len();

            let origin = SearchOrigin::new(self.client.source(), dispatch.query.clone());
            for hit in hits {
                for extraction in engine.extract(&hit.text) {
                    stats.extracted += 1;
                    match self
                        .store
                        .upsert_candidate(extraction.api_type, &extraction.text, &origin)
                        .await?
                    {
                        UpsertOutcome::Inserted(_) => stats.inserted += 1,
                        UpsertOutcome::Refreshed(_) => stats.refreshed += 1,
                    }
                }
            }
        }

        info!(
            "Scrape pass: {} queries, {} blobs, {} extracted ({} new, {} re-seen)",
            stats.queries_run, stats.blobs, stats.extracted, stats.inserted, stats.refreshed
        );
        Ok(stats)
    }
}
