use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use super::candidate::{ApiKeyCandidate, SearchOrigin};
use super::error::Result;
use super::outcome::{KeyMetadata, ValidationOutcome};
use super::types::{ApiType, KeyStatus, ProviderCategory, SearchSource};
use crate::utils::HttpResponse;

/// Static capability metadata for one credential type. Built once into the
/// registry and immutable afterwards.
#[derive(Debug, Clone, Copy)]
pub struct ProviderDescriptor {
    pub name: &'static str,
    pub api_type: ApiType,
    pub category: ProviderCategory,
    /// Whether the scraper mines for this credential shape.
    pub scraper_use: bool,
    /// Whether the verifier can probe a bare credential string.
    pub verification_use: bool,
    /// Whether public aggregates may include this provider.
    pub display_in_ui: bool,
    pub scraper_disabled_reason: Option<&'static str>,
    pub verification_disabled_reason: Option<&'static str>,
    pub hidden_from_ui_reason: Option<&'static str>,
}

impl ProviderDescriptor {
    /// Both capability flags on, visible in aggregates.
    pub const fn enabled(
        name: &'static str,
        api_type: ApiType,
        category: ProviderCategory,
    ) -> Self {
        Self {
            name,
            api_type,
            category,
            scraper_use: true,
            verification_use: true,
            display_in_ui: true,
            scraper_disabled_reason: None,
            verification_disabled_reason: None,
            hidden_from_ui_reason: None,
        }
    }
}

/// The contract every credential type implements. One implementation per
/// provider, registered into the `ProviderRegistry` and dispatched through
/// this trait by both the scraper and the verifier.
#[async_trait]
pub trait ApiKeyProvider: Send + Sync {
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Extraction patterns, evaluated in order. Intentionally broad; the
    /// precise length/charset rules live in `is_plausible_format`. A provider
    /// may expose zero patterns; that is the canonical way to permanently
    /// retire a shape that proved too generic.
    fn patterns(&self) -> &[Regex];

    /// Cheap structural pre-check applied after pattern matching and before
    /// any network call.
    fn is_plausible_format(&self, candidate: &str) -> bool;

    /// Maps a raw HTTP response to the shared outcome taxonomy. Pure, so the
    /// per-provider status rules are testable without a network.
    fn classify(&self, response: &HttpResponse) -> ValidationOutcome;

    /// Live probe against the provider's API. Expected failure modes
    /// (rejection, exhausted quota) are outcomes; `Err` is reserved for
    /// transport faults, which the engine retries with status preserved.
    async fn validate(&self, api_key: &str) -> Result<ValidationOutcome>;

    /// Reference search queries for this credential shape, used when the
    /// operator configures none.
    fn reference_queries(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A single search result blob: snippet text plus where it came from.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub text: String,
    pub repository: String,
    pub file_path: String,
}

/// External code-search collaborator. Pagination and provider-side rate-limit
/// handling live behind this trait, not in the scraper.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchClient: Send + Sync {
    fn source(&self) -> SearchSource;

    /// Run one query with one auth token and return zero or more text blobs.
    async fn search(&self, query: &str, token: &str) -> Result<Vec<SearchHit>>;
}

/// Outcome of an upsert: whether the (type, text) pair was new.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(u64),
    Refreshed(u64),
}

impl UpsertOutcome {
    pub fn id(&self) -> u64 {
        match self {
            UpsertOutcome::Inserted(id) | UpsertOutcome::Refreshed(id) => *id,
        }
    }
}

/// Parameters for one claim pass.
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    pub now: DateTime<Utc>,
    pub limit: usize,
    /// Lease length; a crashed worker's claim expires and becomes
    /// reclaimable.
    pub lease: Duration,
    /// How stale a working key's `last_verified` must be before recheck.
    pub recheck_after: Duration,
    /// Types the verifier can actually probe; unverifiable-by-design
    /// candidates are not selected.
    pub verifiable_types: Vec<ApiType>,
}

/// Final write-back for one verified candidate; clears the lease.
#[derive(Debug, Clone)]
pub struct VerificationUpdate {
    pub status: KeyStatus,
    pub verified_at: DateTime<Utc>,
    pub error_count: u32,
    /// `Some` replaces stored metadata (successful probes), `None` keeps it.
    pub metadata: Option<Vec<KeyMetadata>>,
}

/// Persistence collaborator. The concrete schema is not this crate's concern;
/// the uniqueness and claim-lease semantics are.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Insert a new `Unverified` candidate, or bump `last_seen`/`times_found`
    /// on the existing (type, text) row without touching its status.
    async fn upsert_candidate(
        &self,
        api_type: ApiType,
        api_key: &str,
        origin: &SearchOrigin,
    ) -> Result<UpsertOutcome>;

    /// Atomically claim up to `limit` due candidates. A claimed candidate is
    /// invisible to concurrent claims until its lease expires or is cleared,
    /// which gives the at-most-one-in-flight-probe guarantee.
    async fn claim_due(&self, request: &ClaimRequest) -> Result<Vec<ApiKeyCandidate>>;

    /// Write the post-probe status and clear the lease. Must refuse to
    /// overwrite a terminal status set concurrently by moderation.
    async fn finish_verification(&self, id: u64, update: VerificationUpdate) -> Result<()>;

    /// Clear a lease without writing a status (claimed but not probed).
    async fn release_claim(&self, id: u64) -> Result<()>;

    async fn get(&self, api_type: ApiType, api_key: &str) -> Result<Option<ApiKeyCandidate>>;

    /// Full copy of the store, for aggregates and persistence.
    async fn snapshot(&self) -> Result<Vec<ApiKeyCandidate>>;
}
