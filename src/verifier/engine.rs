//! Verification passes: claim due candidates, probe them concurrently, fold
//! each outcome into the candidate's persisted status.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::core::candidate::ApiKeyCandidate;
use crate::core::config::VerifierConfig;
use crate::core::error::{LeakwatchError, Result};
use crate::core::outcome::{KeyMetadata, OutcomeKind, ValidationOutcome};
use crate::core::traits::{ApiKeyProvider, CandidateStore, ClaimRequest, VerificationUpdate};
use crate::core::types::KeyStatus;
use crate::registry::ProviderRegistry;

/// Counters for one verification pass.
#[derive(Debug, Default, Clone)]
pub struct VerifyStats {
    pub claimed: usize,
    pub valid: usize,
    pub valid_no_credits: usize,
    pub invalid: usize,
    pub no_longer_working: usize,
    pub transport_faults: usize,
    pub parked_in_error: usize,
}

/// What one probe decided: the next persisted state of the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFold {
    pub status: KeyStatus,
    pub error_count: u32,
    /// `Some` replaces stored metadata; `None` keeps what is there.
    pub metadata: Option<Vec<KeyMetadata>>,
}

/// Pure transition from (previous state, probe outcome) to next state.
///
/// Rejection demotes to `Invalid` only for keys never seen working; a key
/// that was live goes to `NoLongerWorking` so the history of it having
/// worked is not erased. Infrastructure noise never changes the verdict,
/// it only advances the error counter toward the ceiling.
pub fn fold_outcome(
    prev_status: KeyStatus,
    prev_errors: u32,
    outcome: &ValidationOutcome,
    error_ceiling: u32,
) -> StatusFold {
    match outcome.kind {
        OutcomeKind::Success => StatusFold {
            status: KeyStatus::Valid,
            error_count: 0,
            metadata: Some(outcome.metadata.clone()),
        },
        OutcomeKind::ValidNoCredits => StatusFold {
            status: KeyStatus::ValidNoCredits,
            error_count: 0,
            metadata: None,
        },
        OutcomeKind::Unauthorized => StatusFold {
            status: if prev_status.is_working() {
                KeyStatus::NoLongerWorking
            } else {
                KeyStatus::Invalid
            },
            error_count: prev_errors,
            metadata: None,
        },
        OutcomeKind::ProviderSpecificError | OutcomeKind::HttpError => {
            bump_error(prev_status, prev_errors, error_ceiling)
        }
    }
}

/// Status-preserving error bump; the ceiling parks the candidate in `Error`
/// and scheduling stops selecting it.
pub fn bump_error(prev_status: KeyStatus, prev_errors: u32, error_ceiling: u32) -> StatusFold {
    let error_count = prev_errors + 1;
    StatusFold {
        status: if error_count >= error_ceiling {
            KeyStatus::Error
        } else {
            prev_status
        },
        error_count,
        metadata: None,
    }
}

pub struct Verifier {
    store: Arc<dyn CandidateStore>,
    config: VerifierConfig,
}

impl Verifier {
    pub fn new(store: Arc<dyn CandidateStore>, config: VerifierConfig) -> Self {
        Self { store, config }
    }

    /// One pass: claim a batch and probe it with bounded concurrency. Every
    /// claimed candidate gets exactly one write-back (or a lease release if
    /// its provider vanished from the registry).
    pub async fn run_pass(&self, registry: &ProviderRegistry) -> Result<VerifyStats> {
        let request = ClaimRequest {
            now: Utc::now(),
            limit: self.config.batch_size,
            lease: chrono::Duration::seconds(self.config.lease_secs),
            recheck_after: chrono::Duration::hours(self.config.recheck_hours),
            verifiable_types: registry.verifiable_types(),
        };
        let claimed = self.store.claim_due(&request).await?;

        let mut stats = VerifyStats {
            claimed: claimed.len(),
            ..VerifyStats::default()
        };
        if claimed.is_empty() {
            info!("No candidates due for verification");
            return Ok(stats);
        }
        info!("Claimed {} candidates for verification", claimed.len());

        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));
        let mut tasks: JoinSet<Result<ProbeReport>> = JoinSet::new();

        for candidate in claimed {
            let provider = match registry.get(candidate.api_type) {
                Some(p) => Arc::clone(p),
                None => {
                    warn!(api_type = %candidate.api_type, "no provider registered, releasing claim");
                    self.store.release_claim(candidate.id).await?;
                    continue;
                }
            };
            // The claim filter should already exclude these, but the engine
            // must not probe a type whose provider cannot verify it; a bare
            // release leaves the candidate untouched.
            if !provider.descriptor().verification_use {
                warn!(api_type = %candidate.api_type, "provider cannot verify this type, releasing claim");
                self.store.release_claim(candidate.id).await?;
                continue;
            }
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);
            let timeout = Duration::from_secs(self.config.probe_timeout_secs);
            let ceiling = self.config.error_ceiling;

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|_| LeakwatchError::Unknown("semaphore closed".to_string()))?;
                probe_one(provider, candidate, store, timeout, ceiling).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let report = joined
                .map_err(|e| LeakwatchError::Unknown(format!("Task join error: {}", e)))??;
            match report {
                ProbeReport::Status(KeyStatus::Valid) => stats.valid += 1,
                ProbeReport::Status(KeyStatus::ValidNoCredits) => stats.valid_no_credits += 1,
                ProbeReport::Status(KeyStatus::Invalid) => stats.invalid += 1,
                ProbeReport::Status(KeyStatus::NoLongerWorking) => stats.no_longer_working += 1,
                ProbeReport::Status(KeyStatus::Error) => stats.parked_in_error += 1,
                ProbeReport::Status(_) => {}
                ProbeReport::TransportFault(parked) => {
                    stats.transport_faults += 1;
                    if parked {
                        stats.parked_in_error += 1;
                    }
                }
            }
        }

        info!(
            "Verify pass: {} claimed, {} valid, {} no-credits, {} invalid, {} stopped working, {} transport faults",
            stats.claimed,
            stats.valid,
            stats.valid_no_credits,
            stats.invalid,
            stats.no_longer_working,
            stats.transport_faults
        );
        Ok(stats)
    }
}

enum ProbeReport {
    Status(KeyStatus),
    /// Transport fault; true when the error ceiling parked the candidate.
    TransportFault(bool),
}

async fn probe_one(
    provider: Arc<dyn ApiKeyProvider>,
    candidate: ApiKeyCandidate,
    store: Arc<dyn CandidateStore>,
    timeout: Duration,
    ceiling: u32,
) -> Result<ProbeReport> {
    let probed = tokio::time::timeout(timeout, provider.validate(&candidate.api_key)).await;

    let fold = match probed {
        Ok(Ok(outcome)) => {
            debug!(
                key = %candidate.redacted_key(),
                kind = ?outcome.kind,
                "probe completed"
            );
            fold_outcome(candidate.status, candidate.error_count, &outcome, ceiling)
        }
        Ok(Err(e)) => {
            // Transport faults and unexpected errors both preserve status.
            if e.is_transport_fault() {
                debug!(key = %candidate.redacted_key(), "transport fault: {}", e);
            } else {
                warn!(key = %candidate.redacted_key(), "probe error: {}", e);
            }
            let fold = bump_error(candidate.status, candidate.error_count, ceiling);
            write_back(&store, candidate.id, &fold).await?;
            return Ok(ProbeReport::TransportFault(fold.status == KeyStatus::Error));
        }
        Err(_) => {
            debug!(key = %candidate.redacted_key(), "probe timed out after {:?}", timeout);
            let fold = bump_error(candidate.status, candidate.error_count, ceiling);
            write_back(&store, candidate.id, &fold).await?;
            return Ok(ProbeReport::TransportFault(fold.status == KeyStatus::Error));
        }
    };

    write_back(&store, candidate.id, &fold).await?;
    Ok(ProbeReport::Status(fold.status))
}

async fn write_back(store: &Arc<dyn CandidateStore>, id: u64, fold: &StatusFold) -> Result<()> {
    store
        .finish_verification(
            id,
            VerificationUpdate {
                status: fold.status,
                verified_at: Utc::now(),
                error_count: fold.error_count,
                metadata: fold.metadata.clone(),
            },
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_resets_errors_and_stores_metadata() {
        let outcome = ValidationOutcome::success_with(
            200,
            vec![KeyMetadata::new("scopes", "Scopes", "repo")],
        );
        let fold = fold_outcome(KeyStatus::Unverified, 3, &outcome, 5);
        assert_eq!(fold.status, KeyStatus::Valid);
        assert_eq!(fold.error_count, 0);
        assert_eq!(fold.metadata.unwrap().len(), 1);
    }

    #[test]
    fn test_rejection_of_never_working_key_is_invalid() {
        let outcome = ValidationOutcome::unauthorized(401);
        let fold = fold_outcome(KeyStatus::Unverified, 0, &outcome, 5);
        assert_eq!(fold.status, KeyStatus::Invalid);
    }

    #[test]
    fn test_rejection_of_working_key_is_no_longer_working() {
        let outcome = ValidationOutcome::unauthorized(401);
        for prev in [KeyStatus::Valid, KeyStatus::ValidNoCredits] {
            let fold = fold_outcome(prev, 0, &outcome, 5);
            assert_eq!(fold.status, KeyStatus::NoLongerWorking);
        }
    }

    #[test]
    fn test_quota_exhaustion_is_not_a_rejection() {
        let outcome = ValidationOutcome::valid_no_credits(402);
        let fold = fold_outcome(KeyStatus::Valid, 2, &outcome, 5);
        assert_eq!(fold.status, KeyStatus::ValidNoCredits);
        assert_eq!(fold.error_count, 0);
    }

    #[test]
    fn test_provider_specific_error_preserves_status() {
        let outcome = ValidationOutcome::provider_specific("needs paired secret");
        let fold = fold_outcome(KeyStatus::Valid, 0, &outcome, 5);
        assert_eq!(fold.status, KeyStatus::Valid);
        assert_eq!(fold.error_count, 1);
        assert!(fold.metadata.is_none());
    }

    #[test]
    fn test_error_ceiling_parks_candidate() {
        let outcome = ValidationOutcome::http_error(500, "boom");
        // Four prior failures, ceiling five: this one parks it.
        let fold = fold_outcome(KeyStatus::Unverified, 4, &outcome, 5);
        assert_eq!(fold.status, KeyStatus::Error);
        assert_eq!(fold.error_count, 5);
    }

    #[test]
    fn test_bump_error_below_ceiling_keeps_status() {
        let fold = bump_error(KeyStatus::ValidNoCredits, 1, 5);
        assert_eq!(fold.status, KeyStatus::ValidNoCredits);
        assert_eq!(fold.error_count, 2);
    }
}
