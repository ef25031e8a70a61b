//! In-memory candidate store with (type, text) uniqueness and claim leases.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::core::candidate::{ApiKeyCandidate, SearchOrigin};
use crate::core::error::{LeakwatchError, Result};
use crate::core::traits::{CandidateStore, ClaimRequest, UpsertOutcome, VerificationUpdate};
use crate::core::types::{ApiType, KeyStatus};

#[derive(Default)]
struct Inner {
    candidates: Vec<ApiKeyCandidate>,
    /// (type, text) -> index into `candidates`.
    index: HashMap<(ApiType, String), usize>,
    next_id: u64,
}

/// The only store implementation; persistence wraps it with load/save.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                candidates: Vec::new(),
                index: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Rebuild from a persisted snapshot. Leases are not persisted, so every
    /// loaded candidate starts unclaimed.
    pub fn from_candidates(candidates: Vec<ApiKeyCandidate>) -> Self {
        let mut index = HashMap::new();
        let mut next_id = 1;
        for (i, c) in candidates.iter().enumerate() {
            index.insert((c.api_type, c.api_key.clone()), i);
            next_id = next_id.max(c.id + 1);
        }
        Self {
            inner: Mutex::new(Inner {
                candidates,
                index,
                next_id,
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| LeakwatchError::Store("store mutex poisoned".to_string()))
    }

    /// Set a moderation status directly. Moderation owns the terminal states;
    /// this bypasses the verification write path on purpose.
    pub fn set_status(&self, id: u64, status: KeyStatus) -> Result<()> {
        let mut inner = self.lock()?;
        let candidate = inner
            .candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| LeakwatchError::Store(format!("no candidate with id {}", id)))?;
        candidate.status = status;
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CandidateStore for MemoryStore {
    async fn upsert_candidate(
        &self,
        api_type: ApiType,
        api_key: &str,
        origin: &SearchOrigin,
    ) -> Result<UpsertOutcome> {
        let mut inner = self.lock()?;

        if let Some(&i) = inner.index.get(&(api_type, api_key.to_string())) {
            let candidate = &mut inner.candidates[i];
            candidate.last_seen = Utc::now();
            candidate.times_found += 1;
            return Ok(UpsertOutcome::Refreshed(candidate.id));
        }

        let id = inner.next_id;
        inner.next_id += 1;
        let candidate = ApiKeyCandidate::new(id, api_type, api_key, origin.clone());
        let i = inner.candidates.len();
        inner.candidates.push(candidate);
        inner.index.insert((api_type, api_key.to_string()), i);
        debug!(id, api_type = %api_type, "inserted new candidate");
        Ok(UpsertOutcome::Inserted(id))
    }

    async fn claim_due(&self, request: &ClaimRequest) -> Result<Vec<ApiKeyCandidate>> {
        let mut inner = self.lock()?;
        let mut claimed = Vec::new();

        for candidate in inner.candidates.iter_mut() {
            if claimed.len() >= request.limit {
                break;
            }
            if !request.verifiable_types.contains(&candidate.api_type) {
                continue;
            }
            if candidate.status.is_terminal() || candidate.status == KeyStatus::Error {
                continue;
            }
            // An unexpired lease means another worker holds this candidate.
            if let Some(until) = candidate.lease_until {
                if until > request.now {
                    continue;
                }
            }
            let due = match candidate.status {
                KeyStatus::Unverified => true,
                _ => match candidate.last_verified {
                    Some(at) => request.now - at >= request.recheck_after,
                    None => true,
                },
            };
            if !due {
                continue;
            }
            candidate.lease_until = Some(request.now + request.lease);
            claimed.push(candidate.clone());
        }

        Ok(claimed)
    }

    async fn finish_verification(&self, id: u64, update: VerificationUpdate) -> Result<()> {
        let mut inner = self.lock()?;
        let candidate = inner
            .candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| LeakwatchError::Store(format!("no candidate with id {}", id)))?;

        candidate.lease_until = None;

        // Moderation may have flagged the row while the probe was in flight.
        if candidate.status.is_terminal() {
            debug!(id, status = %candidate.status, "skipping write over terminal status");
            return Ok(());
        }

        candidate.status = update.status;
        candidate.last_verified = Some(update.verified_at);
        candidate.error_count = update.error_count;
        if let Some(metadata) = update.metadata {
            candidate.metadata = metadata;
        }
        Ok(())
    }

    async fn release_claim(&self, id: u64) -> Result<()> {
        let mut inner = self.lock()?;
        if let Some(candidate) = inner.candidates.iter_mut().find(|c| c.id == id) {
            candidate.lease_until = None;
        }
        Ok(())
    }

    async fn get(&self, api_type: ApiType, api_key: &str) -> Result<Option<ApiKeyCandidate>> {
        let inner = self.lock()?;
        Ok(inner
            .index
            .get(&(api_type, api_key.to_string()))
            .map(|&i| inner.candidates[i].clone()))
    }

    async fn snapshot(&self) -> Result<Vec<ApiKeyCandidate>> {
        let inner = self.lock()?;
        Ok(inner.candidates.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SearchSource;
    use chrono::Duration;

    fn origin() -> SearchOrigin {
        SearchOrigin::new(SearchSource::GitHub, "ghp_ in:file")
    }

    fn claim_all(now: chrono::DateTime<Utc>, types: Vec<ApiType>) -> ClaimRequest {
        ClaimRequest {
            now,
            limit: 100,
            lease: Duration::seconds(300),
            recheck_after: Duration::hours(24),
            verifiable_types: types,
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_type_and_text() {
        let store = MemoryStore::new();
        let first = store
            .upsert_candidate(ApiType::GitHub, "ghp_aaaa", &origin())
            .await
            .unwrap();
        assert!(matches!(first, UpsertOutcome::Inserted(_)));

        for _ in 0..4 {
            let again = store
                .upsert_candidate(ApiType::GitHub, "ghp_aaaa", &origin())
                .await
                .unwrap();
            assert!(matches!(again, UpsertOutcome::Refreshed(_)));
            assert_eq!(again.id(), first.id());
        }

        let c = store.get(ApiType::GitHub, "ghp_aaaa").await.unwrap().unwrap();
        assert_eq!(c.times_found, 5);
        assert_eq!(store.snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_text_different_type_is_distinct() {
        let store = MemoryStore::new();
        store
            .upsert_candidate(ApiType::GitHub, "sharedtext", &origin())
            .await
            .unwrap();
        store
            .upsert_candidate(ApiType::GitLab, "sharedtext", &origin())
            .await
            .unwrap();
        assert_eq!(store.snapshot().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_claim_hides_candidate_until_lease_expires() {
        let store = MemoryStore::new();
        store
            .upsert_candidate(ApiType::GitHub, "ghp_bbbb", &origin())
            .await
            .unwrap();

        let now = Utc::now();
        let req = claim_all(now, vec![ApiType::GitHub]);
        assert_eq!(store.claim_due(&req).await.unwrap().len(), 1);
        // Second claim while the lease is live finds nothing.
        assert_eq!(store.claim_due(&req).await.unwrap().len(), 0);

        // After the lease expires the candidate is reclaimable.
        let later = claim_all(now + Duration::seconds(301), vec![ApiType::GitHub]);
        assert_eq!(store.claim_due(&later).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_claim_skips_unverifiable_types() {
        let store = MemoryStore::new();
        store
            .upsert_candidate(ApiType::Twilio, "AC00000000000000000000000000000000", &origin())
            .await
            .unwrap();
        let req = claim_all(Utc::now(), vec![ApiType::GitHub]);
        assert!(store.claim_due(&req).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_status_is_never_overwritten() {
        let store = MemoryStore::new();
        let id = store
            .upsert_candidate(ApiType::GitHub, "ghp_cccc", &origin())
            .await
            .unwrap()
            .id();
        store.set_status(id, KeyStatus::Removed).unwrap();

        store
            .finish_verification(
                id,
                VerificationUpdate {
                    status: KeyStatus::Valid,
                    verified_at: Utc::now(),
                    error_count: 0,
                    metadata: None,
                },
            )
            .await
            .unwrap();

        let c = store.get(ApiType::GitHub, "ghp_cccc").await.unwrap().unwrap();
        assert_eq!(c.status, KeyStatus::Removed);
    }

    #[tokio::test]
    async fn test_error_status_drops_out_of_scheduling() {
        let store = MemoryStore::new();
        let id = store
            .upsert_candidate(ApiType::GitHub, "ghp_dddd", &origin())
            .await
            .unwrap()
            .id();
        store.set_status(id, KeyStatus::Error).unwrap();
        let req = claim_all(Utc::now(), vec![ApiType::GitHub]);
        assert!(store.claim_due(&req).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_working_key_due_only_when_stale() {
        let store = MemoryStore::new();
        let id = store
            .upsert_candidate(ApiType::GitHub, "ghp_eeee", &origin())
            .await
            .unwrap()
            .id();
        let now = Utc::now();
        store
            .finish_verification(
                id,
                VerificationUpdate {
                    status: KeyStatus::Valid,
                    verified_at: now,
                    error_count: 0,
                    metadata: None,
                },
            )
            .await
            .unwrap();

        let fresh = claim_all(now + Duration::hours(1), vec![ApiType::GitHub]);
        assert!(store.claim_due(&fresh).await.unwrap().is_empty());

        let stale = claim_all(now + Duration::hours(25), vec![ApiType::GitHub]);
        assert_eq!(store.claim_due(&stale).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_release_claim_makes_candidate_reclaimable() {
        let store = MemoryStore::new();
        let id = store
            .upsert_candidate(ApiType::GitHub, "ghp_ffff", &origin())
            .await
            .unwrap()
            .id();
        let req = claim_all(Utc::now(), vec![ApiType::GitHub]);
        assert_eq!(store.claim_due(&req).await.unwrap().len(), 1);
        store.release_claim(id).await.unwrap();
        assert_eq!(store.claim_due(&req).await.unwrap().len(), 1);
    }
}
