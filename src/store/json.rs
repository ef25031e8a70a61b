//! Snapshot persistence for the candidate store. Scrape and verify runs are
//! separate processes sharing one JSON file.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::core::candidate::ApiKeyCandidate;
use crate::core::error::Result;
use crate::core::traits::CandidateStore;

use super::memory::MemoryStore;

/// Load a store from `path`, or start empty if the file does not exist yet.
pub fn load_store(path: &str) -> Result<MemoryStore> {
    if !Path::new(path).exists() {
        info!("No store file at {}, starting empty", path);
        return Ok(MemoryStore::new());
    }
    let contents = fs::read_to_string(path)?;
    let candidates: Vec<ApiKeyCandidate> = serde_json::from_str(&contents)?;
    info!("Loaded {} candidates from {}", candidates.len(), path);
    Ok(MemoryStore::from_candidates(candidates))
}

/// Write the full snapshot back. Writes to a sibling temp file first so a
/// crash mid-write cannot truncate the store.
pub async fn save_store(store: &MemoryStore, path: &str) -> Result<()> {
    let snapshot = store.snapshot().await?;
    let json = serde_json::to_string_pretty(&snapshot)?;
    let tmp = format!("{}.tmp", path);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    info!("Saved {} candidates to {}", snapshot.len(), path);
    Ok(())
}
