use leakwatch::core::candidate::SearchOrigin;
use leakwatch::core::traits::{CandidateStore, UpsertOutcome};
use leakwatch::core::types::{ApiType, KeyStatus, SearchSource};
use leakwatch::registry::ProviderRegistry;
use leakwatch::scraper::ExtractionEngine;
use leakwatch::store::MemoryStore;

fn github_token() -> String {
    format!("ghp_{}", "a1B2".repeat(9))
}

fn gitlab_token() -> String {
    format!("glpat-{}", "xY9z".repeat(5))
}

fn origin() -> SearchOrigin {
    SearchOrigin::new(SearchSource::GitHub, "extension:env")
}

#[tokio::test]
async fn test_same_key_across_many_blobs_yields_one_candidate() {
    let registry = ProviderRegistry::with_builtins();
    let engine = ExtractionEngine::new(&registry);
    let store = MemoryStore::new();

    let token = github_token();
    let blobs: Vec<String> = (0..5)
        .map(|i| format!("# config {}\nGITHUB_TOKEN={}\n", i, token))
        .collect();

    for blob in &blobs {
        for extraction in engine.extract(blob) {
            store
                .upsert_candidate(extraction.api_type, &extraction.text, &origin())
                .await
                .unwrap();
        }
    }

    let snapshot = store.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1, "re-discovery must not insert duplicates");
    assert_eq!(snapshot[0].times_found, 5);
    assert_eq!(snapshot[0].status, KeyStatus::Unverified);
}

#[tokio::test]
async fn test_mixed_blob_produces_one_candidate_per_credential() {
    let registry = ProviderRegistry::with_builtins();
    let engine = ExtractionEngine::new(&registry);
    let store = MemoryStore::new();

    let ghp = github_token();
    let glpat = gitlab_token();
    // The GitHub token appears twice in the same blob.
    let blob = format!("A={}\nB={}\nC={}\n", ghp, glpat, ghp);

    let mut inserted = 0;
    for extraction in engine.extract(&blob) {
        if let UpsertOutcome::Inserted(_) = store
            .upsert_candidate(extraction.api_type, &extraction.text, &origin())
            .await
            .unwrap()
        {
            inserted += 1;
        }
    }

    assert_eq!(inserted, 2, "two distinct credentials, two rows");
    assert_eq!(store.snapshot().await.unwrap().len(), 2);
    let github = store.get(ApiType::GitHub, &ghp).await.unwrap().unwrap();
    // Both occurrences of the GitHub token count.
    assert_eq!(github.times_found, 2);
    let gitlab = store.get(ApiType::GitLab, &glpat).await.unwrap().unwrap();
    assert_eq!(gitlab.times_found, 1);
}

#[tokio::test]
async fn test_extraction_only_yields_scraper_enabled_types() {
    let registry = ProviderRegistry::with_builtins();
    let engine = ExtractionEngine::new(&registry);

    // Datadog patterns exist but the provider is retired from scraping, so a
    // 32-hex blob must extract nothing at all.
    let blob = format!("DD_API_KEY={}\n", "4f".repeat(16));
    let found = engine.extract(&blob);
    assert!(
        found.iter().all(|e| e.api_type != ApiType::Datadog),
        "retired provider must not contribute extractions"
    );
}
