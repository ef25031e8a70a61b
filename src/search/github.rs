//! GitHub code search client. Uses the text-match media type so matched
//! fragments arrive with the search response and no file downloads are needed.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::core::error::{LeakwatchError, Result};
use crate::core::traits::{SearchClient, SearchHit};
use crate::core::types::SearchSource;
use crate::utils::{HttpClient, HttpResponse, RateLimiter};

const PER_PAGE: usize = 100;
// GitHub caps code search at 1000 results.
const MAX_PAGES: usize = 10;

#[derive(Debug, Deserialize)]
struct CodeSearchResponse {
    total_count: u64,
    items: Vec<CodeSearchItem>,
}

#[derive(Debug, Deserialize)]
struct CodeSearchItem {
    path: String,
    repository: Repository,
    #[serde(default)]
    text_matches: Vec<TextMatch>,
}

#[derive(Debug, Deserialize)]
struct TextMatch {
    fragment: String,
}

#[derive(Debug, Deserialize)]
struct Repository {
    full_name: String,
}

pub struct GitHubSearchClient {
    base_url: String,
    rate_limiter: RateLimiter,
}

impl GitHubSearchClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            rate_limiter: RateLimiter::with_delay(Duration::from_millis(2000)),
        }
    }

    async fn fetch_page(&self, url: &str, token: &str) -> Result<HttpResponse> {
        let url = url.to_string();
        let token = token.to_string();
        tokio::task::spawn_blocking(move || {
            let client = HttpClient::new();
            let auth = format!("token {}", token);
            let headers = vec![
                // Text matches give us snippets without downloading files.
                ("Accept", "application/vnd.github.text-match+json"),
                ("User-Agent", "curl/7.68.0"),
                ("Authorization", auth.as_str()),
            ];
            client.get(&url, &headers)
        })
        .await
        .map_err(|e| LeakwatchError::Unknown(format!("Task join error: {}", e)))?
    }

    fn page_url(&self, query: &str, page: usize) -> String {
        format!(
            "{}/search/code?q={}&per_page={}&page={}",
            self.base_url,
            urlencoding::encode(query),
            PER_PAGE,
            page
        )
    }

    fn is_rate_limited(response: &HttpResponse) -> bool {
        response.status_code == 429
            || (response.status_code == 403
                && response.header("X-RateLimit-Remaining") == Some("0"))
    }
}

#[async_trait]
impl SearchClient for GitHubSearchClient {
    fn source(&self) -> SearchSource {
        SearchSource::GitHub
    }

    async fn search(&self, query: &str, token: &str) -> Result<Vec<SearchHit>> {
        info!("Searching GitHub for: {}", query);

        self.rate_limiter.wait().await;
        let first = self.fetch_page(&self.page_url(query, 1), token).await?;

        if Self::is_rate_limited(&first) {
            return Err(LeakwatchError::Search(
                "GitHub search rate limit exceeded".to_string(),
            ));
        }
        if !first.is_success() {
            return Err(LeakwatchError::Search(format!(
                "GitHub API returned {}: {}",
                first.status_code,
                first.text()
            )));
        }

        let parsed: CodeSearchResponse = first.json()?;
        let total_count = parsed.total_count;
        info!("Found {} total results on GitHub", total_count);

        let mut items = parsed.items;
        let total_pages = ((total_count as usize + PER_PAGE - 1) / PER_PAGE)
            .min(MAX_PAGES)
            .max(1);

        for page in 2..=total_pages {
            self.rate_limiter.wait().await;
            let response = match self.fetch_page(&self.page_url(query, page), token).await {
                Ok(r) => r,
                Err(e) => {
                    warn!("Error fetching page {}: {}", page, e);
                    break;
                }
            };

            if Self::is_rate_limited(&response) {
                warn!("Rate limited on page {}, stopping pagination", page);
                break;
            }
            if !response.is_success() {
                warn!("Error on page {}: HTTP {}", page, response.status_code);
                break;
            }

            match response.json::<CodeSearchResponse>() {
                Ok(page_response) => {
                    let count = page_response.items.len();
                    items.extend(page_response.items);
                    debug!("Page {}/{}: +{} results", page, total_pages, count);
                    if count == 0 {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to parse page {}: {}", page, e);
                    break;
                }
            }
        }

        let hits = items
            .into_iter()
            .flat_map(|item| {
                let repository = item.repository.full_name;
                let path = item.path;
                item.text_matches
                    .into_iter()
                    .map(move |m| SearchHit {
                        text: m.fragment,
                        repository: repository.clone(),
                        file_path: path.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        info!("Collected {} text fragments", hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_encodes_query() {
        let client = GitHubSearchClient::new("https://api.github.com".to_string());
        let url = client.page_url("ghp_ in:file extension:env", 2);
        assert!(url.contains("q=ghp_%20in%3Afile%20extension%3Aenv"));
        assert!(url.contains("page=2"));
    }

    #[test]
    fn test_rate_limit_detection() {
        let plain_403 = HttpResponse::synthetic(403, &[], "");
        assert!(!GitHubSearchClient::is_rate_limited(&plain_403));

        let exhausted = HttpResponse::synthetic(403, &[("X-RateLimit-Remaining", "0")], "");
        assert!(GitHubSearchClient::is_rate_limited(&exhausted));

        let throttled = HttpResponse::synthetic(429, &[], "");
        assert!(GitHubSearchClient::is_rate_limited(&throttled));
    }

    #[test]
    fn test_parse_text_match_payload() {
        let body = r#"{
            "total_count": 1,
            "items": [{
                "path": ".env",
                "repository": {"full_name": "acme/site"},
                "text_matches": [{"fragment": "GITHUB_TOKEN=ghp_abc"}]
            }]
        }"#;
        let parsed: CodeSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.total_count, 1);
        assert_eq!(parsed.items[0].text_matches[0].fragment, "GITHUB_TOKEN=ghp_abc");
    }
}
