//! Shared probe plumbing and the default response-classification rules.
//!
//! Every provider maps raw HTTP responses into the outcome taxonomy with a
//! small number of recurring rules; the recurring part lives here and each
//! provider parameterizes or overrides it.

use std::time::Duration;

use crate::core::error::{LeakwatchError, Result};
use crate::core::outcome::ValidationOutcome;
use crate::core::traits::ProviderDescriptor;
use crate::utils::http::map_curl_error;
use crate::utils::{HttpClient, HttpResponse};

/// Keeps operator diagnostics bounded; provider APIs can return arbitrarily
/// large error bodies.
pub const RESPONSE_TRUNCATE_LEN: usize = 500;

/// Body substrings that turn a response into `ValidNoCredits`: the key
/// authenticated, the account just cannot pay for the call.
pub const QUOTA_MARKERS: &[&str] = &[
    "insufficient_quota",
    "exceeded your current quota",
    "insufficient credits",
    "quota exceeded",
    "payment required",
    "billing_not_active",
    "billing hard limit",
];

pub fn truncate_response(body: &str) -> String {
    if body.len() <= RESPONSE_TRUNCATE_LEN {
        return body.to_string();
    }
    let mut end = RESPONSE_TRUNCATE_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

fn has_quota_marker(response: &HttpResponse) -> bool {
    QUOTA_MARKERS.iter().any(|m| response.body_contains(m))
}

/// What an HTTP 429 means for this provider. Either way the credential passed
/// authentication before being throttled; it is never invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimited {
    /// Treat as a plain successful authentication.
    Success,
    /// Treat as authenticated-but-unusable.
    ValidNoCredits,
}

/// Per-provider variance knobs over the shared classification rules.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyRules {
    /// 403 means rejection for most providers; some overload it to mean
    /// "authenticated but under-scoped", which is a working key.
    pub forbidden_is_unauthorized: bool,
    pub on_rate_limited: RateLimited,
    /// 404 from an endpoint the key might simply lack a scope for.
    pub not_found_is_success: bool,
}

impl Default for ClassifyRules {
    fn default() -> Self {
        Self {
            forbidden_is_unauthorized: true,
            on_rate_limited: RateLimited::Success,
            not_found_is_success: false,
        }
    }
}

/// Default mapping from an HTTP response to an outcome. Providers with more
/// exotic semantics (body-level success flags, rate-limit headers) override
/// `classify` entirely instead of bending these rules.
pub fn classify_with(response: &HttpResponse, rules: &ClassifyRules) -> ValidationOutcome {
    if response.is_success() {
        if has_quota_marker(response) {
            return ValidationOutcome::valid_no_credits(response.status_code);
        }
        return ValidationOutcome::success(response.status_code);
    }

    match response.status_code {
        401 => ValidationOutcome::unauthorized(response.status_code),
        403 => {
            if rules.forbidden_is_unauthorized {
                ValidationOutcome::unauthorized(response.status_code)
            } else {
                ValidationOutcome::success(response.status_code)
            }
        }
        // The account authenticated and then hit a billing wall.
        402 => ValidationOutcome::valid_no_credits(response.status_code),
        404 if rules.not_found_is_success => ValidationOutcome::success(response.status_code),
        429 => match rules.on_rate_limited {
            RateLimited::Success => ValidationOutcome::success(response.status_code),
            RateLimited::ValidNoCredits => ValidationOutcome::valid_no_credits(response.status_code),
        },
        status => ValidationOutcome::http_error(
            status,
            format!(
                "API request failed with status {}. Response: {}",
                status,
                truncate_response(&response.text())
            ),
        ),
    }
}

/// Defensive outcome for providers whose authentication needs information a
/// bare credential string cannot supply.
pub fn unverifiable(descriptor: &ProviderDescriptor) -> ValidationOutcome {
    ValidationOutcome::provider_specific(
        descriptor
            .verification_disabled_reason
            .unwrap_or("provider cannot be verified from a bare credential"),
    )
}

const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Perform a GET probe on the blocking pool (curl is sync). Curl timeouts are
/// surfaced as `ProbeTimeout` so they take the transport-fault path.
pub async fn probe_get(url: String, headers: Vec<(String, String)>) -> Result<HttpResponse> {
    tokio::task::spawn_blocking(move || {
        let client = HttpClient::with_timeout(PROBE_TIMEOUT);
        let header_refs: Vec<(&str, &str)> =
            headers.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        client.get(&url, &header_refs)
    })
    .await
    .map_err(|e| LeakwatchError::Unknown(format!("Task join error: {}", e)))?
    .map_err(|e| match e {
        LeakwatchError::Curl(c) => map_curl_error(c, PROBE_TIMEOUT),
        other => other,
    })
}

/// Perform a GET probe authenticated with HTTP Basic credentials.
pub async fn probe_get_basic_auth(
    url: String,
    username: String,
    password: String,
) -> Result<HttpResponse> {
    tokio::task::spawn_blocking(move || {
        let client = HttpClient::with_timeout(PROBE_TIMEOUT);
        client.get_basic_auth(&url, &username, &password, &[])
    })
    .await
    .map_err(|e| LeakwatchError::Unknown(format!("Task join error: {}", e)))?
    .map_err(|e| match e {
        LeakwatchError::Curl(c) => map_curl_error(c, PROBE_TIMEOUT),
        other => other,
    })
}

/// Perform a POST probe on the blocking pool.
pub async fn probe_post(
    url: String,
    headers: Vec<(String, String)>,
    body: String,
) -> Result<HttpResponse> {
    tokio::task::spawn_blocking(move || {
        let client = HttpClient::with_timeout(PROBE_TIMEOUT);
        let header_refs: Vec<(&str, &str)> =
            headers.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        client.post(&url, &header_refs, &body)
    })
    .await
    .map_err(|e| LeakwatchError::Unknown(format!("Task join error: {}", e)))?
    .map_err(|e| match e {
        LeakwatchError::Curl(c) => map_curl_error(c, PROBE_TIMEOUT),
        other => other,
    })
}
