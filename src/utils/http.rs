use crate::core::error::{LeakwatchError, Result};
use curl::easy::{Easy2, Handler, WriteError};
use std::time::Duration;

/// Collector for response body and headers.
struct Collector {
    body: Vec<u8>,
    headers: Vec<(String, String)>,
}

impl Collector {
    fn new() -> Self {
        Self {
            body: Vec::new(),
            headers: Vec::new(),
        }
    }
}

impl Handler for Collector {
    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, WriteError> {
        self.body.extend_from_slice(data);
        Ok(data.len())
    }

    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(line) = std::str::from_utf8(data) {
            if let Some((name, value)) = line.split_once(':') {
                self.headers
                    .push((name.trim().to_string(), value.trim().to_string()));
            }
        }
        true
    }
}

/// HTTP client using libcurl. One client per provider type; providers differ
/// in base URLs and auth header conventions and must not share clients.
pub struct HttpClient {
    timeout: Duration,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Perform a GET request.
    pub fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut easy = Easy2::new(Collector::new());

        easy.url(url)?;
        easy.timeout(self.timeout)?;
        easy.follow_location(true)?;
        easy.max_redirections(5)?;
        easy.ssl_verify_peer(true)?;
        easy.ssl_verify_host(true)?;

        let mut list = curl::easy::List::new();
        for (key, value) in headers {
            list.append(&format!("{}: {}", key, value))?;
        }
        easy.http_headers(list)?;

        easy.perform()?;

        let response_code = easy.response_code()?;
        let collector = easy.get_ref();

        Ok(HttpResponse {
            status_code: response_code as u16,
            headers: collector.headers.clone(),
            body: collector.body.clone(),
        })
    }

    /// Perform a GET request with HTTP Basic authentication.
    pub fn get_basic_auth(
        &self,
        url: &str,
        username: &str,
        password: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let mut easy = Easy2::new(Collector::new());

        easy.url(url)?;
        easy.timeout(self.timeout)?;
        easy.username(username)?;
        easy.password(password)?;
        easy.follow_location(true)?;
        easy.max_redirections(5)?;
        easy.ssl_verify_peer(true)?;
        easy.ssl_verify_host(true)?;

        let mut list = curl::easy::List::new();
        for (key, value) in headers {
            list.append(&format!("{}: {}", key, value))?;
        }
        easy.http_headers(list)?;

        easy.perform()?;

        let response_code = easy.response_code()?;
        let collector = easy.get_ref();

        Ok(HttpResponse {
            status_code: response_code as u16,
            headers: collector.headers.clone(),
            body: collector.body.clone(),
        })
    }

    /// Perform a POST request.
    pub fn post(&self, url: &str, headers: &[(&str, &str)], body: &str) -> Result<HttpResponse> {
        let mut easy = Easy2::new(Collector::new());

        easy.url(url)?;
        easy.timeout(self.timeout)?;
        easy.post(true)?;
        easy.post_fields_copy(body.as_bytes())?;
        easy.follow_location(true)?;
        easy.max_redirections(5)?;
        easy.ssl_verify_peer(true)?;
        easy.ssl_verify_host(true)?;

        let mut list = curl::easy::List::new();
        for (key, value) in headers {
            list.append(&format!("{}: {}", key, value))?;
        }
        easy.http_headers(list)?;

        easy.perform()?;

        let response_code = easy.response_code()?;
        let collector = easy.get_ref();

        Ok(HttpResponse {
            status_code: response_code as u16,
            headers: collector.headers.clone(),
            body: collector.body.clone(),
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a synthetic response; classification rules are tested this way.
    pub fn synthetic(status_code: u16, headers: &[(&str, &str)], body: &str) -> Self {
        Self {
            status_code,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Into::into)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn body_contains(&self, needle: &str) -> bool {
        let body = self.text();
        body.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Surface curl timeouts as their own error variant so the verification
/// engine can log them distinctly; both paths are transport faults.
pub fn map_curl_error(e: curl::Error, timeout: Duration) -> LeakwatchError {
    if e.is_operation_timedout() {
        LeakwatchError::ProbeTimeout(timeout.as_secs())
    } else {
        LeakwatchError::Curl(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new();
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_http_client_custom_timeout() {
        let client = HttpClient::with_timeout(Duration::from_secs(10));
        assert_eq!(client.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let resp = HttpResponse::synthetic(403, &[("X-RateLimit-Remaining", "0")], "");
        assert_eq!(resp.header("x-ratelimit-remaining"), Some("0"));
        assert_eq!(resp.header("X-Missing"), None);
    }

    #[test]
    fn test_body_contains_ignores_case() {
        let resp = HttpResponse::synthetic(200, &[], r#"{"error":"Insufficient_Quota"}"#);
        assert!(resp.body_contains("insufficient_quota"));
        assert!(!resp.body_contains("rate limit"));
    }
}
