//! HTTP client for directory crawling
//!
//! Thin reqwest wrapper that sends every request with a constant
//! browser-identifying User-Agent and classifies failures into the
//! transient/terminal taxonomy the fetch cache retries on.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};

use crate::infrastructure::fetch_cache::{FetchError, PageFetcher};

/// Request header identifying us as a desktop browser; the directory serves
/// different markup to unknown agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.4896.127 Safari/537.36";

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout_seconds: 30,
            follow_redirects: true,
        }
    }
}

/// Plain HTTPS GET client used as the fetch cache's backend.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .cookie_store(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| classify_request_error(url, &err))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(FetchError::transient(
                url,
                format!("HTTP {status}"),
                Some(status.as_u16()),
            ));
        }
        if !status.is_success() {
            return Err(FetchError::terminal(
                url,
                format!("HTTP {status}"),
                Some(status.as_u16()),
            ));
        }

        // A connection dropped mid-body is as retryable as a failed connect.
        response
            .text()
            .await
            .map_err(|err| FetchError::transient(url, format!("body read failed: {err}"), None))
    }
}

/// Timeouts and connection-level failures retry; anything that made it to a
/// status code is classified by the code above; the rest (TLS, malformed
/// request) is terminal.
fn classify_request_error(url: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::transient(url, "request timed out", None)
    } else if err.is_connect() {
        FetchError::transient(url, format!("connection failed: {err}"), None)
    } else if let Some(status) = err.status() {
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            FetchError::transient(url, format!("HTTP {status}"), Some(status.as_u16()))
        } else {
            FetchError::terminal(url, format!("HTTP {status}"), Some(status.as_u16()))
        }
    } else {
        FetchError::terminal(url, format!("request failed: {err}"), None)
    }
}
