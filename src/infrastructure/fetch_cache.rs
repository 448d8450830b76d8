//! Deduplicating fetch layer with retry and single-flight semantics
//!
//! Every network request in a run goes through one shared [`FetchCache`].
//! The first caller for a URL performs the request (retrying transient
//! failures with exponential backoff); everyone else gets the cached
//! outcome, including callers that arrive while the first request is still
//! in flight. Terminal failures are cached too, so a bad URL costs the run
//! exactly one retry sequence.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell, Semaphore};
use tracing::{debug, warn};

/// Fetch failure, classified for retry.
///
/// `Transient` exists only inside the retry loop; cache callers only ever
/// observe `Terminal` and must treat it as "no content" for that URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transient fetch failure for {url}: {reason}")]
    Transient {
        url: String,
        reason: String,
        status: Option<u16>,
    },

    #[error("terminal fetch failure for {url}: {reason}")]
    Terminal {
        url: String,
        reason: String,
        status: Option<u16>,
    },
}

impl FetchError {
    pub fn transient(url: &str, reason: impl Into<String>, status: Option<u16>) -> Self {
        Self::Transient {
            url: url.to_string(),
            reason: reason.into(),
            status,
        }
    }

    pub fn terminal(url: &str, reason: impl Into<String>, status: Option<u16>) -> Self {
        Self::Terminal {
            url: url.to_string(),
            reason: reason.into(),
            status,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transient { status, .. } | Self::Terminal { status, .. } => *status,
        }
    }

    /// Demote an exhausted transient failure to the terminal form recorded
    /// in the cache.
    fn into_terminal(self) -> Self {
        match self {
            Self::Transient {
                url,
                reason,
                status,
            } => Self::Terminal {
                url,
                reason,
                status,
            },
            terminal => terminal,
        }
    }
}

/// Raw page source: one HTTP GET, classified into [`FetchError`] on failure.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

/// Bounded exponential backoff for transient failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per URL, first try included.
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff_ms: 500,
            max_backoff_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following attempt `attempt` (1-based):
    /// base · 2^(attempt − 1) plus jitter, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt.saturating_sub(1)));
        let jitter = fastrand::u64(0..=self.base_backoff_ms.max(1) / 2);
        Duration::from_millis(exponential.saturating_add(jitter).min(self.max_backoff_ms))
    }
}

type CacheCell = Arc<OnceCell<Result<Arc<str>, FetchError>>>;

/// Shared, write-once-per-URL fetch cache.
pub struct FetchCache {
    backend: Arc<dyn PageFetcher>,
    limiter: Arc<Semaphore>,
    retry: RetryPolicy,
    entries: Mutex<HashMap<String, CacheCell>>,
    requests_issued: AtomicU64,
}

impl FetchCache {
    pub fn new(backend: Arc<dyn PageFetcher>, max_concurrency: usize, retry: RetryPolicy) -> Self {
        Self {
            backend,
            limiter: Arc::new(Semaphore::new(max_concurrency.max(1))),
            retry,
            entries: Mutex::new(HashMap::new()),
            requests_issued: AtomicU64::new(0),
        }
    }

    /// Page body for `url`, fetched at most once per run.
    ///
    /// Errors returned here are always terminal; callers proceed with "no
    /// content" instead of aborting the pipeline.
    pub async fn fetch(&self, url: &str) -> Result<Arc<str>, FetchError> {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries
                .entry(url.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };
        cell.get_or_init(|| self.fetch_with_retry(url)).await.clone()
    }

    /// Network calls actually issued so far (cache misses × attempts).
    pub fn request_count(&self) -> u64 {
        self.requests_issued.load(Ordering::Relaxed)
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<Arc<str>, FetchError> {
        let mut attempt = 1_u32;
        loop {
            let result = {
                let _permit = match self.limiter.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return Err(FetchError::terminal(url, "fetch limiter closed", None)),
                };
                self.requests_issued.fetch_add(1, Ordering::Relaxed);
                self.backend.fetch_page(url).await
            };

            match result {
                Ok(body) => {
                    debug!(url, attempt, "fetched ({} bytes)", body.len());
                    return Ok(Arc::from(body));
                }
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    debug!(url, attempt, "transient failure, retrying in {delay:?}: {err}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(url, attempt, "giving up: {err}");
                    return Err(err.into_terminal());
                }
            }
        }
    }
}
