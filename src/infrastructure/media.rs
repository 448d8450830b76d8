//! Media gallery resolver
//!
//! The gallery page may need a browser-rendering step on some deployments;
//! the core only ever sees final markup through this trait. The default
//! resolver issues a plain GET through the shared fetch cache, so repeated
//! galleries cost one request like every other URL.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::infrastructure::fetch_cache::FetchCache;

/// Produces gallery markup for a gallery URL, or nothing when the gallery
/// cannot be obtained. Failure here never aborts enrichment.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Option<Arc<str>>;
}

/// Default resolver: gallery pages go through the fetch cache.
pub struct CachedMediaResolver {
    cache: Arc<FetchCache>,
}

impl CachedMediaResolver {
    pub fn new(cache: Arc<FetchCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl MediaResolver for CachedMediaResolver {
    async fn resolve(&self, url: &str) -> Option<Arc<str>> {
        match self.cache.fetch(url).await {
            Ok(body) => Some(body),
            Err(err) => {
                debug!(url, "gallery unavailable: {err}");
                None
            }
        }
    }
}
