//! Crawl orchestration
//!
//! Drives the whole pipeline: expands search targets, runs one listing job
//! per target, fans detail-page enrichment out per extracted entry, and
//! merges everything into the record store. Each listing job fetches,
//! extracts, then awaits its enrichment fan-out; a failed fetch finishes the
//! job with nothing merged. Concurrency is bounded globally by the fetch
//! cache's semaphore, so detail fetches compete with listing fetches for
//! the same request slots.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::domain::business::{BusinessKey, FieldPatch, fields, rank_field};
use crate::domain::events::{PageOutcome, ProgressSink};
use crate::domain::record_store::RecordStore;
use crate::domain::search::{SearchTarget, generate_search_targets, split_city_state};
use crate::infrastructure::fetch_cache::FetchCache;
use crate::infrastructure::media::MediaResolver;
use crate::infrastructure::parsing::{DetailParser, ListingEntry, ListingParser};

/// Summary of a finished crawl run.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStats {
    pub pages_total: usize,
    pub pages_failed: usize,
    pub records: usize,
    pub requests_issued: u64,
    pub elapsed: Duration,
}

/// The orchestrator. Cheap to clone; all components are shared.
#[derive(Clone)]
pub struct CrawlEngine {
    cache: Arc<FetchCache>,
    listing_parser: Arc<ListingParser>,
    detail_parser: Arc<DetailParser>,
    media: Arc<dyn MediaResolver>,
    store: Arc<RecordStore>,
    progress: Arc<dyn ProgressSink>,
    domain: String,
}

impl CrawlEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cache: Arc<FetchCache>,
        listing_parser: Arc<ListingParser>,
        detail_parser: Arc<DetailParser>,
        media: Arc<dyn MediaResolver>,
        store: Arc<RecordStore>,
        progress: Arc<dyn ProgressSink>,
        domain: String,
    ) -> Self {
        Self {
            cache,
            listing_parser,
            detail_parser,
            media,
            store,
            progress,
            domain: domain.trim_end_matches('/').to_string(),
        }
    }

    /// Crawl every (location, query, page) combination to completion.
    pub async fn run(
        &self,
        locations: &[String],
        queries: &[String],
        page_limit: u32,
    ) -> CrawlStats {
        let session_id = Uuid::new_v4();
        let targets = generate_search_targets(locations, queries, page_limit);
        let total = targets.len();
        let started = Instant::now();
        info!(
            %session_id,
            locations = locations.len(),
            queries = queries.len(),
            page_limit,
            "starting crawl session over {total} search pages"
        );

        let mut jobs = JoinSet::new();
        for target in targets {
            let engine = self.clone();
            jobs.spawn(async move { engine.process_listing_page(target).await });
        }

        let mut completed = 0_usize;
        let mut failed = 0_usize;
        while let Some(joined) = jobs.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!("listing job aborted: {err}");
                    PageOutcome::FetchFailed
                }
            };
            completed += 1;
            if outcome == PageOutcome::FetchFailed {
                failed += 1;
            }
            self.progress.on_page_complete(completed, total, &outcome);
        }

        let stats = CrawlStats {
            pages_total: total,
            pages_failed: failed,
            records: self.store.len().await,
            requests_issued: self.cache.request_count(),
            elapsed: started.elapsed(),
        };
        info!(
            %session_id,
            pages_failed = stats.pages_failed,
            records = stats.records,
            requests = stats.requests_issued,
            "crawl session finished in {:.1?}",
            stats.elapsed
        );
        stats
    }

    /// One listing job: fetch, extract, merge summaries, await the page's
    /// enrichment fan-out. Other pages keep running while this one waits on
    /// its detail links.
    async fn process_listing_page(&self, target: SearchTarget) -> PageOutcome {
        let url = target.url(&self.domain);
        debug!(%url, "fetching listing page");

        let body = match self.cache.fetch(&url).await {
            Ok(body) => body,
            Err(err) => {
                warn!(%url, "listing page unavailable: {err}");
                return PageOutcome::FetchFailed;
            }
        };

        let entries = self.listing_parser.parse(&body);
        debug!(%url, "extracted {} listing entries", entries.len());

        let (city, state) = split_city_state(&target.location);
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let mut enrichments = Vec::new();
        for entry in &entries {
            let key = entry.key();
            let summary = self.summary_patch(entry, &target, &city, &state, &timestamp);
            self.store.merge(&key, &summary).await;

            for link in &entry.detail_links {
                enrichments.push(self.enrich(key.clone(), self.resolve_link(link)));
            }
        }

        // This page waits for its own detail fan-out; other pages' jobs keep
        // running meanwhile.
        let enriched = join_all(enrichments)
            .await
            .into_iter()
            .filter(|merged| *merged)
            .count();

        PageOutcome::Completed {
            entries: entries.len(),
            enriched,
        }
    }

    /// One detail-page enrichment. Returns whether a patch was merged; a
    /// failed fetch leaves the summary record intact.
    async fn enrich(&self, key: BusinessKey, url: String) -> bool {
        debug!(%url, "enriching {key}");
        let body = match self.cache.fetch(&url).await {
            Ok(body) => body,
            Err(err) => {
                debug!(%url, "detail page unavailable: {err}");
                return false;
            }
        };

        let mut patch = self.detail_parser.parse(&body);
        let mut gallery_images = String::new();
        if let Some(link) = self.detail_parser.gallery_link(&body) {
            let gallery_url = self.resolve_link(&link);
            if let Some(markup) = self.media.resolve(&gallery_url).await {
                gallery_images = self.detail_parser.gallery_images(&markup);
            }
        }
        patch.insert(fields::MEDIA_GALLERY.to_string(), gallery_images);

        self.store.merge(&key, &patch).await;
        true
    }

    /// Summary patch from a listing entry plus its search context.
    fn summary_patch(
        &self,
        entry: &ListingEntry,
        target: &SearchTarget,
        city: &str,
        state: &str,
        timestamp: &str,
    ) -> FieldPatch {
        let detail_url = entry
            .detail_links
            .first()
            .map(|link| self.resolve_link(link))
            .unwrap_or_default();

        let mut patch = FieldPatch::new();
        patch.insert(fields::NAME.to_string(), entry.name.clone());
        patch.insert(fields::PHONE.to_string(), entry.phone.clone());
        patch.insert(fields::ADDRESS.to_string(), entry.address.clone());
        patch.insert(fields::WEBSITE.to_string(), entry.website.clone());
        patch.insert(fields::OPEN_NOW.to_string(), entry.open_now.clone());
        patch.insert(fields::DETAIL_URL.to_string(), detail_url);
        patch.insert(fields::CITY.to_string(), city.to_string());
        patch.insert(fields::STATE.to_string(), state.to_string());
        patch.insert(fields::SEARCH_DATETIME.to_string(), timestamp.to_string());
        patch.insert(rank_field(&target.query), entry.rank.clone());
        patch
    }

    /// Absolute URL for a listing/detail href against the directory domain.
    fn resolve_link(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        match Url::parse(&self.domain).and_then(|base| base.join(href)) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}/{}", self.domain, href.trim_start_matches('/')),
        }
    }
}
