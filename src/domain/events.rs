//! Crawl progress events
//!
//! Coarse progress reporting for the orchestrator. The sink is an
//! observational side channel; nothing downstream gates on it.

use serde::Serialize;
use tracing::{info, warn};

/// Terminal outcome of one listing-page job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PageOutcome {
    /// Page fetched and extracted; all detail fan-out for it has settled.
    Completed { entries: usize, enriched: usize },
    /// Fetch ended in a terminal failure; the page contributed no records.
    FetchFailed,
}

/// Receiver for jobs-completed/total progress.
pub trait ProgressSink: Send + Sync {
    fn on_page_complete(&self, completed: usize, total: usize, outcome: &PageOutcome);
}

/// Default sink: log lines through `tracing`.
#[derive(Debug, Default)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn on_page_complete(&self, completed: usize, total: usize, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Completed { entries, enriched } => {
                info!("page {completed}/{total} done ({entries} entries, {enriched} detail pages)");
            }
            PageOutcome::FetchFailed => {
                warn!("page {completed}/{total} failed to fetch");
            }
        }
    }
}

/// Sink that drops everything; used by tests.
#[derive(Debug, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_page_complete(&self, _completed: usize, _total: usize, _outcome: &PageOutcome) {}
}
