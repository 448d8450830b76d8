//! Application layer: the crawl orchestrator.

pub mod crawler;

pub use crawler::{CrawlEngine, CrawlStats};
