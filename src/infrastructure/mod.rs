//! Infrastructure layer: network fetch, HTML extraction, configuration,
//! logging, and export.

pub mod config;
pub mod export;
pub mod fetch_cache;
pub mod http_client;
pub mod logging;
pub mod media;
pub mod parsing;

pub use config::{AppConfig, read_input_lines};
pub use export::{default_export_filename, export_csv};
pub use fetch_cache::{FetchCache, FetchError, PageFetcher, RetryPolicy};
pub use http_client::{BROWSER_USER_AGENT, HttpClient, HttpClientConfig};
pub use media::{CachedMediaResolver, MediaResolver};
pub use parsing::{DetailParser, ListingEntry, ListingParser, SelectorConfig};
