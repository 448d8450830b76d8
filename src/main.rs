//! CLI entry point: load config and input lists, run the crawl, export CSV.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::info;

use ypharvest::application::CrawlEngine;
use ypharvest::domain::{LogProgressSink, RecordStore};
use ypharvest::infrastructure::{
    AppConfig, CachedMediaResolver, DetailParser, FetchCache, HttpClient, HttpClientConfig,
    ListingParser, default_export_filename, export_csv, read_input_lines,
};

#[derive(Parser, Debug)]
#[command(name = "ypharvest")]
#[command(about = "Crawl a business directory across locations and queries, export merged CSV")]
#[command(version)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Newline-delimited list of locations to search
    #[arg(short = 'c', long)]
    cities: Option<PathBuf>,

    /// Newline-delimited list of search queries
    #[arg(short = 'q', long)]
    queries: Option<PathBuf>,

    /// Pages of results to fetch per (location, query) pair
    #[arg(short, long)]
    pages: Option<u32>,

    /// Maximum concurrent requests
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Output CSV path; an existing file is merged and deduplicated
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    ypharvest::infrastructure::logging::init_logging(cli.verbose)?;

    let mut config = AppConfig::load_or_default(cli.config.as_deref()).await?;
    if let Some(cities) = cli.cities {
        config.cities_file = cities;
    }
    if let Some(queries) = cli.queries {
        config.queries_file = queries;
    }
    if let Some(pages) = cli.pages {
        config.page_limit = pages;
    }
    if let Some(concurrency) = cli.concurrency {
        config.max_concurrent_requests = concurrency;
    }

    // Input lists are the only fatal error, checked before any network work.
    let locations = read_input_lines(&config.cities_file).await?;
    let queries = read_input_lines(&config.queries_file).await?;

    let client = Arc::new(HttpClient::new(&HttpClientConfig {
        user_agent: config.user_agent.clone(),
        timeout_seconds: config.request_timeout_seconds,
        follow_redirects: true,
    })?);
    let cache = Arc::new(FetchCache::new(
        client,
        config.max_concurrent_requests,
        config.retry.clone(),
    ));
    let store = Arc::new(RecordStore::new());
    let engine = CrawlEngine::new(
        Arc::clone(&cache),
        Arc::new(ListingParser::with_config(&config.selectors.listing)?),
        Arc::new(DetailParser::with_config(&config.selectors.detail)?),
        Arc::new(CachedMediaResolver::new(Arc::clone(&cache))),
        Arc::clone(&store),
        Arc::new(LogProgressSink),
        config.domain.clone(),
    );

    let stats = engine.run(&locations, &queries, config.page_limit).await;

    let output = cli.output.unwrap_or_else(|| {
        config
            .export_dir
            .join(default_export_filename(chrono::Local::now()))
    });
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create export directory {}", parent.display()))?;
        }
    }
    let snapshot = store.snapshot().await;
    let rows = export_csv(&snapshot, &config.column_order, &output)?;

    let secs = stats.elapsed.as_secs();
    info!("saved {} rows to {}", rows, output.display());
    info!(
        "total time taken: {} hours, {} minutes, {} seconds",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    );
    Ok(())
}
