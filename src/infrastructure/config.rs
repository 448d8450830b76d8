//! Application configuration
//!
//! JSON-backed configuration with defaults matching the directory the tool
//! ships against. Input location/query lists are newline-delimited text
//! files; failing to read them is the run's only fatal error and happens
//! before any network activity.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::infrastructure::fetch_cache::RetryPolicy;
use crate::infrastructure::http_client::BROWSER_USER_AGENT;
use crate::infrastructure::parsing::SelectorConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory root, scheme included, no trailing slash.
    pub domain: String,
    pub user_agent: String,
    /// Search pages fetched per (location, query) pair.
    pub page_limit: u32,
    /// Global in-flight request bound shared by listing and detail fetches.
    pub max_concurrent_requests: usize,
    pub request_timeout_seconds: u64,
    pub retry: RetryPolicy,
    pub selectors: SelectorConfig,
    pub cities_file: PathBuf,
    pub queries_file: PathBuf,
    pub export_dir: PathBuf,
    /// Fixed tail of the export column order.
    pub column_order: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            domain: "https://www.yellowpages.com".to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            page_limit: 2,
            max_concurrent_requests: 40,
            request_timeout_seconds: 30,
            retry: RetryPolicy::default(),
            selectors: SelectorConfig::default(),
            cities_file: PathBuf::from("data/cities.txt"),
            queries_file: PathBuf::from("data/queries.txt"),
            export_dir: PathBuf::from("exports"),
            column_order: crate::domain::business::BASE_COLUMNS
                .iter()
                .map(|column| column.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    /// Load from a JSON file, or fall back to defaults when no path given.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("cannot read config file {}", path.display()))?;
                let config: Self = serde_json::from_str(&raw)
                    .with_context(|| format!("invalid config file {}", path.display()))?;
                info!("loaded configuration from {}", path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Trimmed, non-empty lines of an input list file.
pub async fn read_input_lines(path: &Path) -> Result<Vec<String>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read input list {}", path.display()))?;
    let lines: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    if lines.is_empty() {
        bail!("input list {} contains no entries", path.display());
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_shipping_directory() {
        let config = AppConfig::default();
        assert_eq!(config.domain, "https://www.yellowpages.com");
        assert_eq!(config.page_limit, 2);
        assert_eq!(config.max_concurrent_requests, 40);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.column_order.first().map(String::as_str), Some("name"));
    }

    #[tokio::test]
    async fn partial_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"page_limit": 7, "max_concurrent_requests": 3}}"#).unwrap();

        let config = AppConfig::load_or_default(Some(file.path())).await.unwrap();
        assert_eq!(config.page_limit, 7);
        assert_eq!(config.max_concurrent_requests, 3);
        assert_eq!(config.domain, "https://www.yellowpages.com");
    }

    #[tokio::test]
    async fn missing_config_file_is_an_error() {
        let result = AppConfig::load_or_default(Some(Path::new("/nonexistent/config.json"))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn input_lines_are_trimmed_and_filtered() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Austin, TX\n\n  Dallas, TX  \n").unwrap();

        let lines = read_input_lines(file.path()).await.unwrap();
        assert_eq!(lines, vec!["Austin, TX".to_string(), "Dallas, TX".to_string()]);
    }

    #[tokio::test]
    async fn unreadable_input_list_is_fatal() {
        assert!(read_input_lines(Path::new("/nonexistent/cities.txt")).await.is_err());
    }

    #[tokio::test]
    async fn empty_input_list_is_fatal() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(read_input_lines(file.path()).await.is_err());
    }
}
