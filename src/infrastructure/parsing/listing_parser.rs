//! Listing page parser
//!
//! Extracts business summary entries from a search-results page. Paid
//! advertisements are skipped; every missing sub-field resolves to empty
//! string; a page with no entries is a valid end-of-results, not an error.

use anyhow::Result;
use scraper::{Html, Selector};
use tracing::debug;

use super::config::ListingSelectors;
use super::{attr_or_empty, compile_selector, text_or_empty};
use crate::domain::business::BusinessKey;

/// One business summary extracted from a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    /// Leading integer of the rank label ("3. Joe's Diner" gives "3").
    pub rank: String,
    pub phone: String,
    pub address: String,
    /// "Open now" status text when the entry shows one.
    pub open_now: String,
    pub website: String,
    /// Detail-page hrefs for this entry; several links (name, photo) may
    /// point at the same business.
    pub detail_links: Vec<String>,
}

impl ListingEntry {
    /// Identity key for dedup/merge.
    pub fn key(&self) -> BusinessKey {
        BusinessKey::new(&self.name, &self.address)
    }
}

/// Parser for search-result pages.
pub struct ListingParser {
    entry: Selector,
    ad_marker: Selector,
    name: Selector,
    rank: Selector,
    phone: Selector,
    address: Selector,
    open_status: Selector,
    website: Selector,
    detail_link: Selector,
}

impl ListingParser {
    pub fn new() -> Result<Self> {
        Self::with_config(&ListingSelectors::default())
    }

    pub fn with_config(selectors: &ListingSelectors) -> Result<Self> {
        Ok(Self {
            entry: compile_selector(&selectors.entry)?,
            ad_marker: compile_selector(&selectors.ad_marker)?,
            name: compile_selector(&selectors.name)?,
            rank: compile_selector(&selectors.rank)?,
            phone: compile_selector(&selectors.phone)?,
            address: compile_selector(&selectors.address)?,
            open_status: compile_selector(&selectors.open_status)?,
            website: compile_selector(&selectors.website)?,
            detail_link: compile_selector(&selectors.detail_link)?,
        })
    }

    /// All non-ad entries on the page, in page order.
    pub fn parse(&self, body: &str) -> Vec<ListingEntry> {
        let html = Html::parse_document(body);
        let mut entries = Vec::new();

        for element in html.select(&self.entry) {
            let ad_marker = text_or_empty(element, &self.ad_marker, " ");
            if !ad_marker.is_empty() {
                debug!("skipping ad entry ({ad_marker})");
                continue;
            }

            let name = text_or_empty(element, &self.name, " ");
            if name.is_empty() {
                // No name means no identity key; nothing to merge under.
                debug!("skipping listing entry without a name");
                continue;
            }

            let rank_label = text_or_empty(element, &self.rank, " ");
            let detail_links: Vec<String> = element
                .select(&self.detail_link)
                .filter_map(|anchor| anchor.value().attr("href"))
                .filter(|href| !href.contains('#'))
                .map(str::to_string)
                .collect();

            entries.push(ListingEntry {
                name,
                rank: leading_rank(&rank_label),
                phone: text_or_empty(element, &self.phone, " "),
                address: text_or_empty(element, &self.address, ", "),
                open_now: text_or_empty(element, &self.open_status, " "),
                website: attr_or_empty(element, &self.website, "href"),
                detail_links,
            });
        }

        entries
    }
}

/// Leading integer before the first period of the rank label.
fn leading_rank(label: &str) -> String {
    label
        .split('.')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
