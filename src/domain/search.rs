//! Search target generation
//!
//! Pure expansion of (locations × queries × pages) into the ordered sequence
//! of search-result URLs. No deduplication here; the fetch cache downstream
//! owns uniqueness.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Percent-encode everything except RFC 3986 unreserved characters, the
/// behavior the directory's query strings expect for location/query values.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// One (location, query, page) search job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTarget {
    pub location: String,
    pub query: String,
    pub page: u32,
}

impl SearchTarget {
    /// Absolute search URL for this target against the directory domain.
    pub fn url(&self, domain: &str) -> String {
        format!(
            "{}/search?search_terms={}&geo_location_terms={}&page={}",
            domain.trim_end_matches('/'),
            utf8_percent_encode(&self.query, QUERY_VALUE),
            utf8_percent_encode(&self.location, QUERY_VALUE),
            self.page
        )
    }
}

/// Ordered cross product: for each location, each query, pages `1..=limit`.
pub fn generate_search_targets(
    locations: &[String],
    queries: &[String],
    page_limit: u32,
) -> Vec<SearchTarget> {
    let mut targets = Vec::with_capacity(locations.len() * queries.len() * page_limit as usize);
    for location in locations {
        for query in queries {
            for page in 1..=page_limit {
                targets.push(SearchTarget {
                    location: location.clone(),
                    query: query.clone(),
                    page,
                });
            }
        }
    }
    targets
}

/// Split a location into (city, state) on the first comma; a location
/// without a comma is all city.
pub fn split_city_state(location: &str) -> (String, String) {
    match location.split_once(',') {
        Some((city, state)) => (city.trim().to_string(), state.trim().to_string()),
        None => (location.trim().to_string(), String::new()),
    }
}
