//! Business record model and merge rules
//!
//! A business is identified by a loose `(name, address)` key and accumulates
//! string fields from listing pages and detail-page enrichment. Field names
//! are dynamic (per-query rank columns), so records are string-keyed maps
//! rather than fixed structs.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Canonical field names shared by extractors, merge, and export.
pub mod fields {
    pub const NAME: &str = "name";
    pub const PHONE: &str = "phone";
    pub const ADDRESS: &str = "address";
    pub const WEBSITE: &str = "website";
    pub const DETAIL_URL: &str = "detail_url";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const SEARCH_DATETIME: &str = "search_datetime";
    pub const SLOGAN: &str = "slogan";
    pub const GENERAL_INFO: &str = "general_info";
    pub const NEIGHBORHOOD: &str = "neighborhood";
    pub const EMAIL: &str = "email";
    pub const EXTRA_PHONES: &str = "extra_phones";
    pub const SOCIAL_LINKS: &str = "social_links";
    pub const CATEGORIES: &str = "categories";
    pub const HOUR_CATEGORY: &str = "hour_category";
    pub const OTHER_INFO: &str = "other_info";
    pub const DETAILED_HOURS: &str = "detailed_hours";
    pub const MEDIA_GALLERY: &str = "media_gallery";
    pub const OPEN_NOW: &str = "open_now";
}

/// Fixed tail of the export column order. Dynamic columns (per-query ranks,
/// `open_now`) are sorted in front of these at export time.
pub static BASE_COLUMNS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        fields::NAME,
        fields::PHONE,
        fields::ADDRESS,
        fields::WEBSITE,
        fields::DETAIL_URL,
        fields::CITY,
        fields::STATE,
        fields::SEARCH_DATETIME,
        fields::SLOGAN,
        fields::GENERAL_INFO,
        fields::NEIGHBORHOOD,
        fields::EMAIL,
        fields::EXTRA_PHONES,
        fields::SOCIAL_LINKS,
        fields::CATEGORIES,
        fields::HOUR_CATEGORY,
        fields::OTHER_INFO,
        fields::DETAILED_HOURS,
        fields::MEDIA_GALLERY,
    ]
});

/// Column name carrying a business's rank for one search query.
pub fn rank_field(query: &str) -> String {
    format!("{query}_rank")
}

/// Collapse internal whitespace runs and trim the ends.
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Identity key deduplicating businesses across pages and queries.
///
/// Equality is intentionally loose: the key is the extracted text with only
/// whitespace normalization applied, so differently formatted addresses
/// produce distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BusinessKey {
    name: String,
    address: String,
}

impl BusinessKey {
    pub fn new(name: &str, address: &str) -> Self {
        Self {
            name: normalize_ws(name),
            address: normalize_ws(address),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl std::fmt::Display for BusinessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.name, self.address)
    }
}

/// Partial field-value mapping merged into a record.
pub type FieldPatch = HashMap<String, String>;

/// Accumulated field map for one business.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    fields: HashMap<String, String>,
}

impl BusinessRecord {
    /// Apply a patch under the merge rules:
    /// an empty value registers the field but never overwrites a populated
    /// one; a non-empty value always wins (later sightings may carry fresher
    /// rank/timestamp/city data).
    pub fn apply(&mut self, patch: &FieldPatch) {
        for (field, value) in patch {
            if value.is_empty() {
                self.fields.entry(field.clone()).or_default();
            } else {
                self.fields.insert(field.clone(), value.clone());
            }
        }
    }

    /// Field value, empty string when the field was never seen.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Register every listed field so the record carries a stable field set.
    pub fn fill_missing<'a>(&mut self, field_names: impl IntoIterator<Item = &'a str>) {
        for name in field_names {
            self.fields.entry(name.to_string()).or_default();
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(pairs: &[(&str, &str)]) -> FieldPatch {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn key_normalizes_whitespace_only() {
        let a = BusinessKey::new("  Joe's   Diner ", "100  Main St");
        let b = BusinessKey::new("Joe's Diner", "100 Main St");
        assert_eq!(a, b);

        // Different address formatting is a different business on purpose.
        let c = BusinessKey::new("Joe's Diner", "100 Main Street");
        assert_ne!(a, c);
    }

    #[test]
    fn empty_value_never_regresses_populated_field() {
        let mut record = BusinessRecord::default();
        record.apply(&patch(&[(fields::EMAIL, "info@joes.com")]));
        record.apply(&patch(&[(fields::EMAIL, "")]));
        assert_eq!(record.get(fields::EMAIL), "info@joes.com");
    }

    #[test]
    fn empty_value_still_registers_field() {
        let mut record = BusinessRecord::default();
        record.apply(&patch(&[(fields::SLOGAN, "")]));
        assert!(record.field_names().any(|f| f == fields::SLOGAN));
        assert_eq!(record.get(fields::SLOGAN), "");
    }

    #[test]
    fn later_non_empty_value_overwrites() {
        let mut record = BusinessRecord::default();
        record.apply(&patch(&[(fields::CITY, "Austin")]));
        record.apply(&patch(&[(fields::CITY, "Dallas")]));
        assert_eq!(record.get(fields::CITY), "Dallas");
    }

    #[test]
    fn applying_same_patch_twice_is_a_noop() {
        let mut record = BusinessRecord::default();
        let p = patch(&[(fields::NAME, "Joe's Diner"), (fields::PHONE, "")]);
        record.apply(&p);
        let snapshot = record.clone();
        record.apply(&p);
        assert_eq!(record, snapshot);
    }

    #[test]
    fn unknown_field_reads_as_empty() {
        let record = BusinessRecord::default();
        assert_eq!(record.get("nope"), "");
    }

    #[test]
    fn rank_field_is_query_scoped() {
        assert_eq!(rank_field("coffee"), "coffee_rank");
    }
}
