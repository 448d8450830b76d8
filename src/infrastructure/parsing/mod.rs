//! HTML extraction for listing and detail pages
//!
//! Parsers hold selectors compiled once at construction from a serde
//! configuration ([`config::SelectorConfig`]). Field access degrades to
//! empty string through the helpers here, so one place owns the
//! "extract-or-empty" policy instead of per-field error handling.

pub mod config;
pub mod detail_parser;
pub mod listing_parser;

pub use config::{DetailSelectors, ListingSelectors, SelectorConfig};
pub use detail_parser::DetailParser;
pub use listing_parser::{ListingEntry, ListingParser};

use anyhow::{Result, anyhow};
use scraper::{ElementRef, Selector};

/// Compile a selector string, turning the borrowed parse error into an
/// owned one.
pub(crate) fn compile_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|err| anyhow!("invalid selector '{selector}': {err}"))
}

/// First descendant of `scope` matching `selector`.
pub(crate) fn select_first<'a>(
    scope: ElementRef<'a>,
    selector: &Selector,
) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// Element text with each fragment trimmed, empties dropped, and the rest
/// joined by `sep` (the BeautifulSoup `get_text(separator=...)` shape the
/// directory's multi-line fields need).
pub(crate) fn joined_text(element: ElementRef<'_>, sep: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Joined text of the first match, or empty string.
pub(crate) fn text_or_empty(scope: ElementRef<'_>, selector: &Selector, sep: &str) -> String {
    select_first(scope, selector)
        .map(|element| joined_text(element, sep))
        .unwrap_or_default()
}

/// Attribute of the first match, or empty string.
pub(crate) fn attr_or_empty(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> String {
    select_first(scope, selector)
        .and_then(|element| element.value().attr(attr))
        .map(str::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn joined_text_trims_and_separates_fragments() {
        let html = Html::parse_fragment("<div><span> 100 Main St </span><span>Austin, TX</span></div>");
        let div = compile_selector("div").unwrap();
        let root = html.root_element();
        let element = select_first(root, &div).unwrap();
        assert_eq!(joined_text(element, ", "), "100 Main St, Austin, TX");
    }

    #[test]
    fn missing_elements_resolve_to_empty() {
        let html = Html::parse_fragment("<div></div>");
        let missing = compile_selector("span.nope").unwrap();
        let root = html.root_element();
        assert_eq!(text_or_empty(root, &missing, " "), "");
        assert_eq!(attr_or_empty(root, &missing, "href"), "");
    }

    #[test]
    fn invalid_selector_is_a_construction_error() {
        assert!(compile_selector(":::").is_err());
    }
}
