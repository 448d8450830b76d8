//! Selector set configuration
//!
//! The CSS selectors the parsers compile at construction. Defaults target
//! the business directory's current markup; a config file can override
//! individual selectors when the site shifts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub listing: ListingSelectors,
    pub detail: DetailSelectors,
}

/// Selectors for search-result (listing) pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// One element per business entry.
    pub entry: String,
    /// Non-empty text here marks a paid advertisement.
    pub ad_marker: String,
    pub name: String,
    /// Rank label, "<n>. <name>".
    pub rank: String,
    pub phone: String,
    pub address: String,
    pub open_status: String,
    pub website: String,
    /// Anchors whose hrefs lead to the business detail page.
    pub detail_link: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            entry: "div.info".to_string(),
            ad_marker: "span.ad-pill".to_string(),
            name: "a.business-name".to_string(),
            rank: "h2.n".to_string(),
            phone: "div.phones.phone.primary".to_string(),
            address: "div.adr".to_string(),
            open_status: "div.open-status.open".to_string(),
            website: "a.track-visit-website".to_string(),
            detail_link: "a.business-name".to_string(),
        }
    }
}

/// Selectors for business detail pages and the media gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailSelectors {
    pub slogan: String,
    pub general_info: String,
    pub neighborhood: String,
    /// Anchor carrying a `mailto:` href.
    pub email: String,
    pub extra_phones: String,
    pub social_links: String,
    pub categories: String,
    pub hour_category: String,
    /// One element per other-information item.
    pub other_info_item: String,
    /// One element per day row of the detailed-hours table.
    pub hours_row: String,
    /// Link from a detail page into the media collage gallery.
    pub collage_link: String,
    /// Anchors wrapping gallery images on the gallery page.
    pub gallery_anchor: String,
    /// Image inside a gallery anchor; its `src` is collected.
    pub gallery_image: String,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            slogan: "h2.slogan".to_string(),
            general_info: "dd.general-info".to_string(),
            neighborhood: "dd.neighborhoods".to_string(),
            email: "a.email-business".to_string(),
            extra_phones: "dd.extra-phones".to_string(),
            social_links: "dd.social-links".to_string(),
            categories: "dd.categories".to_string(),
            hour_category: "span.hour-category".to_string(),
            other_info_item: "dd.other-information p".to_string(),
            hours_row: "div.open-details table tr".to_string(),
            collage_link: "a.media-thumbnail.collage-pic".to_string(),
            gallery_anchor: "a[data-media]".to_string(),
            gallery_image: "img".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize_from_empty_object() {
        let config: SelectorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.listing.entry, "div.info");
        assert_eq!(config.detail.collage_link, "a.media-thumbnail.collage-pic");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config: SelectorConfig =
            serde_json::from_str(r#"{"listing": {"entry": "li.result"}}"#).unwrap();
        assert_eq!(config.listing.entry, "li.result");
        assert_eq!(config.listing.name, "a.business-name");
    }
}
