//! Detail page parser
//!
//! Turns a business detail page into a field patch for the record store,
//! and extracts image URLs from the media-collage gallery page when the
//! detail page links to one. Every absent element resolves to an empty
//! field; the patch always carries the full enrichment field set so records
//! stabilize their columns.

use anyhow::Result;
use scraper::{Html, Selector};

use super::config::DetailSelectors;
use super::{attr_or_empty, compile_selector, joined_text, select_first, text_or_empty};
use crate::domain::business::{FieldPatch, fields};

/// Parser for detail pages and gallery markup.
pub struct DetailParser {
    slogan: Selector,
    general_info: Selector,
    neighborhood: Selector,
    email: Selector,
    extra_phones: Selector,
    social_links: Selector,
    categories: Selector,
    hour_category: Selector,
    other_info_item: Selector,
    hours_row: Selector,
    day_cell: Selector,
    hours_cell: Selector,
    collage_link: Selector,
    gallery_anchor: Selector,
    gallery_image: Selector,
}

impl DetailParser {
    pub fn new() -> Result<Self> {
        Self::with_config(&DetailSelectors::default())
    }

    pub fn with_config(selectors: &DetailSelectors) -> Result<Self> {
        Ok(Self {
            slogan: compile_selector(&selectors.slogan)?,
            general_info: compile_selector(&selectors.general_info)?,
            neighborhood: compile_selector(&selectors.neighborhood)?,
            email: compile_selector(&selectors.email)?,
            extra_phones: compile_selector(&selectors.extra_phones)?,
            social_links: compile_selector(&selectors.social_links)?,
            categories: compile_selector(&selectors.categories)?,
            hour_category: compile_selector(&selectors.hour_category)?,
            other_info_item: compile_selector(&selectors.other_info_item)?,
            hours_row: compile_selector(&selectors.hours_row)?,
            day_cell: compile_selector("th")?,
            hours_cell: compile_selector("td")?,
            collage_link: compile_selector(&selectors.collage_link)?,
            gallery_anchor: compile_selector(&selectors.gallery_anchor)?,
            gallery_image: compile_selector(&selectors.gallery_image)?,
        })
    }

    /// Enrichment patch for a detail page. Always contains every enrichment
    /// field, empty where the page has nothing.
    pub fn parse(&self, body: &str) -> FieldPatch {
        let html = Html::parse_document(body);
        let root = html.root_element();

        let mut patch = FieldPatch::new();
        patch.insert(
            fields::SLOGAN.to_string(),
            text_or_empty(root, &self.slogan, " "),
        );
        patch.insert(
            fields::GENERAL_INFO.to_string(),
            text_or_empty(root, &self.general_info, " "),
        );
        patch.insert(
            fields::NEIGHBORHOOD.to_string(),
            text_or_empty(root, &self.neighborhood, " "),
        );
        patch.insert(fields::EMAIL.to_string(), self.extract_email(root));
        patch.insert(
            fields::EXTRA_PHONES.to_string(),
            text_or_empty(root, &self.extra_phones, " "),
        );
        patch.insert(
            fields::SOCIAL_LINKS.to_string(),
            text_or_empty(root, &self.social_links, ", "),
        );
        patch.insert(
            fields::CATEGORIES.to_string(),
            text_or_empty(root, &self.categories, ""),
        );
        patch.insert(
            fields::HOUR_CATEGORY.to_string(),
            text_or_empty(root, &self.hour_category, " "),
        );
        patch.insert(
            fields::OTHER_INFO.to_string(),
            self.extract_other_info(root),
        );
        patch.insert(
            fields::DETAILED_HOURS.to_string(),
            self.extract_detailed_hours(root),
        );
        patch
    }

    /// Gallery href on a detail page, when the business has a media collage.
    pub fn gallery_link(&self, body: &str) -> Option<String> {
        let html = Html::parse_document(body);
        let link = attr_or_empty(html.root_element(), &self.collage_link, "href");
        if link.is_empty() { None } else { Some(link) }
    }

    /// Every image URL on a gallery page, comma-joined.
    pub fn gallery_images(&self, body: &str) -> String {
        let html = Html::parse_document(body);
        html.root_element()
            .select(&self.gallery_anchor)
            .filter_map(|anchor| select_first(anchor, &self.gallery_image))
            .filter_map(|image| image.value().attr("src"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Address part of the `mailto:` link.
    fn extract_email(&self, root: scraper::ElementRef<'_>) -> String {
        attr_or_empty(root, &self.email, "href")
            .splitn(2, ':')
            .nth(1)
            .unwrap_or_default()
            .to_string()
    }

    /// Other-information items, each with the label/value separator spacing
    /// fixed (`" :"` becomes `":"`), comma-joined.
    fn extract_other_info(&self, root: scraper::ElementRef<'_>) -> String {
        root.select(&self.other_info_item)
            .map(|item| joined_text(item, " ").replace(" :", ":"))
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Day rows flattened to "<day> <hours>", comma-joined.
    fn extract_detailed_hours(&self, root: scraper::ElementRef<'_>) -> String {
        root.select(&self.hours_row)
            .filter_map(|row| {
                let day = select_first(row, &self.day_cell)?;
                let hours = select_first(row, &self.hours_cell)?;
                Some(format!(
                    "{} {}",
                    joined_text(day, " "),
                    joined_text(hours, " ")
                ))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
