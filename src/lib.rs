//! ypharvest - concurrent business-directory crawler
//!
//! Crawls a paginated business-directory search interface across many
//! (location, query) combinations, enriches each business from its detail
//! page, deduplicates records under a loose (name, address) identity, and
//! exports the merged dataset as CSV.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;
