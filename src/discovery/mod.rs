//! URL discovery
//!
//! Two independent strategies feed the crawl:
//! - [`sitemap`]: sitemap index → leaf sitemaps → document URL line store
//! - [`listing`]: category listing pages → article descriptors

pub mod listing;
pub mod sitemap;

pub use listing::{discover_listing_pages, parse_listing_page, split_timestamp, ListingDiscovery};
pub use sitemap::{discover_documents, discover_sitemap_tree, extract_locs, SitemapStats};

use std::collections::HashSet;

/// Removes duplicate URLs, keeping the first occurrence of each
pub fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
