//! URL helpers for the target site
//!
//! This module derives stable identifiers from site URLs (document ids,
//! sitemap part numbers, category slugs) and builds the derived URLs the
//! crawler requests (listing pages, the attribute endpoint).

mod ids;

pub use ids::{attribute_url, category_slug, document_id, listing_page_url, sitemap_part};
