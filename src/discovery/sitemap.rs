//! Sitemap walking
//!
//! The root sitemap is an index whose `<loc>` entries point at leaf
//! sitemaps; every leaf lists document URLs. Leaves are processed in
//! declaration order and their URLs appended to the line store in the order
//! they appear, duplicates included.

use crate::crawler::{FetchOutcome, ProxyFetcher};
use crate::storage::{archive_sitemap, UrlLineStore};
use crate::url::sitemap_part;
use crate::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

/// Counts for one leaf sitemap walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SitemapStats {
    pub leaves_processed: usize,
    pub leaves_skipped: usize,
    pub urls_appended: usize,
}

/// Extracts the text of every `<loc>` element, in document order
///
/// Works for both `<sitemapindex>` and `<urlset>` documents, with or
/// without a namespace prefix.
pub fn extract_locs(xml: &str) -> std::result::Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut locs = Vec::new();
    let mut in_loc = false;
    let mut current = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"loc" => {
                in_loc = true;
                current.clear();
            }
            Event::End(e) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                let loc = current.trim();
                if !loc.is_empty() {
                    locs.push(loc.to_string());
                }
            }
            Event::Text(t) if in_loc => current.push_str(&t.unescape()?),
            Event::CData(c) if in_loc => current.push_str(&String::from_utf8_lossy(&c)),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(locs)
}

/// Fetches the sitemap index and returns its leaf sitemap URLs
///
/// Unlike leaf failures, a failed index fetch is an error: there is
/// nothing to walk.
pub async fn discover_sitemap_tree(fetcher: &ProxyFetcher, root_url: &str) -> Result<Vec<String>> {
    tracing::info!("Fetching sitemap index {}", root_url);
    let body = fetcher.fetch(root_url, None).await.into_body(root_url)?;
    let leaves = extract_locs(&body)?;
    tracing::info!("Number of sitemap URLs: {}", leaves.len());
    Ok(leaves)
}

/// Walks leaf sitemaps, archiving each body and appending its URLs
///
/// A leaf that cannot be fetched, has no part number, or does not parse is
/// logged and skipped. Storage failures abort the walk.
pub async fn discover_documents(
    fetcher: &ProxyFetcher,
    leaves: &[String],
    store: &UrlLineStore,
    sitemap_dir: &Path,
) -> Result<SitemapStats> {
    let mut stats = SitemapStats::default();

    for (index, leaf) in leaves.iter().enumerate() {
        tracing::info!("Processing sitemap {}/{}: {}", index + 1, leaves.len(), leaf);

        let Some(part) = sitemap_part(leaf) else {
            tracing::warn!("Skipping sitemap without a part number: {}", leaf);
            stats.leaves_skipped += 1;
            continue;
        };

        let body = match fetcher.fetch(leaf, None).await {
            FetchOutcome::Success { body, .. } => body,
            FetchOutcome::Failure { kind, detail, .. } => {
                tracing::warn!("Error processing sitemap {} ({}): {}", leaf, kind, detail);
                stats.leaves_skipped += 1;
                continue;
            }
        };

        archive_sitemap(sitemap_dir, part, &body)?;

        let urls = match extract_locs(&body) {
            Ok(urls) => urls,
            Err(e) => {
                tracing::warn!("Error parsing sitemap {}: {}", leaf, e);
                stats.leaves_skipped += 1;
                continue;
            }
        };

        store.append_all(urls.iter().map(String::as_str))?;
        tracing::debug!("Appended {} URLs from {}", urls.len(), leaf);
        stats.urls_appended += urls.len();
        stats.leaves_processed += 1;
    }

    tracing::info!(
        "Sitemap walk complete: {} processed, {} skipped, {} URLs appended",
        stats.leaves_processed,
        stats.leaves_skipped,
        stats.urls_appended
    );
    Ok(stats)
}
