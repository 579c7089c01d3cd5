//! Per-item fetch + extract flows

use crate::config::{OutputConfig, SiteConfig};
use crate::crawler::ProxyFetcher;
use crate::extract::{extract_article, extract_document, ExtractError};
use crate::model::{ExtractedRecord, WorkItem};
use crate::url::{attribute_url, document_id};
use crate::CrawlError;
use std::fmt;
use std::path::Path;

/// Which record type a crawl produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Legal documents discovered from sitemaps
    Documents,
    /// Q&A articles discovered from category listings
    Articles,
}

impl Pipeline {
    /// Record array written by this pipeline
    pub fn records_path(self, output: &OutputConfig) -> &Path {
        match self {
            Self::Documents => &output.documents_path,
            Self::Articles => &output.articles_path,
        }
    }

    /// `(successful, failed)` URL list files of this pipeline
    pub fn ledger_paths(self, output: &OutputConfig) -> (&Path, &Path) {
        match self {
            Self::Documents => (&output.successful_path, &output.failed_path),
            Self::Articles => (
                &output.articles_successful_path,
                &output.articles_failed_path,
            ),
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Documents => f.write_str("documents"),
            Self::Articles => f.write_str("articles"),
        }
    }
}

/// Fetches and extracts one work item
///
/// Any error is a per-item failure; the caller records it in the ledger.
pub async fn crawl_item(
    pipeline: Pipeline,
    fetcher: &ProxyFetcher,
    site: &SiteConfig,
    item: &WorkItem,
) -> Result<ExtractedRecord, CrawlError> {
    match pipeline {
        Pipeline::Documents => crawl_document(fetcher, site, &item.url).await,
        Pipeline::Articles => {
            let page = fetcher.fetch(&item.url, None).await;
            extract_article(page, &item.url, item.listing.as_ref(), &site.source_name)
        }
    }
}

async fn crawl_document(
    fetcher: &ProxyFetcher,
    site: &SiteConfig,
    url: &str,
) -> Result<ExtractedRecord, CrawlError> {
    let id = document_id(url).ok_or_else(|| CrawlError::Extract {
        url: url.to_string(),
        source: ExtractError::MissingDocumentId,
    })?;

    // The attribute endpoint only answers requests referred by the page
    let attributes_url = attribute_url(&site.base_url, &site.attribute_path, &id)?;
    let attributes = fetcher.fetch(&attributes_url, Some(url)).await;
    let page = fetcher.fetch(url, None).await;

    extract_document(page, attributes, &id, url, &site.source_name)
}
