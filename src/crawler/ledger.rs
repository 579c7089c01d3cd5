//! Shared crawl outcome ledger

use crate::model::ExtractedRecord;
use std::collections::HashSet;

/// Insertion-ordered set of URLs
#[derive(Debug, Default, Clone)]
struct OrderedUrls {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl OrderedUrls {
    fn insert(&mut self, url: &str) -> bool {
        if !self.seen.insert(url.to_string()) {
            return false;
        }
        self.order.push(url.to_string());
        true
    }

    fn remove(&mut self, url: &str) -> bool {
        if !self.seen.remove(url) {
            return false;
        }
        self.order.retain(|u| u != url);
        true
    }

    fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }
}

/// Successful URLs, failed URLs and accumulated records of one run
///
/// Lists are ordered by completion time. A URL is recorded at most once
/// and never sits in both lists: a success clears an earlier failure, and
/// a failure after a success is ignored.
#[derive(Debug, Default, Clone)]
pub struct CrawlLedger {
    successful: OrderedUrls,
    failed: OrderedUrls,
    records: Vec<ExtractedRecord>,
}

impl CrawlLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful item and its record
    pub fn record_success(&mut self, url: &str, record: ExtractedRecord) {
        if self.successful.insert(url) {
            self.records.push(record);
        }
        if self.failed.remove(url) {
            tracing::debug!("{} recovered after an earlier failure", url);
        }
    }

    /// Records a failed item
    pub fn record_failure(&mut self, url: &str) {
        if !self.successful.contains(url) {
            self.failed.insert(url);
        }
    }

    pub fn successful(&self) -> &[String] {
        &self.successful.order
    }

    pub fn failed(&self) -> &[String] {
        &self.failed.order
    }

    pub fn records(&self) -> &[ExtractedRecord] {
        &self.records
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
