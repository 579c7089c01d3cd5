//! Batch crawl orchestration
//!
//! Each batch is dispatched across a bounded pool of tokio tasks. Every
//! task fetches and extracts one work item; its outcome (including a
//! panic) lands in the shared [`CrawlLedger`] as either a success with a
//! record or a failure. Per-item errors never abort the batch; only
//! failures to persist the URL lists do.

use crate::config::{Config, SiteConfig};
use crate::crawler::ledger::CrawlLedger;
use crate::crawler::pipeline::{crawl_item, Pipeline};
use crate::crawler::ProxyFetcher;
use crate::model::{ExtractedRecord, WorkItem};
use crate::storage::{remove_url_list, save_records, write_url_list};
use crate::{CrawlError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Counts for one completed batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs batches of work items and persists their outcomes
pub struct Orchestrator {
    pipeline: Pipeline,
    fetcher: Arc<ProxyFetcher>,
    site: Arc<SiteConfig>,
    width: usize,
    ledger: Arc<Mutex<CrawlLedger>>,
    successful_path: PathBuf,
    failed_path: PathBuf,
    failed_written: AtomicBool,
}

impl Orchestrator {
    /// Creates an orchestrator
    ///
    /// # Arguments
    ///
    /// * `pipeline` - Record type to produce
    /// * `fetcher` - Shared fetcher used by every worker
    /// * `site` - Target site settings
    /// * `width` - Maximum number of items in flight (at least 1)
    /// * `successful_path` / `failed_path` - URL lists rewritten after each batch
    pub fn new(
        pipeline: Pipeline,
        fetcher: Arc<ProxyFetcher>,
        site: SiteConfig,
        width: usize,
        successful_path: impl Into<PathBuf>,
        failed_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pipeline,
            fetcher,
            site: Arc::new(site),
            width: width.max(1),
            ledger: Arc::new(Mutex::new(CrawlLedger::new())),
            successful_path: successful_path.into(),
            failed_path: failed_path.into(),
            failed_written: AtomicBool::new(false),
        }
    }

    /// Creates an orchestrator with the configured pool width and output paths
    pub fn from_config(
        pipeline: Pipeline,
        fetcher: Arc<ProxyFetcher>,
        config: &Config,
    ) -> Self {
        let (successful, failed) = pipeline.ledger_paths(&config.output);
        Self::new(
            pipeline,
            fetcher,
            config.site.clone(),
            config.crawler.threads,
            successful,
            failed,
        )
    }

    /// Snapshot of the ledger
    pub fn ledger(&self) -> CrawlLedger {
        self.lock_ledger().clone()
    }

    /// Crawls every item, then rewrites the successful/failed URL lists
    ///
    /// Completion order is whatever the pool yields.
    pub async fn crawl_batch(&self, items: Vec<WorkItem>) -> Result<BatchReport> {
        let semaphore = Arc::new(Semaphore::new(self.width));
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::new();

        for item in items {
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&self.fetcher);
            let site = Arc::clone(&self.site);
            let pipeline = self.pipeline;
            let url = item.url.clone();

            let handle = tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return Err(CrawlError::Worker {
                            url: item.url.clone(),
                            message: e.to_string(),
                        })
                    }
                };
                crawl_item(pipeline, &fetcher, &site, &item).await
            });
            pending.insert(handle.id(), url);
        }

        let mut report = BatchReport::default();
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, result)) => {
                    let url = pending.remove(&id).unwrap_or_default();
                    self.record(&url, result, &mut report);
                }
                Err(e) => {
                    let url = pending.remove(&e.id()).unwrap_or_default();
                    tracing::error!("Worker for {} did not complete: {}", url, e);
                    let error = worker_error(&url, &e);
                    self.record(&url, Err(error), &mut report);
                }
            }
        }

        self.write_url_lists()?;
        Ok(report)
    }

    /// Writes every accumulated record to `path`
    ///
    /// A no-op when nothing has been crawled successfully yet.
    pub fn save(&self, path: &Path) -> Result<usize> {
        let records: Vec<ExtractedRecord> = self.lock_ledger().records().to_vec();
        Ok(save_records(path, &records)?)
    }

    fn record(
        &self,
        url: &str,
        result: Result<ExtractedRecord>,
        report: &mut BatchReport,
    ) {
        match result {
            Ok(record) => {
                self.lock_ledger().record_success(url, record);
                report.succeeded += 1;
                tracing::info!("Successfully crawled: {}", url);
            }
            Err(e) => {
                self.lock_ledger().record_failure(url);
                report.failed += 1;
                tracing::warn!("Failed to crawl {} [{}]: {}", url, e.category(), e);
            }
        }
    }

    fn write_url_lists(&self) -> Result<()> {
        let (successful, failed) = {
            let ledger = self.lock_ledger();
            (ledger.successful().to_vec(), ledger.failed().to_vec())
        };
        write_url_list(&self.successful_path, &successful)?;
        if write_url_list(&self.failed_path, &failed)? {
            self.failed_written.store(true, Ordering::Relaxed);
        } else if self.failed_written.swap(false, Ordering::Relaxed) {
            // Every earlier failure has since succeeded
            remove_url_list(&self.failed_path)?;
        }
        Ok(())
    }

    fn lock_ledger(&self) -> MutexGuard<'_, CrawlLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn worker_error(url: &str, error: &JoinError) -> CrawlError {
    let message = if error.is_panic() {
        "worker panicked".to_string()
    } else {
        error.to_string()
    };
    CrawlError::Worker {
        url: url.to_string(),
        message,
    }
}
