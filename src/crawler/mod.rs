//! Crawler module for page fetching and batch orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching through a rotating proxy pool
//! - Per-item document and article pipelines
//! - The shared success/failure ledger
//! - Bounded-pool batch orchestration

mod fetcher;
mod ledger;
mod orchestrator;
mod pipeline;
mod proxy;

pub use fetcher::{build_http_client, FailureKind, FetchOutcome, ProxyFetcher};
pub use ledger::CrawlLedger;
pub use orchestrator::{BatchReport, Orchestrator};
pub use pipeline::{crawl_item, Pipeline};
pub use proxy::{parse_proxy_list, ProxyError, ProxyPool};
