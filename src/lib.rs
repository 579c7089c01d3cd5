//! tvpl-crawler: legal document and Q&A harvester for thuvienphapluat.vn
//!
//! This crate discovers document URLs from sitemaps and article URLs from
//! paginated category listings, fetches each page through a rotating proxy
//! pool, extracts normalized records from the HTML and persists them as
//! batched JSON/CSV artifacts alongside success/failure ledgers.

pub mod config;
pub mod crawler;
pub mod discovery;
pub mod extract;
pub mod model;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed for {url} ({kind}): {detail}")]
    Fetch {
        url: String,
        kind: crawler::FailureKind,
        status_code: Option<u16>,
        detail: String,
    },

    #[error("Extraction failed for {url}: {source}")]
    Extract {
        url: String,
        source: extract::ExtractError,
    },

    #[error("Worker for {url} did not complete: {message}")]
    Worker { url: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Sitemap XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrawlError {
    /// Short label used in logs and ledgers for the error taxonomy
    pub fn category(&self) -> &'static str {
        match self {
            Self::Fetch { kind, .. } => kind.as_str(),
            Self::Extract { source, .. } => source.category(),
            Self::Worker { .. } => "worker_error",
            Self::Config(_) => "config_error",
            Self::Storage(_) | Self::Io(_) | Self::Json(_) | Self::Csv(_) => "storage_error",
            Self::Xml(_) | Self::UrlParse(_) => "parse_error",
            Self::Reqwest(_) => "transport_error",
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BatchReport, FetchOutcome, Orchestrator, Pipeline, ProxyFetcher};
pub use model::{ExtractedRecord, WorkItem};
