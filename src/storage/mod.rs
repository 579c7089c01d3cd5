//! Storage module for persisting crawl artifacts
//!
//! This module handles every file the crawler writes:
//! - Append-only discovered-URL store guarded by an inter-process lock
//! - JSON array of extracted records, rewritten on every flush
//! - Successful/failed URL lists, overwritten after every batch
//! - Listing-page descriptor CSV export
//! - Raw leaf sitemap archive

mod archive;
mod lines;
mod listing_csv;
mod records;
mod url_list;

pub use archive::{archive_path, archive_sitemap};
pub use lines::UrlLineStore;
pub use listing_csv::{read_listing_csv, write_listing_csv};
pub use records::{load_records, save_records};
pub use url_list::{read_url_list, remove_url_list, write_url_list};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl StorageError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
        move |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Creates the parent directory of `path` if it has one
pub(crate) fn ensure_parent(path: &Path) -> StorageResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(StorageError::io(parent))
        }
        _ => Ok(()),
    }
}
