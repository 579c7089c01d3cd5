//! Successful/failed URL list files

use crate::storage::{ensure_parent, StorageError, StorageResult};
use std::path::Path;

/// Overwrites `path` with one URL per line
///
/// An empty list leaves any existing file untouched. Returns whether the
/// file was written.
pub fn write_url_list(path: &Path, urls: &[String]) -> StorageResult<bool> {
    if urls.is_empty() {
        return Ok(false);
    }

    ensure_parent(path)?;
    std::fs::write(path, urls.join("\n")).map_err(StorageError::io(path))?;
    tracing::info!("Saved {} URLs to {}", urls.len(), path.display());
    Ok(true)
}

/// Deletes a URL list file; a missing file is not an error
pub fn remove_url_list(path: &Path) -> StorageResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::io(path)(e)),
    }
}

/// Reads a URL list, trimming entries and dropping blank lines
pub fn read_url_list(path: &Path) -> StorageResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(StorageError::io(path))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
