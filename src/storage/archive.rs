use crate::storage::{StorageError, StorageResult};
use std::path::{Path, PathBuf};

/// Archive location of the leaf sitemap numbered `part`
pub fn archive_path(dir: &Path, part: &str) -> PathBuf {
    dir.join(format!("sitemaps_part{}.xml", part))
}

/// Writes a raw leaf sitemap body, replacing any earlier copy
pub fn archive_sitemap(dir: &Path, part: &str, body: &str) -> StorageResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(StorageError::io(dir))?;
    let path = archive_path(dir, part);
    std::fs::write(&path, body).map_err(StorageError::io(&path))?;
    tracing::debug!("Archived sitemap to {}", path.display());
    Ok(path)
}
