//! Append-only line store for discovered URLs
//!
//! Writers hold an exclusive lock on a sibling `<file name>.lock` file for
//! the duration of each append, so several crawler processes can feed the
//! same store without interleaving partial lines.

use crate::storage::{ensure_parent, StorageError, StorageResult};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Line-delimited URL store, one entry per line
#[derive(Debug, Clone)]
pub struct UrlLineStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl UrlLineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_name = format!(
            "{}.lock",
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "urls".to_string())
        );
        let lock_path = path.with_file_name(lock_name);
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a single entry
    pub fn append(&self, url: &str) -> StorageResult<()> {
        self.append_all(std::iter::once(url))
    }

    /// Appends every entry under one lock acquisition
    ///
    /// The file is created if absent; existing content is never touched.
    pub fn append_all<'a, I>(&self, urls: I) -> StorageResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        ensure_parent(&self.path)?;
        let lock = self.acquire()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(StorageError::io(&self.path))?;
        let mut writer = BufWriter::new(file);
        for url in urls {
            writeln!(writer, "{}", url).map_err(StorageError::io(&self.path))?;
        }
        writer.flush().map_err(StorageError::io(&self.path))?;

        lock.unlock().map_err(|source| StorageError::Lock {
            path: self.lock_path.clone(),
            source,
        })
    }

    /// Loads every non-blank, trimmed line in file order
    ///
    /// A store that does not exist yet is empty.
    pub fn load(&self) -> StorageResult<Vec<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StorageError::io(&self.path)(e)),
        }
    }

    fn acquire(&self) -> StorageResult<File> {
        let lock_error = |source| StorageError::Lock {
            path: self.lock_path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(lock_error)?;
        file.lock().map_err(lock_error)?;
        Ok(file)
    }
}
