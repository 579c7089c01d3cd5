//! JSON array store for extracted records

use crate::model::ExtractedRecord;
use crate::storage::{ensure_parent, StorageError, StorageResult};
use std::path::Path;

/// Writes the full record array to `path`
///
/// The array is pretty-printed (two-space indent, non-ASCII kept as is)
/// into a sibling temporary file which is then renamed over the target,
/// so readers never observe a truncated array. Line breaks inside
/// `html_text` are written as the two-character sequence `\n`.
///
/// Saving an empty slice is a no-op; returns the number of records written.
pub fn save_records(path: &Path, records: &[ExtractedRecord]) -> StorageResult<usize> {
    if records.is_empty() {
        tracing::warn!("No records to save to {}", path.display());
        return Ok(0);
    }

    let cleaned: Vec<ExtractedRecord> = records.iter().map(escape_html_text).collect();
    let json = serde_json::to_string_pretty(&cleaned)?;

    ensure_parent(path)?;
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    std::fs::write(tmp_path, json).map_err(StorageError::io(tmp_path))?;
    std::fs::rename(tmp_path, path).map_err(StorageError::io(path))?;

    tracing::info!("Saved {} records to {}", cleaned.len(), path.display());
    Ok(cleaned.len())
}

/// Reads a record array written by [`save_records`]
pub fn load_records(path: &Path) -> StorageResult<Vec<ExtractedRecord>> {
    let content = std::fs::read_to_string(path).map_err(StorageError::io(path))?;
    Ok(serde_json::from_str(&content)?)
}

fn escape_html_text(record: &ExtractedRecord) -> ExtractedRecord {
    let mut record = record.clone();
    if let Some(html) = record.html_text.as_mut() {
        *html = html.replace("\r\n", "\\n").replace('\n', "\\n");
    }
    record
}
