//! CSV export of listing-page descriptors
//!
//! Columns are `link,keyword,date,time,type`; the keyword list is stored
//! as a JSON array so tags containing commas survive the round trip.
//! Missing time/date values are written as empty fields.

use crate::model::ArticleDescriptor;
use crate::storage::{ensure_parent, StorageResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct ListingRow {
    link: String,
    keyword: String,
    date: Option<String>,
    time: Option<String>,
    #[serde(rename = "type")]
    category: String,
}

impl ListingRow {
    fn from_descriptor(descriptor: &ArticleDescriptor) -> StorageResult<Self> {
        Ok(Self {
            link: descriptor.link.clone(),
            keyword: serde_json::to_string(&descriptor.keyword)?,
            date: descriptor.date.clone(),
            time: descriptor.time.clone(),
            category: descriptor.category.clone(),
        })
    }

    fn into_descriptor(self) -> StorageResult<ArticleDescriptor> {
        Ok(ArticleDescriptor {
            link: self.link,
            keyword: serde_json::from_str(&self.keyword)?,
            time: self.time,
            date: self.date,
            category: self.category,
        })
    }
}

/// Overwrites `path` with one row per descriptor
pub fn write_listing_csv(path: &Path, descriptors: &[ArticleDescriptor]) -> StorageResult<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for descriptor in descriptors {
        writer.serialize(ListingRow::from_descriptor(descriptor)?)?;
    }
    writer.flush().map_err(crate::storage::StorageError::io(path))?;

    tracing::info!("Saved {} listing rows to {}", descriptors.len(), path.display());
    Ok(())
}

/// Reads descriptors previously written by [`write_listing_csv`]
pub fn read_listing_csv(path: &Path) -> StorageResult<Vec<ArticleDescriptor>> {
    let mut reader = csv::ReaderBuilder::new().from_path(path)?;
    reader
        .deserialize::<ListingRow>()
        .map(|row| row?.into_descriptor())
        .collect()
}
