//! Data model shared by discovery, extraction and persistence
//!
//! - [`WorkItem`]: one unit of crawl work (a URL plus optional listing metadata)
//! - [`ArticleDescriptor`]: one article summary found on a listing page
//! - [`ExtractedRecord`]: the normalized output of a successful crawl

mod record;
mod work_item;

pub use record::{
    ContentSection, DocumentAttributes, ExtractedRecord, RecordMetadata, NO_INTRODUCTION,
};
pub use work_item::{ArticleDescriptor, ListingMeta, WorkItem};
