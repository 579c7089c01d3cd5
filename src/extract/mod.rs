//! HTML-to-record extraction
//!
//! This module turns fetched pages into [`ExtractedRecord`]s:
//! - [`content`]: title, introduction and level-2 section parsing shared by
//!   documents and articles
//! - [`fragment`]: the content fragment variant and its flattening
//! - [`attributes`]: the AJAX attribute fragment and its normalization
//! - [`text`]: plain-text rendering of rich HTML
//! - [`document`] / [`article`]: the two record builders
//!
//! [`ExtractedRecord`]: crate::model::ExtractedRecord

pub mod article;
pub mod attributes;
pub mod content;
pub mod document;
pub mod fragment;
pub mod text;

pub use article::extract_article;
pub use attributes::{normalize_attributes, parse_attribute_fragment, RawAttributes};
pub use content::{extract_introduction, extract_sections, extract_title, NO_IMAGE_SOURCE};
pub use document::extract_document;
pub use fragment::{flatten_fragments, join_fragments, Fragment};
pub use text::{extract_raw_text_from_html, strip_hrefs};

use thiserror::Error;

/// Errors that abort extraction of a single page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page has no <h1> title")]
    MissingTitle,

    #[error("URL carries no document id")]
    MissingDocumentId,

    #[error("attribute fragment is malformed: {0}")]
    MalformedAttributes(String),
}

impl ExtractError {
    /// Error taxonomy label
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingTitle | Self::MissingDocumentId => "parse_error",
            Self::MalformedAttributes(_) => "attribute_fetch_error",
        }
    }
}
