use serde::{Deserialize, Serialize};

/// Introduction used when a page has no summary paragraph
pub const NO_INTRODUCTION: &str = "No introduction found";

/// Normalized output of one successful crawl
///
/// Only ever built from a successful fetch with a title present; the
/// document-only fields are absent from article records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Numeric document id, or the full URL for articles
    pub source_id: String,

    pub url: String,

    /// Fixed site identifier
    pub source: String,

    /// Listing keyword tags (articles only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<Vec<String>>,

    pub title: String,

    /// Summary paragraph, or [`NO_INTRODUCTION`]
    pub introduction: String,

    /// Sections in document order
    pub content: Vec<ContentSection>,

    pub metadata: RecordMetadata,

    /// Normalized legal-document attributes (documents only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<DocumentAttributes>,

    /// Viewable document body with links stripped (documents only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_text: Option<String>,

    /// Plain-text rendering of `html_text` (documents only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
}

/// One `(sub_title, sub_content)` section under a level-2 heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    pub sub_title: String,
    pub sub_content: String,
}

/// Fixed-key metadata; values may be empty but keys are always present
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub time_published: String,
    pub date_published: String,
    #[serde(rename = "type")]
    pub category_type: String,
    pub author: String,
}

/// Normalized legal-document attributes
///
/// Every key is always serialized. Single-value fields are one-element
/// lists, the issuing composite is a fixed three-slot list whose middle
/// (office) slot is always empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAttributes {
    pub official_number: [String; 1],

    /// `[description, "Tình trạng: <status>"]`
    pub document_info: [String; 2],

    /// `[issuing body, "", signer]`
    #[serde(rename = "issuing_body/office/signer")]
    pub issuing_body_office_signer: [String; 3],

    pub document_type: [String; 1],
    pub document_field: [String; 1],
    pub issued_date: String,
    pub effective_date: String,
    pub enforced_date: String,
    pub note: String,
}

impl DocumentAttributes {
    /// Issuing body or empty string
    pub fn issuing_body(&self) -> &str {
        &self.issuing_body_office_signer[0]
    }

    /// Signer or empty string
    pub fn signer(&self) -> &str {
        &self.issuing_body_office_signer[2]
    }
}
