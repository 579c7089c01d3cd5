use serde::{Deserialize, Serialize};

/// Metadata carried over from a listing page to the article crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingMeta {
    /// Keyword tags shown on the listing card (`[""]` when the card has none)
    pub keyword: Vec<String>,

    /// Publish time (`08:00`)
    pub time: Option<String>,

    /// Publish date (`12/05/2023`)
    pub date: Option<String>,

    /// Category slug of the listing page
    pub category: String,
}

/// One unit of crawl work
///
/// Immutable once enqueued; consumed exactly once by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: String,
    pub listing: Option<ListingMeta>,
}

impl WorkItem {
    /// Creates a work item for a bare URL (document pipeline)
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            listing: None,
        }
    }
}

impl From<ArticleDescriptor> for WorkItem {
    fn from(descriptor: ArticleDescriptor) -> Self {
        Self {
            url: descriptor.link,
            listing: Some(ListingMeta {
                keyword: descriptor.keyword,
                time: descriptor.time,
                date: descriptor.date,
                category: descriptor.category,
            }),
        }
    }
}

/// An article summary discovered on a category listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDescriptor {
    /// Absolute URL of the article detail page
    pub link: String,

    /// Keyword tags (`[""]` when the card has none)
    pub keyword: Vec<String>,

    pub time: Option<String>,
    pub date: Option<String>,

    /// Category slug the listing page belongs to
    pub category: String,
}

impl ArticleDescriptor {
    /// True when the listing card carried a `time | date` stamp
    pub fn has_timestamp(&self) -> bool {
        self.time.is_some() && self.date.is_some()
    }
}
