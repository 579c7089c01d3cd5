//! Q&A article record builder

use crate::crawler::FetchOutcome;
use crate::extract::content::{extract_introduction, extract_sections, extract_title, first_text};
use crate::model::{ExtractedRecord, ListingMeta, RecordMetadata};
use crate::CrawlError;
use scraper::Html;

/// Byline element of an article page
const AUTHOR_SELECTOR: &str = "span.text-end.fw-bold";

/// Builds an article record from its page fetch and listing metadata
///
/// Articles are keyed by their full URL. Publish time, date, keyword and
/// category come from the listing card; the author comes from the page.
pub fn extract_article(
    page: FetchOutcome,
    url: &str,
    listing: Option<&ListingMeta>,
    source: &str,
) -> Result<ExtractedRecord, CrawlError> {
    let body = page.into_body(url)?;
    let document = Html::parse_document(&body);

    let title = extract_title(&document).map_err(|source| CrawlError::Extract {
        url: url.to_string(),
        source,
    })?;

    let metadata = RecordMetadata {
        time_published: listing.and_then(|l| l.time.clone()).unwrap_or_default(),
        date_published: listing.and_then(|l| l.date.clone()).unwrap_or_default(),
        category_type: listing.map(|l| l.category.clone()).unwrap_or_default(),
        author: first_text(&document, AUTHOR_SELECTOR).unwrap_or_default(),
    };
    let keyword = listing
        .map(|l| l.keyword.clone())
        .unwrap_or_else(|| vec![String::new()]);

    Ok(ExtractedRecord {
        source_id: url.to_string(),
        url: url.to_string(),
        source: source.to_string(),
        keyword: Some(keyword),
        title,
        introduction: extract_introduction(&document),
        content: extract_sections(document.root_element()),
        metadata,
        attribute: None,
        html_text: None,
        full_text: None,
    })
}
