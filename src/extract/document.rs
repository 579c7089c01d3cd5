//! Legal-document record builder

use crate::crawler::FetchOutcome;
use crate::extract::attributes::{normalize_attributes, parse_attribute_fragment, RawAttributes};
use crate::extract::content::{extract_introduction, extract_sections, extract_title};
use crate::extract::text::{extract_raw_text_from_html, strip_hrefs};
use crate::extract::ExtractError;
use crate::model::{ContentSection, ExtractedRecord, RecordMetadata};
use crate::CrawlError;
use scraper::{Html, Selector};

/// Container of the viewable document body
const CONTENT_SELECTOR: &str = "div.content1";

/// Present when the body is only offered as a download
const DOWNLOAD_ONLY_SELECTOR: &str = "div.TaiVanBan";

/// Present when the body is hidden behind a login
const LOGIN_GATE_SELECTOR: &str = r#"a.clsopentLogin[style="color:blue"]"#;

/// Builds a document record from the page and attribute fetches
///
/// The page fetch must succeed and carry an `<h1>`. The attribute fetch is
/// best effort: a failed or malformed response is logged and every
/// attribute falls back to its empty value.
pub fn extract_document(
    page: FetchOutcome,
    attributes: FetchOutcome,
    source_id: &str,
    url: &str,
    source: &str,
) -> Result<ExtractedRecord, CrawlError> {
    let body = page.into_body(url)?;
    let document = Html::parse_document(&body);

    let title = extract_title(&document).map_err(|source| CrawlError::Extract {
        url: url.to_string(),
        source,
    })?;
    let introduction = extract_introduction(&document);
    let (content, html_text) = document_body(&document);
    let full_text = extract_raw_text_from_html(&html_text);

    let attribute = normalize_attributes(&raw_attributes(attributes, url));
    let metadata = RecordMetadata {
        time_published: String::new(),
        date_published: attribute.issued_date.clone(),
        category_type: attribute.document_type[0].clone(),
        author: attribute.signer().to_string(),
    };

    Ok(ExtractedRecord {
        source_id: source_id.to_string(),
        url: url.to_string(),
        source: source.to_string(),
        keyword: None,
        title,
        introduction,
        content,
        metadata,
        attribute: Some(attribute),
        html_text: Some(html_text),
        full_text: Some(full_text),
    })
}

/// Returns the body sections and the link-stripped body HTML
///
/// Gated pages yield no sections and an empty body.
fn document_body(document: &Html) -> (Vec<ContentSection>, String) {
    if is_gated(document) {
        tracing::debug!("Document body is not viewable");
        return (Vec::new(), String::new());
    }

    let container = Selector::parse(CONTENT_SELECTOR)
        .ok()
        .and_then(|selector| document.select(&selector).next());

    match container {
        Some(content) => (extract_sections(content), strip_hrefs(content)),
        None => (extract_sections(document.root_element()), String::new()),
    }
}

fn is_gated(document: &Html) -> bool {
    [DOWNLOAD_ONLY_SELECTOR, LOGIN_GATE_SELECTOR]
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .any(|selector| document.select(&selector).next().is_some())
}

fn raw_attributes(outcome: FetchOutcome, url: &str) -> RawAttributes {
    let parsed = match outcome {
        FetchOutcome::Success { body, .. } => parse_attribute_fragment(&body),
        FetchOutcome::Failure { kind, detail, .. } => {
            tracing::warn!("Attribute fetch for {} failed ({}): {}", url, kind, detail);
            return RawAttributes::new();
        }
    };

    parsed.unwrap_or_else(|e: ExtractError| {
        tracing::warn!("{} for {}: {}", e.category(), url, e);
        RawAttributes::new()
    })
}
