//! Title, introduction and section parsing shared by every page type
//!
//! # Section rules
//!
//! For every `<h2>` in document order, the sibling elements that follow it
//! up to (not including) the next `<h2>` form one section:
//!
//! | Sibling | Fragment |
//! |---------|----------|
//! | `<p>` containing `<img>` | image `src`, or [`NO_IMAGE_SOURCE`] |
//! | `<p>` | trimmed text |
//! | `<blockquote>` | text of every `<em>` inside (citations) |
//! | anything else (including `<a>`) | nothing |
//!
//! The section title is the `<strong>` text of the heading, or empty.

use crate::extract::fragment::{join_fragments, Fragment};
use crate::extract::ExtractError;
use crate::model::{ContentSection, NO_INTRODUCTION};
use scraper::{ElementRef, Html, Selector};

/// Fragment emitted for an image tag without a usable `src`
pub const NO_IMAGE_SOURCE: &str = "No image source";

/// Selector of the summary paragraph under the title
const INTRODUCTION_SELECTOR: &str = "strong.d-block.mt-3.mb-3.sapo";

/// Extracts the trimmed text of the first `<h1>`
///
/// A page without one is not a valid detail page.
pub fn extract_title(document: &Html) -> Result<String, ExtractError> {
    let selector = Selector::parse("h1").map_err(|_| ExtractError::MissingTitle)?;

    document
        .select(&selector)
        .next()
        .map(|element| element_text(&element))
        .ok_or(ExtractError::MissingTitle)
}

/// Extracts the summary paragraph, falling back to [`NO_INTRODUCTION`]
pub fn extract_introduction(document: &Html) -> String {
    Selector::parse(INTRODUCTION_SELECTOR)
        .ok()
        .and_then(|selector| document.select(&selector).next().map(|e| element_text(&e)))
        .unwrap_or_else(|| NO_INTRODUCTION.to_string())
}

/// Extracts the trimmed text of the first element matching `css`
pub(crate) fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next().map(|e| element_text(&e))
}

/// Parses every level-2 section below `root`
pub fn extract_sections(root: ElementRef<'_>) -> Vec<ContentSection> {
    let (Ok(heading), Ok(strong)) = (Selector::parse("h2"), Selector::parse("strong")) else {
        return Vec::new();
    };

    root.select(&heading)
        .map(|h2| ContentSection {
            sub_title: h2
                .select(&strong)
                .next()
                .map(|s| element_text(&s))
                .unwrap_or_default(),
            sub_content: join_fragments(&section_fragments(h2)),
        })
        .collect()
}

/// Collects the fragments between `heading` and the next `<h2>` sibling
fn section_fragments(heading: ElementRef<'_>) -> Vec<Fragment> {
    let mut fragments = Vec::new();

    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        match sibling.value().name() {
            "h2" => break,
            "p" => fragments.push(paragraph_fragment(sibling)),
            "blockquote" => fragments.push(citation_fragment(sibling)),
            _ => {}
        }
    }

    fragments
}

fn paragraph_fragment(paragraph: ElementRef<'_>) -> Fragment {
    let image = Selector::parse("img")
        .ok()
        .and_then(|selector| paragraph.select(&selector).next());

    match image {
        Some(img) => {
            let src = img
                .value()
                .attr("src")
                .filter(|src| !src.is_empty())
                .unwrap_or(NO_IMAGE_SOURCE);
            Fragment::ImageRef(src.to_string())
        }
        None => Fragment::Text(element_text(&paragraph)),
    }
}

fn citation_fragment(quote: ElementRef<'_>) -> Fragment {
    let citations = match Selector::parse("em") {
        Ok(selector) => quote
            .select(&selector)
            .map(|em| Fragment::Text(em.text().collect()))
            .collect(),
        Err(_) => Vec::new(),
    };
    Fragment::Citations(citations)
}

/// Concatenated, trimmed text content of an element
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
