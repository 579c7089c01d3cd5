//! Category listing pages
//!
//! Every listing page is a grid of `<article>` cards:
//!
//! ```html
//! <article>
//!   <a class="title-link" href="/phap-luat/doanh-nghiep/...html">...</a>
//!   <a class="d-block sub-item-head-keyword">Doanh nghiệp</a>
//!   <span class="sub-time">08:00 | 12/05/2023</span>
//! </article>
//! ```

use crate::crawler::{FetchOutcome, ProxyFetcher};
use crate::model::ArticleDescriptor;
use crate::url::{category_slug, listing_page_url};
use scraper::{ElementRef, Html, Selector};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Result of a listing discovery pass
#[derive(Debug, Clone, Default)]
pub struct ListingDiscovery {
    /// Descriptors in page order, then card order
    pub articles: Vec<ArticleDescriptor>,

    /// Listing pages that could not be fetched
    pub failed_pages: Vec<String>,
}

/// Parses one listing page into article descriptors
///
/// Cards without a `title-link` are dropped. Relative links are resolved
/// against `base_url`; the category is the slug of `page_url`.
pub fn parse_listing_page(html: &str, page_url: &str, base_url: &str) -> Vec<ArticleDescriptor> {
    let (Ok(article), Ok(title_link), Ok(keyword), Ok(sub_time)) = (
        Selector::parse("article"),
        Selector::parse("a.title-link"),
        Selector::parse(".d-block.sub-item-head-keyword"),
        Selector::parse("span.sub-time"),
    ) else {
        return Vec::new();
    };

    let base = Url::parse(base_url).ok();
    let category = category_slug(page_url).unwrap_or_default();
    let document = Html::parse_document(html);

    document
        .select(&article)
        .filter_map(|card| {
            let href = card.select(&title_link).next()?.value().attr("href")?;
            let link = resolve(base.as_ref(), href)?;

            let mut keywords: Vec<String> = card.select(&keyword).map(|k| text(&k)).collect();
            if keywords.is_empty() {
                keywords.push(String::new());
            }

            let (time, date) = match card.select(&sub_time).next() {
                Some(stamp) => split_timestamp(&text(&stamp)),
                None => (None, None),
            };

            Some(ArticleDescriptor {
                link,
                keyword: keywords,
                time,
                date,
                category: category.clone(),
            })
        })
        .collect()
}

/// Splits a `"08:00 | 12/05/2023"` stamp into `(time, date)`
///
/// Spaces are removed first. A stamp without a separator is kept whole as
/// the time.
pub fn split_timestamp(raw: &str) -> (Option<String>, Option<String>) {
    let compact: String = raw.chars().filter(|c| *c != ' ').collect();
    if compact.is_empty() {
        return (None, None);
    }

    let mut parts = compact.split('|');
    let time = parts.next().map(str::to_string);
    let date = parts.next().map(str::to_string);
    (time, date)
}

fn resolve(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match base {
        Some(base) => base.join(href).ok().map(|u| u.to_string()),
        None => Some(href.to_string()),
    }
}

fn text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Fetches every page of every category template and parses its cards
///
/// Up to `width` pages are in flight at once. Failed pages are reported,
/// never retried.
pub async fn discover_listing_pages(
    fetcher: Arc<ProxyFetcher>,
    templates: &[String],
    pages: RangeInclusive<u32>,
    base_url: &str,
    width: usize,
) -> ListingDiscovery {
    let page_urls: Vec<String> = templates
        .iter()
        .flat_map(|template| pages.clone().map(move |page| listing_page_url(template, page)))
        .collect();
    tracing::info!("Discovering articles from {} listing pages", page_urls.len());

    let semaphore = Arc::new(Semaphore::new(width.max(1)));
    let mut tasks = JoinSet::new();

    for (index, page_url) in page_urls.iter().cloned().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let fetcher = Arc::clone(&fetcher);
        let base_url = base_url.to_string();

        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return (index, None);
            };
            let articles = match fetcher.fetch(&page_url, None).await {
                FetchOutcome::Success { body, .. } => {
                    Some(parse_listing_page(&body, &page_url, &base_url))
                }
                FetchOutcome::Failure { kind, detail, .. } => {
                    tracing::warn!("Error processing {} ({}): {}", page_url, kind, detail);
                    None
                }
            };
            (index, articles)
        });
    }

    let mut results: Vec<Option<Vec<ArticleDescriptor>>> = vec![None; page_urls.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, articles)) => results[index] = articles,
            Err(e) => tracing::error!("Listing worker did not complete: {}", e),
        }
    }

    let mut discovery = ListingDiscovery::default();
    for (page_url, result) in page_urls.into_iter().zip(results) {
        match result {
            Some(articles) => discovery.articles.extend(articles),
            None => discovery.failed_pages.push(page_url),
        }
    }

    tracing::info!(
        "Discovered {} articles, {} listing pages failed",
        discovery.articles.len(),
        discovery.failed_pages.len()
    );
    discovery
}
