use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn document_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/([0-9]+)/|-([0-9]+)\.aspx").expect("document id pattern is valid")
    })
}

fn digits_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+").expect("digits pattern is valid"))
}

/// Extracts the numeric document id embedded in a document URL
///
/// The id is the first `/<digits>/` path segment or `-<digits>.aspx` suffix.
///
/// # Examples
///
/// ```
/// use tvpl_crawler::url::document_id;
///
/// let url = "https://thuvienphapluat.vn/van-ban/Doanh-nghiep/Luat-Doanh-nghiep-2020-427301.aspx";
/// assert_eq!(document_id(url), Some("427301".to_string()));
/// assert_eq!(document_id("https://thuvienphapluat.vn/"), None);
/// ```
pub fn document_id(url: &str) -> Option<String> {
    let captures = document_id_pattern().captures(url)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str().to_string())
}

/// Returns the first run of digits in a leaf sitemap URL
///
/// Used to name the archived copy of the sitemap (`sitemaps_part<N>.xml`).
pub fn sitemap_part(url: &str) -> Option<&str> {
    digits_pattern().find(url).map(|m| m.as_str())
}

/// Returns the category slug of a listing URL
///
/// The slug is the last non-empty path segment, without the query string:
/// `https://thuvienphapluat.vn/phap-luat/doanh-nghiep?page=3` → `doanh-nghiep`.
pub fn category_slug(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// Expands a category listing template for one page number
pub fn listing_page_url(template: &str, page: u32) -> String {
    template.replace("{}", &page.to_string())
}

/// Builds the attribute endpoint URL for a document id
pub fn attribute_url(base_url: &str, attribute_path: &str, id: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(base_url)?.join(attribute_path)?;
    url.query_pairs_mut().clear().append_pair("LawID", id);
    Ok(url.to_string())
}
