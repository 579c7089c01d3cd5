use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Worker pool width for detail-page crawling
    pub threads: usize,

    /// Number of work items dispatched per batch
    pub batch_size: usize,

    /// Worker pool width for listing-page discovery
    pub listing_threads: usize,

    /// First listing page to visit (inclusive)
    pub page_start: u32,

    /// Last listing page to visit (inclusive)
    pub page_end: u32,

    /// Maximum number of leaf sitemaps walked per run (0 walks all of them)
    pub max_sitemaps: usize,

    /// Per-request timeout handed to the HTTP client (seconds)
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            batch_size: 100,
            listing_threads: 64,
            page_start: 1,
            page_end: 499,
            max_sitemaps: 1,
            request_timeout_secs: 30,
        }
    }
}

/// Egress proxy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProxyConfig {
    /// Route requests through a randomly chosen proxy
    pub enabled: bool,

    /// Upstream service returning newline-delimited `host:port` entries
    pub list_url: String,

    /// Local cache of the proxy list, written once on first use
    pub cache_path: PathBuf,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            list_url: "https://api.proxyscrape.com/v2/?request=displayproxies&protocol=http&timeout=10000&country=all&ssl=all&anonymity=all".to_string(),
            cache_path: PathBuf::from("config/proxy_list.txt"),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
        }
    }
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Origin used to resolve listing links and the attribute endpoint
    pub base_url: String,

    /// Identifier stored in the `source` field of every record
    pub source_name: String,

    /// Root sitemap index
    pub sitemap_url: String,

    /// Path of the AJAX endpoint serving document attributes
    pub attribute_path: String,

    /// Category listing templates; `{}` is replaced by the page number
    pub categories: Vec<String>,
}

const CATEGORY_SLUGS: &[&str] = &[
    "cong-nghe-thong-tin",
    "doanh-nghiep",
    "lao-dong-tien-luong",
    "bat-dong-san",
    "vi-pham-hanh-chinh",
    "bao-hiem",
    "quyen-dan-su",
    "van-hoa-xa-hoi",
    "thuong-mai",
    "trach-nhiem-hinh-su",
    "xay-dung-do-thi",
    "chung-khoan",
    "ke-toan-kiem-toan",
    "thue-phi-le-phi",
    "xuat-nhap-khau",
    "tien-te-ngan-hang",
    "dau-tu",
    "so-huu-tri-tue",
    "thu-tuc-to-tung",
    "tai-chinh-nha-nuoc",
    "the-thao-y-te",
    "dich-vu-phap-ly",
    "tai-nguyen-moi-truong",
    "giao-duc",
    "giao-thong-van-tai",
    "hanh-chinh",
    "linh-vuc-khac",
];

impl Default for SiteConfig {
    fn default() -> Self {
        let base_url = "https://thuvienphapluat.vn".to_string();
        let categories = CATEGORY_SLUGS
            .iter()
            .map(|slug| format!("{}/phap-luat/{}?page={{}}", base_url, slug))
            .collect();

        Self {
            sitemap_url: format!("{}/sitemap.xml", base_url),
            source_name: "thuvienphapluat.vn".to_string(),
            attribute_path: "/AjaxLoadData/LoadLuocDo.aspx".to_string(),
            base_url,
            categories,
        }
    }
}

/// Output locations for every persisted artifact
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Append-only store of discovered document URLs
    pub urls_path: PathBuf,

    /// Directory receiving archived leaf sitemap bodies
    pub sitemap_dir: PathBuf,

    /// JSON array of document records
    pub documents_path: PathBuf,

    /// Successful document URLs (rewritten each batch)
    pub successful_path: PathBuf,

    /// Failed document URLs (rewritten each batch)
    pub failed_path: PathBuf,

    /// JSON array of article records
    pub articles_path: PathBuf,

    /// Successful article URLs (rewritten each batch)
    pub articles_successful_path: PathBuf,

    /// Failed article URLs (rewritten each batch)
    pub articles_failed_path: PathBuf,

    /// CSV export of listing-page descriptors
    pub listing_path: PathBuf,

    /// Listing pages that could not be fetched or parsed
    pub failed_listing_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            urls_path: PathBuf::from("data/raw/urls/urls.lines"),
            sitemap_dir: PathBuf::from("data/raw/sitemap"),
            documents_path: PathBuf::from("data/processed/documents.json"),
            successful_path: PathBuf::from("successful_urls.txt"),
            failed_path: PathBuf::from("failed_urls.txt"),
            articles_path: PathBuf::from("data/qa/documents.json"),
            articles_successful_path: PathBuf::from("successful_qa_urls.txt"),
            articles_failed_path: PathBuf::from("failed_qa_urls.txt"),
            listing_path: PathBuf::from("data/data.csv"),
            failed_listing_path: PathBuf::from("failed_links_summary.txt"),
        }
    }
}
