//! Integration tests for sitemap and listing discovery

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tvpl_crawler::config::ProxyConfig;
use tvpl_crawler::crawler::ProxyFetcher;
use tvpl_crawler::discovery::{
    dedup_preserving_order, discover_documents, discover_listing_pages, discover_sitemap_tree,
};
use tvpl_crawler::storage::{read_listing_csv, write_listing_csv, UrlLineStore};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn direct_fetcher() -> ProxyFetcher {
    let config = ProxyConfig {
        enabled: false,
        ..ProxyConfig::default()
    };
    ProxyFetcher::new(&config, Duration::from_secs(5)).expect("Failed to build fetcher")
}

fn urlset(urls: &[&str]) -> String {
    let entries: String = urls
        .iter()
        .map(|u| format!("<url><loc>{}</loc></url>", u))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

/// Mounts an index with three leaves; the second leaf answers 500
async fn mount_sitemaps(mock_server: &MockServer) {
    let base = mock_server.uri();
    let index = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>{0}/sitemap1.xml</loc></sitemap>
  <sitemap><loc>{0}/sitemap2.xml</loc></sitemap>
  <sitemap><loc>{0}/sitemap3.xml</loc></sitemap>
</sitemapindex>"#,
        base
    );

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap1.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&[
            "https://thuvienphapluat.vn/van-ban/a-1.aspx",
            "https://thuvienphapluat.vn/van-ban/b-2.aspx",
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap2.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap3.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&[
            "https://thuvienphapluat.vn/van-ban/b-2.aspx",
            "https://thuvienphapluat.vn/van-ban/c-3.aspx",
        ])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_sitemap_tree_lists_leaves() {
    let mock_server = MockServer::start().await;
    mount_sitemaps(&mock_server).await;

    let fetcher = direct_fetcher();
    let leaves = discover_sitemap_tree(&fetcher, &format!("{}/sitemap.xml", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(leaves.len(), 3);
    assert!(leaves[0].ends_with("/sitemap1.xml"));
    assert!(leaves[2].ends_with("/sitemap3.xml"));
}

#[tokio::test]
async fn test_failed_sitemap_index_is_an_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let fetcher = direct_fetcher();
    let result =
        discover_sitemap_tree(&fetcher, &format!("{}/sitemap.xml", mock_server.uri())).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_discover_documents_skips_failed_leaf() {
    let mock_server = MockServer::start().await;
    mount_sitemaps(&mock_server).await;
    let dir = TempDir::new().unwrap();

    let fetcher = direct_fetcher();
    let store = UrlLineStore::new(dir.path().join("urls/urls.lines"));
    let sitemap_dir = dir.path().join("sitemap");

    let leaves = discover_sitemap_tree(&fetcher, &format!("{}/sitemap.xml", mock_server.uri()))
        .await
        .unwrap();
    let stats = discover_documents(&fetcher, &leaves, &store, &sitemap_dir)
        .await
        .unwrap();

    assert_eq!(stats.leaves_processed, 2);
    assert_eq!(stats.leaves_skipped, 1);
    assert_eq!(stats.urls_appended, 4);

    // Declaration order is kept and duplicates are not removed
    assert_eq!(
        store.load().unwrap(),
        vec![
            "https://thuvienphapluat.vn/van-ban/a-1.aspx",
            "https://thuvienphapluat.vn/van-ban/b-2.aspx",
            "https://thuvienphapluat.vn/van-ban/b-2.aspx",
            "https://thuvienphapluat.vn/van-ban/c-3.aspx",
        ]
    );

    let archived = std::fs::read_dir(&sitemap_dir).unwrap().count();
    assert!(archived >= 1);
}

#[tokio::test]
async fn test_rediscovery_appends_without_losing_entries() {
    let mock_server = MockServer::start().await;
    mount_sitemaps(&mock_server).await;
    let dir = TempDir::new().unwrap();

    let store = UrlLineStore::new(dir.path().join("urls.lines"));
    store.append("https://thuvienphapluat.vn/van-ban/cu-0.aspx").unwrap();

    let fetcher = direct_fetcher();
    let leaves = vec![format!("{}/sitemap1.xml", mock_server.uri())];
    let sitemap_dir = dir.path().join("sitemap");

    discover_documents(&fetcher, &leaves, &store, &sitemap_dir)
        .await
        .unwrap();
    discover_documents(&fetcher, &leaves, &store, &sitemap_dir)
        .await
        .unwrap();

    let lines = store.load().unwrap();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "https://thuvienphapluat.vn/van-ban/cu-0.aspx");

    let unique = dedup_preserving_order(lines);
    assert_eq!(
        unique,
        vec![
            "https://thuvienphapluat.vn/van-ban/cu-0.aspx",
            "https://thuvienphapluat.vn/van-ban/a-1.aspx",
            "https://thuvienphapluat.vn/van-ban/b-2.aspx",
        ]
    );
}

#[tokio::test]
async fn test_listing_discovery_collects_articles_and_failures() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/phap-luat/doanh-nghiep"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <article>
                    <a class="title-link" href="/phap-luat/doanh-nghiep/thanh-lap-cong-ty.html">Thành lập</a>
                    <span class="d-block sub-item-head-keyword">Doanh nghiệp</span>
                    <span class="sub-time">08:00 | 12/05/2023</span>
                </article>
                <article>
                    <a class="title-link" href="/phap-luat/doanh-nghiep/giai-the.html">Giải thể</a>
                </article>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/phap-luat/doanh-nghiep"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let templates = vec![format!("{}/phap-luat/doanh-nghiep?page={{}}", base)];
    let discovery =
        discover_listing_pages(Arc::new(direct_fetcher()), &templates, 1..=2, &base, 8).await;

    assert_eq!(discovery.articles.len(), 2);
    let first = &discovery.articles[0];
    assert_eq!(
        first.link,
        format!("{}/phap-luat/doanh-nghiep/thanh-lap-cong-ty.html", base)
    );
    assert_eq!(first.keyword, vec!["Doanh nghiệp"]);
    assert_eq!(first.time.as_deref(), Some("08:00"));
    assert_eq!(first.date.as_deref(), Some("12/05/2023"));
    assert_eq!(first.category, "doanh-nghiep");

    assert_eq!(discovery.articles[1].keyword, vec![""]);
    assert!(!discovery.articles[1].has_timestamp());

    assert_eq!(
        discovery.failed_pages,
        vec![format!("{}/phap-luat/doanh-nghiep?page=2", base)]
    );

    // The CSV export keeps every descriptor field
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("data/data.csv");
    write_listing_csv(&csv_path, &discovery.articles).unwrap();
    assert_eq!(read_listing_csv(&csv_path).unwrap(), discovery.articles);
}
