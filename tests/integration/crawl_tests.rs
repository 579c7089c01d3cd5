//! Integration tests for fetching and batch crawling
//!
//! These tests use wiremock to create mock HTTP servers and run the
//! document and article pipelines end-to-end.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tvpl_crawler::config::{ProxyConfig, SiteConfig};
use tvpl_crawler::crawler::{
    FailureKind, FetchOutcome, Orchestrator, Pipeline, ProxyFetcher, ProxyPool,
};
use tvpl_crawler::model::{ListingMeta, WorkItem};
use tvpl_crawler::storage::{load_records, read_url_list};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fetcher that connects directly (no proxy pool)
fn direct_fetcher(timeout: Duration) -> ProxyFetcher {
    let config = ProxyConfig {
        enabled: false,
        ..ProxyConfig::default()
    };
    ProxyFetcher::new(&config, timeout).expect("Failed to build fetcher")
}

/// Site settings pointing at the mock server
fn site_config(base_url: &str) -> SiteConfig {
    SiteConfig {
        base_url: base_url.to_string(),
        sitemap_url: format!("{}/sitemap.xml", base_url),
        categories: vec![format!("{}/phap-luat/doanh-nghiep?page={{}}", base_url)],
        ..SiteConfig::default()
    }
}

fn orchestrator(dir: &TempDir, pipeline: Pipeline, base_url: &str, width: usize) -> Orchestrator {
    Orchestrator::new(
        pipeline,
        Arc::new(direct_fetcher(Duration::from_secs(5))),
        site_config(base_url),
        width,
        dir.path().join("successful_urls.txt"),
        dir.path().join("failed_urls.txt"),
    )
}

fn html_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{0}</title></head><body><h1>{0}</h1>{1}</body></html>",
        title, body
    )
}

#[tokio::test]
async fn test_fetch_success_and_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("xin chào"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = direct_fetcher(Duration::from_secs(5));

    let ok = fetcher.fetch(&format!("{}/ok", mock_server.uri()), None).await;
    assert_eq!(
        ok,
        FetchOutcome::Success {
            status_code: 200,
            body: "xin chào".to_string()
        }
    );

    let missing = fetcher
        .fetch(&format!("{}/missing", mock_server.uri()), None)
        .await;
    match missing {
        FetchOutcome::Failure {
            kind, status_code, ..
        } => {
            assert_eq!(kind, FailureKind::HttpError);
            assert_eq!(status_code, Some(404));
        }
        other => panic!("Expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_timeout_is_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let fetcher = direct_fetcher(Duration::from_millis(300));
    let outcome = fetcher
        .fetch(&format!("{}/slow", mock_server.uri()), None)
        .await;

    assert!(
        matches!(
            outcome,
            FetchOutcome::Failure {
                kind: FailureKind::Timeout,
                status_code: None,
                ..
            }
        ),
        "unexpected outcome: {:?}",
        outcome
    );
}

#[tokio::test]
async fn test_referer_header_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ajax"))
        .and(header("referer", "https://thuvienphapluat.vn/van-ban/a-1.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let fetcher = direct_fetcher(Duration::from_secs(5));
    let url = format!("{}/ajax", mock_server.uri());

    let with_referer = fetcher
        .fetch(&url, Some("https://thuvienphapluat.vn/van-ban/a-1.aspx"))
        .await;
    assert!(with_referer.is_success());

    // Without the header no mock matches and wiremock answers 404
    let without_referer = fetcher.fetch(&url, None).await;
    assert!(!without_referer.is_success());
}

#[tokio::test]
async fn test_proxy_list_is_downloaded_once_and_cached() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("config/proxy_list.txt");

    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1.2.3.4:80\r\n5.6.7.8:3128\r\n"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let list_url = format!("{}/proxies", mock_server.uri());
    let client = reqwest::Client::new();

    let pool = ProxyPool::new(&list_url, &cache);
    for _ in 0..5 {
        let chosen = pool.choose(&client).await.unwrap();
        assert!(chosen == "1.2.3.4:80" || chosen == "5.6.7.8:3128");
    }
    assert_eq!(pool.len(), 2);
    assert_eq!(
        std::fs::read_to_string(&cache).unwrap(),
        "1.2.3.4:80\n5.6.7.8:3128\n"
    );

    // A second pool in the same process reads the cache instead of the service
    let second = ProxyPool::new(&list_url, &cache);
    assert!(second.choose(&client).await.is_ok());
}

#[tokio::test]
async fn test_document_pipeline_with_attribute_endpoint() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    let page_path = "/van-ban/Doanh-nghiep/Luat-Doanh-nghiep-2020-427301.aspx";
    let page_url = format!("{}{}", base, page_path);

    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(
            "Luật Doanh nghiệp 2020",
            r#"<div class="content1">
                 <h2><strong>Chương I</strong></h2>
                 <p>Điều 1. Phạm vi điều chỉnh</p>
                 <p><img src="/img/a.png"></p>
                 <p><a href="/van-ban/khac.aspx">khác</a></p>
               </div>"#,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/AjaxLoadData/LoadLuocDo.aspx"))
        .and(query_param("LawID", "427301"))
        .and(header("referer", page_url.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="tt">Luật Doanh nghiệp</div>
               <div class="att"><div class="hd fl">Số hiệu:</div><div class="ds fl">59/2020/QH14</div></div>
               <div class="att"><div class="hd fl">Loại văn bản:</div><div class="ds fl">Luật</div></div>
               <div class="att"><div class="hd fl">Nơi ban hành:</div><div class="ds fl">Quốc hội</div></div>
               <div class="att"><div class="hd fl">Người ký:</div><div class="ds fl">Nguyễn Thị Kim Ngân</div></div>
               <div class="att"><div class="hd fl">Ngày ban hành:</div><div class="ds fl">17/06/2020</div></div>
               <div class="att"><div class="hd fl">Tình trạng:</div><div class="ds fl">Còn hiệu lực</div></div>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let orchestrator = orchestrator(&dir, Pipeline::Documents, &base, 2);
    let report = orchestrator
        .crawl_batch(vec![WorkItem::from_url(page_url.clone())])
        .await
        .expect("Batch failed");

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 0);

    let ledger = orchestrator.ledger();
    let record = &ledger.records()[0];
    assert_eq!(record.source_id, "427301");
    assert_eq!(record.title, "Luật Doanh nghiệp 2020");
    assert_eq!(record.content[0].sub_title, "Chương I");
    assert_eq!(
        record.content[0].sub_content,
        "Điều 1. Phạm vi điều chỉnh\n/img/a.png\nkhác"
    );

    let attribute = record.attribute.as_ref().unwrap();
    assert_eq!(attribute.official_number[0], "59/2020/QH14");
    assert_eq!(attribute.document_info[1], "Tình trạng: Còn hiệu lực");
    assert_eq!(attribute.issuing_body(), "Quốc hội");
    assert_eq!(record.metadata.author, "Nguyễn Thị Kim Ngân");
    assert_eq!(record.metadata.category_type, "Luật");
    assert!(!record.html_text.as_ref().unwrap().contains("href"));

    assert_eq!(
        read_url_list(&dir.path().join("successful_urls.txt")).unwrap(),
        vec![page_url.clone()]
    );

    let json_path = dir.path().join("processed/documents.json");
    assert_eq!(orchestrator.save(&json_path).unwrap(), 1);
    let saved = load_records(&json_path).unwrap();
    assert_eq!(saved[0].url, page_url);
    assert!(!saved[0].html_text.as_ref().unwrap().contains('\n'));
}

#[tokio::test]
async fn test_document_survives_failed_attribute_endpoint() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    let page_url = format!("{}/van-ban/Nghi-dinh-15-2020-ND-CP-433210.aspx", base);

    Mock::given(method("GET"))
        .and(path("/van-ban/Nghi-dinh-15-2020-ND-CP-433210.aspx"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(html_page("Nghị định 15", "<p>x</p>")),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/AjaxLoadData/LoadLuocDo.aspx"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let orchestrator = orchestrator(&dir, Pipeline::Documents, &base, 1);
    let report = orchestrator
        .crawl_batch(vec![WorkItem::from_url(page_url)])
        .await
        .unwrap();

    assert_eq!(report.succeeded, 1);
    let ledger = orchestrator.ledger();
    let attribute = ledger.records()[0].attribute.as_ref().unwrap();
    assert_eq!(attribute.official_number, [String::new()]);
    assert_eq!(attribute.issuing_body_office_signer.len(), 3);
}

#[tokio::test]
async fn test_article_pipeline_uses_listing_metadata() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/phap-luat/doanh-nghiep/von-dieu-le.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(
            "Vốn điều lệ là gì?",
            r#"<strong class="d-block mt-3 mb-3 sapo">Tóm tắt</strong>
               <span class="text-end fw-bold">Trần Thị B</span>
               <div><h2><strong>Khái niệm</strong></h2><p>Vốn điều lệ là...</p></div>"#,
        )))
        .mount(&mock_server)
        .await;

    let url = format!("{}/phap-luat/doanh-nghiep/von-dieu-le.html", base);
    let item = WorkItem {
        url: url.clone(),
        listing: Some(ListingMeta {
            keyword: vec!["Doanh nghiệp".to_string()],
            time: Some("08:00".to_string()),
            date: Some("12/05/2023".to_string()),
            category: "doanh-nghiep".to_string(),
        }),
    };

    let orchestrator = orchestrator(&dir, Pipeline::Articles, &base, 4);
    orchestrator.crawl_batch(vec![item]).await.unwrap();

    let ledger = orchestrator.ledger();
    let record = &ledger.records()[0];
    assert_eq!(record.source_id, url);
    assert_eq!(record.keyword, Some(vec!["Doanh nghiệp".to_string()]));
    assert_eq!(record.introduction, "Tóm tắt");
    assert_eq!(record.metadata.time_published, "08:00");
    assert_eq!(record.metadata.date_published, "12/05/2023");
    assert_eq!(record.metadata.category_type, "doanh-nghiep");
    assert_eq!(record.metadata.author, "Trần Thị B");
    assert_eq!(record.content[0].sub_content, "Vốn điều lệ là...");
}

/// Mounts ten article pages: even ones succeed, multiples of three fail
/// with 500, the rest have no title
async fn mount_mixed_articles(mock_server: &MockServer) -> Vec<String> {
    let mut urls = Vec::new();
    for i in 0..10 {
        let page_path = format!("/phap-luat/bai-{}.html", i);
        let response = if i % 2 == 0 {
            ResponseTemplate::new(200).set_body_string(html_page(&format!("Bài {}", i), "<p>x</p>"))
        } else if i % 3 == 0 {
            ResponseTemplate::new(500)
        } else {
            ResponseTemplate::new(200).set_body_string("<html><body><p>no title</p></body></html>")
        };

        Mock::given(method("GET"))
            .and(path(page_path.as_str()))
            .respond_with(response.set_delay(Duration::from_millis(10 * (i % 4))))
            .mount(mock_server)
            .await;
        urls.push(format!("{}{}", mock_server.uri(), page_path));
    }
    urls
}

#[tokio::test]
async fn test_pool_width_does_not_change_ledger_contents() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let urls = mount_mixed_articles(&mock_server).await;

    let mut outcomes = Vec::new();
    for width in [1, 8] {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(&dir, Pipeline::Articles, &base, width);
        let items = urls.iter().cloned().map(WorkItem::from_url).collect();
        let report = orchestrator.crawl_batch(items).await.unwrap();
        assert_eq!(report.succeeded + report.failed, urls.len());

        let ledger = orchestrator.ledger();
        let successful: BTreeSet<String> = ledger.successful().iter().cloned().collect();
        let failed: BTreeSet<String> = ledger.failed().iter().cloned().collect();
        let titles: BTreeSet<String> = ledger.records().iter().map(|r| r.title.clone()).collect();
        outcomes.push((successful, failed, titles));
    }

    assert_eq!(outcomes[0], outcomes[1]);
    let (successful, failed, _) = &outcomes[0];
    assert_eq!(successful.len(), 5);
    assert_eq!(failed.len(), 5);
}

#[tokio::test]
async fn test_ledger_accumulates_across_batches() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let urls = mount_mixed_articles(&mock_server).await;

    let orchestrator = orchestrator(&dir, Pipeline::Articles, &base, 3);
    for batch in urls.chunks(4) {
        let items = batch.iter().cloned().map(WorkItem::from_url).collect();
        orchestrator.crawl_batch(items).await.unwrap();
    }

    // URL lists are rewritten with the full ledger after every batch
    let successful = read_url_list(&dir.path().join("successful_urls.txt")).unwrap();
    let failed = read_url_list(&dir.path().join("failed_urls.txt")).unwrap();
    assert_eq!(successful.len(), 5);
    assert_eq!(failed.len(), 5);

    let json_path = dir.path().join("qa/documents.json");
    assert_eq!(orchestrator.save(&json_path).unwrap(), 5);
}

#[tokio::test]
async fn test_retried_failure_leaves_failed_list() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    // First request fails, every later one succeeds
    Mock::given(method("GET"))
        .and(path("/phap-luat/thu-lai.html"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/phap-luat/thu-lai.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Thử lại", "<p>x</p>")))
        .mount(&mock_server)
        .await;

    let url = format!("{}/phap-luat/thu-lai.html", base);
    let failed_path = dir.path().join("failed_urls.txt");
    let orchestrator = orchestrator(&dir, Pipeline::Articles, &base, 2);

    let report = orchestrator
        .crawl_batch(vec![WorkItem::from_url(url.clone())])
        .await
        .unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(read_url_list(&failed_path).unwrap(), vec![url.clone()]);

    let report = orchestrator
        .crawl_batch(vec![WorkItem::from_url(url.clone())])
        .await
        .unwrap();
    assert_eq!(report.succeeded, 1);

    let ledger = orchestrator.ledger();
    assert_eq!(ledger.successful(), [url.clone()]);
    assert!(ledger.failed().is_empty());
    assert!(!failed_path.exists());
    assert_eq!(
        read_url_list(&dir.path().join("successful_urls.txt")).unwrap(),
        vec![url]
    );
}
