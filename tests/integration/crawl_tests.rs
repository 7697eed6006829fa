//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end over the real HTTP transport.

use link_crawler::config::{parse_config, Config};
use link_crawler::crawler::{crawl, Crawler, DiscardReason};
use link_crawler::output::{format_crawling_results, CrawlStatistics};
use link_crawler::TransportError;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `seed`
fn create_test_config(seed: &str) -> Config {
    let mut config = Config::new(seed);
    config.crawler.max_runners = 5;
    config.crawler.sleep_between_retries_ms = 10;
    config.crawler.request_timeout_ms = 5_000;
    config
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&format!(
            r#"<a href="{}/page1">Page 1</a>
               <a href="/page2">Page 2</a>
               <a href="page1#section">Page 1 again</a>"#,
            base_url
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html_page(r#"<a href="/">Home</a><a href="/page2">Page 2</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html_page("Content 2"))
        .mount(&mock_server)
        .await;

    let report = crawl(create_test_config(&format!("{}/", base_url)))
        .await
        .expect("Crawl failed");

    assert_eq!(report.succeeded.len(), 3);
    assert!(report.failed.is_empty());

    let root = &report.succeeded[&format!("{}/", base_url)];
    assert_eq!(root.depth, 0);
    assert_eq!(root.status, 200);
    assert_eq!(
        root.links,
        vec![
            format!("{}/page1", base_url),
            format!("{}/page2", base_url),
            format!("{}/page1", base_url),
        ]
    );

    // Every page is fetched exactly once
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);

    let printed = format_crawling_results(&report);
    assert!(printed.contains(&format!(
        "The urls present in {}/ are: {}/page1 (2), {}/page2 (1)",
        base_url, base_url, base_url
    )));
}

#[tokio::test]
async fn test_configured_headers_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("User-Agent", "LinkCrawlerTest/1.0"))
        .and(header("X-Crawl", "yes"))
        .respond_with(html_page("hello"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = parse_config(&format!(
        r#"
[crawler]
url = "{}/"
max-runners = 2

[headers]
User-Agent = "LinkCrawlerTest/1.0"
X-Crawl = "yes"
"#,
        mock_server.uri()
    ))
    .unwrap();

    let report = crawl(config).await.unwrap();
    assert_eq!(report.succeeded.len(), 1);
}

#[tokio::test]
async fn test_retry_on_server_error() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // First two requests fail, the third succeeds
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("finally"))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&format!("{}/", base_url));
    config.crawler.max_retries = 5;
    config.crawler.sleep_between_retries_ms = 50;

    let started = std::time::Instant::now();
    let report = crawl(config).await.unwrap();

    let page = &report.succeeded[&format!("{}/", base_url)];
    assert_eq!(page.attempts, 3);
    assert_eq!(report.requests_made, 3);
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_permanent_failures() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/broken">b</a><a href="/missing">m</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&format!("{}/", base_url));
    config.crawler.max_retries = 2;

    let report = crawl(config).await.unwrap();

    let broken = &report.failed[&format!("{}/broken", base_url)];
    assert_eq!(broken.attempts, 3);
    assert!(matches!(
        broken.error,
        TransportError::Status { status: 500, .. }
    ));

    let missing = &report.failed[&format!("{}/missing", base_url)];
    assert_eq!(missing.attempts, 1);

    let stats = CrawlStatistics::from_report(&report);
    assert_eq!(stats.pages_failed, 2);
    assert_eq!(stats.requests_made, 5);
    assert_eq!(stats.retries, 2);
}

#[tokio::test]
async fn test_domain_filter_keeps_crawl_on_seed_domain() {
    let seed_server = MockServer::start().await;
    let other_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&format!(
            r#"<a href="{}/elsewhere">Other site</a>"#,
            other_server.uri()
        )))
        .mount(&seed_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(html_page("other"))
        .mount(&other_server)
        .await;

    let report = crawl(create_test_config(&format!("{}/", seed_server.uri())))
        .await
        .unwrap();

    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(
        report.discarded[&format!("{}/elsewhere", other_server.uri())].reason,
        DiscardReason::OutOfScope
    );
    assert!(other_server.received_requests().await.unwrap().is_empty());

    // Without the filter the other site is crawled too
    let mut config = create_test_config(&format!("{}/", seed_server.uri()));
    config.crawler.domain_filter = false;
    let report = crawl(config).await.unwrap();

    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(other_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_max_depth_respected() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    for (page, next) in [("/", "/level1"), ("/level1", "/level2"), ("/level2", "/level3")] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html_page(&format!(r#"<a href="{}">next</a>"#, next)))
            .mount(&mock_server)
            .await;
    }

    let mut config = create_test_config(&format!("{}/", base_url));
    config.crawler.max_depth = Some(1);

    let report = crawl(config).await.unwrap();

    assert_eq!(report.succeeded.len(), 2);
    assert!(report
        .succeeded
        .contains_key(&format!("{}/level1", base_url)));
    assert_eq!(
        report.discarded[&format!("{}/level2", base_url)].reason,
        DiscardReason::DepthExceeded
    );
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_request_timeout_is_a_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/slow">slow</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page("late").set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&format!("{}/", base_url));
    config.crawler.request_timeout_ms = 200;
    config.crawler.max_retries = 1;

    let report = crawl(config).await.unwrap();

    let slow = &report.failed[&format!("{}/slow", base_url)];
    assert_eq!(slow.attempts, 2);
    assert!(matches!(slow.error, TransportError::Timeout { .. }));
}

#[tokio::test]
async fn test_invalid_seed_is_fatal() {
    let result = Crawler::new(Config::new("mailto:someone@example.com"));
    assert!(matches!(
        result,
        Err(link_crawler::CrawlError::InvalidSeed { .. })
    ));
}
