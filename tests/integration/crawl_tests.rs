//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive the full
//! dispatch cycle end-to-end through the HTTP fetcher.

use sitemap_crawler::config::{parse_config, CrawlerConfig, FetcherConfig, OutputConfig, UserAgentConfig};
use sitemap_crawler::crawler::{CrawlEngine, CrawlEvent, CrawlRequest, Dispatcher, HttpFetcher};
use sitemap_crawler::output::StatusEvent;
use sitemap_crawler::service::{CrawlService, CrawlUrlInput};
use sitemap_crawler::storage::{CrawlStorage, MemoryStorage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(
            format!("<html><body>{}</body></html>", body),
            "text/html; charset=utf-8",
        )
}

fn anchors(hrefs: &[&str]) -> String {
    hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect()
}

async fn mount_page(server: &MockServer, page: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(response)
        .mount(server)
        .await;
}

fn test_fetcher() -> Arc<HttpFetcher> {
    let fetcher_config = FetcherConfig {
        timeout: 5_000,
        connect_timeout: 1_000,
    };
    Arc::new(
        HttpFetcher::new(&fetcher_config, &UserAgentConfig::default())
            .expect("Failed to build HTTP fetcher"),
    )
}

fn test_engine() -> (CrawlEngine, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let engine = CrawlEngine::new(storage.clone(), test_fetcher(), &CrawlerConfig::default());
    (engine, storage)
}

async fn wait_finished(events: &mut broadcast::Receiver<StatusEvent>, url: &str) {
    let finished = async {
        loop {
            match events.recv().await {
                Ok(event) if event.is_finished() && event.url() == url => return,
                Ok(_) => continue,
                Err(e) => panic!("status channel failed: {}", e),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(10), finished)
        .await
        .expect("crawl did not finish in time");
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html(anchors(&[
            &format!("{}/page1", base_url),
            "/page2",
            "https://external.example/x",
            "mailto:someone@example.com",
        ])),
    )
    .await;
    mount_page(&mock_server, "/page1", html(anchors(&["/", "/page3"]))).await;
    mount_page(&mock_server, "/page2", ResponseTemplate::new(404)).await;
    mount_page(
        &mock_server,
        "/page3",
        ResponseTemplate::new(200)
            .set_body_string("<a href=\"/hidden\">not html</a>")
            .insert_header("content-type", "text/plain"),
    )
    .await;

    let (engine, storage) = test_engine();
    let (service, _event_loop) = CrawlService::start(engine, &OutputConfig::default());
    let mut events = service.subscribe();

    let message = service.crawl_url(CrawlUrlInput::new(&base_url)).unwrap();
    assert_eq!(message, format!("Started crawling {}", base_url));
    wait_finished(&mut events, &base_url).await;

    let record = storage.get(&base_url).await.expect("record should exist");
    assert!(!record.is_crawling);
    assert_eq!(
        record.crawled_data,
        vec![
            format!("{}/page1", base_url),
            format!("{}/page2", base_url),
            "https://external.example/x".to_string(),
            format!("{}/", base_url),
            format!("{}/page3", base_url),
        ]
    );

    // Text pages contribute no links
    assert!(!record
        .crawled_data
        .contains(&format!("{}/hidden", base_url)));

    let sitemap = service.generate_sitemap(&base_url, None).await.unwrap();
    assert_eq!(sitemap.hrefs.len(), 4);
    assert!(!sitemap.xml.contains("external.example"));

    let with_external = service.generate_sitemap(&base_url, Some(true)).await.unwrap();
    assert_eq!(with_external.hrefs.len(), 5);
}

#[tokio::test]
async fn test_crawl_result_truncated_to_budget() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let pages: Vec<String> = (0..20).map(|i| format!("/p{}", i)).collect();
    let page_refs: Vec<&str> = pages.iter().map(String::as_str).collect();
    mount_page(&mock_server, "/", html(anchors(&page_refs))).await;

    let (engine, storage) = test_engine();
    let (dispatcher, _event_loop) = Dispatcher::start(engine);
    let (done_tx, done_rx) = oneshot::channel();

    dispatcher
        .dispatch(CrawlEvent::InitCrawl(
            CrawlRequest::new(&base_url)
                .with_max_urls(5)
                .on_complete(move || {
                    let _ = done_tx.send(());
                }),
        ))
        .unwrap();
    done_rx.await.unwrap();

    let record = storage.get(&base_url).await.unwrap();
    assert_eq!(record.crawled_data.len(), 5);
    assert_eq!(record.crawled_data[0], format!("{}/p0", base_url));
}

#[tokio::test]
async fn test_record_is_crawling_while_worker_runs() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html(anchors(&["https://external.example/"])).set_delay(Duration::from_millis(500)),
    )
    .await;

    let (engine, storage) = test_engine();
    let (dispatcher, _event_loop) = Dispatcher::start(engine);
    let completions = Arc::new(AtomicUsize::new(0));
    let (done_tx, done_rx) = oneshot::channel();

    let counter = Arc::clone(&completions);
    dispatcher
        .dispatch_named(
            "initCrawl",
            CrawlRequest::new(&base_url).on_complete(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = done_tx.send(());
            }),
        )
        .unwrap();

    while !storage.has(&base_url).await {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let in_flight = storage.get(&base_url).await.unwrap();
    assert!(in_flight.is_crawling);
    assert!(in_flight.crawled_data.is_empty());
    assert_eq!(storage.currently_crawling().await.len(), 1);

    done_rx.await.unwrap();

    let done = storage.get(&base_url).await.unwrap();
    assert!(!done.is_crawling);
    assert_eq!(done.crawled_data, vec!["https://external.example/"]);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failing_site_still_completes() {
    // No mocks mounted: every request answers 404
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let (engine, storage) = test_engine();
    let (service, _event_loop) = CrawlService::start(engine, &OutputConfig::default());
    let mut events = service.subscribe();

    service.crawl_url(CrawlUrlInput::new(&base_url)).unwrap();
    wait_finished(&mut events, &base_url).await;

    let record = storage.get(&base_url).await.unwrap();
    assert!(!record.is_crawling);
    assert!(record.crawled_data.is_empty());

    let sitemap = service.generate_sitemap(&base_url, None).await.unwrap();
    assert!(sitemap.hrefs.is_empty());
}

#[tokio::test]
async fn test_concurrent_crawls_are_independent() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_page(&first, "/", html(anchors(&["/a"]))).await;
    mount_page(&second, "/", html(anchors(&["/b", "/c"]))).await;

    let (engine, storage) = test_engine();
    let (service, _event_loop) = CrawlService::start(engine, &OutputConfig::default());
    let mut events = service.subscribe();

    service.crawl_url(CrawlUrlInput::new(first.uri())).unwrap();
    service.crawl_url(CrawlUrlInput::new(second.uri())).unwrap();

    let mut finished = Vec::new();
    while finished.len() < 2 {
        let event = tokio::time::timeout(Duration::from_secs(10), events.recv())
            .await
            .expect("crawls did not finish in time")
            .unwrap();
        if event.is_finished() {
            finished.push(event.url().to_string());
        }
    }

    assert_eq!(storage.len().await, 2);
    assert_eq!(storage.get(&first.uri()).await.unwrap().crawled_data.len(), 1);
    assert_eq!(storage.get(&second.uri()).await.unwrap().crawled_data.len(), 2);

    let status = service.crawler_status().await;
    assert!(status.currently_crawled.is_empty());
    assert_eq!(status.done_crawled, 2);

    let listed = service.get_crawled_data(None, None).await;
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn test_same_host_scope_from_config() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // The query string contains the seed, which the substring heuristic follows
    let decoy = format!("http://localhost:1/?ref={}", base_url);
    mount_page(&mock_server, "/", html(anchors(&[&decoy, "/a"]))).await;

    let config = parse_config(
        r#"
        [crawler]
        domain-scope = "same-host"

        [fetcher]
        timeout = 5000
        connect-timeout = 500
        "#,
    )
    .unwrap();
    let (service, _event_loop) = CrawlService::from_config(&config).unwrap();
    let mut events = service.subscribe();

    service.crawl_url(CrawlUrlInput::new(&base_url)).unwrap();
    wait_finished(&mut events, &base_url).await;

    let sitemap = service.generate_sitemap(&base_url, None).await.unwrap();
    assert_eq!(sitemap.hrefs, vec![format!("{}/a", base_url)]);
}

#[tokio::test]
async fn test_unknown_urls_have_no_record() {
    let (engine, storage) = test_engine();
    let (service, _event_loop) = CrawlService::start(engine, &OutputConfig::default());

    assert!(!storage.has("https://never-crawled.example").await);
    assert!(storage.get("https://never-crawled.example").await.is_none());
    assert!(service
        .generate_sitemap("https://never-crawled.example", None)
        .await
        .is_err());
    assert!(service.health());
}
