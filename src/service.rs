//! Request-handling service
//!
//! [`CrawlService`] is the entry point front ends talk to. It validates seed
//! URLs before dispatch, turns crawl completion into status events and
//! answers read-only queries against the crawl store.

use crate::config::{Config, OutputConfig};
use crate::crawler::{CrawlEngine, CrawlEvent, CrawlRequest, Dispatcher, HttpFetcher};
use crate::output::{make_sitemap_xml, CrawlerStatus, StatusEvent, StatusPublisher};
use crate::storage::{CrawlStorage, MemoryStorage};
use crate::url::{validate_seed, DomainScope};
use crate::{CrawlerError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Default page size of [`CrawlService::get_crawled_data`]
pub const DEFAULT_TAKE: usize = 5;

/// Input of [`CrawlService::crawl_url`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlUrlInput {
    pub url: String,

    /// Pause between traversal rounds, in milliseconds
    pub delay: Option<u64>,

    pub max_urls: Option<usize>,
}

impl CrawlUrlInput {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// One store entry as reported to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawledData {
    pub url: String,
    pub is_crawling: bool,
    pub crawled_data: Vec<String>,
}

/// A rendered sitemap and the links it lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteMap {
    pub hrefs: Vec<String>,
    pub xml: String,
}

/// Front door of the crawler
#[derive(Clone)]
pub struct CrawlService {
    dispatcher: Dispatcher,
    storage: Arc<dyn CrawlStorage>,
    scope: Arc<dyn DomainScope>,
    publisher: StatusPublisher,
    include_external_links: bool,
}

impl CrawlService {
    /// Starts a dispatcher for `engine` and wraps it in a service
    ///
    /// The returned handle belongs to the dispatcher's event loop.
    pub fn start(engine: CrawlEngine, output: &OutputConfig) -> (Self, JoinHandle<()>) {
        let storage = Arc::clone(engine.storage());
        let scope = Arc::clone(engine.scope());
        let (dispatcher, event_loop) = Dispatcher::start(engine);

        let service = Self {
            dispatcher,
            storage,
            scope,
            publisher: StatusPublisher::new(),
            include_external_links: output.include_external_links,
        };
        (service, event_loop)
    }

    /// Builds the production stack: HTTP fetcher and in-memory store
    pub fn from_config(config: &Config) -> Result<(Self, JoinHandle<()>)> {
        let fetcher = HttpFetcher::new(&config.fetcher, &config.user_agent)?;
        let engine = CrawlEngine::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(fetcher),
            &config.crawler,
        );
        Ok(Self::start(engine, &config.output))
    }

    /// Validates the seed and starts a crawl in the background
    ///
    /// `Started` is published before the crawl is queued and `Finished` once
    /// its Done record is written. If the dispatcher has stopped, `Finished`
    /// follows `Started` immediately and the error is returned.
    pub fn crawl_url(&self, input: CrawlUrlInput) -> Result<String> {
        let url = validate_seed(&input.url)?.to_string();

        let publisher = self.publisher.clone();
        let finished_url = url.clone();
        let mut request = CrawlRequest::new(url.as_str()).on_complete(move || {
            publisher.finished(&finished_url);
        });
        if let Some(delay) = input.delay {
            request = request.with_delay(Duration::from_millis(delay));
        }
        if let Some(max_urls) = input.max_urls {
            request = request.with_max_urls(max_urls);
        }

        self.publisher.started(&url);
        if let Err(e) = self.dispatcher.dispatch(CrawlEvent::InitCrawl(request)) {
            self.publisher.finished(&url);
            return Err(e);
        }

        Ok(format!("Started crawling {}", url))
    }

    pub async fn crawler_status(&self) -> CrawlerStatus {
        CrawlerStatus::from_storage(self.storage.as_ref()).await
    }

    /// Pages through the store in iteration order
    pub async fn get_crawled_data(&self, skip: Option<usize>, take: Option<usize>) -> Vec<CrawledData> {
        self.storage
            .list()
            .await
            .into_iter()
            .skip(skip.unwrap_or(0))
            .take(take.unwrap_or(DEFAULT_TAKE))
            .map(|(url, record)| CrawledData {
                url,
                is_crawling: record.is_crawling,
                crawled_data: record.crawled_data,
            })
            .collect()
    }

    /// Renders the sitemap of a crawled seed
    ///
    /// Links outside the configured domain scope are dropped unless
    /// `external_links` (or `output.include-external-links`) asks for them.
    pub async fn generate_sitemap(&self, url: &str, external_links: Option<bool>) -> Result<SiteMap> {
        let record = self
            .storage
            .get(url)
            .await
            .ok_or_else(|| CrawlerError::NotCrawled {
                url: url.to_string(),
            })?;

        let hrefs: Vec<String> = if external_links.unwrap_or(self.include_external_links) {
            record.crawled_data
        } else {
            record
                .crawled_data
                .into_iter()
                .filter(|link| self.scope.in_scope(url, link))
                .collect()
        };

        Ok(SiteMap {
            xml: make_sitemap_xml(&hrefs),
            hrefs,
        })
    }

    pub fn health(&self) -> bool {
        true
    }

    /// Subscribes to crawl start/finish events
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.publisher.subscribe()
    }

    pub fn storage(&self) -> &Arc<dyn CrawlStorage> {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlerConfig;
    use crate::crawler::testing::ScriptedFetcher;
    use crate::state::CrawlRecord;
    use crate::url::SameHostScope;
    use crate::UrlError;

    const SEED: &str = "https://example.com";

    fn service(fetcher: ScriptedFetcher) -> CrawlService {
        let engine = CrawlEngine::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(fetcher),
            &CrawlerConfig::default(),
        );
        CrawlService::start(engine, &OutputConfig::default()).0
    }

    async fn wait_finished(events: &mut broadcast::Receiver<StatusEvent>, url: &str) {
        loop {
            let event = events.recv().await.unwrap();
            if event.is_finished() && event.url() == url {
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_crawl_url_rejects_invalid_url() {
        let service = service(ScriptedFetcher::default());
        let result = service.crawl_url(CrawlUrlInput::new("notanurl"));

        assert!(matches!(
            result,
            Err(CrawlerError::UrlError(UrlError::Invalid(url))) if url == "notanurl"
        ));
        assert!(service.storage().is_empty().await);
    }

    #[tokio::test]
    async fn test_crawl_url_publishes_lifecycle() {
        let service = service(ScriptedFetcher::new(&[(SEED, &["https://example.com/a"])]));
        let mut events = service.subscribe();

        let message = service.crawl_url(CrawlUrlInput::new(SEED)).unwrap();
        assert_eq!(message, "Started crawling https://example.com");

        let started = events.recv().await.unwrap();
        assert!(matches!(started, StatusEvent::Started { ref url, .. } if url == SEED));
        wait_finished(&mut events, SEED).await;

        let status = service.crawler_status().await;
        assert!(status.currently_crawled.is_empty());
        assert_eq!(status.done_crawled, 1);
    }

    #[tokio::test]
    async fn test_crawl_url_after_shutdown_closes_lifecycle() {
        let engine = CrawlEngine::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(ScriptedFetcher::default()),
            &CrawlerConfig::default(),
        );
        let (service, event_loop) = CrawlService::start(engine, &OutputConfig::default());
        event_loop.abort();
        let _ = event_loop.await;
        let mut events = service.subscribe();

        let result = service.crawl_url(CrawlUrlInput::new(SEED));
        assert!(matches!(result, Err(CrawlerError::DispatcherClosed { .. })));

        let started = events.recv().await.unwrap();
        assert!(matches!(started, StatusEvent::Started { ref url, .. } if url == SEED));
        let finished = events.recv().await.unwrap();
        assert!(matches!(finished, StatusEvent::Finished { ref url, .. } if url == SEED));
        assert!(service.storage().is_empty().await);
    }

    #[tokio::test]
    async fn test_crawl_url_passes_budget() {
        let service = service(ScriptedFetcher::new(&[(
            SEED,
            &["https://example.com/a", "https://example.com/b", "https://example.com/c"],
        )]));
        let mut events = service.subscribe();

        service
            .crawl_url(CrawlUrlInput {
                url: SEED.to_string(),
                delay: Some(0),
                max_urls: Some(2),
            })
            .unwrap();
        wait_finished(&mut events, SEED).await;

        let record = service.storage().get(SEED).await.unwrap();
        assert_eq!(record.crawled_data.len(), 2);
    }

    #[tokio::test]
    async fn test_get_crawled_data_pages() {
        let service = service(ScriptedFetcher::default());
        for i in 0..7 {
            service
                .storage()
                .upsert(&format!("https://site{}.com", i), CrawlRecord::done(Vec::new()))
                .await;
        }

        let first = service.get_crawled_data(None, None).await;
        assert_eq!(first.len(), DEFAULT_TAKE);
        assert_eq!(first[0].url, "https://site0.com");

        let rest = service.get_crawled_data(Some(5), Some(10)).await;
        let urls: Vec<_> = rest.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, vec!["https://site5.com", "https://site6.com"]);
    }

    #[tokio::test]
    async fn test_sitemap_requires_crawl() {
        let service = service(ScriptedFetcher::default());
        let result = service.generate_sitemap(SEED, None).await;
        assert!(matches!(result, Err(CrawlerError::NotCrawled { url }) if url == SEED));
    }

    #[tokio::test]
    async fn test_sitemap_filters_external_links() {
        let service = service(ScriptedFetcher::default());
        service
            .storage()
            .upsert(
                SEED,
                CrawlRecord::done(vec![
                    "https://example.com/a".to_string(),
                    "https://external.com/b".to_string(),
                ]),
            )
            .await;

        let internal = service.generate_sitemap(SEED, None).await.unwrap();
        assert_eq!(internal.hrefs, vec!["https://example.com/a"]);
        assert!(!internal.xml.contains("external.com"));

        let all = service.generate_sitemap(SEED, Some(true)).await.unwrap();
        assert_eq!(all.hrefs.len(), 2);
        assert!(all.xml.contains("<loc>https://external.com/b</loc>"));
    }

    #[tokio::test]
    async fn test_sitemap_uses_engine_scope() {
        let engine = CrawlEngine::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(ScriptedFetcher::default()),
            &CrawlerConfig::default(),
        )
        .with_scope(Arc::new(SameHostScope));
        let (service, _loop) = CrawlService::start(engine, &OutputConfig::default());
        service
            .storage()
            .upsert(
                SEED,
                CrawlRecord::done(vec![
                    "https://EXAMPLE.com/a".to_string(),
                    "https://example.com.evil.net/".to_string(),
                ]),
            )
            .await;

        let sitemap = service.generate_sitemap(SEED, Some(false)).await.unwrap();
        assert_eq!(sitemap.hrefs, vec!["https://EXAMPLE.com/a"]);
    }

    #[tokio::test]
    async fn test_health() {
        assert!(service(ScriptedFetcher::default()).health());
    }

    #[test]
    fn test_crawl_input_json() {
        let input: CrawlUrlInput =
            serde_json::from_str(r#"{"url": "https://example.com", "maxUrls": 10}"#).unwrap();
        assert_eq!(input.max_urls, Some(10));
        assert_eq!(input.delay, None);
    }
}
