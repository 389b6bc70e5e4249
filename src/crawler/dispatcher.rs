//! Crawl dispatcher
//!
//! Crawl requests travel over an unbounded channel owned by the
//! [`Dispatcher`]. A single event loop receives them and spawns one task per
//! dispatch cycle, so crawls for different URLs run concurrently. Every
//! `Dispatcher` clone is a sender; the loop is the only receiver. The loop
//! owns its cycle tasks and logs any that panic.
//!
//! A dispatch cycle writes a Crawling record, runs the traversal on an
//! isolated worker, writes the Done record and then fires the completion
//! callback. Nothing inside the cycle is reported back to the sender.

use crate::config::CrawlerConfig;
use crate::crawler::events::{CrawlEvent, CrawlRequest};
use crate::crawler::traversal::{panic_message, traverse, LinkSet, TraversalParams};
use crate::crawler::worker::run_isolated;
use crate::crawler::PageFetcher;
use crate::state::{CrawlRecord, CrawlState};
use crate::storage::CrawlStorage;
use crate::url::DomainScope;
use crate::CrawlerError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};

/// Shared collaborators of every dispatch cycle
#[derive(Clone)]
pub struct CrawlEngine {
    storage: Arc<dyn CrawlStorage>,
    fetcher: Arc<dyn PageFetcher>,
    scope: Arc<dyn DomainScope>,
    default_max_urls: usize,
    default_delay: Duration,
}

impl CrawlEngine {
    /// Builds an engine using the scope and defaults from `config`
    pub fn new(
        storage: Arc<dyn CrawlStorage>,
        fetcher: Arc<dyn PageFetcher>,
        config: &CrawlerConfig,
    ) -> Self {
        Self {
            storage,
            fetcher,
            scope: config.domain_scope.build(),
            default_max_urls: config.default_max_urls,
            default_delay: Duration::from_millis(config.default_delay),
        }
    }

    /// Replaces the domain-scope predicate
    pub fn with_scope(mut self, scope: Arc<dyn DomainScope>) -> Self {
        self.scope = scope;
        self
    }

    pub fn storage(&self) -> &Arc<dyn CrawlStorage> {
        &self.storage
    }

    pub fn scope(&self) -> &Arc<dyn DomainScope> {
        &self.scope
    }

    /// Runs one event to completion
    pub async fn handle(&self, event: CrawlEvent) {
        match event {
            CrawlEvent::InitCrawl(request) => self.init_crawl(request).await,
        }
    }

    /// Drives one Requested -> Crawling -> Done cycle
    ///
    /// Worker failures are logged and stored as an empty result. The
    /// completion callback runs after the Done write on every path.
    pub async fn init_crawl(&self, request: CrawlRequest) {
        let CrawlRequest {
            url,
            delay,
            max_urls,
            on_complete,
        } = request;

        let params = TraversalParams {
            url: url.clone(),
            max_urls: max_urls.unwrap_or(self.default_max_urls),
            delay: delay.unwrap_or(self.default_delay),
        };

        let crawling = CrawlRecord::crawling();
        log_transition(&url, CrawlState::Requested, &crawling);
        self.storage.upsert(&url, crawling).await;
        tracing::info!(
            "Crawling {} (max {} URLs, {:?} between rounds, {} scope)",
            url,
            params.max_urls,
            params.delay,
            self.scope.name()
        );

        let fetcher = Arc::clone(&self.fetcher);
        let scope = Arc::clone(&self.scope);
        let worker_params = params.clone();
        let visited = match run_isolated(&url, async move {
            traverse(fetcher.as_ref(), scope.as_ref(), &worker_params).await
        })
        .await
        {
            Ok(visited) => visited,
            Err(e) => {
                tracing::error!("{}", e);
                LinkSet::new()
            }
        };

        let crawled_data = visited.truncated(params.max_urls);
        let found = crawled_data.len();
        let done = CrawlRecord::done(crawled_data);
        log_transition(&url, CrawlState::Crawling, &done);
        self.storage.upsert(&url, done).await;
        tracing::info!("Finished crawling {}: {} links stored", url, found);

        if let Some(callback) = on_complete {
            callback();
        }
    }
}

/// Logs the move from `from` to the state `record` reflects
fn log_transition(url: &str, from: CrawlState, record: &CrawlRecord) {
    let to = record.state();
    debug_assert!(from.can_transition_to(to), "illegal transition {} -> {}", from, to);
    if to.is_terminal() {
        tracing::debug!("{}: {} -> {} (final)", url, from, to);
    } else {
        tracing::debug!("{}: {} -> {}", url, from, to);
    }
}

fn log_cycle_failure(error: JoinError) {
    if error.is_panic() {
        tracing::error!("Dispatch cycle panicked: {}", panic_message(&*error.into_panic()));
    } else {
        tracing::warn!("Dispatch cycle cancelled: {}", error);
    }
}

/// Sending side of the crawl event channel
#[derive(Clone)]
pub struct Dispatcher {
    sender: mpsc::UnboundedSender<CrawlEvent>,
}

impl Dispatcher {
    /// Starts the event loop on the current runtime
    ///
    /// The loop runs until every `Dispatcher` clone is dropped, then waits for
    /// the cycles still in flight. Aborting the returned handle cancels those
    /// cycles as well.
    pub fn start(engine: CrawlEngine) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<CrawlEvent>();

        let handle = tokio::spawn(async move {
            tracing::debug!("Dispatcher event loop started");
            let mut cycles = JoinSet::new();
            loop {
                tokio::select! {
                    event = receiver.recv() => {
                        let Some(event) = event else { break };
                        tracing::debug!("Received {} event", event.name());
                        let engine = engine.clone();
                        cycles.spawn(async move {
                            engine.handle(event).await;
                        });
                    }
                    Some(joined) = cycles.join_next(), if !cycles.is_empty() => {
                        if let Err(e) = joined {
                            log_cycle_failure(e);
                        }
                    }
                }
            }

            tracing::debug!("Dispatcher event loop draining {} cycles", cycles.len());
            while let Some(joined) = cycles.join_next().await {
                if let Err(e) = joined {
                    log_cycle_failure(e);
                }
            }
            tracing::debug!("Dispatcher event loop stopped");
        });

        (Self { sender }, handle)
    }

    /// Queues an event; fails only when the event loop has stopped
    pub fn dispatch(&self, event: CrawlEvent) -> Result<(), CrawlerError> {
        self.sender
            .send(event)
            .map_err(|rejected| CrawlerError::DispatcherClosed {
                event: rejected.0.name().to_string(),
            })
    }

    /// Queues an event by its wire name
    ///
    /// Unknown names are rejected without invoking the request's callback.
    pub fn dispatch_named(&self, name: &str, request: CrawlRequest) -> Result<(), CrawlerError> {
        let event = CrawlEvent::from_name(name, request)
            .ok_or_else(|| CrawlerError::UnknownEvent(name.to_string()))?;
        self.dispatch(event)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
