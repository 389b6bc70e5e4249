//! Crawl status reporting
//!
//! Crawl start and finish notifications go out on a broadcast channel;
//! subscribers pair them with a [`CrawlerStatus`] snapshot read from the
//! store.

use crate::storage::CrawlStorage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tokio::sync::broadcast;

/// Number of events a slow subscriber may fall behind before it lags
const STATUS_CHANNEL_CAPACITY: usize = 64;

/// A crawl lifecycle notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StatusEvent {
    Started { url: String, at: DateTime<Utc> },
    Finished { url: String, at: DateTime<Utc> },
}

impl StatusEvent {
    pub fn url(&self) -> &str {
        match self {
            Self::Started { url, .. } | Self::Finished { url, .. } => url,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// Point-in-time view of the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerStatus {
    /// URLs with a crawl in flight
    pub currently_crawled: Vec<String>,

    /// Number of finished crawls
    pub done_crawled: usize,
}

impl CrawlerStatus {
    /// Reads the current status from storage
    pub async fn from_storage(storage: &dyn CrawlStorage) -> Self {
        let currently_crawled = storage
            .currently_crawling()
            .await
            .into_iter()
            .map(|(url, _)| url)
            .collect();
        let done_crawled = storage.done_crawling().await.len();

        Self {
            currently_crawled,
            done_crawled,
        }
    }
}

impl fmt::Display for CrawlerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} crawling, {} done",
            self.currently_crawled.len(),
            self.done_crawled
        )
    }
}

/// Broadcasts [`StatusEvent`]s to any number of subscribers
#[derive(Debug, Clone)]
pub struct StatusPublisher {
    sender: broadcast::Sender<StatusEvent>,
}

impl StatusPublisher {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.sender.subscribe()
    }

    pub fn started(&self, url: &str) {
        self.publish(StatusEvent::Started {
            url: url.to_string(),
            at: Utc::now(),
        });
    }

    pub fn finished(&self, url: &str) {
        self.publish(StatusEvent::Finished {
            url: url.to_string(),
            at: Utc::now(),
        });
    }

    /// Sends an event; having no subscribers is not an error
    pub fn publish(&self, event: StatusEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No status subscribers");
        }
    }
}

impl Default for StatusPublisher {
    fn default() -> Self {
        Self::new()
    }
}
