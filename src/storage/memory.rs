//! In-memory crawl record store
//!
//! Process-wide, created empty, never written to disk. Iteration follows
//! first-insertion order; overwriting a key keeps its position.

use crate::state::CrawlRecord;
use crate::storage::CrawlStorage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Records {
    order: Vec<String>,
    by_url: HashMap<String, CrawlRecord>,
}

/// Shared in-memory [`CrawlStorage`] implementation
///
/// Cloning is cheap and every clone sees the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: Arc<RwLock<Records>>,
}

impl MemoryStorage {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CrawlStorage for MemoryStorage {
    async fn get(&self, url: &str) -> Option<CrawlRecord> {
        self.records.read().await.by_url.get(url).cloned()
    }

    async fn upsert(&self, url: &str, record: CrawlRecord) {
        let mut records = self.records.write().await;
        if records.by_url.insert(url.to_string(), record).is_none() {
            records.order.push(url.to_string());
        }
    }

    async fn has(&self, url: &str) -> bool {
        self.records.read().await.by_url.contains_key(url)
    }

    async fn delete(&self, url: &str) -> bool {
        let mut records = self.records.write().await;
        if records.by_url.remove(url).is_some() {
            records.order.retain(|u| u != url);
            true
        } else {
            false
        }
    }

    async fn list(&self) -> Vec<(String, CrawlRecord)> {
        let records = self.records.read().await;
        records
            .order
            .iter()
            .filter_map(|url| {
                records
                    .by_url
                    .get(url)
                    .map(|record| (url.clone(), record.clone()))
            })
            .collect()
    }

    async fn filter(&self, is_crawling: bool) -> Vec<(String, CrawlRecord)> {
        self.list()
            .await
            .into_iter()
            .filter(|(_, record)| record.is_crawling == is_crawling)
            .collect()
    }

    async fn clear(&self) {
        let mut records = self.records.write().await;
        records.order.clear();
        records.by_url.clear();
    }

    async fn len(&self) -> usize {
        self.records.read().await.by_url.len()
    }
}
