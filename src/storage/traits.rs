//! Storage trait for crawl records
//!
//! This module defines the interface the dispatcher writes through and the
//! reporting side (sitemap, status) reads through.

use crate::state::CrawlRecord;
use async_trait::async_trait;

/// Associative store mapping a seed URL to its [`CrawlRecord`]
///
/// Every operation is total. Implementations must make each call atomic on
/// its own; nothing is atomic across calls, so a caller that reads and then
/// writes can race with another dispatch cycle for the same URL.
#[async_trait]
pub trait CrawlStorage: Send + Sync {
    /// Gets the record for a URL, if one exists
    async fn get(&self, url: &str) -> Option<CrawlRecord>;

    /// Inserts or fully replaces the record for a URL
    async fn upsert(&self, url: &str, record: CrawlRecord);

    /// Returns true if a record exists for the URL
    async fn has(&self, url: &str) -> bool;

    /// Removes the record for a URL
    ///
    /// Returns whether something was removed. Deleting an absent key is a no-op.
    async fn delete(&self, url: &str) -> bool;

    /// Lists every `(url, record)` pair in iteration order
    async fn list(&self) -> Vec<(String, CrawlRecord)>;

    /// Lists the pairs whose `is_crawling` flag equals the argument
    async fn filter(&self, is_crawling: bool) -> Vec<(String, CrawlRecord)>;

    /// Removes every record
    async fn clear(&self);

    /// Number of records
    async fn len(&self) -> usize;

    /// Returns true if the store holds no records
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Records still being crawled
    async fn currently_crawling(&self) -> Vec<(String, CrawlRecord)> {
        self.filter(true).await
    }

    /// Records whose crawl has finished
    async fn done_crawling(&self) -> Vec<(String, CrawlRecord)> {
        self.filter(false).await
    }
}
