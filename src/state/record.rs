use crate::state::CrawlState;
use serde::Serialize;

/// Persisted crawl state for one seed URL
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRecord {
    /// True from the moment a crawl is accepted until its worker resolves
    pub is_crawling: bool,

    /// Discovered links, truncated to the request's budget; empty while crawling
    pub crawled_data: Vec<String>,
}

impl CrawlRecord {
    /// The record written when a crawl is accepted
    pub fn crawling() -> Self {
        Self {
            is_crawling: true,
            crawled_data: Vec::new(),
        }
    }

    /// The record written when a crawl's worker resolves
    pub fn done(crawled_data: Vec<String>) -> Self {
        Self {
            is_crawling: false,
            crawled_data,
        }
    }

    /// The dispatch-cycle state this record reflects
    pub fn state(&self) -> CrawlState {
        if self.is_crawling {
            CrawlState::Crawling
        } else {
            CrawlState::Done
        }
    }
}
