//! Crawler module: page fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - The page fetcher contract and its HTTP implementation
//! - HTML link extraction
//! - Round-based traversal with deduplication and domain scoping
//! - Worker isolation for each traversal
//! - The event-driven dispatcher that runs whole crawl cycles

mod dispatcher;
mod events;
mod fetcher;
mod parser;
#[cfg(test)]
pub(crate) mod testing;
mod traversal;
mod worker;

pub use dispatcher::{CrawlEngine, Dispatcher};
pub use events::{CrawlEvent, CrawlRequest, OnComplete};
pub use fetcher::{build_http_client, fetch_page, FetchOutcome, HttpFetcher, PageFetcher};
pub use parser::extract_links;
pub use traversal::{traverse, LinkSet, TraversalParams};
pub use worker::{run_isolated, CrawlWorker};
