//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: where a seed URL is in its dispatch cycle (requested, crawling, done)
//! - `CrawlRecord`: the `{isCrawling, crawledData}` value stored per seed URL

mod crawl_state;
mod record;

pub use crawl_state::CrawlState;
pub use record::CrawlRecord;
