//! Storage module for crawl records
//!
//! The store maps a seed URL to its `{isCrawling, crawledData}` record. The
//! dispatcher is the only writer during normal operation; reporting code
//! (sitemap generation, crawl status) only reads.

mod memory;
mod traits;

pub use memory::MemoryStorage;
pub use traits::CrawlStorage;
