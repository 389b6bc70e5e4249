//! Output module for crawl reporting
//!
//! This module handles:
//! - Rendering crawled links as sitemap XML
//! - Broadcasting crawl start/finish events
//! - Summarizing store contents as a crawler status snapshot

mod sitemap;
mod status;

pub use sitemap::{make_sitemap_xml, write_sitemap};
pub use status::{CrawlerStatus, StatusEvent, StatusPublisher};
