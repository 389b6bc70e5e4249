//! Sitemap-Crawler: an event-driven site crawler
//!
//! This crate crawls a website from a seed URL, follows same-site links up to a
//! URL budget, and records per-URL crawl state that reporting code (sitemap
//! generation, crawl status) reads back.

pub mod config;
pub mod crawler;
pub mod output;
pub mod service;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Failed to spawn crawl worker for {url}: {message}")]
    WorkerSpawn { url: String, message: String },

    #[error("Crawl worker for {url} failed: {message}")]
    WorkerFailed { url: String, message: String },

    #[error("Dispatcher is shut down, event '{event}' was dropped")]
    DispatcherClosed { event: String },

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("{url} has not been crawled yet, run a crawl before generating a sitemap")]
    NotCrawled { url: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("{0} is not a valid URL")]
    Invalid(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEvent, CrawlRequest, Dispatcher, PageFetcher};
pub use service::CrawlService;
pub use state::{CrawlRecord, CrawlState};
pub use storage::{CrawlStorage, MemoryStorage};
pub use crate::url::{is_url, DomainScope, SameHostScope, ScopeKind, SubstringScope};
