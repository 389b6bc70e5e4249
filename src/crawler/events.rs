//! Events accepted by the dispatcher

use std::fmt;
use std::time::Duration;

/// Completion callback, invoked once per dispatch cycle
pub type OnComplete = Box<dyn FnOnce() + Send + 'static>;

/// Parameters of one `initCrawl` request
///
/// Unset `delay` and `max_urls` fall back to the dispatcher's configured
/// defaults.
pub struct CrawlRequest {
    pub url: String,
    pub delay: Option<Duration>,
    pub max_urls: Option<usize>,
    pub on_complete: Option<OnComplete>,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            delay: None,
            max_urls: None,
            on_complete: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_max_urls(mut self, max_urls: usize) -> Self {
        self.max_urls = Some(max_urls);
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for CrawlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlRequest")
            .field("url", &self.url)
            .field("delay", &self.delay)
            .field("max_urls", &self.max_urls)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Messages carried by the dispatcher channel
#[derive(Debug)]
pub enum CrawlEvent {
    InitCrawl(CrawlRequest),
}

impl CrawlEvent {
    pub const INIT_CRAWL: &'static str = "initCrawl";

    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitCrawl(_) => Self::INIT_CRAWL,
        }
    }

    /// Builds an event from its wire name, if the name is known
    pub fn from_name(name: &str, request: CrawlRequest) -> Option<Self> {
        match name {
            Self::INIT_CRAWL => Some(Self::InitCrawl(request)),
            _ => None,
        }
    }
}
