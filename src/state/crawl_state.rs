/// Crawl state definitions for the per-URL dispatch cycle
///
/// A dispatch cycle always walks Requested -> Crawling -> Done. Only the
/// Crawling and Done states are ever written to the store.
use std::fmt;

/// Represents where a URL is in its dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// `initCrawl` was received; nothing is stored yet
    Requested,

    /// The URL is marked in the store and a worker is traversing the site
    Crawling,

    /// The worker resolved (successfully or not) and results are stored
    Done,
}

impl CrawlState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if `next` is the legal successor of this state
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Requested, Self::Crawling) | (Self::Crawling, Self::Done)
        )
    }

    /// Stable string form used in logs and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Crawling => "crawling",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
