//! Round-based site traversal
//!
//! Each round fetches the whole frontier concurrently, records every returned
//! link in the visited set and builds the next frontier from the newly seen
//! links that pass the domain-scope predicate. The loop stops when the
//! frontier is empty or the visited set holds more than `max_urls` links.
//! The budget is only checked between rounds, so a single round can overshoot
//! it; callers truncate the result.

use crate::crawler::PageFetcher;
use crate::url::DomainScope;
use futures::future::join_all;
use futures::FutureExt;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

/// Parameters of one traversal run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalParams {
    /// Seed URL, assumed to be validated upstream
    pub url: String,

    /// Link budget
    pub max_urls: usize,

    /// Pause between rounds
    pub delay: Duration,
}

/// Insertion-ordered set of URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL, returning false if it was already present
    pub fn insert(&mut self, url: String) -> bool {
        if self.members.contains(&url) {
            return false;
        }
        self.members.insert(url.clone());
        self.order.push(url);
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.members.contains(url)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    /// Iterates in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    /// Returns the first `limit` URLs in insertion order
    pub fn truncated(self, limit: usize) -> Vec<String> {
        let mut urls = self.order;
        urls.truncate(limit);
        urls
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

impl FromIterator<String> for LinkSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = LinkSet::new();
        for url in iter {
            set.insert(url);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for LinkSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

/// Crawls `params.url` round by round and returns every discovered link
///
/// Fetch failures are the fetcher's concern and show up here as pages with no
/// links. A panic raised anywhere in a round, whether in a fetch or in the
/// scope predicate, ends the traversal; the links gathered by earlier rounds
/// are still returned and nothing from the failed round is kept.
pub async fn traverse(
    fetcher: &dyn PageFetcher,
    scope: &dyn DomainScope,
    params: &TraversalParams,
) -> LinkSet {
    let mut frontier = LinkSet::new();
    let mut visited = LinkSet::new();
    frontier.insert(params.url.clone());

    let mut round = 0usize;
    loop {
        round += 1;
        tracing::debug!(
            "Round {} for {}: fetching {} pages",
            round,
            params.url,
            frontier.len()
        );

        let round_body = async {
            let results = join_all(frontier.iter().map(|url| fetcher.fetch(url))).await;

            let mut discovered = LinkSet::new();
            let mut next_frontier = LinkSet::new();
            for link in results.into_iter().flatten() {
                if visited.contains(&link) || !discovered.insert(link.clone()) {
                    continue;
                }
                if scope.in_scope(&params.url, &link) {
                    next_frontier.insert(link);
                }
            }
            (discovered, next_frontier)
        };

        // Shared state is only touched once the round has completed
        let (discovered, next_frontier) = match AssertUnwindSafe(round_body).catch_unwind().await {
            Ok(round_links) => round_links,
            Err(panic) => {
                tracing::error!(
                    "Round {} for {} aborted: {}",
                    round,
                    params.url,
                    panic_message(&*panic)
                );
                break;
            }
        };

        for link in discovered.into_vec() {
            visited.insert(link);
        }
        frontier = next_frontier;

        tracing::debug!(
            "Round {} for {} done: {} visited, {} to follow",
            round,
            params.url,
            visited.len(),
            frontier.len()
        );

        if frontier.is_empty() || visited.len() > params.max_urls {
            break;
        }

        if !params.delay.is_zero() {
            tokio::time::sleep(params.delay).await;
        }
    }

    tracing::info!(
        "Traversal of {} finished after {} rounds with {} links",
        params.url,
        round,
        visited.len()
    );

    visited
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
