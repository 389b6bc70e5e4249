//! Domain-scope predicates
//!
//! A scope predicate decides whether a discovered link is traversed further
//! or only recorded in the crawl result. The traversal loop and sitemap
//! filtering only see the [`DomainScope`] trait, so the heuristic can be
//! swapped through configuration.

use crate::url::domain::extract_host;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Decides whether `link` belongs to the site rooted at `seed`
pub trait DomainScope: Send + Sync {
    /// Returns true if `link` should be followed when crawling from `seed`
    fn in_scope(&self, seed: &str, link: &str) -> bool;

    /// Short identifier used in logs
    fn name(&self) -> &'static str;
}

/// Substring containment: `link` is in scope when it contains `seed` verbatim
///
/// Loose on purpose. `https://example.com` matches
/// `https://example.com.evil.net/` and
/// `https://other.net/?ref=https://example.com`, and misses
/// `https://www.example.com/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringScope;

impl DomainScope for SubstringScope {
    fn in_scope(&self, seed: &str, link: &str) -> bool {
        link.contains(seed)
    }

    fn name(&self) -> &'static str {
        "substring"
    }
}

/// Host equality: `link` is in scope when its host equals the seed's host
///
/// Hosts are compared case-insensitively with the port ignored. Links or
/// seeds that do not parse as URLs with a host are out of scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameHostScope;

impl DomainScope for SameHostScope {
    fn in_scope(&self, seed: &str, link: &str) -> bool {
        match (extract_host(seed), extract_host(link)) {
            (Ok(seed_host), Ok(link_host)) => seed_host == link_host,
            _ => false,
        }
    }

    fn name(&self) -> &'static str {
        "same-host"
    }
}

/// Configurable selection of a [`DomainScope`] implementation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeKind {
    #[default]
    Substring,
    SameHost,
}

impl ScopeKind {
    /// Builds the shared predicate for this kind
    pub fn build(self) -> Arc<dyn DomainScope> {
        match self {
            Self::Substring => Arc::new(SubstringScope),
            Self::SameHost => Arc::new(SameHostScope),
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substring => write!(f, "substring"),
            Self::SameHost => write!(f, "same-host"),
        }
    }
}
