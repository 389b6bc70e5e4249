//! In-memory fetchers and scopes shared by unit tests

use crate::crawler::PageFetcher;
use crate::url::DomainScope;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves a fixed link map and records every fetch
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    pages: HashMap<String, Vec<String>>,
    calls: Mutex<Vec<String>>,
    panic_on: Option<String>,
}

impl ScriptedFetcher {
    pub(crate) fn new(pages: &[(&str, &[&str])]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, links)| {
                    (
                        url.to_string(),
                        links.iter().map(|l| l.to_string()).collect(),
                    )
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Makes fetching `url` panic
    pub(crate) fn panicking_on(mut self, url: &str) -> Self {
        self.panic_on = Some(url.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Vec<String> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.panic_on.as_deref() == Some(url) {
            panic!("renderer crashed on {}", url);
        }
        self.pages.get(url).cloned().unwrap_or_default()
    }
}

/// Substring scope that panics when asked about one particular link
pub(crate) struct PanickingScope {
    link: String,
}

impl PanickingScope {
    pub(crate) fn on(link: &str) -> Self {
        Self {
            link: link.to_string(),
        }
    }
}

impl DomainScope for PanickingScope {
    fn in_scope(&self, seed: &str, link: &str) -> bool {
        if link == self.link {
            panic!("scope check failed for {}", link);
        }
        link.contains(seed)
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}
