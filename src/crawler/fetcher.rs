//! Page fetching
//!
//! This module defines the [`PageFetcher`] contract the traversal engine
//! depends on, plus the HTTP implementation used in production:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests with outcome classification
//! - Link extraction from HTML responses

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::crawler::parser::extract_links;
use crate::CrawlerError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Returns the outbound links of a page
///
/// Implementations never fail: any error (network, timeout, non-HTML,
/// HTTP status) is absorbed and reported as an empty list.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Vec<String>;
}

/// Result of a single page fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched an HTML page
    Links {
        /// Final URL after redirects
        final_url: String,
        /// Absolute hrefs found on the page
        links: Vec<String>,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Network error (connection refused, timeout, body read failure)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchOutcome {
    /// Reduces the outcome to the link list of the fetcher contract
    pub fn into_links(self) -> Vec<String> {
        match self {
            Self::Links { links, .. } => links,
            _ => Vec::new(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `fetcher` - Timeouts applied to every page fetch
/// * `user_agent` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    fetcher: &FetcherConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_millis(fetcher.timeout))
        .connect_timeout(Duration::from_millis(fetcher.connect_timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the result
///
/// Redirects are followed by the client; links are resolved against the
/// final URL.
pub async fn fetch_page(client: &Client, url: &str) -> FetchOutcome {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            return FetchOutcome::NetworkError { error };
        }
    };

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return FetchOutcome::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.contains("text/html") {
        return FetchOutcome::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchOutcome::Links {
            links: extract_links(&body, &final_url),
            final_url: final_url.to_string(),
        },
        Err(e) => FetchOutcome::NetworkError {
            error: e.to_string(),
        },
    }
}

/// [`PageFetcher`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from configuration
    pub fn new(fetcher: &FetcherConfig, user_agent: &UserAgentConfig) -> Result<Self, CrawlerError> {
        Ok(Self {
            client: build_http_client(fetcher, user_agent)?,
        })
    }

    /// Wraps an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Vec<String> {
        if let Err(e) = Url::parse(url) {
            tracing::warn!("Skipping unparseable URL {}: {}", url, e);
            return Vec::new();
        }

        let outcome = fetch_page(&self.client, url).await;
        match &outcome {
            FetchOutcome::Links { final_url, links } => {
                tracing::debug!("Fetched {} ({} links)", final_url, links.len());
            }
            FetchOutcome::HttpError { status_code } => {
                tracing::warn!("HTTP {} for {}", status_code, url);
            }
            FetchOutcome::ContentMismatch { content_type } => {
                tracing::debug!("Skipping {}: expected HTML, got '{}'", url, content_type);
            }
            FetchOutcome::NetworkError { error } => {
                tracing::warn!("Failed to fetch {}: {}", url, error);
            }
        }
        outcome.into_links()
    }
}
