use crate::url::ScopeKind;
use serde::Deserialize;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl defaults applied when a request leaves a parameter out
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL budget used when a crawl request omits `maxUrls`
    #[serde(rename = "default-max-urls", default = "default_max_urls")]
    pub default_max_urls: usize,

    /// Pause between traversal rounds (milliseconds) when a request omits `delay`
    #[serde(rename = "default-delay", default)]
    pub default_delay: u64,

    /// Predicate deciding which discovered links are traversed further
    #[serde(rename = "domain-scope", default)]
    pub domain_scope: ScopeKind,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            default_max_urls: default_max_urls(),
            default_delay: 0,
            domain_scope: ScopeKind::default(),
        }
    }
}

/// HTTP page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Whole-request timeout for one page (milliseconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Connection establishment timeout (milliseconds)
    #[serde(rename = "connect-timeout", default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "sitemap-crawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/crawler".to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Whether sitemaps include off-site links unless the caller says otherwise
    #[serde(rename = "include-external-links", default)]
    pub include_external_links: bool,
}

fn default_max_urls() -> usize {
    100
}

fn default_timeout() -> u64 {
    30_000
}

fn default_connect_timeout() -> u64 {
    10_000
}
