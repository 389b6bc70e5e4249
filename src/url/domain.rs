use crate::UrlError;
use url::Url;

/// Extracts the lowercase host from a URL string
///
/// # Arguments
///
/// * `url` - The URL to extract the host from
///
/// # Returns
///
/// * `Ok(String)` - The lowercase host (port excluded)
/// * `Err(UrlError)` - The string does not parse or has no host
///
/// # Examples
///
/// ```
/// use sitemap_crawler::url::extract_host;
///
/// assert_eq!(extract_host("https://EXAMPLE.com/path").unwrap(), "example.com");
/// assert_eq!(extract_host("https://sub.example.com:8080/").unwrap(), "sub.example.com");
/// ```
pub fn extract_host(url: &str) -> Result<String, UrlError> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;
    parsed
        .host_str()
        .map(|h| h.to_lowercase())
        .ok_or_else(|| UrlError::MissingHost(url.to_string()))
}
