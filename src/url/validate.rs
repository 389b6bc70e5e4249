use crate::UrlError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Optional `scheme:` followed by `//` and a non-empty, whitespace-free rest
static PROTOCOL_RELATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\w+:)?//(\S+)$").expect("hardcoded regex pattern is valid"));

static LOCALHOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^localhost[:?\d]*(?:[^:?\d]\S*)?$").expect("hardcoded regex pattern is valid")
});

/// A dotted host: one label, a dot, then at least two more characters
static DOTTED_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s.]+\.\S{2,}$").expect("hardcoded regex pattern is valid"));

/// Loosely validates a URL string
///
/// Accepts an optional scheme followed by `//`, then either `localhost`
/// (with optional port and path) or something that looks like a dotted host.
/// This is deliberately permissive; it only rejects strings that cannot be a
/// crawl seed at all.
///
/// # Examples
///
/// ```
/// use sitemap_crawler::url::is_url;
///
/// assert!(is_url("https://fakedoors.com"));
/// assert!(is_url("http://localhost:4000/graphql"));
/// assert!(!is_url("notanurl"));
/// ```
pub fn is_url(candidate: &str) -> bool {
    let Some(captures) = PROTOCOL_RELATIVE.captures(candidate) else {
        return false;
    };

    let Some(rest) = captures.get(1).map(|m| m.as_str()) else {
        return false;
    };

    LOCALHOST.is_match(rest) || DOTTED_HOST.is_match(rest)
}

/// Validates a seed URL, returning it unchanged when it passes [`is_url`]
pub fn validate_seed(candidate: &str) -> Result<&str, UrlError> {
    if is_url(candidate) {
        Ok(candidate)
    } else {
        Err(UrlError::Invalid(candidate.to_string()))
    }
}
