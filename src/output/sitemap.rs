//! Sitemap XML generation
//!
//! Renders a list of crawled links as a sitemaps.org `urlset` document.

use std::fs::File;
use std::io::Write;
use std::path::Path;

const URLSET_OPEN: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" "#,
    r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
    r#"xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">"#,
);

const URLSET_CLOSE: &str = "</urlset>";

/// Formats links as a sitemap document
///
/// Every link becomes one `<url>` entry with a weekly change frequency, in
/// the order given. Link text is XML-escaped.
///
/// # Example
///
/// ```
/// use sitemap_crawler::output::make_sitemap_xml;
///
/// let xml = make_sitemap_xml(&["https://example.com/a".to_string()]);
/// assert!(xml.contains("<url><loc>https://example.com/a</loc><changefreq>weekly</changefreq></url>"));
/// assert!(xml.ends_with("</urlset>"));
/// ```
pub fn make_sitemap_xml(links: &[String]) -> String {
    let mut xml = String::from(URLSET_OPEN);

    for link in links {
        xml.push_str("<url><loc>");
        xml.push_str(&escape_xml(link));
        xml.push_str("</loc><changefreq>weekly</changefreq></url>");
    }

    xml.push_str(URLSET_CLOSE);
    xml
}

/// Writes a sitemap document to `output_path`
pub fn write_sitemap(links: &[String], output_path: &Path) -> std::io::Result<()> {
    let mut file = File::create(output_path)?;
    file.write_all(make_sitemap_xml(links).as_bytes())?;
    Ok(())
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
