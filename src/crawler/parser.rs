//! HTML parser for extracting link targets
//!
//! Extraction is a pure function of the document: it returns raw `href`
//! values and the base URL they resolve against. Classification happens
//! afterwards in [`crate::url::classify`].

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Links found in an HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// URL relative hrefs resolve against: `<base href>` if present and
    /// valid, else the page URL
    pub base_url: Url,

    /// Distinct raw `href` values from `<a>` tags, in document order
    pub hrefs: Vec<String>,
}

/// Parses HTML content and extracts anchor targets
///
/// Malformed markup never fails: html5ever recovers what it can, and a page
/// with no usable anchors simply yields no hrefs.
///
/// # Example
///
/// ```
/// use link_sweep::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/a">A</a><a href="/a">again</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &page_url);
/// assert_eq!(parsed.hrefs, vec!["/a".to_string()]);
/// ```
pub fn parse_html(html: &str, page_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        base_url: extract_base(&document, page_url),
        hrefs: extract_hrefs(&document),
    }
}

/// Convenience function returning just the raw hrefs
pub fn extract_links(html: &str) -> Vec<String> {
    extract_hrefs(&Html::parse_document(html))
}

/// Resolves the first `<base href>` against the page URL
fn extract_base(document: &Html, page_url: &Url) -> Url {
    let Ok(base_selector) = Selector::parse("base[href]") else {
        return page_url.clone();
    };

    document
        .select(&base_selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
        .unwrap_or_else(|| page_url.clone())
}

fn extract_hrefs(document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter(|href| seen.insert(href.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://example.com/docs/page").unwrap()
    }

    #[test]
    fn test_extract_hrefs_in_order() {
        let html = r#"
            <html>
            <body>
                <a href="/page1">Link 1</a>
                <a href="page2">Link 2</a>
                <a href="https://other.com/page3">Link 3</a>
            </body>
            </html>
        "#;
        let parsed = parse_html(html, &page_url());
        assert_eq!(
            parsed.hrefs,
            vec!["/page1", "page2", "https://other.com/page3"]
        );
    }

    #[test]
    fn test_duplicates_removed() {
        let html = r#"<a href="/x">1</a><a href=" /x ">2</a><a href="/y">3</a><a href="/x">4</a>"#;
        assert_eq!(extract_links(html), vec!["/x", "/y"]);
    }

    #[test]
    fn test_anchors_without_href_ignored() {
        let html = r#"<a name="top">Top</a><a href="">empty</a><a href="/ok">ok</a>"#;
        assert_eq!(extract_links(html), vec!["/ok"]);
    }

    #[test]
    fn test_non_anchor_links_ignored() {
        let html = r#"
            <link rel="stylesheet" href="/style.css">
            <script src="/app.js"></script>
            <img src="/logo.png">
        "#;
        assert!(extract_links(html).is_empty());
    }

    #[test]
    fn test_skip_schemes_are_returned_raw() {
        // Filtering is the classifier's job
        let html = r#"<a href="mailto:me@example.com">mail</a>"#;
        assert_eq!(extract_links(html), vec!["mailto:me@example.com"]);
    }

    #[test]
    fn test_base_defaults_to_page_url() {
        let parsed = parse_html("<p>no base</p>", &page_url());
        assert_eq!(parsed.base_url, page_url());
    }

    #[test]
    fn test_base_element() {
        let html = r#"<html><head><base href="/assets/"></head><body><a href="x">x</a></body></html>"#;
        let parsed = parse_html(html, &page_url());
        assert_eq!(parsed.base_url.as_str(), "https://example.com/assets/");
    }

    #[test]
    fn test_invalid_base_ignored() {
        let html = r#"<base href="javascript:void(0)"><a href="x">x</a>"#;
        let parsed = parse_html(html, &page_url());
        assert_eq!(parsed.base_url, page_url());
    }

    #[test]
    fn test_malformed_html() {
        let html = r#"<html><body><a href="/ok">ok<div><a href="/unclosed"</body>"#;
        let parsed = parse_html(html, &page_url());
        assert!(parsed.hrefs.contains(&"/ok".to_string()));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let html = r#"<a href="/a">a</a><a href="b">b</a><a href="mailto:x">m</a>"#;
        assert_eq!(parse_html(html, &page_url()), parse_html(html, &page_url()));
    }
}
