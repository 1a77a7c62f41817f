//! URL handling module for Link-Sweep
//!
//! This module canonicalizes URLs and classifies discovered hrefs as
//! internal (crawled and checked), external (counted, not checked) or
//! skipped (non-HTTP schemes, empty and fragment-only hrefs).

mod normalize;

use crate::config::CrawlConfig;
use url::Url;

pub use normalize::{canonicalize, normalize_url};

/// Schemes that never lead to a checkable page
const SKIP_PREFIXES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

/// Classification of a discovered href
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkClass {
    /// Same site as the root; carries the canonical absolute URL
    Internal(Url),
    /// HTTP(S) link to another site
    External,
    /// Not a link we can or should check
    Skip,
}

/// The set of hosts considered internal to a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteScope {
    host: String,
    /// Explicit port of the root URL; `None` when it uses its scheme default
    port: Option<u16>,
    include_subdomains: bool,
}

impl SiteScope {
    /// Creates a scope rooted at `root`
    ///
    /// Returns `None` if the root URL has no host.
    pub fn new(root: &Url, include_subdomains: bool) -> Option<Self> {
        let host = root.host_str()?.to_lowercase();
        Some(Self {
            host,
            port: root.port(),
            include_subdomains,
        })
    }

    /// Creates the scope described by a crawl configuration
    pub fn from_config(config: &CrawlConfig) -> Option<Self> {
        Self::new(&config.root_url, config.include_subdomains)
    }

    /// The root host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns true if `url` belongs to the crawled site
    ///
    /// Hosts must match; the scheme does not matter, so an `http://` root
    /// keeps its `https://` pages. An explicitly written port must match the
    /// root's explicit port, mirroring a network location comparison.
    /// Subdomains only match when enabled.
    pub fn contains(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };

        if url.port() != self.port {
            return false;
        }

        let host = host.to_lowercase();
        if host == self.host {
            return true;
        }

        self.include_subdomains
            && host
                .strip_suffix(self.host.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    /// Classifies `raw_href` found on the page at `base`
    pub fn classify(&self, raw_href: &str, base: &Url) -> LinkClass {
        classify(raw_href, base, self)
    }
}

/// Classifies an href found on the page at `base`
///
/// Pure and deterministic: the same `(raw_href, base, scope)` always yields
/// the same result, which the visited-set relies on.
///
/// # Examples
///
/// ```
/// use link_sweep::url::{classify, LinkClass, SiteScope};
/// use url::Url;
///
/// let root = Url::parse("https://ex.com/").unwrap();
/// let scope = SiteScope::new(&root, false).unwrap();
///
/// match classify("/docs/#intro", &root, &scope) {
///     LinkClass::Internal(url) => assert_eq!(url.as_str(), "https://ex.com/docs"),
///     other => panic!("unexpected {:?}", other),
/// }
/// assert_eq!(classify("https://other.org/", &root, &scope), LinkClass::External);
/// assert_eq!(classify("mailto:me@ex.com", &root, &scope), LinkClass::Skip);
/// ```
pub fn classify(raw_href: &str, base: &Url, scope: &SiteScope) -> LinkClass {
    let href = raw_href.trim();

    if href.is_empty() || href.starts_with('#') {
        return LinkClass::Skip;
    }

    let lower = href.to_ascii_lowercase();
    if SKIP_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
        return LinkClass::Skip;
    }

    let resolved = match base.join(href) {
        Ok(url) => url,
        Err(_) => return LinkClass::Skip,
    };

    let url = match canonicalize(resolved) {
        Ok(url) => url,
        Err(_) => return LinkClass::Skip,
    };

    if scope.contains(&url) {
        LinkClass::Internal(url)
    } else {
        LinkClass::External
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    fn scope() -> SiteScope {
        SiteScope::new(&root(), false).unwrap()
    }

    fn internal(href: &str, base: &Url) -> String {
        match classify(href, base, &scope()) {
            LinkClass::Internal(url) => url.to_string(),
            other => panic!("expected internal for {}, got {:?}", href, other),
        }
    }

    #[test]
    fn test_relative_link() {
        let base = Url::parse("https://example.com/docs/guide").unwrap();
        assert_eq!(internal("intro", &base), "https://example.com/docs/intro");
        assert_eq!(internal("/about/", &base), "https://example.com/about");
        assert_eq!(internal("../faq", &base), "https://example.com/faq");
    }

    #[test]
    fn test_absolute_internal_link() {
        assert_eq!(
            internal("https://EXAMPLE.com/page#frag", &root()),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_protocol_relative_link() {
        assert_eq!(internal("//example.com/x", &root()), "https://example.com/x");
    }

    #[test]
    fn test_external_link() {
        assert_eq!(
            classify("https://other.com/page", &root(), &scope()),
            LinkClass::External
        );
    }

    #[test]
    fn test_subdomain_is_external_by_default() {
        assert_eq!(
            classify("https://blog.example.com/", &root(), &scope()),
            LinkClass::External
        );
    }

    #[test]
    fn test_subdomain_folding_when_enabled() {
        let scope = SiteScope::new(&root(), true).unwrap();
        assert!(matches!(
            classify("https://blog.example.com/", &root(), &scope),
            LinkClass::Internal(_)
        ));
        // Suffix match must fall on a label boundary
        assert_eq!(
            classify("https://notexample.com/", &root(), &scope),
            LinkClass::External
        );
    }

    #[test]
    fn test_different_port_is_external() {
        let root = Url::parse("http://127.0.0.1:8080/").unwrap();
        let scope = SiteScope::new(&root, false).unwrap();
        assert_eq!(
            classify("http://127.0.0.1:9090/a", &root, &scope),
            LinkClass::External
        );
        assert!(matches!(
            classify("/a", &root, &scope),
            LinkClass::Internal(_)
        ));
    }

    #[test]
    fn test_other_scheme_same_host_is_internal() {
        let root = Url::parse("http://example.com/").unwrap();
        let scope = SiteScope::new(&root, false).unwrap();
        let https_page = Url::parse("https://example.com/").unwrap();

        assert_eq!(
            classify("/about", &https_page, &scope),
            LinkClass::Internal(Url::parse("https://example.com/about").unwrap())
        );
        assert!(matches!(
            classify("https://example.com/docs", &root, &scope),
            LinkClass::Internal(_)
        ));
    }

    #[test]
    fn test_explicit_port_differs_from_default() {
        let scope = SiteScope::new(&root(), false).unwrap();
        assert_eq!(
            classify("https://example.com:8443/a", &root(), &scope),
            LinkClass::External
        );
        // An explicit default port is elided by the parser
        assert!(matches!(
            classify("https://example.com:443/a", &root(), &scope),
            LinkClass::Internal(_)
        ));
    }

    #[test]
    fn test_skip_schemes() {
        for href in [
            "mailto:test@example.com",
            "tel:+1234567890",
            "javascript:void(0)",
            "JavaScript:alert(1)",
            "data:text/html,<h1>x</h1>",
            "ftp://example.com/file",
        ] {
            assert_eq!(classify(href, &root(), &scope()), LinkClass::Skip, "{}", href);
        }
    }

    #[test]
    fn test_skip_empty_and_fragment() {
        assert_eq!(classify("", &root(), &scope()), LinkClass::Skip);
        assert_eq!(classify("   ", &root(), &scope()), LinkClass::Skip);
        assert_eq!(classify("#top", &root(), &scope()), LinkClass::Skip);
    }

    #[test]
    fn test_trailing_slash_equivalence() {
        assert_eq!(internal("/a/", &root()), internal("/a", &root()));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let base = Url::parse("https://example.com/x/y").unwrap();
        for href in ["z", "/a/", "https://other.com", "mailto:x", "#f"] {
            assert_eq!(
                classify(href, &base, &scope()),
                classify(href, &base, &scope())
            );
        }
    }
}
