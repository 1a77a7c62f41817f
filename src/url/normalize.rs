use crate::UrlError;
use url::Url;

/// Normalizes a URL to Link-Sweep's canonical form
///
/// Two URLs that normalize to the same string are treated as the same page
/// by the visited-set, so this must stay deterministic.
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed (the `url` crate already
///    lowercases scheme and host, elides default ports and removes dot
///    segments)
/// 2. Reject non-HTTP(S) schemes and URLs without a host
/// 3. Remove the fragment (everything after #)
/// 4. Remove trailing slashes from non-root paths; the root stays `/`
///
/// The query string is kept verbatim.
///
/// # Examples
///
/// ```
/// use link_sweep::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.COM:80/page/#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Applies the canonical form to an already parsed URL
pub fn canonicalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
        url.set_path(&trimmed);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_trailing_slash() {
        let result = normalize_url("https://example.com/page/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_remove_repeated_trailing_slashes() {
        let result = normalize_url("https://example.com/page///").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_keep_root_slash() {
        let result = normalize_url("https://example.com/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let result = normalize_url("https://example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_slash_only_path_becomes_root() {
        let result = normalize_url("https://example.com//").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_remove_fragment() {
        let result = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_query_kept_verbatim() {
        let result = normalize_url("https://example.com/search/?b=2&a=1").unwrap();
        assert_eq!(result.as_str(), "https://example.com/search?b=2&a=1");
    }

    #[test]
    fn test_lowercase_host_keeps_path_case() {
        let result = normalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_scheme_is_significant() {
        let http = normalize_url("http://example.com/a").unwrap();
        let https = normalize_url("https://example.com/a").unwrap();
        assert_ne!(http, https);
    }

    #[test]
    fn test_default_port_elided() {
        let result = normalize_url("https://example.com:443/a").unwrap();
        assert_eq!(result.as_str(), "https://example.com/a");
    }

    #[test]
    fn test_explicit_port_kept() {
        let result = normalize_url("http://127.0.0.1:8080/a/").unwrap();
        assert_eq!(result.as_str(), "http://127.0.0.1:8080/a");
    }

    #[test]
    fn test_dot_segments() {
        let result = normalize_url("https://example.com/a/../b/./c").unwrap();
        assert_eq!(result.as_str(), "https://example.com/b/c");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.com/page");
        assert_eq!(result, Err(UrlError::InvalidScheme("ftp".to_string())));
    }

    #[test]
    fn test_malformed_url() {
        let result = normalize_url("not a url");
        assert!(matches!(result, Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_url("HTTP://Example.com/a/b/?q=1#x").unwrap();
        let twice = normalize_url(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }
}
