//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client (user agent, timeouts, redirect limit)
//! - GET requests that read the body only for HTML responses
//! - Error classification into status errors and network errors

use crate::config::HttpConfig;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Body of a successful response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// An HTML document; its links get extracted
    Html(String),
    /// Anything else; treated as a leaf
    Other { content_type: String },
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server answered with a non-error status
    Page {
        /// HTTP status code
        status: u16,
        /// Final URL after redirects
        final_url: Url,
        content: PageContent,
    },

    /// The server answered with a 4xx or 5xx status
    HttpError { status: u16 },

    /// No usable response (DNS, connect, timeout, too many redirects, ...)
    NetworkError { message: String },
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed up to `config.max_redirects` hops; one more hop
/// makes the request fail with a redirect error.
///
/// # Example
///
/// ```
/// use link_sweep::config::HttpConfig;
/// use link_sweep::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_millis(config.timeout_ms))
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// # Outcome Rules
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | 4xx / 5xx status | `HttpError` |
/// | Other status, `text/html` or XHTML | `Page` with `Html` body |
/// | Other status, any other type | `Page` with `Other` |
/// | Timeout | `NetworkError` "request timed out" |
/// | Redirect chain over the limit | `NetworkError` "too many redirects" |
/// | DNS / connect failure | `NetworkError` "connection failed: ..." |
/// | Body read failure | `NetworkError` |
///
/// Never retries; a failed URL is reported once.
pub async fn fetch_url(client: &Client, url: &Url) -> FetchOutcome {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchOutcome::NetworkError {
                message: classify_error(&e),
            }
        }
    };

    let status = response.status();
    if is_error_status(status) {
        return FetchOutcome::HttpError {
            status: status.as_u16(),
        };
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return FetchOutcome::Page {
            status: status.as_u16(),
            final_url,
            content: PageContent::Other { content_type },
        };
    }

    match response.text().await {
        Ok(body) => FetchOutcome::Page {
            status: status.as_u16(),
            final_url,
            content: PageContent::Html(body),
        },
        Err(e) => FetchOutcome::NetworkError {
            message: classify_error(&e),
        },
    }
}

fn is_error_status(status: StatusCode) -> bool {
    status.is_client_error() || status.is_server_error()
}

/// Returns true for HTML media types, ignoring parameters and case
pub fn is_html(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    media_type == "text/html" || media_type == "application/xhtml+xml"
}

/// Turns a client error into a short, stable message
fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_redirect() {
        "too many redirects".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", root_cause(e))
    } else {
        root_cause(e)
    }
}

fn root_cause(e: &reqwest::Error) -> String {
    let mut source: &dyn std::error::Error = e;
    while let Some(next) = source.source() {
        source = next;
    }
    source.to_string()
}
