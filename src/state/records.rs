/// Work items and broken-link records
///
/// Both types are created once and never mutated afterwards.
use chrono::{DateTime, Utc};
use std::fmt;
use url::Url;

/// Source label used for the root page, which no other page links to
pub const ROOT_SOURCE: &str = "root";

/// A URL waiting to be checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Canonical URL to fetch
    pub url: Url,

    /// Link distance from the root page (root is 0)
    pub depth: u32,

    /// First page seen linking here; `None` for the root
    pub source: Option<Url>,
}

impl WorkItem {
    /// The root item at depth 0
    pub fn root(url: Url) -> Self {
        Self {
            url,
            depth: 0,
            source: None,
        }
    }

    /// An item discovered on `source`, one level deeper than it
    pub fn child(url: Url, source: &WorkItem) -> Self {
        Self {
            url,
            depth: source.depth + 1,
            source: Some(source.url.clone()),
        }
    }

    /// Source page as shown in reports
    pub fn source_label(&self) -> String {
        source_label(self.source.as_ref())
    }
}

fn source_label(source: Option<&Url>) -> String {
    source.map_or_else(|| ROOT_SOURCE.to_string(), |url| url.to_string())
}

/// Why a link is broken
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkError {
    /// The server answered with a 4xx or 5xx status
    HttpStatus(u16),
    /// No usable response: DNS, connect, timeout, too many redirects, ...
    Network(String),
}

impl LinkError {
    /// The `Error` column value in reports: the status code, or `ERROR`
    pub fn code_label(&self) -> String {
        match self {
            Self::HttpStatus(code) => code.to_string(),
            Self::Network(_) => "ERROR".to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus(code) => Some(*code),
            Self::Network(_) => None,
        }
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::Network(message) => write!(f, "network error: {}", message),
        }
    }
}

/// A link that failed its check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    pub url: Url,
    pub error: LinkError,
    pub source: Option<Url>,
    pub discovered_at: DateTime<Utc>,
}

impl BrokenLink {
    /// Builds the record for a failed work item, stamped with the current time
    pub fn new(item: &WorkItem, error: LinkError) -> Self {
        Self {
            url: item.url.clone(),
            error,
            source: item.source.clone(),
            discovered_at: Utc::now(),
        }
    }

    /// Source page as shown in reports
    pub fn source_label(&self) -> String {
        source_label(self.source.as_ref())
    }
}
