use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Default maximum crawl depth
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Default number of worker tasks
pub const DEFAULT_THREADS: usize = 10;

/// Fully resolved crawl configuration
///
/// Built once before the crawl starts and shared read-only by every
/// component through an `Arc`.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// The URL the crawl starts from (already normalized)
    pub root_url: Url,

    /// Maximum link depth from the root page (root is depth 0)
    pub max_depth: u32,

    /// Number of concurrent worker tasks
    pub threads: usize,

    /// Treat subdomains of the root host as internal
    pub include_subdomains: bool,

    /// Dequeue timeout for workers and the coordinator's drain poll (milliseconds)
    pub poll_interval_ms: u64,

    pub http: HttpConfig,
    pub export: ExportConfig,
    pub dashboard: DashboardConfig,
}

/// HTTP client behaviour
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Total request timeout (milliseconds)
    pub timeout_ms: u64,

    /// Connection establishment timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Maximum redirect hops before the request counts as a network error
    pub max_redirects: usize,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
            max_redirects: 10,
            user_agent: format!("link-sweep/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// CSV export destinations
#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    /// Written once after the crawl finishes
    pub path: Option<PathBuf>,

    /// Appended to as broken links are found
    pub realtime_path: Option<PathBuf>,
}

/// Live dashboard settings
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub enabled: bool,

    /// Redraw interval (milliseconds)
    pub refresh_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_ms: 250,
        }
    }
}

/// On-disk TOML configuration
///
/// Every key is optional; anything left out falls back to the defaults
/// or to the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub max_depth: Option<u32>,
    pub threads: Option<usize>,
    pub include_subdomains: Option<bool>,
    pub poll_interval_ms: Option<u64>,
    pub http: HttpSection,
    pub export: ExportSection,
    pub dashboard: DashboardSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct HttpSection {
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub max_redirects: Option<usize>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ExportSection {
    pub path: Option<PathBuf>,
    pub realtime_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DashboardSection {
    pub enabled: Option<bool>,
    pub refresh_ms: Option<u64>,
}

/// Values supplied on the command line; these win over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub max_depth: Option<u32>,
    pub threads: Option<usize>,
    pub include_subdomains: bool,
    pub timeout_ms: Option<u64>,
    pub max_redirects: Option<usize>,
    pub export_path: Option<PathBuf>,
    pub realtime_export_path: Option<PathBuf>,
    pub no_dashboard: bool,
}
