use crate::config::types::{
    ConfigFile, ConfigOverrides, CrawlConfig, DashboardConfig, ExportConfig, HttpConfig,
    DEFAULT_MAX_DEPTH, DEFAULT_THREADS,
};
use crate::config::validation::validate;
use crate::url::normalize_url;
use crate::ConfigError;
use std::path::Path;

/// Default dequeue timeout / drain poll interval (milliseconds)
const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Loads and parses a TOML configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(ConfigFile)` - Parsed (not yet validated) file contents
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config_file(&content)
}

/// Parses TOML configuration from a string
pub fn parse_config_file(content: &str) -> Result<ConfigFile, ConfigError> {
    let file: ConfigFile = toml::from_str(content)?;
    Ok(file)
}

/// Merges the config file and command-line overrides into a validated `CrawlConfig`
///
/// Precedence is command line, then config file, then built-in defaults.
///
/// # Example
///
/// ```
/// use link_sweep::config::{resolve_config, ConfigFile, ConfigOverrides};
///
/// let overrides = ConfigOverrides {
///     url: Some("https://example.com/docs/".to_string()),
///     ..Default::default()
/// };
/// let config = resolve_config(ConfigFile::default(), overrides).unwrap();
/// assert_eq!(config.root_url.as_str(), "https://example.com/docs");
/// assert_eq!(config.max_depth, 5);
/// assert_eq!(config.threads, 10);
/// ```
pub fn resolve_config(
    file: ConfigFile,
    overrides: ConfigOverrides,
) -> Result<CrawlConfig, ConfigError> {
    let raw_url = overrides.url.or(file.url).ok_or(ConfigError::MissingUrl)?;
    let root_url = normalize_url(&raw_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", raw_url, e)))?;

    let http_defaults = HttpConfig::default();
    let http = HttpConfig {
        timeout_ms: overrides
            .timeout_ms
            .or(file.http.timeout_ms)
            .unwrap_or(http_defaults.timeout_ms),
        connect_timeout_ms: file
            .http
            .connect_timeout_ms
            .unwrap_or(http_defaults.connect_timeout_ms),
        max_redirects: overrides
            .max_redirects
            .or(file.http.max_redirects)
            .unwrap_or(http_defaults.max_redirects),
        user_agent: file.http.user_agent.unwrap_or(http_defaults.user_agent),
    };

    let export = ExportConfig {
        path: overrides.export_path.or(file.export.path),
        realtime_path: overrides.realtime_export_path.or(file.export.realtime_path),
    };

    let dashboard_defaults = DashboardConfig::default();
    let dashboard = DashboardConfig {
        enabled: !overrides.no_dashboard
            && file.dashboard.enabled.unwrap_or(dashboard_defaults.enabled),
        refresh_ms: file
            .dashboard
            .refresh_ms
            .unwrap_or(dashboard_defaults.refresh_ms),
    };

    let config = CrawlConfig {
        root_url,
        max_depth: overrides
            .max_depth
            .or(file.max_depth)
            .unwrap_or(DEFAULT_MAX_DEPTH),
        threads: overrides
            .threads
            .or(file.threads)
            .unwrap_or(DEFAULT_THREADS),
        include_subdomains: overrides.include_subdomains
            || file.include_subdomains.unwrap_or(false),
        poll_interval_ms: file.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        http,
        export,
        dashboard,
    };

    validate(&config)?;
    Ok(config)
}

/// Loads the optional config file and merges the command-line overrides
pub fn load_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<CrawlConfig, ConfigError> {
    let file = match path {
        Some(p) => load_config_file(p)?,
        None => ConfigFile::default(),
    };
    resolve_config(file, overrides)
}

impl CrawlConfig {
    /// Builds a configuration for `url` with default settings
    pub fn for_url(url: &str) -> Result<Self, ConfigError> {
        resolve_config(
            ConfigFile::default(),
            ConfigOverrides {
                url: Some(url.to_string()),
                ..Default::default()
            },
        )
    }
}
