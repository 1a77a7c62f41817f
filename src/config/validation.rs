use crate::config::types::{CrawlConfig, ExportConfig, HttpConfig};
use crate::ConfigError;

/// Upper bound on the worker pool size
const MAX_THREADS: usize = 256;

/// Upper bound on followed redirect hops
const MAX_REDIRECTS: usize = 50;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_root_url(config)?;
    validate_pool(config)?;
    validate_http_config(&config.http)?;
    validate_export_config(&config.export)?;

    if config.dashboard.refresh_ms == 0 {
        return Err(ConfigError::Validation(
            "dashboard refresh-ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_root_url(config: &CrawlConfig) -> Result<(), ConfigError> {
    let url = &config.root_url;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root URL must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "root URL '{}' has no host",
            url
        )));
    }

    Ok(())
}

fn validate_pool(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.threads < 1 || config.threads > MAX_THREADS {
        return Err(ConfigError::Validation(format!(
            "threads must be between 1 and {}, got {}",
            MAX_THREADS, config.threads
        )));
    }

    if config.poll_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "poll-interval-ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "http timeout must be > 0".to_string(),
        ));
    }

    if config.connect_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "http connect timeout must be > 0".to_string(),
        ));
    }

    if config.max_redirects > MAX_REDIRECTS {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be <= {}, got {}",
            MAX_REDIRECTS, config.max_redirects
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_export_config(config: &ExportConfig) -> Result<(), ConfigError> {
    for path in [&config.path, &config.realtime_path].into_iter().flatten() {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "export path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
