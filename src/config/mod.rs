//! Configuration module for Link-Sweep
//!
//! A crawl is configured from the command line, optionally layered over a
//! TOML configuration file. The result is a validated, immutable
//! [`CrawlConfig`].
//!
//! # Example
//!
//! ```no_run
//! use link_sweep::config::{load_config, ConfigOverrides};
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("link-sweep.toml")), ConfigOverrides::default()).unwrap();
//! println!("Crawler will use max depth: {}", config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ConfigFile, ConfigOverrides, CrawlConfig, DashboardConfig, DashboardSection, ExportConfig,
    ExportSection, HttpConfig, HttpSection, DEFAULT_MAX_DEPTH, DEFAULT_THREADS,
};

// Re-export parser functions
pub use parser::{load_config, load_config_file, parse_config_file, resolve_config};
pub use validation::validate;
