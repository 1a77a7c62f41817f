//! Link-Sweep main entry point
//!
//! This is the command-line interface for the Link-Sweep broken-link checker.

use anyhow::Context;
use clap::Parser;
use link_sweep::config::{load_config, ConfigOverrides, CrawlConfig};
use link_sweep::crawler::run_crawl;
use link_sweep::output::print_summary;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Link-Sweep: a concurrent broken-link checker
///
/// Link-Sweep crawls a website from a root URL, stays on that site, and
/// reports every internal link that returns an HTTP error or cannot be
/// reached, together with the page it was found on.
#[derive(Parser, Debug)]
#[command(name = "link-sweep")]
#[command(version)]
#[command(about = "Find broken links on a website", long_about = None)]
struct Cli {
    /// Root URL to start crawling from
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Maximum link depth from the root page [default: 5]
    #[arg(short, long, value_name = "DEPTH")]
    depth: Option<u32>,

    /// Number of concurrent workers [default: 10]
    #[arg(short, long, value_name = "N")]
    threads: Option<usize>,

    /// Write broken links to this CSV file when the crawl finishes
    #[arg(short, long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Append broken links to this CSV file as they are found
    #[arg(long, value_name = "PATH")]
    export_realtime: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Request timeout in seconds [default: 10]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Redirect hops to follow before a link counts as broken [default: 10]
    #[arg(long, value_name = "N")]
    max_redirects: Option<usize>,

    /// Treat subdomains of the root host as part of the site
    #[arg(long)]
    include_subdomains: bool,

    /// Disable the live progress display
    #[arg(long)]
    no_dashboard: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            url: self.url.clone(),
            max_depth: self.depth,
            threads: self.threads,
            include_subdomains: self.include_subdomains,
            timeout_ms: self.timeout.map(|secs| secs.saturating_mul(1000)),
            max_redirects: self.max_redirects,
            export_path: self.export.clone(),
            realtime_export_path: self.export_realtime.clone(),
            no_dashboard: self.no_dashboard || self.quiet,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_sweep=warn,warn"),
            1 => EnvFilter::new("link_sweep=info,warn"),
            2 => EnvFilter::new("link_sweep=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration, runs the crawl and prints the results
///
/// Broken links are not an error; only startup failures are.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(Some(path.as_path()), cli.overrides())
                .with_context(|| format!("invalid configuration in {}", path.display()))?
        }
        None => load_config(None, cli.overrides()).context("invalid configuration")?,
    };

    log_config(&config);

    let report = run_crawl(config).await.context("crawl could not start")?;

    if !cli.quiet {
        print_summary(&report);
    }

    for failure in &report.export_errors {
        eprintln!("Export failed: {}", failure);
    }
    if let Some(rows) = report.realtime_rows {
        tracing::info!("Streamed {} broken links to the realtime export", rows);
    }

    Ok(())
}

fn log_config(config: &CrawlConfig) {
    tracing::info!(
        "Crawling {} (max depth {}, {} workers, subdomains {})",
        config.root_url,
        config.max_depth,
        config.threads,
        if config.include_subdomains { "included" } else { "excluded" }
    );
    if let Some(path) = &config.export.path {
        tracing::info!("CSV export: {}", path.display());
    }
    if let Some(path) = &config.export.realtime_path {
        tracing::info!("Realtime CSV export: {}", path.display());
    }
}
