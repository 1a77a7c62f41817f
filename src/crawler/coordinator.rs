//! Crawler coordinator - main crawl orchestration logic
//!
//! This module owns the crawl lifecycle:
//! - Seeding the frontier with the root URL after a DNS preflight
//! - Spawning and supervising the worker pool
//! - Detecting completion (nothing queued and nothing in flight)
//! - Shutting workers down and producing the final report and exports

use crate::config::CrawlConfig;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::frontier::Frontier;
use crate::crawler::worker::{Worker, WorkerContext};
use crate::output::{export_csv_in_background, CrawlReport, Dashboard, RealtimeExporter};
use crate::state::{Aggregator, WorkItem};
use crate::url::SiteScope;
use crate::{LinkSweepError, UrlError};
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::{Host, Url};

/// Lifecycle phase of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    /// Root URL checked and queued; workers not yet running
    Seeding,
    /// Workers are processing the frontier
    Running,
    /// Frontier drained; workers are being stopped
    Draining,
    /// Workers joined, report produced
    Done,
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<CrawlConfig>,
    frontier: Arc<Frontier>,
    scope: Arc<SiteScope>,
    client: Client,
    phase: CrawlPhase,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(LinkSweepError)` - The root URL has no host or the HTTP client could not be built
    pub fn new(config: CrawlConfig) -> Result<Self, LinkSweepError> {
        let scope = SiteScope::from_config(&config).ok_or(UrlError::MissingDomain)?;
        let client = build_http_client(&config.http)?;
        let frontier = Frontier::new(config.max_depth);

        Ok(Self {
            config: Arc::new(config),
            frontier: Arc::new(frontier),
            scope: Arc::new(scope),
            client,
            phase: CrawlPhase::Seeding,
        })
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    fn enter(&mut self, phase: CrawlPhase) {
        tracing::info!("Crawl phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    /// Runs the crawl to completion
    ///
    /// 1. Seeding: resolve the root host (failure is fatal), open the
    ///    realtime export, queue the root at depth 0
    /// 2. Running: spawn the worker pool and wait for the frontier to drain
    /// 3. Draining: close the frontier and join every worker
    /// 4. Done: flush exports and build the report
    ///
    /// Individual broken links never make this return `Err`.
    pub async fn run(mut self) -> Result<CrawlReport, LinkSweepError> {
        let started = Instant::now();
        let root = self.config.root_url.clone();
        tracing::info!(
            "Starting crawl of {} (max depth {}, {} workers)",
            root,
            self.config.max_depth,
            self.config.threads
        );

        // Seeding
        preflight(&root).await?;

        let mut export_errors = Vec::new();
        let realtime = match &self.config.export.realtime_path {
            Some(path) => match RealtimeExporter::spawn(path) {
                Ok(exporter) => Some(exporter),
                Err(e) => {
                    tracing::error!("Realtime export to {} disabled: {}", path.display(), e);
                    export_errors.push(format!("{}: {}", path.display(), e));
                    None
                }
            },
            None => None,
        };

        let aggregator = Arc::new(match &realtime {
            Some(exporter) => Aggregator::with_sink(exporter.sender()),
            None => Aggregator::new(),
        });

        if self.frontier.try_enqueue(WorkItem::root(root)) {
            aggregator.record_discovered();
        }

        let dashboard = self.config.dashboard.enabled.then(|| {
            Dashboard::spawn(
                Arc::clone(&aggregator),
                Arc::clone(&self.frontier),
                Duration::from_millis(self.config.dashboard.refresh_ms),
            )
        });

        let ctx = WorkerContext {
            frontier: Arc::clone(&self.frontier),
            aggregator: Arc::clone(&aggregator),
            client: self.client.clone(),
            scope: Arc::clone(&self.scope),
            poll_interval: Duration::from_millis(self.config.poll_interval_ms),
        };

        let mut workers = JoinSet::new();
        for id in 0..self.config.threads {
            workers.spawn(Worker::new(id, ctx.clone()).run());
        }
        self.enter(CrawlPhase::Running);

        self.supervise(&mut workers, &ctx).await;

        self.enter(CrawlPhase::Draining);
        self.frontier.close();

        let mut processed = 0;
        while let Some(result) = workers.join_next().await {
            match result {
                Ok(count) => processed += count,
                Err(e) => tracing::error!("Worker failed during shutdown: {}", e),
            }
        }
        tracing::debug!("Workers joined after processing {} items", processed);

        if let Some(dashboard) = dashboard {
            dashboard.stop().await;
        }

        aggregator.close_sink();
        let realtime_rows = match realtime {
            Some(exporter) => match exporter.finish().await {
                Ok(rows) => Some(rows),
                Err(e) => {
                    tracing::error!("Realtime export failed: {}", e);
                    export_errors.push(e.to_string());
                    None
                }
            },
            None => None,
        };

        let snapshot = aggregator
            .snapshot()
            .with_queue(self.frontier.len(), self.frontier.in_flight());
        let broken = aggregator.take_broken_links();

        if let Some(path) = &self.config.export.path {
            let already_streamed = realtime_rows.is_some()
                && self.config.export.realtime_path.as_ref() == Some(path);
            if !already_streamed {
                match export_csv_in_background(path.clone(), broken.clone()).await {
                    Ok(rows) => tracing::info!("Exported {} broken links to {}", rows, path.display()),
                    Err(e) => {
                        tracing::error!("Export to {} failed: {}", path.display(), e);
                        export_errors.push(format!("{}: {}", path.display(), e));
                    }
                }
            }
        }

        self.enter(CrawlPhase::Done);

        let report = CrawlReport {
            snapshot,
            broken,
            elapsed: started.elapsed(),
            realtime_rows,
            export_errors,
        };

        tracing::info!(
            "Crawl completed: {} checked, {} broken in {:?}",
            report.snapshot.checked,
            report.snapshot.broken,
            report.elapsed
        );

        Ok(report)
    }

    /// Waits for the frontier to drain, replacing any worker that dies early
    ///
    /// A worker only returns on its own once the frontier is closed, so any
    /// exit seen here is a panic. Its in-flight slot was already released by
    /// the guard's `Drop`; a replacement keeps the pool at full size.
    async fn supervise(&self, workers: &mut JoinSet<usize>, ctx: &WorkerContext) {
        let poll = Duration::from_millis(self.config.poll_interval_ms);
        let mut next_id = self.config.threads;

        loop {
            tokio::select! {
                _ = self.frontier.wait_drained(poll) => return,
                Some(result) = workers.join_next() => {
                    if let Err(e) = result {
                        tracing::error!("Worker died: {}; starting a replacement", e);
                    }
                    workers.spawn(Worker::new(next_id, ctx.clone()).run());
                    next_id += 1;
                }
            }
        }
    }
}

/// Resolves the root host before any crawling starts
///
/// An unresolvable root is a fatal startup error rather than a broken link.
async fn preflight(root: &Url) -> Result<(), LinkSweepError> {
    let startup_error = |message: String| LinkSweepError::Startup {
        url: root.to_string(),
        message,
    };

    let domain = match root.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => return Ok(()),
        None => return Err(startup_error("URL has no host".to_string())),
    };
    let port = root.port_or_known_default().unwrap_or(80);

    let mut addrs = tokio::net::lookup_host((domain.as_str(), port))
        .await
        .map_err(|e| startup_error(format!("cannot resolve host '{}': {}", domain, e)))?;

    if addrs.next().is_none() {
        return Err(startup_error(format!(
            "host '{}' resolved to no addresses",
            domain
        )));
    }

    Ok(())
}

/// Runs a complete crawl with the given configuration
///
/// # Example
///
/// ```no_run
/// use link_sweep::config::CrawlConfig;
/// use link_sweep::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CrawlConfig::for_url("https://example.com/")?;
/// let report = run_crawl(config).await?;
/// println!("{} broken links", report.broken.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: CrawlConfig) -> Result<CrawlReport, LinkSweepError> {
    Coordinator::new(config)?.run().await
}
