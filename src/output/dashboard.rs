//! Live progress display
//!
//! A spinner on stderr refreshed from aggregator snapshots. The render task
//! only reads atomics and copies, so it never holds a lock that workers need.

use crate::crawler::Frontier;
use crate::state::{Aggregator, CrawlSnapshot};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Status codes that get their own column
pub const SHOWN_CODES: [u16; 3] = [400, 404, 500];

/// Handle to the running dashboard task
pub struct Dashboard {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Dashboard {
    /// Starts rendering every `refresh` until [`Dashboard::stop`] is called
    pub fn spawn(aggregator: Arc<Aggregator>, frontier: Arc<Frontier>, refresh: Duration) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("Starting crawl...");

        let (stop, mut stopped) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(refresh);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let snapshot = aggregator
                            .snapshot()
                            .with_queue(frontier.len(), frontier.in_flight());
                        bar.set_message(render_line(&snapshot));
                        bar.tick();
                    }
                    _ = &mut stopped => break,
                }
            }
            bar.finish_and_clear();
        });

        Self { stop, handle }
    }

    /// Stops the render task and clears the spinner
    pub async fn stop(self) {
        // The task may already be gone; nothing to signal then
        let _ = self.stop.send(());
        if let Err(e) = self.handle.await {
            tracing::warn!("Dashboard task ended abnormally: {}", e);
        }
    }
}

/// Formats one dashboard frame
pub fn render_line(snapshot: &CrawlSnapshot) -> String {
    format!(
        "Discovered: {} | Checked: {} | Queued: {} | In flight: {}\n\
         200 OK: {} | 400: {} | 404: {} | 500: {} | Other errors: {}",
        snapshot.discovered,
        snapshot.checked,
        snapshot.queued,
        snapshot.in_flight,
        snapshot.status(200),
        snapshot.status(400),
        snapshot.status(404),
        snapshot.status(500),
        snapshot.other_errors(&SHOWN_CODES),
    )
}
