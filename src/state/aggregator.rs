//! Thread-safe collector of crawl results
//!
//! Workers report every outcome here. Counters are independent atomics, so
//! readers never block writers; the broken-link list is append-only behind
//! a mutex so each record is stored whole.

use crate::state::records::{BrokenLink, LinkError, WorkItem};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::UnboundedSender;

/// Point-in-time copy of the crawl counters
///
/// Fields are read one at a time, so a snapshot taken mid-crawl may be
/// slightly inconsistent across fields. After the workers are joined it is
/// exact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSnapshot {
    /// URLs accepted into the frontier (root included)
    pub discovered: u64,

    /// URLs fetched, whatever the outcome
    pub checked: u64,

    /// Checks that ended in a non-error response
    pub succeeded: u64,

    /// Checks that produced a broken-link record
    pub broken: u64,

    /// Broken links caused by network failures rather than a status code
    pub network_errors: u64,

    /// Links to other sites seen on crawled pages
    pub external_links: u64,

    /// Items waiting in the frontier
    pub queued: usize,

    /// Items currently being fetched
    pub in_flight: usize,

    /// Responses received, by status code
    pub status_counts: BTreeMap<u16, u64>,
}

impl CrawlSnapshot {
    /// Adds the frontier's queue figures to the snapshot
    pub fn with_queue(mut self, queued: usize, in_flight: usize) -> Self {
        self.queued = queued;
        self.in_flight = in_flight;
        self
    }

    /// Responses with the given status code
    pub fn status(&self, code: u16) -> u64 {
        self.status_counts.get(&code).copied().unwrap_or(0)
    }

    /// Error responses (4xx/5xx) by status code
    pub fn errors_by_code(&self) -> BTreeMap<u16, u64> {
        self.status_counts
            .iter()
            .filter(|(code, _)| **code >= 400)
            .map(|(code, count)| (*code, *count))
            .collect()
    }

    /// Error responses whose code is not in `shown`, plus network errors
    pub fn other_errors(&self, shown: &[u16]) -> u64 {
        let other_codes: u64 = self
            .errors_by_code()
            .iter()
            .filter(|(code, _)| !shown.contains(code))
            .map(|(_, count)| count)
            .sum();
        other_codes + self.network_errors
    }
}

/// Result aggregator shared by all workers
#[derive(Debug, Default)]
pub struct Aggregator {
    discovered: AtomicU64,
    checked: AtomicU64,
    succeeded: AtomicU64,
    broken_count: AtomicU64,
    network_errors: AtomicU64,
    external_links: AtomicU64,
    status_counts: Mutex<BTreeMap<u16, u64>>,
    broken: Mutex<BrokenLog>,
}

/// Broken-link records plus the optional realtime consumer
///
/// Kept under one lock so the sink sees records in list order.
#[derive(Debug, Default)]
struct BrokenLog {
    records: Vec<BrokenLink>,
    sink: Option<UnboundedSender<BrokenLink>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an aggregator that also forwards each broken link to `sink`
    ///
    /// Records are forwarded in the same order they are appended.
    pub fn with_sink(sink: UnboundedSender<BrokenLink>) -> Self {
        Self {
            broken: Mutex::new(BrokenLog {
                records: Vec::new(),
                sink: Some(sink),
            }),
            ..Self::default()
        }
    }

    /// Counts a URL newly accepted into the frontier
    pub fn record_discovered(&self) {
        self.discovered.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts an outbound link to another site
    pub fn record_external(&self) {
        self.external_links.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful check
    pub fn record_success(&self, status: u16) {
        self.bump_status(status);
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        self.checked.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed check for `item`
    pub fn record_broken(&self, item: &WorkItem, error: LinkError) {
        match &error {
            LinkError::HttpStatus(code) => self.bump_status(*code),
            LinkError::Network(_) => {
                self.network_errors.fetch_add(1, Ordering::Relaxed);
            }
        }

        let record = BrokenLink::new(item, error);
        {
            let mut log = lock(&self.broken);
            let send_failed = log
                .sink
                .as_ref()
                .is_some_and(|sink| sink.send(record.clone()).is_err());
            if send_failed {
                tracing::warn!("Realtime export closed; {} not streamed", record.url);
                log.sink = None;
            }
            log.records.push(record);
        }

        self.broken_count.fetch_add(1, Ordering::Relaxed);
        self.checked.fetch_add(1, Ordering::Relaxed);
    }

    fn bump_status(&self, status: u16) {
        *lock(&self.status_counts).entry(status).or_insert(0) += 1;
    }

    /// Returns a copy of the current counters
    pub fn snapshot(&self) -> CrawlSnapshot {
        CrawlSnapshot {
            discovered: self.discovered.load(Ordering::Relaxed),
            checked: self.checked.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            broken: self.broken_count.load(Ordering::Relaxed),
            network_errors: self.network_errors.load(Ordering::Relaxed),
            external_links: self.external_links.load(Ordering::Relaxed),
            queued: 0,
            in_flight: 0,
            status_counts: lock(&self.status_counts).clone(),
        }
    }

    /// Returns a copy of the broken-link list, in the order recorded
    pub fn broken_links(&self) -> Vec<BrokenLink> {
        lock(&self.broken).records.clone()
    }

    /// Takes the broken-link list out of the aggregator
    pub fn take_broken_links(&self) -> Vec<BrokenLink> {
        std::mem::take(&mut lock(&self.broken).records)
    }

    /// Drops the realtime sink so its consumer can finish
    pub fn close_sink(&self) {
        lock(&self.broken).sink = None;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
