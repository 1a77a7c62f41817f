//! Crawl frontier: the work queue and the visited-set
//!
//! The queue, the visited-set and the in-flight count live under one mutex,
//! so every operation sees them in a consistent state:
//!
//! - a URL enters the visited-set at most once, in the same critical section
//!   that queues it, so no two workers ever queue the same URL
//! - popping an item and counting it in-flight are one step, so the
//!   coordinator never sees "queue empty, nothing in flight" while a worker
//!   holds an item it has not reported yet

use crate::state::WorkItem;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Outcome of [`Frontier::dequeue`]
#[derive(Debug)]
pub enum Dequeued<'a> {
    /// An item to process; it counts as in-flight until the guard is dropped
    Item(InFlight<'a>),
    /// Nothing arrived before the timeout
    Empty,
    /// The frontier was closed and no more work will be handed out
    Closed,
}

/// A dequeued work item that is being processed
///
/// Dropping the guard marks the item done. Because the mark happens in
/// `Drop`, a worker that panics mid-fetch still releases its slot.
#[derive(Debug)]
pub struct InFlight<'a> {
    frontier: &'a Frontier,
    item: WorkItem,
}

impl InFlight<'_> {
    pub fn item(&self) -> &WorkItem {
        &self.item
    }

    /// Marks the item done; equivalent to dropping the guard
    pub fn mark_done(self) {}
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.frontier.release();
    }
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<WorkItem>,
    visited: HashSet<String>,
    in_flight: usize,
    closed: bool,
}

/// Thread-safe work queue with at-most-once admission per URL
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
    drained: Notify,
    max_depth: u32,
}

impl Frontier {
    /// Creates an empty frontier that admits items up to `max_depth`
    pub fn new(max_depth: u32) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            notify: Notify::new(),
            drained: Notify::new(),
            max_depth,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues `item` unless its URL was seen before
    ///
    /// Returns whether the item was queued. Items deeper than the depth
    /// limit, and every item after [`close`](Self::close), are rejected
    /// without touching the visited-set.
    pub fn try_enqueue(&self, item: WorkItem) -> bool {
        {
            let mut state = self.lock();

            if state.closed || item.depth > self.max_depth {
                return false;
            }

            if !state.visited.insert(item.url.as_str().to_string()) {
                tracing::trace!("Already seen: {}", item.url);
                return false;
            }

            state.queue.push_back(item);
        }

        self.notify.notify_one();
        true
    }

    /// Takes the next item, waiting up to `timeout` for one to arrive
    ///
    /// Returns [`Dequeued::Closed`] as soon as the frontier is closed, even
    /// while waiting, so shutdown is observed within one timeout interval at
    /// most.
    pub async fn dequeue(&self, timeout: Duration) -> Dequeued<'_> {
        let deadline = Instant::now() + timeout;

        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking the queue so a push in between is not missed
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    return Dequeued::Closed;
                }
                if let Some(item) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Dequeued::Item(InFlight {
                        frontier: self,
                        item,
                    });
                }
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Dequeued::Empty;
            }
        }
    }

    fn release(&self) {
        let drained = {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.queue.is_empty() && state.in_flight == 0
        };

        if drained {
            self.drained.notify_waiters();
        }
    }

    /// Stops handing out and accepting work, and wakes every waiting worker
    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Returns true when nothing is queued and nothing is in flight
    ///
    /// Both conditions are read under the same lock.
    pub fn is_drained(&self) -> bool {
        let state = self.lock();
        state.queue.is_empty() && state.in_flight == 0
    }

    /// Waits until the frontier drains, re-checking at least every `poll`
    pub async fn wait_drained(&self, poll: Duration) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_drained() {
                return;
            }

            let _ = tokio::time::timeout(poll, notified).await;
        }
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Number of items handed out and not yet done
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Number of distinct URLs ever admitted
    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    /// Returns true if `url` was admitted at some point
    pub fn was_visited(&self, url: &url::Url) -> bool {
        self.lock().visited.contains(url.as_str())
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
