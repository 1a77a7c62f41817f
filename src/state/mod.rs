//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `WorkItem`: a URL waiting to be checked, with its depth and source page
//! - `BrokenLink`: a failed check, with the page that referenced it
//! - `Aggregator`: thread-safe counters and the broken-link list

mod aggregator;
mod records;

// Re-export main types
pub use aggregator::{Aggregator, CrawlSnapshot};
pub use records::{BrokenLink, LinkError, WorkItem, ROOT_SOURCE};
