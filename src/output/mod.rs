//! Output module for crawl results
//!
//! This module handles:
//! - The live progress dashboard
//! - CSV export of broken links, at the end of the run or as they are found
//! - The final summary table

mod csv_export;
mod dashboard;
mod summary;

pub use csv_export::{
    export_csv, export_csv_in_background, read_csv, write_csv, CsvRow, RealtimeExporter,
    CSV_HEADERS,
};
pub use dashboard::{render_line, Dashboard, SHOWN_CODES};
pub use summary::{print_summary, render_summary};

use crate::state::{BrokenLink, CrawlSnapshot};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while writing CSV exports
///
/// None of these abort a crawl; they are logged and listed in the report.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export writer failed: {0}")]
    Writer(String),
}

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Final counters; exact because all workers have been joined
    pub snapshot: CrawlSnapshot,

    /// Broken links in the order they were recorded
    pub broken: Vec<BrokenLink>,

    pub elapsed: Duration,

    /// Rows written by the realtime exporter, if it ran to completion
    pub realtime_rows: Option<usize>,

    /// Export failures, as `path: message`
    pub export_errors: Vec<String>,
}

impl CrawlReport {
    /// True when every checked link succeeded
    pub fn is_clean(&self) -> bool {
        self.broken.is_empty()
    }
}
