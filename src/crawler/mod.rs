//! Crawler module for link checking
//!
//! This module contains the concurrent crawl engine, including:
//! - HTTP fetching with timeout and redirect limits
//! - HTML parsing and link extraction
//! - The shared frontier with its visited-set
//! - The worker pool and overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod worker;

pub use coordinator::{run_crawl, CrawlPhase, Coordinator};
pub use fetcher::{build_http_client, fetch_url, is_html, FetchOutcome, PageContent};
pub use frontier::{Dequeued, Frontier, InFlight};
pub use parser::{extract_links, parse_html, ParsedPage};
pub use worker::{process_item, Worker, WorkerContext};
