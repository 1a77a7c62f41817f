//! Fetch-and-extract worker
//!
//! Each worker loops until the frontier closes: take an item, fetch it,
//! report the outcome, and queue the internal links of HTML pages that are
//! still above the depth limit.

use crate::crawler::fetcher::{fetch_url, FetchOutcome, PageContent};
use crate::crawler::frontier::{Dequeued, Frontier};
use crate::crawler::parser::parse_html;
use crate::state::{Aggregator, LinkError, WorkItem};
use crate::url::{LinkClass, SiteScope};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Everything a worker shares with its siblings
#[derive(Clone)]
pub struct WorkerContext {
    pub frontier: Arc<Frontier>,
    pub aggregator: Arc<Aggregator>,
    pub client: Client,
    pub scope: Arc<SiteScope>,
    /// Dequeue timeout; bounds how long shutdown takes to be noticed
    pub poll_interval: Duration,
}

/// A single worker task
pub struct Worker {
    id: usize,
    ctx: WorkerContext,
}

impl Worker {
    pub fn new(id: usize, ctx: WorkerContext) -> Self {
        Self { id, ctx }
    }

    /// Runs until the frontier is closed; returns the number of items processed
    pub async fn run(self) -> usize {
        debug!("Worker {} started", self.id);
        let mut processed = 0;

        loop {
            match self.ctx.frontier.dequeue(self.ctx.poll_interval).await {
                Dequeued::Item(guard) => {
                    process_item(&self.ctx, guard.item()).await;
                    guard.mark_done();
                    processed += 1;
                }
                Dequeued::Empty => continue,
                Dequeued::Closed => break,
            }
        }

        debug!("Worker {} exiting after {} items", self.id, processed);
        processed
    }
}

/// Checks one URL and reports the outcome
pub async fn process_item(ctx: &WorkerContext, item: &WorkItem) {
    debug!("Checking {} (depth {})", item.url, item.depth);

    match fetch_url(&ctx.client, &item.url).await {
        FetchOutcome::Page {
            status,
            final_url,
            content,
        } => {
            ctx.aggregator.record_success(status);

            if let PageContent::Html(body) = content {
                if !ctx.scope.contains(&final_url) {
                    debug!("{} redirected off-site to {}; not expanding", item.url, final_url);
                } else if item.depth < ctx.frontier.max_depth() {
                    enqueue_links(ctx, item, &body, &final_url);
                }
            }
        }

        FetchOutcome::HttpError { status } => {
            debug!("Broken link {} (HTTP {}) on {}", item.url, status, item.source_label());
            ctx.aggregator
                .record_broken(item, LinkError::HttpStatus(status));
        }

        FetchOutcome::NetworkError { message } => {
            debug!("Broken link {} ({}) on {}", item.url, message, item.source_label());
            ctx.aggregator.record_broken(item, LinkError::Network(message));
        }
    }
}

/// Queues every new internal link found in `body`
fn enqueue_links(ctx: &WorkerContext, item: &WorkItem, body: &str, page_url: &url::Url) {
    let parsed = parse_html(body, page_url);

    for href in &parsed.hrefs {
        match ctx.scope.classify(href, &parsed.base_url) {
            LinkClass::Internal(url) => {
                if ctx.frontier.try_enqueue(WorkItem::child(url, item)) {
                    ctx.aggregator.record_discovered();
                }
            }
            LinkClass::External => ctx.aggregator.record_external(),
            LinkClass::Skip => trace!("Skipping href {:?} on {}", href, item.url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::crawler::fetcher::build_http_client;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(root: &Url, max_depth: u32) -> WorkerContext {
        WorkerContext {
            frontier: Arc::new(Frontier::new(max_depth)),
            aggregator: Arc::new(Aggregator::new()),
            client: build_http_client(&HttpConfig::default()).unwrap(),
            scope: Arc::new(SiteScope::new(root, false).unwrap()),
            poll_interval: Duration::from_millis(10),
        }
    }

    async fn site() -> (MockServer, Url) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    r#"<a href="/a">a</a><a href="/a#x">a again</a>
                       <a href="https://elsewhere.test/">ext</a>
                       <a href="mailto:x@y.z">mail</a>"#,
                    "text/html",
                ),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let root = Url::parse(&format!("{}/", server.uri())).unwrap();
        (server, root)
    }

    #[tokio::test]
    async fn test_process_html_page_queues_internal_links() {
        let (_server, root) = site().await;
        let ctx = context(&root, 2);

        process_item(&ctx, &WorkItem::root(root.clone())).await;

        let snapshot = ctx.aggregator.snapshot();
        assert_eq!(snapshot.succeeded, 1);
        assert_eq!(snapshot.discovered, 1);
        assert_eq!(snapshot.external_links, 1);
        assert_eq!(ctx.frontier.len(), 1);
        assert!(ctx.frontier.was_visited(&root.join("/a").unwrap()));
    }

    #[tokio::test]
    async fn test_page_at_max_depth_is_not_expanded() {
        let (_server, root) = site().await;
        let ctx = context(&root, 0);

        process_item(&ctx, &WorkItem::root(root)).await;

        assert_eq!(ctx.aggregator.snapshot().checked, 1);
        assert!(ctx.frontier.is_empty());
    }

    #[tokio::test]
    async fn test_offsite_redirect_target_not_expanded() {
        let (server, root) = site().await;
        let port = root.port().unwrap();
        // Same server under another host name counts as a different site
        Mock::given(method("GET"))
            .and(path("/out"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("http://localhost:{}/landing", port)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/landing"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                format!(r#"<a href="http://127.0.0.1:{}/back">back</a>"#, port),
                "text/html",
            ))
            .mount(&server)
            .await;

        let ctx = context(&root, 3);
        let parent = WorkItem::root(root.clone());
        process_item(&ctx, &WorkItem::child(root.join("/out").unwrap(), &parent)).await;

        let snapshot = ctx.aggregator.snapshot();
        assert_eq!(snapshot.succeeded, 1);
        assert_eq!(snapshot.discovered, 0);
        assert!(ctx.frontier.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_recorded_with_source() {
        let (_server, root) = site().await;
        let ctx = context(&root, 2);
        let parent = WorkItem::root(root.clone());
        let item = WorkItem::child(root.join("/gone").unwrap(), &parent);

        process_item(&ctx, &item).await;

        let broken = ctx.aggregator.broken_links();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].error, LinkError::HttpStatus(404));
        assert_eq!(broken[0].source.as_ref(), Some(&root));
    }

    #[tokio::test]
    async fn test_worker_exits_when_frontier_closes() {
        let (_server, root) = site().await;
        let ctx = context(&root, 0);
        assert!(ctx.frontier.try_enqueue(WorkItem::root(root)));

        let frontier = Arc::clone(&ctx.frontier);
        let handle = tokio::spawn(Worker::new(0, ctx).run());

        frontier.wait_drained(Duration::from_millis(10)).await;
        frontier.close();
        assert_eq!(handle.await.unwrap(), 1);
    }
}
