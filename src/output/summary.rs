//! End-of-run summary printed to stdout

use crate::output::CrawlReport;
use std::fmt::Write;

/// Prints the summary to stdout
pub fn print_summary(report: &CrawlReport) {
    print!("{}", render_summary(report));
}

/// Formats the counters and the broken-link table
pub fn render_summary(report: &CrawlReport) -> String {
    let snapshot = &report.snapshot;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Crawl Summary ===\n");
    let _ = writeln!(out, "  Pages discovered: {}", snapshot.discovered);
    let _ = writeln!(out, "  Pages checked: {}", snapshot.checked);
    let _ = writeln!(out, "  Succeeded: {}", snapshot.succeeded);
    let _ = writeln!(out, "  Broken: {}", snapshot.broken);
    let _ = writeln!(out, "  External links seen: {}", snapshot.external_links);
    let _ = writeln!(out, "  Elapsed: {:.1}s", report.elapsed.as_secs_f64());

    let errors = snapshot.errors_by_code();
    if !errors.is_empty() || snapshot.network_errors > 0 {
        let _ = writeln!(out, "\nErrors by code:");
        for (code, count) in &errors {
            let _ = writeln!(out, "  {}: {}", code, count);
        }
        if snapshot.network_errors > 0 {
            let _ = writeln!(out, "  ERROR: {}", snapshot.network_errors);
        }
    }
    out.push('\n');

    if report.broken.is_empty() {
        out.push_str("No broken links found.\n");
        return out;
    }

    let rows: Vec<[String; 3]> = report
        .broken
        .iter()
        .map(|link| [link.error.code_label(), link.url.to_string(), link.source_label()])
        .collect();

    let mut widths = ["Error".len(), "URL".len(), "Source".len()];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let _ = writeln!(out, "Broken links ({}):", rows.len());
    let _ = writeln!(
        out,
        "{:<w0$} | {:<w1$} | {}",
        "Error",
        "URL",
        "Source",
        w0 = widths[0],
        w1 = widths[1]
    );
    let _ = writeln!(
        out,
        "{}-+-{}-+-{}",
        "-".repeat(widths[0]),
        "-".repeat(widths[1]),
        "-".repeat(widths[2])
    );
    for [code, url, source] in &rows {
        let _ = writeln!(
            out,
            "{:<w0$} | {:<w1$} | {}",
            code,
            url,
            source,
            w0 = widths[0],
            w1 = widths[1]
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Aggregator, LinkError, WorkItem};
    use std::time::Duration;
    use url::Url;

    fn report(aggregator: &Aggregator) -> CrawlReport {
        CrawlReport {
            snapshot: aggregator.snapshot(),
            broken: aggregator.broken_links(),
            elapsed: Duration::from_millis(1500),
            realtime_rows: None,
            export_errors: Vec::new(),
        }
    }

    #[test]
    fn test_no_broken_links_message() {
        let aggregator = Aggregator::new();
        aggregator.record_discovered();
        aggregator.record_success(200);

        let text = render_summary(&report(&aggregator));
        assert!(text.contains("Pages checked: 1"));
        assert!(text.contains("Elapsed: 1.5s"));
        assert!(text.ends_with("No broken links found.\n"));
        assert!(!text.contains("Errors by code"));
    }

    #[test]
    fn test_broken_link_table() {
        let aggregator = Aggregator::new();
        let root = WorkItem::root(Url::parse("https://ex.com/").unwrap());
        let child = WorkItem::child(Url::parse("https://ex.com/missing").unwrap(), &root);
        aggregator.record_broken(&child, LinkError::HttpStatus(404));
        aggregator.record_broken(&root, LinkError::Network("request timed out".into()));

        let text = render_summary(&report(&aggregator));
        assert!(text.contains("Broken links (2):"));
        assert!(text.contains("  404: 1"));
        assert!(text.contains("  ERROR: 1"));

        let table: Vec<&str> = text
            .lines()
            .skip_while(|line| !line.starts_with("Broken links"))
            .skip(1)
            .collect();
        assert!(table[0].starts_with("Error | URL"));
        assert!(table[2].starts_with("404   | https://ex.com/missing | https://ex.com/"));
        assert!(table[3].starts_with("ERROR | https://ex.com/"));
        assert!(table[3].ends_with("| root"));
        assert!(!text.contains("No broken links found."));
    }
}
