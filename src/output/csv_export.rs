//! CSV export of broken links
//!
//! Both export modes share one schema: a `Error,URL,Source` header and one
//! row per broken link. `Error` is the HTTP status code or `ERROR` for
//! network failures; `Source` is the referring page or `root`.

use crate::output::ExportError;
use crate::state::BrokenLink;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::JoinHandle;

pub const CSV_HEADERS: [&str; 3] = ["Error", "URL", "Source"];

/// One CSV row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRow {
    #[serde(rename = "Error")]
    pub error: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Source")]
    pub source: String,
}

impl From<&BrokenLink> for CsvRow {
    fn from(link: &BrokenLink) -> Self {
        Self {
            error: link.error.code_label(),
            url: link.url.to_string(),
            source: link.source_label(),
        }
    }
}

fn csv_writer<W: Write>(inner: W) -> Result<csv::Writer<W>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(inner);
    writer.write_record(CSV_HEADERS)?;
    Ok(writer)
}

/// Writes the header and every record; returns the number of rows written
pub fn write_csv<W: Write>(inner: W, records: &[BrokenLink]) -> Result<usize, ExportError> {
    let mut writer = csv_writer(inner)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;
    Ok(records.len())
}

/// Writes `records` to a new file at `path`, replacing any existing file
pub fn export_csv(path: &Path, records: &[BrokenLink]) -> Result<usize, ExportError> {
    let file = File::create(path)?;
    write_csv(file, records)
}

/// Runs [`export_csv`] on the blocking thread pool
pub async fn export_csv_in_background(
    path: PathBuf,
    records: Vec<BrokenLink>,
) -> Result<usize, ExportError> {
    tokio::task::spawn_blocking(move || export_csv(&path, &records))
        .await
        .map_err(|e| ExportError::Writer(e.to_string()))?
}

/// Reads rows written by this module
pub fn read_csv<R: Read>(inner: R) -> Result<Vec<CsvRow>, ExportError> {
    let mut reader = csv::Reader::from_reader(inner);
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<CsvRow>, csv::Error>>()?;
    Ok(rows)
}

/// Streams broken links to a CSV file as they are found
///
/// A single blocking task owns the file and drains an unbounded channel,
/// so rows are never interleaved and each row is flushed as it arrives.
#[derive(Debug)]
pub struct RealtimeExporter {
    path: PathBuf,
    tx: UnboundedSender<BrokenLink>,
    handle: JoinHandle<Result<usize, ExportError>>,
}

impl RealtimeExporter {
    /// Creates the file, writes the header and starts the writer task
    ///
    /// Opening errors are returned here, before the crawl starts.
    pub fn spawn(path: &Path) -> Result<Self, ExportError> {
        let mut writer = csv_writer(File::create(path)?)?;
        writer.flush()?;

        let (tx, mut rx) = unbounded_channel::<BrokenLink>();
        let display_path = path.display().to_string();

        let handle = tokio::task::spawn_blocking(move || {
            let mut rows = 0;
            while let Some(record) = rx.blocking_recv() {
                let written = writer
                    .serialize(CsvRow::from(&record))
                    .map_err(ExportError::from)
                    .and_then(|_| writer.flush().map_err(ExportError::from));

                if let Err(e) = written {
                    tracing::error!("Realtime export to {} stopped: {}", display_path, e);
                    return Err(e);
                }
                rows += 1;
            }
            Ok(rows)
        });

        Ok(Self {
            path: path.to_path_buf(),
            tx,
            handle,
        })
    }

    /// A sender feeding the writer task
    pub fn sender(&self) -> UnboundedSender<BrokenLink> {
        self.tx.clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Waits for every queued row to be written
    ///
    /// All other senders must be dropped first or this never returns.
    pub async fn finish(self) -> Result<usize, ExportError> {
        drop(self.tx);
        self.handle
            .await
            .map_err(|e| ExportError::Writer(e.to_string()))?
    }
}
