pub mod jsonl;

use std::path::Path;

use thiserror::Error;

use crate::parsers::browser::{CookieRecord, DownloadRecord, HistoryRecord};
use crate::pipeline::{ExtractionRun, RunDiagnostics};

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("other error: {0}")]
    Other(String),
}

/// Output sink for extracted records and the run summary.
///
/// # Example
/// ```rust
/// use webbeaver::metadata::{self, MetadataSink};
/// use std::path::PathBuf;
///
/// let run_output_dir = std::env::temp_dir().join("webbeaver_meta_example");
/// std::fs::create_dir_all(&run_output_dir).unwrap();
///
/// let sink = metadata::build_sink(
///     "0.1.0",
///     "deadbeef",
///     PathBuf::from("/evidence").as_path(),
///     &run_output_dir,
/// )
/// .unwrap();
/// sink.flush().unwrap();
/// ```
pub trait MetadataSink: Send + Sync {
    fn record_history(&self, record: &HistoryRecord) -> Result<(), MetadataError>;
    fn record_download(&self, record: &DownloadRecord) -> Result<(), MetadataError>;
    fn record_cookie(&self, record: &CookieRecord) -> Result<(), MetadataError>;
    fn record_run_summary(&self, summary: &RunDiagnostics) -> Result<(), MetadataError>;
    fn flush(&self) -> Result<(), MetadataError>;
}

pub fn build_sink(
    tool_version: &str,
    config_hash: &str,
    root_path: &Path,
    run_output_dir: &Path,
) -> Result<Box<dyn MetadataSink>, MetadataError> {
    let sink = jsonl::JsonlSink::new(tool_version, config_hash, root_path, run_output_dir)?;
    Ok(Box::new(sink))
}

/// Write every record of `run` followed by its summary, then flush.
pub fn write_run(sink: &dyn MetadataSink, run: &ExtractionRun) -> Result<(), MetadataError> {
    for record in &run.history {
        sink.record_history(record)?;
    }
    for record in &run.downloads {
        sink.record_download(record)?;
    }
    for record in &run.cookies {
        sink.record_cookie(record)?;
    }
    sink.record_run_summary(&run.diagnostics)?;
    sink.flush()
}
