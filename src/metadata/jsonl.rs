use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::metadata::{MetadataError, MetadataSink};
use crate::parsers::browser::{CookieRecord, DownloadRecord, HistoryRecord};
use crate::pipeline::RunDiagnostics;

pub struct JsonlSink {
    tool_version: String,
    config_hash: String,
    root_path: String,
    history_writer: Mutex<BufWriter<File>>,
    downloads_writer: Mutex<BufWriter<File>>,
    cookies_writer: Mutex<BufWriter<File>>,
    run_writer: Mutex<BufWriter<File>>,
}

/// Every line carries the provenance of the run that produced it.
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    #[serde(flatten)]
    record: &'a T,
    tool_version: &'a str,
    config_hash: &'a str,
    root_path: &'a str,
}

impl JsonlSink {
    pub fn new(
        tool_version: &str,
        config_hash: &str,
        root_path: &Path,
        run_output_dir: &Path,
    ) -> Result<Self, MetadataError> {
        let meta_dir = run_output_dir.join("metadata");
        std::fs::create_dir_all(&meta_dir)?;
        let open = |name: &str| -> Result<Mutex<BufWriter<File>>, MetadataError> {
            let file = File::create(meta_dir.join(name))?;
            Ok(Mutex::new(BufWriter::new(file)))
        };
        Ok(Self {
            tool_version: tool_version.to_string(),
            config_hash: config_hash.to_string(),
            root_path: root_path.to_string_lossy().to_string(),
            history_writer: open("history.jsonl")?,
            downloads_writer: open("downloads.jsonl")?,
            cookies_writer: open("cookies.jsonl")?,
            run_writer: open("run_summary.jsonl")?,
        })
    }

    fn write_line<T: Serialize>(
        &self,
        writer: &Mutex<BufWriter<File>>,
        name: &str,
        record: &T,
    ) -> Result<(), MetadataError> {
        let envelope = Envelope {
            record,
            tool_version: &self.tool_version,
            config_hash: &self.config_hash,
            root_path: &self.root_path,
        };
        let mut guard = writer
            .lock()
            .map_err(|_| MetadataError::Other(format!("{name} writer lock poisoned")))?;
        serde_json::to_writer(&mut *guard, &envelope)?;
        guard.write_all(b"\n")?;
        Ok(())
    }
}

impl MetadataSink for JsonlSink {
    fn record_history(&self, record: &HistoryRecord) -> Result<(), MetadataError> {
        self.write_line(&self.history_writer, "history", record)
    }

    fn record_download(&self, record: &DownloadRecord) -> Result<(), MetadataError> {
        self.write_line(&self.downloads_writer, "downloads", record)
    }

    fn record_cookie(&self, record: &CookieRecord) -> Result<(), MetadataError> {
        self.write_line(&self.cookies_writer, "cookies", record)
    }

    fn record_run_summary(&self, summary: &RunDiagnostics) -> Result<(), MetadataError> {
        self.write_line(&self.run_writer, "run", summary)
    }

    fn flush(&self) -> Result<(), MetadataError> {
        for (name, writer) in [
            ("history", &self.history_writer),
            ("downloads", &self.downloads_writer),
            ("cookies", &self.cookies_writer),
            ("run", &self.run_writer),
        ] {
            let mut guard = writer
                .lock()
                .map_err(|_| MetadataError::Other(format!("{name} writer lock poisoned")))?;
            guard.flush()?;
        }
        Ok(())
    }
}
