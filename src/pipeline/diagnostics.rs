use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{FileError, SkipReason};
use crate::parsers::browser::{serialize_path_lossy, BrowserFamily};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    #[serde(serialize_with = "serialize_path_lossy")]
    pub path: PathBuf,
    pub reason: SkipReason,
    pub detail: String,
}

/// Completeness counters for one artefact category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryDiagnostics {
    /// Files the extractor attempted, skipped ones included
    pub files_scanned: u64,
    pub files_skipped_open: u64,
    pub files_skipped_dialect: u64,
    /// Candidates never attempted because the run was cancelled
    pub files_not_attempted: u64,
    pub files_with_row_errors: u64,
    pub rows_skipped: u64,
    pub records_extracted: u64,
    pub skipped_files: Vec<SkippedFile>,
}

impl CategoryDiagnostics {
    pub fn files_skipped(&self, reason: SkipReason) -> u64 {
        match reason {
            SkipReason::FileOpenError => self.files_skipped_open,
            SkipReason::UnrecognizedDialect => self.files_skipped_dialect,
        }
    }

    pub(crate) fn record_skip(&mut self, path: PathBuf, err: &FileError) {
        let reason = err.reason();
        match reason {
            SkipReason::FileOpenError => self.files_skipped_open += 1,
            SkipReason::UnrecognizedDialect => self.files_skipped_dialect += 1,
        }
        self.skipped_files.push(SkippedFile {
            path,
            reason,
            detail: err.to_string(),
        });
    }
}

/// Run summary a caller must surface alongside the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunDiagnostics {
    pub run_id: String,
    #[serde(serialize_with = "serialize_path_lossy")]
    pub root: PathBuf,
    pub browser: BrowserFamily,
    pub walk_errors: u64,
    pub symlink_cycles: u64,
    pub cancelled: bool,
    pub history: CategoryDiagnostics,
    pub downloads: CategoryDiagnostics,
    pub cookies: CategoryDiagnostics,
}

impl RunDiagnostics {
    pub fn total_records(&self) -> u64 {
        self.history.records_extracted
            + self.downloads.records_extracted
            + self.cookies.records_extracted
    }

    /// Distinct files skipped by any category. A `History` file feeds both
    /// history and downloads, so a bad one is a single skipped file here.
    pub fn total_skipped_files(&self) -> u64 {
        let paths: BTreeSet<&Path> = [&self.history, &self.downloads, &self.cookies]
            .iter()
            .flat_map(|c| c.skipped_files.iter().map(|s| s.path.as_path()))
            .collect();
        paths.len() as u64
    }
}
