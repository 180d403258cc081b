//! # Error Module
//!
//! Unified error handling for the webbeaver crate.
//!
//! Only [`WebBeaverError`] ever fails a run. Per-file problems are carried as
//! [`FileError`] values and end up as counted skips in the run diagnostics.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::metadata::MetadataError;

/// Central error type for webbeaver operations.
#[derive(Debug, Error)]
pub enum WebBeaverError {
    /// Root path missing or not a directory; raised before any file is touched
    #[error("invalid root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    /// Configuration error
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error recording metadata
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WebBeaverError {
    pub fn invalid_root(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using WebBeaverError
pub type Result<T> = std::result::Result<T, WebBeaverError>;

/// Why a whole database file was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SkipReason {
    FileOpenError,
    UnrecognizedDialect,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FileOpenError => f.write_str("open failure"),
            SkipReason::UnrecognizedDialect => f.write_str("unrecognized dialect"),
        }
    }
}

/// Per-file failure. Never propagated as a run failure.
#[derive(Debug, Error)]
pub enum FileError {
    /// Not a database, permission denied, locked past the busy timeout
    #[error("cannot open database: {0}")]
    Open(#[source] rusqlite::Error),

    /// Readable, but not a schema this extractor knows
    #[error("unrecognized schema: {0}")]
    UnrecognizedDialect(String),
}

impl FileError {
    pub fn reason(&self) -> SkipReason {
        match self {
            FileError::Open(_) => SkipReason::FileOpenError,
            FileError::UnrecognizedDialect(_) => SkipReason::UnrecognizedDialect,
        }
    }
}
