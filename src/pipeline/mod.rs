//! # Pipeline Module
//!
//! Orchestrates a run: scan the root, pick the browser label, then run the
//! history, download and cookie extractors over their candidate files.
//!
//! Files are the unit of isolation. Each one gets its own connection on a
//! worker thread; a failing file becomes a counted skip and results are
//! merged back in discovered-file order so repeated runs are identical.

pub mod cancel;
pub mod diagnostics;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded};
use tracing::{info, warn};

use crate::config::Config;
use crate::constants::{CHANNEL_CAPACITY_MULTIPLIER, MIN_CHANNEL_CAPACITY};
use crate::error::{FileError, Result};
use crate::family::detect_family;
use crate::parsers::browser::{BrowserFamily, CookieRecord, DownloadRecord, HistoryRecord};
use crate::parsers::sqlite_db::{
    cookies_from_file,
    downloads_from_file,
    history_from_file,
    FileExtraction,
    RecordContext,
};
use crate::scanner::{scan, ArtefactCategory, ScanOptions};

pub use cancel::CancellationToken;
pub use diagnostics::{CategoryDiagnostics, RunDiagnostics, SkippedFile};

/// Per-category extraction settings.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub workers: usize,
    pub open_timeout: Duration,
    /// Budget for the statements run against one file; `None` is unbounded
    pub query_timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            open_timeout: Duration::from_millis(crate::constants::DEFAULT_OPEN_TIMEOUT_MS),
            query_timeout: Some(Duration::from_millis(crate::constants::DEFAULT_QUERY_TIMEOUT_MS)),
            cancel: CancellationToken::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub run_id: String,
    pub user_profile: String,
    pub scan: ScanOptions,
    pub extract: ExtractOptions,
}

impl RunOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            run_id: cfg.run_id.clone(),
            user_profile: cfg.user_profile.clone(),
            scan: cfg.scan_options(),
            extract: ExtractOptions {
                workers: cfg.effective_workers(),
                open_timeout: cfg.open_timeout(),
                query_timeout: cfg.query_timeout(),
                cancel: CancellationToken::new(),
            },
        }
    }
}

/// Ordered records of one category plus how complete they are.
#[derive(Debug)]
pub struct CategoryOutput<T> {
    pub records: Vec<T>,
    pub diagnostics: CategoryDiagnostics,
}

#[derive(Debug)]
pub struct ExtractionRun {
    pub history: Vec<HistoryRecord>,
    pub downloads: Vec<DownloadRecord>,
    pub cookies: Vec<CookieRecord>,
    pub diagnostics: RunDiagnostics,
}

/// Scan `root` and extract every category. Only an invalid root fails the run.
pub fn run_extraction(root: &Path, opts: &RunOptions) -> Result<ExtractionRun> {
    let files = scan(root, &opts.scan)?;
    let browser = detect_family(files.history.iter().chain(files.cookies.iter()));
    info!(
        "starting extraction run_id={} root={} browser={} workers={}",
        opts.run_id,
        root.display(),
        browser,
        opts.extract.workers
    );

    let history = extract_history(browser, &files.history, &opts.user_profile, &opts.extract);
    let downloads =
        extract_downloads(browser, &files.downloads, &opts.user_profile, &opts.extract);
    let cookies = extract_cookies(browser, &files.cookies, &opts.user_profile, &opts.extract);

    let diagnostics = RunDiagnostics {
        run_id: opts.run_id.clone(),
        root: root.to_path_buf(),
        browser,
        walk_errors: files.walk_errors,
        symlink_cycles: files.symlink_cycles,
        cancelled: history.diagnostics.files_not_attempted > 0
            || downloads.diagnostics.files_not_attempted > 0
            || cookies.diagnostics.files_not_attempted > 0,
        history: history.diagnostics,
        downloads: downloads.diagnostics,
        cookies: cookies.diagnostics,
    };

    info!(
        "run_summary run_id={} records={} skipped_files={} history={} downloads={} cookies={} cancelled={}",
        diagnostics.run_id,
        diagnostics.total_records(),
        diagnostics.total_skipped_files(),
        history.records.len(),
        downloads.records.len(),
        cookies.records.len(),
        diagnostics.cancelled
    );

    Ok(ExtractionRun {
        history: history.records,
        downloads: downloads.records,
        cookies: cookies.records,
        diagnostics,
    })
}

pub fn extract_history(
    browser: BrowserFamily,
    files: &[PathBuf],
    user_profile: &str,
    opts: &ExtractOptions,
) -> CategoryOutput<HistoryRecord> {
    let ctx = record_context(browser, user_profile, opts);
    run_category(ArtefactCategory::History, files, opts, |path| {
        history_from_file(path, &ctx)
    })
}

pub fn extract_downloads(
    browser: BrowserFamily,
    files: &[PathBuf],
    user_profile: &str,
    opts: &ExtractOptions,
) -> CategoryOutput<DownloadRecord> {
    let ctx = record_context(browser, user_profile, opts);
    run_category(ArtefactCategory::Downloads, files, opts, |path| {
        downloads_from_file(path, &ctx)
    })
}

pub fn extract_cookies(
    browser: BrowserFamily,
    files: &[PathBuf],
    user_profile: &str,
    opts: &ExtractOptions,
) -> CategoryOutput<CookieRecord> {
    let ctx = record_context(browser, user_profile, opts);
    run_category(ArtefactCategory::Cookies, files, opts, |path| {
        cookies_from_file(path, &ctx)
    })
}

fn record_context<'a>(
    browser: BrowserFamily,
    user_profile: &'a str,
    opts: &ExtractOptions,
) -> RecordContext<'a> {
    RecordContext {
        browser,
        user_profile,
        open_timeout: opts.open_timeout,
        query_timeout: opts.query_timeout,
    }
}

type FileOutcome<T> = std::result::Result<FileExtraction<T>, FileError>;

/// Fan `files` out to a bounded worker pool and merge the outcomes back in
/// input order. Cancellation is honoured between files, never mid-file.
fn run_category<T, F>(
    category: ArtefactCategory,
    files: &[PathBuf],
    opts: &ExtractOptions,
    extract: F,
) -> CategoryOutput<T>
where
    T: Send,
    F: Fn(&Path) -> FileOutcome<T> + Sync,
{
    let mut slots: Vec<Option<FileOutcome<T>>> = files.iter().map(|_| None).collect();

    if !files.is_empty() {
        let workers = opts.workers.clamp(1, files.len());
        let channel_cap = workers
            .saturating_mul(CHANNEL_CAPACITY_MULTIPLIER)
            .max(MIN_CHANNEL_CAPACITY);
        let (job_tx, job_rx) = bounded::<usize>(channel_cap);
        let (out_tx, out_rx) = unbounded::<(usize, FileOutcome<T>)>();
        let extract = &extract;
        let cancel = &opts.cancel;

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let out_tx = out_tx.clone();
                scope.spawn(move || {
                    for index in job_rx.iter() {
                        if cancel.is_cancelled() {
                            continue;
                        }
                        if out_tx.send((index, extract(&files[index]))).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(job_rx);
            drop(out_tx);

            for index in 0..files.len() {
                if cancel.is_cancelled() || job_tx.send(index).is_err() {
                    break;
                }
            }
            drop(job_tx);

            for (index, outcome) in out_rx.iter() {
                slots[index] = Some(outcome);
            }
        });
    }

    merge_outcomes(category, files, slots)
}

fn merge_outcomes<T>(
    category: ArtefactCategory,
    files: &[PathBuf],
    slots: Vec<Option<FileOutcome<T>>>,
) -> CategoryOutput<T> {
    let mut records = Vec::new();
    let mut diagnostics = CategoryDiagnostics::default();

    for (path, slot) in files.iter().zip(slots) {
        let Some(outcome) = slot else {
            diagnostics.files_not_attempted += 1;
            continue;
        };
        diagnostics.files_scanned += 1;
        match outcome {
            Ok(extraction) => {
                if extraction.row_errors > 0 {
                    diagnostics.files_with_row_errors += 1;
                    diagnostics.rows_skipped += extraction.row_errors;
                    warn!(
                        "rows skipped category={:?} path={} dialect={} rows={}",
                        category,
                        path.display(),
                        extraction.dialect,
                        extraction.row_errors
                    );
                }
                diagnostics.records_extracted += extraction.records.len() as u64;
                records.extend(extraction.records);
            }
            Err(err) => {
                warn!(
                    "file skipped category={:?} path={} reason={} err={}",
                    category,
                    path.display(),
                    err.reason(),
                    err
                );
                diagnostics.record_skip(path.clone(), &err);
            }
        }
    }

    if diagnostics.files_not_attempted > 0 {
        info!(
            "category cancelled category={:?} not_attempted={}",
            category, diagnostics.files_not_attempted
        );
    }

    CategoryOutput {
        records,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkipReason;
    use crate::parsers::dialect::SchemaDialect;

    fn fake_files(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("/evidence/{i}/History"))).collect()
    }

    fn index_of(path: &Path) -> usize {
        path.parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .and_then(|n| n.parse().ok())
            .expect("index")
    }

    #[test]
    fn merges_in_discovered_order_with_many_workers() {
        let files = fake_files(40);
        let opts = ExtractOptions {
            workers: 8,
            ..ExtractOptions::default()
        };
        let out = run_category(ArtefactCategory::History, &files, &opts, |path| {
            let i = index_of(path);
            if i % 3 == 0 {
                std::thread::sleep(Duration::from_millis(2));
            }
            Ok(FileExtraction {
                dialect: SchemaDialect::ChromiumHistory,
                records: vec![i, i],
                row_errors: 0,
            })
        });
        let expected: Vec<usize> = (0..40).flat_map(|i| [i, i]).collect();
        assert_eq!(out.records, expected);
        assert_eq!(out.diagnostics.files_scanned, 40);
        assert_eq!(out.diagnostics.records_extracted, 80);
    }

    #[test]
    fn failures_are_isolated_and_counted() {
        let files = fake_files(4);
        let out = run_category(ArtefactCategory::Cookies, &files, &ExtractOptions::default(), |path| {
            match index_of(path) {
                1 => Err(FileError::Open(rusqlite::Error::InvalidQuery)),
                2 => Err(FileError::UnrecognizedDialect("tables=[]".into())),
                i => Ok(FileExtraction {
                    dialect: SchemaDialect::ChromiumCookies,
                    records: vec![i],
                    row_errors: if i == 3 { 2 } else { 0 },
                }),
            }
        });
        assert_eq!(out.records, vec![0, 3]);
        let diag = &out.diagnostics;
        assert_eq!(diag.files_scanned, 4);
        assert_eq!(diag.files_skipped(SkipReason::FileOpenError), 1);
        assert_eq!(diag.files_skipped(SkipReason::UnrecognizedDialect), 1);
        assert_eq!(diag.files_with_row_errors, 1);
        assert_eq!(diag.rows_skipped, 2);
        assert_eq!(diag.skipped_files[0].path, files[1]);
    }

    #[test]
    fn cancelled_token_attempts_nothing() {
        let files = fake_files(5);
        let opts = ExtractOptions::default();
        opts.cancel.cancel();
        let out = run_category(ArtefactCategory::History, &files, &opts, |_| -> FileOutcome<u8> {
            panic!("no file should be attempted after cancellation")
        });
        assert!(out.records.is_empty());
        assert_eq!(out.diagnostics.files_scanned, 0);
        assert_eq!(out.diagnostics.files_not_attempted, 5);
    }

    #[test]
    fn cancellation_stops_at_file_boundary() {
        let files = fake_files(6);
        let opts = ExtractOptions::default();
        let cancel = opts.cancel.clone();
        let out = run_category(ArtefactCategory::History, &files, &opts, |path| {
            let i = index_of(path);
            if i == 1 {
                cancel.cancel();
            }
            Ok(FileExtraction {
                dialect: SchemaDialect::ChromiumHistory,
                records: vec![i],
                row_errors: 0,
            })
        });
        // the file that raised the signal still completes
        assert_eq!(out.records, vec![0, 1]);
        assert_eq!(out.diagnostics.files_scanned, 2);
        assert_eq!(out.diagnostics.files_not_attempted, 4);
    }

    #[test]
    fn empty_category_is_empty() {
        let out = extract_cookies(
            BrowserFamily::Unknown,
            &[],
            "default_user",
            &ExtractOptions::default(),
        );
        assert!(out.records.is_empty());
        assert_eq!(out.diagnostics, CategoryDiagnostics::default());
    }
}
