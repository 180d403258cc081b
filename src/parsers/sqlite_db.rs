use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

use rusqlite::{Connection, ErrorCode, OpenFlags, Row};
use tracing::{debug, warn};

use crate::constants::UNKNOWN_LABEL;
use crate::error::FileError;
use crate::parsers::browser::{BrowserFamily, CookieRecord, DownloadRecord, HistoryRecord};
use crate::parsers::dialect::{
    cookies_dialect,
    downloads_dialect,
    history_dialect,
    table_catalog,
    SchemaDialect,
};
use crate::parsers::labels::{danger_label, interrupt_label, transition_label};
use crate::parsers::time::{firefox_time_to_utc, webkit_time_to_utc};

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// VM instructions between query budget checks.
const PROGRESS_HANDLER_OPS: i32 = 1_000;

/// Attribution stamped onto every record produced from one file.
#[derive(Debug, Clone, Copy)]
pub struct RecordContext<'a> {
    pub browser: BrowserFamily,
    pub user_profile: &'a str,
    pub open_timeout: Duration,
    /// Wall-clock budget for all statements on one file; `None` is unbounded
    pub query_timeout: Option<Duration>,
}

/// Records mapped from a single database plus the rows that could not be.
#[derive(Debug)]
pub struct FileExtraction<T> {
    pub dialect: SchemaDialect,
    pub records: Vec<T>,
    pub row_errors: u64,
}

pub fn history_from_file(
    path: &Path,
    ctx: &RecordContext<'_>,
) -> Result<FileExtraction<HistoryRecord>, FileError> {
    with_database(path, ctx, |conn, tables| {
        match history_dialect(tables) {
            SchemaDialect::ChromiumHistory => chromium_history(conn, path, ctx),
            SchemaDialect::FirefoxHistory => firefox_history(conn, path, ctx),
            _ => Err(unrecognized(tables)),
        }
    })
}

pub fn downloads_from_file(
    path: &Path,
    ctx: &RecordContext<'_>,
) -> Result<FileExtraction<DownloadRecord>, FileError> {
    with_database(path, ctx, |conn, tables| {
        match downloads_dialect(tables) {
            SchemaDialect::ChromiumDownloads => chromium_downloads(conn, path, ctx),
            _ => Err(unrecognized(tables)),
        }
    })
}

pub fn cookies_from_file(
    path: &Path,
    ctx: &RecordContext<'_>,
) -> Result<FileExtraction<CookieRecord>, FileError> {
    with_database(path, ctx, |conn, tables| {
        match cookies_dialect(tables) {
            SchemaDialect::ChromiumCookies => chromium_cookies(conn, path, ctx),
            _ => Err(unrecognized(tables)),
        }
    })
}

/// Open read-only, arm the busy timeout and query budget, read the table
/// catalog, run `f`, then close the handle whatever `f` returned.
fn with_database<T>(
    path: &Path,
    ctx: &RecordContext<'_>,
    f: impl FnOnce(&Connection, &HashSet<String>) -> Result<T, FileError>,
) -> Result<T, FileError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(FileError::Open)?;

    if let Some(budget) = ctx.query_timeout {
        let deadline = Instant::now().checked_add(budget);
        conn.progress_handler(
            PROGRESS_HANDLER_OPS,
            Some(move || deadline.is_some_and(|deadline| Instant::now() >= deadline)),
        );
    }

    let result = conn
        .busy_timeout(ctx.open_timeout)
        .and_then(|_| table_catalog(&conn))
        .map_err(FileError::Open)
        .and_then(|tables| f(&conn, &tables));

    if let Err((_, err)) = conn.close() {
        warn!("close failed path={} err={}", path.display(), err);
    }
    result
}

/// Storage-level failures make the whole file unreadable; anything else a
/// statement trips over is a schema the query does not fit.
fn is_storage_failure(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => matches!(
            failure.code,
            ErrorCode::DatabaseCorrupt
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::OperationInterrupted
                | ErrorCode::SystemIoFailure
                | ErrorCode::CannotOpen
                | ErrorCode::PermissionDenied
                | ErrorCode::OutOfMemory
        ),
        _ => false,
    }
}

fn statement_error(dialect: SchemaDialect, err: rusqlite::Error) -> FileError {
    if is_storage_failure(&err) {
        FileError::Open(err)
    } else {
        FileError::UnrecognizedDialect(format!("{dialect} query rejected: {err}"))
    }
}

fn unrecognized(tables: &HashSet<String>) -> FileError {
    let mut names: Vec<&str> = tables.iter().map(String::as_str).collect();
    names.sort_unstable();
    FileError::UnrecognizedDialect(format!("tables=[{}]", names.join(", ")))
}

fn table_columns(conn: &Connection, table: &str) -> Result<HashSet<String>, FileError> {
    let read = || -> rusqlite::Result<HashSet<String>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
        let mut out = HashSet::new();
        for row in rows {
            out.insert(row?.to_ascii_lowercase());
        }
        Ok(out)
    };
    read().map_err(FileError::Open)
}

fn pick_col<'a>(columns: &HashSet<String>, candidates: &'a [&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .find(|candidate| columns.contains(&candidate.to_ascii_lowercase()))
}

/// `table.column` for the first present candidate, `NULL` when none is.
fn optional_col(table: &str, columns: &HashSet<String>, candidates: &[&str]) -> String {
    match pick_col(columns, candidates) {
        Some(col) => format!("{table}.{col}"),
        None => "NULL".to_string(),
    }
}

fn required_col(
    table: &str,
    columns: &HashSet<String>,
    candidates: &[&str],
) -> Result<String, FileError> {
    pick_col(columns, candidates)
        .map(|col| format!("{table}.{col}"))
        .ok_or_else(|| {
            FileError::UnrecognizedDialect(format!(
                "table {table} lacks column {}",
                candidates.join("|")
            ))
        })
}

/// Prepare `query` and map every row with `map_row`. A row whose values do
/// not convert is counted and skipped. A failure while stepping the cursor
/// fails the whole file, since the rows after it are unreachable.
fn collect_rows<T>(
    conn: &Connection,
    path: &Path,
    dialect: SchemaDialect,
    query: &str,
    mut map_row: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<FileExtraction<T>, FileError> {
    let mut stmt = conn
        .prepare(query)
        .map_err(|err| statement_error(dialect, err))?;
    let mut rows = stmt.query([]).map_err(|err| statement_error(dialect, err))?;

    let mut records = Vec::new();
    let mut row_errors = 0u64;
    loop {
        let row = match rows.next() {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(err) => {
                warn!(
                    "cursor failed path={} dialect={} rows_read={} err={}",
                    path.display(),
                    dialect,
                    records.len() as u64 + row_errors,
                    err
                );
                return Err(FileError::Open(err));
            }
        };
        match map_row(row) {
            Ok(record) => records.push(record),
            Err(err) => {
                row_errors += 1;
                debug!(
                    "row skipped path={} dialect={} err={}",
                    path.display(),
                    dialect,
                    err
                );
            }
        }
    }

    Ok(FileExtraction {
        dialect,
        records,
        row_errors,
    })
}

fn chromium_history(
    conn: &Connection,
    path: &Path,
    ctx: &RecordContext<'_>,
) -> Result<FileExtraction<HistoryRecord>, FileError> {
    let url_columns = table_columns(conn, "urls")?;
    let visit_columns = table_columns(conn, "visits")?;
    let url = required_col("urls", &url_columns, &["url"])?;
    let title = optional_col("urls", &url_columns, &["title"]);
    let visit_count = optional_col("urls", &url_columns, &["visit_count"]);
    let visit_time = required_col("visits", &visit_columns, &["visit_time"])?;
    let duration = optional_col("visits", &visit_columns, &["visit_duration"]);
    let transition = optional_col("visits", &visit_columns, &["transition"]);

    let query = format!(
        "SELECT {url}, {title}, {visit_count}, {visit_time}, {duration}, {transition} \
         FROM urls JOIN visits ON urls.id = visits.url ORDER BY visits.rowid"
    );
    collect_rows(conn, path, SchemaDialect::ChromiumHistory, &query, |row| {
        let url: String = row.get(0)?;
        let title: Option<String> = row.get(1)?;
        let visit_count: Option<i64> = row.get(2)?;
        let visit_time: Option<i64> = row.get(3)?;
        let duration: Option<i64> = row.get(4)?;
        let transition: Option<i64> = row.get(5)?;
        let duration_seconds = duration.unwrap_or(0) as f64 / MICROS_PER_SECOND;
        Ok(HistoryRecord {
            visit_time: visit_time.and_then(webkit_time_to_utc),
            url,
            title,
            visit_count: visit_count.unwrap_or(0),
            visit_type: Some(transition.map_or(UNKNOWN_LABEL, transition_label).to_string()),
            duration_seconds: Some(duration_seconds),
            browser: ctx.browser,
            user_profile: ctx.user_profile.to_string(),
            source_path: path.to_path_buf(),
        })
    })
}

fn firefox_history(
    conn: &Connection,
    path: &Path,
    ctx: &RecordContext<'_>,
) -> Result<FileExtraction<HistoryRecord>, FileError> {
    let place_columns = table_columns(conn, "moz_places")?;
    let visit_columns = table_columns(conn, "moz_historyvisits")?;
    let url = required_col("moz_places", &place_columns, &["url"])?;
    let title = optional_col("moz_places", &place_columns, &["title"]);
    let visit_count = optional_col("moz_places", &place_columns, &["visit_count"]);
    let visit_date = required_col("moz_historyvisits", &visit_columns, &["visit_date"])?;

    let query = format!(
        "SELECT {url}, {title}, {visit_count}, {visit_date} \
         FROM moz_places JOIN moz_historyvisits ON moz_places.id = moz_historyvisits.place_id \
         ORDER BY moz_historyvisits.rowid"
    );
    collect_rows(conn, path, SchemaDialect::FirefoxHistory, &query, |row| {
        let url: String = row.get(0)?;
        let title: Option<String> = row.get(1)?;
        let visit_count: Option<i64> = row.get(2)?;
        let visit_date: Option<i64> = row.get(3)?;
        Ok(HistoryRecord {
            visit_time: visit_date.and_then(firefox_time_to_utc),
            url,
            title,
            visit_count: visit_count.unwrap_or(0),
            visit_type: None,
            duration_seconds: None,
            browser: ctx.browser,
            user_profile: ctx.user_profile.to_string(),
            source_path: path.to_path_buf(),
        })
    })
}

fn chromium_downloads(
    conn: &Connection,
    path: &Path,
    ctx: &RecordContext<'_>,
) -> Result<FileExtraction<DownloadRecord>, FileError> {
    let columns = table_columns(conn, "downloads")?;
    let target = required_col("downloads", &columns, &["target_path", "current_path"])?;
    let start = optional_col("downloads", &columns, &["start_time"]);
    let total = optional_col("downloads", &columns, &["total_bytes"]);
    let received = optional_col("downloads", &columns, &["received_bytes"]);
    let danger = optional_col("downloads", &columns, &["danger_type"]);
    let interrupt = optional_col("downloads", &columns, &["interrupt_reason"]);
    let end = optional_col("downloads", &columns, &["end_time"]);
    let opened = optional_col("downloads", &columns, &["opened"]);

    let query = format!(
        "SELECT {target}, {start}, {total}, {received}, {danger}, {interrupt}, {end}, {opened} \
         FROM downloads ORDER BY downloads.rowid"
    );
    collect_rows(conn, path, SchemaDialect::ChromiumDownloads, &query, |row| {
        let file_path: String = row.get(0)?;
        let start_time: Option<i64> = row.get(1)?;
        let total_bytes: Option<i64> = row.get(2)?;
        let received_bytes: Option<i64> = row.get(3)?;
        let danger_type: Option<i64> = row.get(4)?;
        let interrupt_reason: Option<i64> = row.get(5)?;
        let end_time: Option<i64> = row.get(6)?;
        let opened: Option<i64> = row.get(7)?;
        Ok(DownloadRecord {
            start_time: start_time.and_then(webkit_time_to_utc),
            end_time: end_time.and_then(webkit_time_to_utc),
            file_path,
            total_bytes: total_bytes.unwrap_or(0),
            received_bytes: received_bytes.unwrap_or(0),
            danger_label: danger_type.map_or(UNKNOWN_LABEL, danger_label).to_string(),
            interrupt_label: interrupt_reason.map_or(UNKNOWN_LABEL, interrupt_label).to_string(),
            opened: opened == Some(1),
            browser: ctx.browser,
            user_profile: ctx.user_profile.to_string(),
            source_path: path.to_path_buf(),
        })
    })
}

fn chromium_cookies(
    conn: &Connection,
    path: &Path,
    ctx: &RecordContext<'_>,
) -> Result<FileExtraction<CookieRecord>, FileError> {
    let columns = table_columns(conn, "cookies")?;
    let host = required_col("cookies", &columns, &["host_key", "host"])?;
    let name = required_col("cookies", &columns, &["name"])?;
    let value = optional_col("cookies", &columns, &["value"]);
    let creation = optional_col("cookies", &columns, &["creation_utc"]);
    let last_access = optional_col("cookies", &columns, &["last_access_utc"]);
    let expires = optional_col("cookies", &columns, &["expires_utc"]);
    let secure = optional_col("cookies", &columns, &["is_secure", "secure"]);
    let http_only = optional_col("cookies", &columns, &["is_httponly", "httponly"]);

    let query = format!(
        "SELECT {host}, {name}, {value}, {creation}, {last_access}, {expires}, {secure}, {http_only} \
         FROM cookies ORDER BY cookies.rowid"
    );
    collect_rows(conn, path, SchemaDialect::ChromiumCookies, &query, |row| {
        let host: String = row.get(0)?;
        let name: String = row.get(1)?;
        let value: Option<String> = row.get(2)?;
        let creation_utc: Option<i64> = row.get(3)?;
        let last_access_utc: Option<i64> = row.get(4)?;
        let expires_utc: Option<i64> = row.get(5)?;
        let is_secure: Option<i64> = row.get(6)?;
        let is_http_only: Option<i64> = row.get(7)?;
        Ok(CookieRecord {
            host,
            name,
            value: value.unwrap_or_default(),
            creation_time: creation_utc.and_then(webkit_time_to_utc),
            last_access_time: last_access_utc.and_then(webkit_time_to_utc),
            expiry_time: expires_utc.and_then(webkit_time_to_utc),
            secure: is_secure.is_some_and(|v| v != 0),
            http_only: is_http_only.is_some_and(|v| v != 0),
            browser: ctx.browser,
            user_profile: ctx.user_profile.to_string(),
            source_path: path.to_path_buf(),
        })
    })
}
