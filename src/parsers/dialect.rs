//! Schema dialect selection from a database's table catalog.

use std::collections::HashSet;
use std::fmt;

use rusqlite::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDialect {
    ChromiumHistory,
    FirefoxHistory,
    ChromiumDownloads,
    ChromiumCookies,
    Unrecognized,
}

impl fmt::Display for SchemaDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaDialect::ChromiumHistory => "chromium_history",
            SchemaDialect::FirefoxHistory => "firefox_history",
            SchemaDialect::ChromiumDownloads => "chromium_downloads",
            SchemaDialect::ChromiumCookies => "chromium_cookies",
            SchemaDialect::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

/// Names of all tables in the database, lowercased.
pub fn table_catalog(conn: &Connection) -> rusqlite::Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut out = HashSet::new();
    for row in rows {
        out.insert(row?.to_ascii_lowercase());
    }
    Ok(out)
}

pub fn history_dialect(tables: &HashSet<String>) -> SchemaDialect {
    if tables.contains("urls") && tables.contains("visits") {
        SchemaDialect::ChromiumHistory
    } else if tables.contains("moz_places") && tables.contains("moz_historyvisits") {
        SchemaDialect::FirefoxHistory
    } else {
        SchemaDialect::Unrecognized
    }
}

pub fn downloads_dialect(tables: &HashSet<String>) -> SchemaDialect {
    if tables.contains("downloads") {
        SchemaDialect::ChromiumDownloads
    } else {
        SchemaDialect::Unrecognized
    }
}

pub fn cookies_dialect(tables: &HashSet<String>) -> SchemaDialect {
    if tables.contains("cookies") {
        SchemaDialect::ChromiumCookies
    } else {
        SchemaDialect::Unrecognized
    }
}
