//! Fixture builders for browser profile trees.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

/// 2022-07-28 00:00:00 UTC in WebKit microseconds.
pub const WEBKIT_2022: i64 = 13_303_449_600_000_000;

/// 2023-11-14 22:13:20 UTC in Firefox microseconds.
pub const FIREFOX_2023: i64 = 1_700_000_000_000_000;

fn create_db(path: &Path) -> Connection {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    Connection::open(path).expect("open fixture db")
}

/// Chromium `History` with 2 urls and 3 visits, plus one download row.
pub fn chromium_history(path: &Path) -> PathBuf {
    let conn = create_db(path);
    conn.execute_batch(
        "CREATE TABLE urls (id INTEGER PRIMARY KEY, url LONGVARCHAR, title LONGVARCHAR, \
         visit_count INTEGER DEFAULT 0 NOT NULL, typed_count INTEGER DEFAULT 0 NOT NULL, \
         last_visit_time INTEGER NOT NULL, hidden INTEGER DEFAULT 0 NOT NULL);
         CREATE TABLE visits (id INTEGER PRIMARY KEY, url INTEGER NOT NULL, visit_time INTEGER NOT NULL, \
         from_visit INTEGER, transition INTEGER DEFAULT 0 NOT NULL, segment_id INTEGER, \
         visit_duration INTEGER DEFAULT 0 NOT NULL);
         CREATE TABLE downloads (id INTEGER PRIMARY KEY, guid VARCHAR NOT NULL, current_path LONGVARCHAR NOT NULL, \
         target_path LONGVARCHAR NOT NULL, start_time INTEGER NOT NULL, received_bytes INTEGER NOT NULL, \
         total_bytes INTEGER NOT NULL, state INTEGER NOT NULL, danger_type INTEGER NOT NULL, \
         interrupt_reason INTEGER NOT NULL, end_time INTEGER NOT NULL, opened INTEGER NOT NULL);",
    )
    .expect("chromium schema");
    conn.execute_batch(&format!(
        "INSERT INTO urls (id, url, title, visit_count, last_visit_time) VALUES \
           (1, 'https://example.com/', 'Example Domain', 2, {t}), \
           (2, 'https://search.test/?q=rust', 'rust - Search', 1, {t});
         INSERT INTO visits (id, url, visit_time, transition, visit_duration) VALUES \
           (1, 1, {t}, 1, 5000000), \
           (2, 1, {t2}, 805306368, 0), \
           (3, 2, {t3}, 0, 1500000);
         INSERT INTO downloads (id, guid, current_path, target_path, start_time, received_bytes, total_bytes, \
           state, danger_type, interrupt_reason, end_time, opened) VALUES \
           (1, 'g1', '/home/a/Downloads/setup.exe', '/home/a/Downloads/setup.exe', {t}, 2048, 4096, \
            2, 7, 99, 0, 1);",
        t = WEBKIT_2022,
        t2 = WEBKIT_2022 + 60_000_000,
        t3 = WEBKIT_2022 + 120_000_000,
    ))
    .expect("chromium rows");
    path.to_path_buf()
}

/// Chromium `Cookies` with two cookies, one without expiry.
pub fn chromium_cookies(path: &Path) -> PathBuf {
    let conn = create_db(path);
    conn.execute_batch(&format!(
        "CREATE TABLE cookies (creation_utc INTEGER NOT NULL, host_key TEXT NOT NULL, name TEXT NOT NULL, \
         value TEXT NOT NULL, path TEXT NOT NULL, expires_utc INTEGER NOT NULL, is_secure INTEGER NOT NULL, \
         is_httponly INTEGER NOT NULL, last_access_utc INTEGER NOT NULL, encrypted_value BLOB DEFAULT '');
         INSERT INTO cookies VALUES ({t}, '.example.com', 'sid', 'abc', '/', {exp}, 1, 1, {t}, x'');
         INSERT INTO cookies VALUES ({t}, 'search.test', 'pref', '', '/', 0, 0, 0, {t}, x'763130');",
        t = WEBKIT_2022,
        exp = WEBKIT_2022 + 86_400_000_000,
    ))
    .expect("cookies");
    path.to_path_buf()
}

/// Firefox `places.sqlite` with one place visited twice.
pub fn firefox_places(path: &Path) -> PathBuf {
    let conn = create_db(path);
    conn.execute_batch(&format!(
        "CREATE TABLE moz_places (id INTEGER PRIMARY KEY, url LONGVARCHAR, title LONGVARCHAR, \
         rev_host LONGVARCHAR, visit_count INTEGER DEFAULT 0, hidden INTEGER DEFAULT 0 NOT NULL, \
         last_visit_date INTEGER);
         CREATE TABLE moz_historyvisits (id INTEGER PRIMARY KEY, from_visit INTEGER, place_id INTEGER, \
         visit_date INTEGER, visit_type INTEGER, session INTEGER);
         INSERT INTO moz_places (id, url, title, visit_count, last_visit_date) VALUES \
           (1, 'https://www.mozilla.org/', 'Mozilla', 2, {t});
         INSERT INTO moz_historyvisits (id, place_id, visit_date, visit_type) VALUES \
           (1, 1, {t}, 1), (2, 1, {t2}, 2);",
        t = FIREFOX_2023,
        t2 = FIREFOX_2023 + 1_000_000,
    ))
    .expect("places");
    path.to_path_buf()
}

/// A file that carries a database name but is not a database.
pub fn corrupt_file(path: &Path) -> PathBuf {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, "this file is not an sqlite database\n".repeat(128)).expect("write");
    path.to_path_buf()
}
