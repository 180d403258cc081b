use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::parsers::labels::yes_no;

/// Browser family a record is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BrowserFamily {
    Chrome,
    Edge,
    Brave,
    Opera,
    Firefox,
    Unknown,
}

impl BrowserFamily {
    pub fn label(self) -> &'static str {
        match self {
            BrowserFamily::Chrome => "Chrome",
            BrowserFamily::Edge => "Edge",
            BrowserFamily::Brave => "Brave",
            BrowserFamily::Opera => "Opera",
            BrowserFamily::Firefox => "Firefox",
            BrowserFamily::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for BrowserFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Serialize a path as text, replacing bytes that are not UTF-8. Evidence
/// trees can hold such directory names and one of them must not abort output.
pub fn serialize_path_lossy<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

/// One visit row. Field order is the column order writers rely on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub visit_time: Option<DateTime<Utc>>,
    pub url: String,
    pub title: Option<String>,
    pub visit_count: i64,
    pub visit_type: Option<String>,
    pub duration_seconds: Option<f64>,
    pub browser: BrowserFamily,
    pub user_profile: String,
    #[serde(serialize_with = "serialize_path_lossy")]
    pub source_path: PathBuf,
}

impl HistoryRecord {
    pub const COLUMNS: [&'static str; 9] = [
        "Visit Time",
        "URL",
        "Title",
        "Visit Count",
        "Visit Type",
        "Duration",
        "Browser",
        "User Profile",
        "Source",
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadRecord {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub file_path: String,
    pub total_bytes: i64,
    pub received_bytes: i64,
    pub danger_label: String,
    pub interrupt_label: String,
    pub opened: bool,
    pub browser: BrowserFamily,
    pub user_profile: String,
    #[serde(serialize_with = "serialize_path_lossy")]
    pub source_path: PathBuf,
}

impl DownloadRecord {
    pub const COLUMNS: [&'static str; 11] = [
        "Start Time",
        "End Time",
        "File Path",
        "Total Bytes",
        "Received Bytes",
        "Danger Type",
        "Interrupt Reason",
        "Opened",
        "Browser",
        "User Profile",
        "Source",
    ];

    pub fn opened_label(&self) -> &'static str {
        yes_no(self.opened)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CookieRecord {
    pub host: String,
    pub name: String,
    pub value: String,
    pub creation_time: Option<DateTime<Utc>>,
    pub last_access_time: Option<DateTime<Utc>>,
    pub expiry_time: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
    pub browser: BrowserFamily,
    pub user_profile: String,
    #[serde(serialize_with = "serialize_path_lossy")]
    pub source_path: PathBuf,
}

impl CookieRecord {
    pub const COLUMNS: [&'static str; 11] = [
        "Host",
        "Name",
        "Value",
        "Creation Time",
        "Last Access Time",
        "Expiry Time",
        "Secure",
        "HTTP Only",
        "Browser",
        "User Profile",
        "Source",
    ];

    pub fn secure_label(&self) -> &'static str {
        yes_no(self.secure)
    }

    pub fn http_only_label(&self) -> &'static str {
        yes_no(self.http_only)
    }
}
