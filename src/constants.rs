//! # Constants Module
//!
//! Centralized constants used throughout the webbeaver crate.

/// Seconds between 1601-01-01 (WebKit epoch) and 1970-01-01 (Unix epoch)
pub const WEBKIT_EPOCH_OFFSET_SECONDS: i64 = 11_644_473_600;

/// Default busy timeout applied to every opened database, in milliseconds
pub const DEFAULT_OPEN_TIMEOUT_MS: u64 = 5_000;

/// Default wall-clock budget for reading one database, in milliseconds
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 120_000;

/// Default user profile identifier stamped onto records
pub const DEFAULT_USER_PROFILE: &str = "default_user";

/// Label used when a numeric code has no known mapping
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Chromium history database file name
pub const CHROMIUM_HISTORY_FILE: &str = "History";

/// Chromium cookie database file name
pub const CHROMIUM_COOKIES_FILE: &str = "Cookies";

/// Firefox history database file name
pub const FIREFOX_PLACES_FILE: &str = "places.sqlite";

/// Default channel capacity multiplier for workers
pub const CHANNEL_CAPACITY_MULTIPLIER: usize = 2;

/// Minimum channel capacity
pub const MIN_CHANNEL_CAPACITY: usize = 1;
