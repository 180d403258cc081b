use chrono::{DateTime, Utc};

use crate::constants::WEBKIT_EPOCH_OFFSET_SECONDS;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Convert a Chromium (WebKit) timestamp, microseconds since 1601-01-01 UTC.
///
/// Zero and negative values encode "never" in Chromium schemas and map to
/// `None`, as does anything outside chrono's calendar range.
pub fn webkit_time_to_utc(microseconds: i64) -> Option<DateTime<Utc>> {
    if microseconds <= 0 {
        return None;
    }
    let secs = microseconds.div_euclid(MICROS_PER_SECOND) - WEBKIT_EPOCH_OFFSET_SECONDS;
    let nsecs = (microseconds.rem_euclid(MICROS_PER_SECOND) as u32) * 1000;
    DateTime::<Utc>::from_timestamp(secs, nsecs)
}

/// Convert a Firefox (PRTime) timestamp, microseconds since 1970-01-01 UTC.
pub fn firefox_time_to_utc(microseconds: i64) -> Option<DateTime<Utc>> {
    if microseconds <= 0 {
        return None;
    }
    let secs = microseconds.div_euclid(MICROS_PER_SECOND);
    let nsecs = (microseconds.rem_euclid(MICROS_PER_SECOND) as u32) * 1000;
    DateTime::<Utc>::from_timestamp(secs, nsecs)
}
