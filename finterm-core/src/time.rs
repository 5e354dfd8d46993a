//! Timestamp parsing and relative time labels

use chrono::{DateTime, FixedOffset, Utc};

/// Label used when a publication date is missing or unparsable
pub const UNKNOWN_TIME: &str = "未知時間";

/// Readers are in Taiwan (UTC+8, no daylight saving), so dates are shown there
const DISPLAY_UTC_OFFSET_SECS: i32 = 8 * 60 * 60;

/// Parse a feed timestamp (RFC 3339 or RFC 2822)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Human label for how long ago `published_at` was, relative to `now`
///
/// Under an hour is `剛剛`, under a day is `N小時前`, anything older is
/// shown as a `YYYY/M/D` date in the readers' zone.
pub fn relative_time_label(published_at: &str, now: DateTime<Utc>) -> String {
    let Some(published) = parse_timestamp(published_at) else {
        return UNKNOWN_TIME.to_string();
    };

    let hours = (now - published).num_hours();
    if hours < 1 {
        "剛剛".to_string()
    } else if hours < 24 {
        format!("{}小時前", hours)
    } else {
        match FixedOffset::east_opt(DISPLAY_UTC_OFFSET_SECS) {
            Some(zone) => published.with_timezone(&zone).format("%Y/%-m/%-d").to_string(),
            None => published.format("%Y/%-m/%-d").to_string(),
        }
    }
}
