//! Publish time formats found upstream

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::release::error::FetchError;

/// `2024-10-01T12:34:56Z`
pub fn parse_rfc3339(text: &str) -> Result<DateTime<FixedOffset>, FetchError> {
    DateTime::parse_from_rfc3339(text.trim())
        .map_err(|e| FetchError::Parse(format!("Invalid timestamp {text:?}: {e}")))
}

/// `2024-10-01`, interpreted as midnight UTC
pub fn parse_date(text: &str) -> Result<DateTime<FixedOffset>, FetchError> {
    let date = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| FetchError::Parse(format!("Invalid date {text:?}: {e}")))?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc().fixed_offset())
}

/// HTTP-date as used in `Last-Modified`: `Tue, 01 Oct 2024 10:00:00 GMT`
pub fn parse_http_date(text: &str) -> Result<DateTime<FixedOffset>, FetchError> {
    DateTime::parse_from_rfc2822(text.trim())
        .map_err(|e| FetchError::Parse(format!("Invalid HTTP date {text:?}: {e}")))
}

/// Apache directory listing column: `2024-10-01 12:34`, in UTC
pub fn parse_listing(text: &str) -> Result<DateTime<FixedOffset>, FetchError> {
    NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M")
        .map(|dt| dt.and_utc().fixed_offset())
        .map_err(|e| FetchError::Parse(format!("Invalid listing time {text:?}: {e}")))
}

/// Formats a timestamp as the version text of date-versioned builds
pub fn format_build_date(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.with_timezone(&Utc).format("%Y-%m-%d %H:%M").to_string()
}
