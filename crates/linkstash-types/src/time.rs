use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::LinkError;

/// Milliseconds since the UNIX epoch for the current wall-clock instant.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render an epoch-millisecond timestamp as ISO-8601 with millisecond
/// precision and a `Z` suffix, e.g. `1970-01-01T00:00:01.000Z`.
pub fn iso_from_millis(millis: i64) -> Result<String, LinkError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or(LinkError::TimestampOutOfRange(millis))
}
