//! Calendar and timestamp helpers
//!
//! Every timestamp in this crate is epoch milliseconds in UTC.

use crate::error::{Result, TrendError};
use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a date string into a UTC instant.
///
/// Calendar dates (`2024-01-15`) resolve to the start of that day in UTC.
/// RFC 3339 date-times keep their instant, and naive date-times
/// (`2024-01-15T07:30:00`) are read as UTC.
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let naive = NaiveDateTime::new(date, chrono::NaiveTime::default());
        return Ok(Utc.from_utc_datetime(&naive));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(TrendError::ParseError(format!(
        "Unrecognized date '{}', expected YYYY-MM-DD",
        input
    )))
}

/// Parse a date string straight to epoch milliseconds
pub fn parse_timestamp(input: &str) -> Result<i64> {
    Ok(parse_date(input)?.timestamp_millis())
}

/// Convert epoch milliseconds back to a UTC instant
pub fn to_datetime(timestamp: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(timestamp).single().ok_or_else(|| {
        TrendError::InvalidParameter(format!("Timestamp {} is out of range", timestamp))
    })
}

/// Format a timestamp as a `YYYY-MM-DD` label
pub fn format_date(timestamp: i64) -> Result<String> {
    Ok(to_datetime(timestamp)?.format("%Y-%m-%d").to_string())
}

/// Advance a timestamp by whole calendar months.
///
/// The day of month is clamped to the end of shorter months, so January 31st
/// plus one month is the last day of February. Time of day is preserved.
pub fn add_months(timestamp: i64, months: u32) -> Result<i64> {
    to_datetime(timestamp)?
        .checked_add_months(Months::new(months))
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| {
            TrendError::InvalidParameter(format!(
                "Adding {} months to {} overflows the calendar",
                months, timestamp
            ))
        })
}

/// Move a timestamp back by whole calendar months, clamping like [`add_months`]
pub fn sub_months(timestamp: i64, months: u32) -> Result<i64> {
    to_datetime(timestamp)?
        .checked_sub_months(Months::new(months))
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| {
            TrendError::InvalidParameter(format!(
                "Subtracting {} months from {} overflows the calendar",
                months, timestamp
            ))
        })
}

/// Create evenly spaced timestamps after `start` up to and including `end`.
///
/// Returns `steps` timestamps, the last of which is exactly `end`. Empty when
/// `end <= start` or `steps == 0`.
pub fn future_timestamps(start: i64, end: i64, steps: usize) -> Vec<i64> {
    if end <= start || steps == 0 {
        return Vec::new();
    }

    let (start, span) = (i128::from(start), i128::from(end) - i128::from(start));
    (1..=steps as i128)
        .map(|i| (start + span * i / steps as i128) as i64)
        .collect()
}
