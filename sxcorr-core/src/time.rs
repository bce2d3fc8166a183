//! UTC/Unix time conversion helpers.
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{Error, Result};

const UTC_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Convert a UTC timestamp string to Unix epoch seconds.
///
/// Accepts RFC 3339 (offsets are honored), the bare `T`- or space-separated
/// date-time forms, and a date-only form, all interpreted as UTC.
/// Fractional seconds are preserved.
///
/// # Errors
/// Returns [`Error::InvalidTimestamp`] if no format matches.
pub fn utc2unix(utc: &str) -> Result<f64> {
    if let Ok(t) = DateTime::parse_from_rfc3339(utc) {
        return Ok(to_unix(&t.with_timezone(&Utc)));
    }
    for fmt in UTC_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(utc, fmt) {
            return Ok(to_unix(&naive.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(utc, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(to_unix(&naive.and_utc()));
        }
    }
    Err(Error::InvalidTimestamp(utc.to_string()))
}

/// Convert Unix epoch seconds to a UTC timestamp string with millisecond
/// precision.
///
/// # Errors
/// Returns [`Error::InvalidTimestamp`] if the value is outside the
/// representable date range.
pub fn unix2utc(unix: f64) -> Result<String> {
    let secs = unix.floor() as i64;
    let nanos = (((unix - unix.floor()) * 1e9).round() as u32).min(999_999_999);
    DateTime::<Utc>::from_timestamp(secs, nanos)
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        .ok_or_else(|| Error::InvalidTimestamp(format!("unix time {unix} out of range")))
}

fn to_unix(t: &DateTime<Utc>) -> f64 {
    t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) * 1e-9
}
