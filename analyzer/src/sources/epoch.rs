//! Apple Calendar timestamps: seconds since 2001-01-01T00:00:00Z.

use chrono::{DateTime, TimeZone, Utc};

/// Unix timestamp of 2001-01-01T00:00:00Z
pub const APPLE_EPOCH_UNIX_SECONDS: i64 = 978_307_200;

/// Whole seconds from the Apple epoch to `instant`, truncated toward zero.
pub fn epoch_seconds<Z: TimeZone>(instant: &DateTime<Z>) -> i64 {
    let seconds = instant.timestamp() - APPLE_EPOCH_UNIX_SECONDS;
    // timestamp() floors; move negative values with a fraction back toward zero
    if seconds < 0 && instant.timestamp_subsec_nanos() > 0 {
        seconds + 1
    } else {
        seconds
    }
}

/// Instant for a stored Apple epoch value. Returns `None` for values chrono
/// cannot represent.
pub fn from_epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }

    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    let unix = (whole as i64).checked_add(APPLE_EPOCH_UNIX_SECONDS)?;
    DateTime::from_timestamp(unix, nanos)
}
