//! Conversion of calendar timestamps into the Pacific display zone.
//!
//! Every start time shown in the report is Pacific civil time. Timestamps that
//! carry no zone at all (floating ICS values) are taken to be UTC.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};

/// Display zone for all reported times
pub const PACIFIC: Tz = chrono_tz::America::Los_Angeles;

/// A start timestamp as it appears in a calendar source
#[derive(Debug, Clone, PartialEq)]
pub enum RawInstant {
    /// Absolute UTC instant (`...Z` in ICS, epoch values in SQLite)
    Utc(DateTime<Utc>),
    /// Wall-clock time in a named zone
    Zoned(DateTime<Tz>),
    /// Wall-clock time with no zone information
    Floating(NaiveDateTime),
}

impl RawInstant {
    /// Express this instant in Pacific civil time
    pub fn normalize(&self) -> DateTime<Tz> {
        match self {
            RawInstant::Utc(instant) => instant.with_timezone(&PACIFIC),
            RawInstant::Zoned(instant) => instant.with_timezone(&PACIFIC),
            RawInstant::Floating(naive) => Utc.from_utc_datetime(naive).with_timezone(&PACIFIC),
        }
    }
}

pub fn now() -> DateTime<Tz> {
    Utc::now().with_timezone(&PACIFIC)
}

/// Whether daylight saving time is in effect at `instant`
pub fn is_dst(instant: &DateTime<Tz>) -> bool {
    instant.offset().dst_offset() != Duration::zero()
}

/// Short zone label used in report headings
pub fn zone_abbreviation(dst: bool) -> &'static str {
    if dst {
        "PDT"
    } else {
        "PST"
    }
}
