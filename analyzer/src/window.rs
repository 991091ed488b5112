use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use chrono_tz::Tz;
use tracing::debug;

use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::timezone::PACIFIC;

/// Which bound a date argument was given for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Inclusive analysis window in Pacific time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl DateWindow {
    /// Build the window from optional command line bounds.
    ///
    /// A missing end means `now`; a missing start means `days_back` days before
    /// the end. Only explicitly given bounds are checked against each other.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        days_back: u32,
        now: DateTime<Tz>,
    ) -> AnalyzerResult<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(AnalyzerError::EndBeforeStart { start, end });
            }
        }

        let end = match end {
            Some(date) => pacific_midnight(date, Bound::End)?,
            None => now,
        };
        let start = match start {
            Some(date) => pacific_midnight(date, Bound::Start)?,
            None => Duration::try_days(i64::from(days_back))
                .and_then(|look_back| end.checked_sub_signed(look_back))
                .ok_or(AnalyzerError::LookBackOutOfRange { days: days_back })?,
        };

        debug!("Analysis window: {} .. {}", start, end);
        Ok(Self { start, end })
    }

    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        self.start <= *instant && *instant <= self.end
    }
}

/// Parse a `YYYY-MM-DD` command line argument.
pub fn parse_date_arg(value: &str, bound: Bound) -> AnalyzerResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| match bound {
        Bound::Start => AnalyzerError::InvalidStartDate {
            value: value.to_string(),
        },
        Bound::End => AnalyzerError::InvalidEndDate {
            value: value.to_string(),
        },
    })
}

/// Midnight at the start of `date` in Pacific time
fn pacific_midnight(date: NaiveDate, bound: Bound) -> AnalyzerResult<DateTime<Tz>> {
    let invalid = || match bound {
        Bound::Start => AnalyzerError::InvalidStartDate {
            value: date.to_string(),
        },
        Bound::End => AnalyzerError::InvalidEndDate {
            value: date.to_string(),
        },
    };

    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    PACIFIC
        .from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(invalid)
}
