use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::sources::RawEvent;
use crate::window::DateWindow;

/// A meeting retained for the report, in Pacific civil time
#[derive(Debug, Clone, PartialEq)]
pub struct Meeting {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub title: String,
    pub duration_hours: f64,
}

/// Running totals over all retained meetings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeetingStats {
    pub total_meetings: usize,
    pub total_hours: f64,
}

impl MeetingStats {
    fn record(&mut self, meeting: &Meeting) {
        self.total_meetings += 1;
        self.total_hours += meeting.duration_hours;
    }
}

/// Keep the events that start inside `window` and total them up.
///
/// Input order is preserved in the returned meetings.
pub fn aggregate(events: Vec<RawEvent>, window: &DateWindow) -> (Vec<Meeting>, MeetingStats) {
    let mut meetings = Vec::new();
    let mut stats = MeetingStats::default();
    let mut skipped = 0usize;

    for event in events {
        if !window.contains(&event.start) {
            skipped += 1;
            continue;
        }

        let meeting = Meeting {
            date: event.start.date_naive(),
            time: event.start.time(),
            title: event.title,
            duration_hours: event.duration_hours,
        };
        stats.record(&meeting);
        meetings.push(meeting);
    }

    debug!(
        "Retained {} meetings ({:.1} hours), {} outside the window",
        stats.total_meetings, stats.total_hours, skipped
    );
    (meetings, stats)
}
