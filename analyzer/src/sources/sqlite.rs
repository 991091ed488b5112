use std::path::Path;

use rusqlite::{params, Connection, OpenFlags};
use tracing::{debug, info, warn};

use super::{epoch, title_or_placeholder, RawEvent};
use crate::errors::AnalyzerResult;
use crate::timezone::RawInstant;
use crate::window::DateWindow;

/// Rows of the Apple Calendar store whose start falls inside the window
const CALENDAR_ITEMS_IN_RANGE: &str = "SELECT summary, start_date, end_date
                                       FROM CalendarItem
                                       WHERE start_date >= ?1 AND start_date <= ?2";

#[derive(Debug)]
struct CalendarItemRow {
    summary: Option<String>,
    start_date: f64,
    end_date: Option<f64>,
}

/// Read events from an Apple Calendar SQLite store.
///
/// The database is opened read-only and closed before returning.
pub fn read_events(path: &Path, window: &DateWindow) -> AnalyzerResult<Vec<RawEvent>> {
    let connection = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    let start = epoch::epoch_seconds(&window.start);
    let end = epoch::epoch_seconds(&window.end);
    debug!("Querying CalendarItem for start_date in [{}, {}]", start, end);

    let rows = query_rows(&connection, start, end)?;
    info!("Loaded {} calendar items from {:?}", rows.len(), path);

    Ok(rows.into_iter().filter_map(convert_row).collect())
}

fn query_rows(connection: &Connection, start: i64, end: i64) -> rusqlite::Result<Vec<CalendarItemRow>> {
    let mut stmt = connection.prepare(CALENDAR_ITEMS_IN_RANGE)?;

    let rows = stmt
        .query_map(params![start, end], |row| {
            Ok(CalendarItemRow {
                summary: row.get(0)?,
                start_date: row.get(1)?,
                end_date: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn convert_row(row: CalendarItemRow) -> Option<RawEvent> {
    let Some(start) = epoch::from_epoch_seconds(row.start_date) else {
        warn!("Skipping calendar item with out-of-range start_date {}", row.start_date);
        return None;
    };

    let duration_hours = match row.end_date {
        Some(end_date) => {
            let hours = (end_date - row.start_date) / 3600.0;
            if hours < 0.0 {
                warn!("Calendar item ends before it starts, counting it as zero length");
                0.0
            } else {
                hours
            }
        }
        None => {
            debug!("Calendar item has no end_date, counting it as zero length");
            0.0
        }
    };

    Some(RawEvent {
        start: RawInstant::Utc(start).normalize(),
        duration_hours,
        title: title_or_placeholder(row.summary.as_deref()),
    })
}
