use std::path::Path;

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::info;

use crate::errors::AnalyzerResult;
use crate::window::DateWindow;

pub mod bundle;
pub mod epoch;
pub mod ics;
pub mod sqlite;

/// Title used for events that have none
pub const UNTITLED: &str = "No Title";

/// One calendar entry as read from a source, start already in Pacific time
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub start: DateTime<Tz>,
    pub duration_hours: f64,
    pub title: String,
}

/// Storage formats the analyzer can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// iCalendar text export
    Ics,
    /// Apple Calendar SQLite store
    Sqlite,
    /// `.icbu` backup bundle holding either of the above
    Bundle,
}

impl SourceFormat {
    /// Pick the reader from the file extension. Unknown extensions are read as ICS.
    pub fn detect(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("sqlitedb") => SourceFormat::Sqlite,
            Some("icbu") => SourceFormat::Bundle,
            _ => SourceFormat::Ics,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::Ics => "ICS",
            SourceFormat::Sqlite => "SQLite",
            SourceFormat::Bundle => "ICBU bundle",
        }
    }
}

/// Read every candidate event from `path`.
///
/// The SQLite reader narrows rows to `window` in its query; the ICS reader
/// returns all timed events and leaves windowing to the aggregator.
pub fn read_events(path: &Path, window: &DateWindow) -> AnalyzerResult<Vec<RawEvent>> {
    let format = SourceFormat::detect(path);
    info!("Reading {} calendar from {:?}", format.name(), path);

    match format {
        SourceFormat::Sqlite => sqlite::read_events(path, window),
        SourceFormat::Bundle => bundle::read_events(path, window),
        SourceFormat::Ics => ics::read_events(path),
    }
}

/// Event title, falling back to the placeholder when missing or blank
pub(crate) fn title_or_placeholder(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => UNTITLED.to_string(),
    }
}
