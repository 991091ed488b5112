use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Fatal errors for a calendar analysis run.
///
/// The `Display` text of each variant is what the user sees, so every variant
/// starts with its own fixed prefix that scripts can grep for.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// `--start-date` was not a valid `YYYY-MM-DD` date
    #[error("Error: Start date must be in YYYY-MM-DD format")]
    InvalidStartDate { value: String },

    /// `--end-date` was not a valid `YYYY-MM-DD` date
    #[error("Error: End date must be in YYYY-MM-DD format")]
    InvalidEndDate { value: String },

    /// `--days` (or `analysis.days_back`) reaches past the representable calendar
    #[error("Error: Number of days to look back is out of range: {days}")]
    LookBackOutOfRange { days: u32 },

    #[error("Error: End date cannot be before start date\nStart date: {start}\nEnd date: {end}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    /// The explicit calendar path could not be made absolute
    #[error("Error processing path: {source}")]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Auto-discovery came back empty
    #[error("Error: No calendar files found in any of the expected locations.\n{}", EXPORT_INSTRUCTIONS)]
    NoCalendarFiles,

    /// The text calendar could not be opened or read
    #[error("Error reading calendar file: {source}")]
    CalendarRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The text calendar was read but is not valid iCalendar data
    #[error("Error parsing calendar file: {message}")]
    CalendarParse { path: PathBuf, message: String },

    #[error("Error reading SQLite calendar: {message}")]
    Sqlite { message: String },

    /// An `.icbu` bundle with neither a database nor an ICS file inside.
    /// `listing` holds the already rendered directory contents.
    #[error("Error: Could not find calendar data (SQLite or ICS) in {}\n{listing}", path.display())]
    BundleMissingData { path: PathBuf, listing: String },

    #[error("Error saving to file: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using AnalyzerError
pub type AnalyzerResult<T> = std::result::Result<T, AnalyzerError>;

impl AnalyzerError {
    /// Process exit status for this error. Every fatal path currently exits with 1.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// The argument or file the error is about, for log records
    pub fn subject(&self) -> Option<String> {
        match self {
            Self::InvalidStartDate { value } | Self::InvalidEndDate { value } => Some(value.clone()),
            Self::LookBackOutOfRange { days } => Some(days.to_string()),
            Self::PathResolution { path, .. }
            | Self::CalendarRead { path, .. }
            | Self::CalendarParse { path, .. }
            | Self::BundleMissingData { path, .. }
            | Self::OutputWrite { path, .. } => Some(path.display().to_string()),
            Self::EndBeforeStart { .. } | Self::NoCalendarFiles | Self::Sqlite { .. } | Self::Config { .. } => None,
        }
    }
}

/// Convert rusqlite::Error to AnalyzerError
impl From<rusqlite::Error> for AnalyzerError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Sqlite {
            message: error.to_string(),
        }
    }
}

/// Shown when no calendar source can be found automatically.
pub const EXPORT_INSTRUCTIONS: &str = "\
Please export your calendar from the Calendar app:
1. Open the Calendar app
2. Select the calendar(s) you want to analyze
3. Go to File > Export
4. Save the calendar file

Then run this tool with the path to your exported file:
calendar-analyzer --calendar /path/to/your/calendar.ics";
