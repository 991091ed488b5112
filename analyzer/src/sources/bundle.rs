use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{ics, sqlite, RawEvent};
use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::locator::list_names;
use crate::window::DateWindow;

/// Database file name inside an Apple Calendar backup bundle
pub const BUNDLE_DATABASE_NAME: &str = "Calendar.sqlitedb";

/// The calendar data found inside an `.icbu` bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleContents {
    Database(PathBuf),
    Ics(PathBuf),
}

/// Find the calendar data in a bundle, preferring the SQLite store.
pub fn locate_contents(bundle: &Path) -> AnalyzerResult<BundleContents> {
    let database = bundle.join(BUNDLE_DATABASE_NAME);
    if database.exists() {
        return Ok(BundleContents::Database(database));
    }

    if let Some(ics_file) = first_ics_file(bundle) {
        return Ok(BundleContents::Ics(ics_file));
    }

    Err(AnalyzerError::BundleMissingData {
        path: bundle.to_path_buf(),
        listing: render_listing(bundle),
    })
}

pub fn read_events(bundle: &Path, window: &DateWindow) -> AnalyzerResult<Vec<RawEvent>> {
    match locate_contents(bundle)? {
        BundleContents::Database(path) => {
            println!("Found SQLite database in ICBU backup: {}", path.display());
            sqlite::read_events(&path, window)
        }
        BundleContents::Ics(path) => {
            println!("Found ICS file in ICBU backup: {}", path.display());
            ics::read_events(&path)
        }
    }
}

/// First `*.ics` entry directly inside the bundle, by file name
fn first_ics_file(bundle: &Path) -> Option<PathBuf> {
    let entries = match fs::read_dir(bundle) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot read bundle directory {:?}: {}", bundle, e);
            return None;
        }
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| ext.eq_ignore_ascii_case("ics"))
        })
        .collect();
    candidates.sort();

    if candidates.len() > 1 {
        info!("Bundle holds {} ICS files, using the first", candidates.len());
    }
    candidates.into_iter().next()
}

/// Directory listing shown alongside the missing-data error
fn render_listing(bundle: &Path) -> String {
    let mut listing = String::from("Contents of ICBU directory:");

    match list_names(bundle) {
        Ok(names) => {
            for name in names {
                listing.push_str(&format!("\n  - {}", name));
            }
        }
        Err(e) => listing.push_str(&format!("\n  Error listing directory contents: {}", e)),
    }

    listing
}
