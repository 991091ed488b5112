use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::{AnalyzerError, AnalyzerResult};

/// File name extensions recognised as calendar sources
pub const CALENDAR_EXTENSIONS: [&str; 3] = ["ics", "icbu", "sqlitedb"];

/// How many matches to print per searched directory
const LISTED_MATCHES: usize = 5;

/// Where Calendar keeps its data on macOS, and where exports usually land
pub fn default_search_dirs(home: &Path) -> Vec<PathBuf> {
    vec![
        home.join("Library/Calendars"),
        home.join("Library/Application Support/Calendar"),
        home.join("Library/Application Support/Apple/Calendar"),
        home.join("Documents"),
        home.join("Downloads"),
    ]
}

/// Make the user-supplied path absolute and describe what is there.
///
/// A path that does not exist is not an error here; the reader reports it.
pub fn resolve_explicit(path: &str) -> AnalyzerResult<PathBuf> {
    let resolved = resolve_path(Path::new(path)).map_err(|source| AnalyzerError::PathResolution {
        path: PathBuf::from(path),
        source,
    })?;

    println!("Looking for calendar at: {}", resolved.display());
    let exists = resolved.exists();
    println!("Path exists: {}", exists);
    if exists {
        let is_dir = resolved.is_dir();
        println!("Is directory: {}", is_dir);
        if is_dir {
            println!("Directory contents:");
            match list_names(&resolved) {
                Ok(names) => {
                    for name in names {
                        println!("  - {}", name);
                    }
                }
                Err(e) => println!("  Error listing directory contents: {}", e),
            }
        }
    }

    Ok(resolved)
}

/// Absolute form of `path` with symlinks resolved as far as the path exists.
pub fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };

    match fs::canonicalize(&absolute) {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let resolved_parent = absolute
                .parent()
                .zip(absolute.file_name())
                .and_then(|(parent, name)| fs::canonicalize(parent).ok().map(|p| p.join(name)));
            Ok(resolved_parent.unwrap_or(absolute))
        }
        Err(e) => Err(e),
    }
}

/// Search every directory and pick the most recently modified calendar file.
pub fn discover(search_dirs: &[PathBuf]) -> AnalyzerResult<PathBuf> {
    println!("\nSearching for calendar files in:");

    let mut all_matches = Vec::new();
    for dir in search_dirs {
        println!("- {}", dir.display());
        if !dir.exists() {
            println!("  ✗ Directory does not exist");
            continue;
        }
        println!("  ✓ Directory exists");

        let matches = find_calendar_files(dir);
        if matches.is_empty() {
            println!("  ✗ No calendar files found");
        } else {
            println!("  ✓ Found {} calendar files", matches.len());
            for file in matches.iter().take(LISTED_MATCHES) {
                println!("    - {}", file.display());
            }
            if matches.len() > LISTED_MATCHES {
                println!("    ... and {} more", matches.len() - LISTED_MATCHES);
            }
        }
        all_matches.extend(matches);
    }

    let latest = most_recent(&all_matches).ok_or(AnalyzerError::NoCalendarFiles)?;
    println!("\nSelected most recent calendar file: {}", latest.display());
    info!("Auto-discovered calendar source {:?} among {} candidates", latest, all_matches.len());
    Ok(latest)
}

/// Calendar files and bundles anywhere below `dir`, in name order
pub fn find_calendar_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry while searching {:?}: {}", dir, e);
                None
            }
        })
        .map(|entry| entry.into_path())
        .filter(|path| has_calendar_extension(path))
        .collect()
}

fn has_calendar_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| CALENDAR_EXTENSIONS.contains(&ext))
}

/// Latest modification time wins; on a tie the later candidate wins.
fn most_recent(candidates: &[PathBuf]) -> Option<PathBuf> {
    let mut latest: Option<(&PathBuf, SystemTime)> = None;

    for path in candidates {
        let modified = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                warn!("Cannot read modification time of {:?}: {}", path, e);
                continue;
            }
        };
        if latest.map_or(true, |(_, best)| modified >= best) {
            latest = Some((path, modified));
        }
    }

    latest.map(|(path, _)| path.clone())
}

/// Sorted entry names of a directory
pub fn list_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(path: &Path, modified: SystemTime) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "calendar content").unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
    }

    #[test]
    fn test_discover_selects_newest_file() {
        let home = TempDir::new().unwrap();
        let now = SystemTime::now();
        let old = home.path().join("Documents/old_calendar.ics");
        let new = home.path().join("Documents/new_calendar.ics");
        touch(&new, now);
        touch(&old, now - Duration::from_secs(3600));

        let selected = discover(&default_search_dirs(home.path())).unwrap();
        assert_eq!(selected, new);
    }

    #[test]
    fn test_discover_compares_across_directories() {
        let home = TempDir::new().unwrap();
        let now = SystemTime::now();
        let library = home.path().join("Library/Calendars/backup.icbu");
        let download = home.path().join("Downloads/export.ics");
        touch(&library, now);
        touch(&download, now - Duration::from_secs(60));

        let selected = discover(&default_search_dirs(home.path())).unwrap();
        assert_eq!(selected, library);
    }

    #[test]
    fn test_discover_searches_subdirectories() {
        let home = TempDir::new().unwrap();
        let nested = home.path().join("Documents/Calendars/Exports/nested_calendar.ics");
        touch(&nested, SystemTime::now());

        assert_eq!(find_calendar_files(&home.path().join("Documents")), vec![nested.clone()]);
        assert_eq!(discover(&default_search_dirs(home.path())).unwrap(), nested);
    }

    #[test]
    fn test_discover_ties_go_to_last_found() {
        let home = TempDir::new().unwrap();
        let stamp = SystemTime::now() - Duration::from_secs(10);
        let first = home.path().join("Documents/a.ics");
        let last = home.path().join("Downloads/b.ics");
        touch(&first, stamp);
        touch(&last, stamp);

        assert_eq!(discover(&default_search_dirs(home.path())).unwrap(), last);
    }

    #[test]
    fn test_only_recognised_extensions_match() {
        let home = TempDir::new().unwrap();
        let docs = home.path().join("Documents");
        touch(&docs.join("calendar.ics"), SystemTime::now());
        touch(&docs.join("Calendar.sqlitedb"), SystemTime::now());
        touch(&docs.join("notes.txt"), SystemTime::now());
        touch(&docs.join("calendar.ics.bak"), SystemTime::now());

        let found = find_calendar_files(&docs);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| has_calendar_extension(p)));
    }

    #[test]
    fn test_discover_without_matches_fails() {
        let home = TempDir::new().unwrap();
        fs::create_dir(home.path().join("Documents")).unwrap();
        fs::create_dir(home.path().join("Downloads")).unwrap();

        let err = discover(&default_search_dirs(home.path())).unwrap_err();
        assert!(matches!(err, AnalyzerError::NoCalendarFiles));
    }

    #[test]
    fn test_discover_with_missing_directories_fails() {
        let home = TempDir::new().unwrap();
        assert!(discover(&default_search_dirs(home.path())).is_err());
    }

    #[test]
    fn test_explicit_path_is_resolved_even_when_missing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing_nonexistent.ics");

        let resolved = resolve_explicit(missing.to_str().unwrap()).unwrap();

        assert!(resolved.is_absolute());
        assert_eq!(resolved, fs::canonicalize(dir.path()).unwrap().join("missing_nonexistent.ics"));
    }

    #[test]
    fn test_explicit_existing_path_is_canonical() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("calendar.ics");
        fs::write(&file, "test content").unwrap();

        let resolved = resolve_explicit(file.to_str().unwrap()).unwrap();
        assert_eq!(resolved, fs::canonicalize(&file).unwrap());
    }

    #[test]
    fn test_list_names_is_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();

        assert_eq!(list_names(dir.path()).unwrap(), vec!["a.txt", "b.txt"]);
    }
}
