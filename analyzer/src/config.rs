use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::locator::default_search_dirs;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Look-back in days when no start date is given
    pub days_back: u32,
    /// Number of titles in the frequency table
    pub top_titles: usize,
    /// Number of start times in the frequency table
    pub top_times: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Directories searched when no calendar is given; `~` is expanded.
    /// Falls back to the standard Calendar locations under the home directory.
    pub search_dirs: Option<Vec<String>>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            days_back: 365,
            top_titles: 50,
            top_times: 5,
        }
    }
}

impl Config {
    /// Load from `explicit`, or from the default location when it exists.
    ///
    /// An explicit path that cannot be read is an error; a missing default file
    /// just means built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::get_config_path()?;
                if !path.exists() {
                    debug!("No config file at {:?}, using defaults", path);
                    return Ok(Config::default());
                }
                path
            }
        };

        let config = Self::load_from(&config_path)?;
        info!("Configuration loaded from {:?}", config_path);
        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("calendar-analyzer");

        Ok(config_dir.join("config.toml"))
    }

    /// Directories to search during auto-discovery, with `~` expanded.
    /// `home` is only required when a directory depends on it.
    pub fn search_dirs(&self, home: Option<&Path>) -> Result<Vec<PathBuf>> {
        match &self.discovery.search_dirs {
            Some(dirs) => dirs.iter().map(|dir| expand_home(dir, home)).collect(),
            None => Ok(default_search_dirs(require_home(home)?)),
        }
    }
}

fn require_home(home: Option<&Path>) -> Result<&Path> {
    home.context("Failed to get home directory")
}

fn expand_home(dir: &str, home: Option<&Path>) -> Result<PathBuf> {
    if dir == "~" {
        Ok(require_home(home)?.to_path_buf())
    } else if let Some(rest) = dir.strip_prefix("~/") {
        Ok(require_home(home)?.join(rest))
    } else {
        Ok(PathBuf::from(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.analysis.days_back, 365);
        assert_eq!(config.analysis.top_titles, 50);
        assert_eq!(config.analysis.top_times, 5);
        assert!(config.discovery.search_dirs.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[analysis]\ntop_titles = 10\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.analysis.top_titles, 10);
        assert_eq!(config.analysis.days_back, 365);
        assert_eq!(config.analysis.top_times, 5);
    }

    #[test]
    fn test_search_dirs_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[discovery]\nsearch_dirs = [\"/srv/calendars\", \"~/Exports\"]\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        let dirs = config.discovery.search_dirs.unwrap();
        assert_eq!(dirs, vec!["/srv/calendars".to_string(), "~/Exports".to_string()]);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[analysis\ndays_back = ").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_search_dirs_default_to_home_locations() {
        let home = Path::new("/home/user");
        let dirs = Config::default().search_dirs(Some(home)).unwrap();
        assert_eq!(dirs, default_search_dirs(home));
    }

    #[test]
    fn test_search_dirs_need_a_home_directory() {
        let err = Config::default().search_dirs(None).unwrap_err();
        assert!(err.to_string().contains("Failed to get home directory"));
    }

    #[test]
    fn test_absolute_search_dirs_do_not_need_home() {
        let mut config = Config::default();
        config.discovery.search_dirs = Some(vec!["/srv/calendars".to_string()]);

        assert_eq!(config.search_dirs(None).unwrap(), vec![PathBuf::from("/srv/calendars")]);
    }

    #[test]
    fn test_expand_home() {
        let home = Some(Path::new("/home/user"));
        assert_eq!(expand_home("~", home).unwrap(), PathBuf::from("/home/user"));
        assert_eq!(expand_home("~/Documents", home).unwrap(), PathBuf::from("/home/user/Documents"));
        assert_eq!(expand_home("/data/cal", home).unwrap(), PathBuf::from("/data/cal"));
        assert!(expand_home("~/Documents", None).is_err());
    }
}
