use std::path::PathBuf;

use crate::config::Config;
use crate::errors::{AnalyzerError, AnalyzerResult};

pub mod analyze;

/// Trait for all command implementations
pub trait Command {
    /// Execute the command with the provided context
    fn execute(&mut self, context: &CommandContext) -> AnalyzerResult<()>;
}

/// Shared context for all commands
pub struct CommandContext {
    pub config: Config,
    /// `None` when the home directory cannot be determined
    pub home: Option<PathBuf>,
}

impl CommandContext {
    pub fn new(config: Config, home: Option<PathBuf>) -> Self {
        Self { config, home }
    }

    /// Auto-discovery directories. Only resolved when discovery actually runs,
    /// since the defaults need a home directory.
    pub fn search_dirs(&self) -> AnalyzerResult<Vec<PathBuf>> {
        self.config
            .search_dirs(self.home.as_deref())
            .map_err(|e| AnalyzerError::Config {
                message: format!("{:#}", e),
            })
    }
}
