use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use super::{Command, CommandContext};
use crate::analysis::aggregate;
use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::formatters::SummaryFormatter;
use crate::locator;
use crate::sources;
use crate::timezone;
use crate::window::{parse_date_arg, Bound, DateWindow};

/// Locate, read, aggregate and report on one calendar
#[derive(Debug, Default)]
pub struct AnalyzeCommand {
    pub calendar: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Overrides `analysis.days_back`
    pub days: Option<u32>,
    /// Overrides `analysis.top_titles`
    pub titles: Option<usize>,
    pub output: Option<PathBuf>,
}

impl Command for AnalyzeCommand {
    fn execute(&mut self, context: &CommandContext) -> AnalyzerResult<()> {
        let analysis = &context.config.analysis;

        // Arguments are validated before anything touches the filesystem
        let start = self
            .start_date
            .as_deref()
            .map(|value| parse_date_arg(value, Bound::Start))
            .transpose()?;
        let end = self
            .end_date
            .as_deref()
            .map(|value| parse_date_arg(value, Bound::End))
            .transpose()?;

        let now = timezone::now();
        let days_back = self.days.unwrap_or(analysis.days_back);
        let window = DateWindow::resolve(start, end, days_back, now)?;

        println!("📊 Analyzing your calendar...");

        let calendar_path = match self.calendar.as_deref() {
            Some(path) => locator::resolve_explicit(path)?,
            None => locator::discover(&context.search_dirs()?)?,
        };
        println!("Found calendar at: {}", calendar_path.display());

        let events = sources::read_events(&calendar_path, &window)?;
        debug!("Read {} candidate events from {:?}", events.len(), calendar_path);

        let (meetings, stats) = aggregate(events, &window);

        let formatter = SummaryFormatter::new(
            self.titles.unwrap_or(analysis.top_titles),
            analysis.top_times,
        );
        let report = formatter.format(&meetings, &stats, now);

        match &self.output {
            Some(path) => {
                fs::write(path, &report).map_err(|source| AnalyzerError::OutputWrite {
                    path: path.clone(),
                    source,
                })?;
                info!("Wrote report for {} meetings to {:?}", stats.total_meetings, path);
                println!("Analysis saved to: {}", path.display());
            }
            None => println!("\n{}", report),
        }

        Ok(())
    }
}
