use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod analysis;
mod commands;
mod config;
mod errors;
mod formatters;
mod locator;
mod sources;
mod timezone;
mod window;

use commands::{analyze::AnalyzeCommand, Command, CommandContext};
use config::Config;
use errors::{AnalyzerError, AnalyzerResult};

#[derive(Parser)]
#[command(name = "calendar-analyzer")]
#[command(about = "Analyze calendar events from a specified date range.")]
struct Cli {
    /// Path to the exported calendar file (.ics, .sqlitedb or .icbu)
    #[arg(long)]
    calendar: Option<String>,

    /// Start date for analysis (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<String>,

    /// End date for analysis (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,

    /// Number of days to look back from end date (default: 365)
    #[arg(long)]
    days: Option<u32>,

    /// Number of meeting titles to display (default: 50)
    #[arg(long)]
    titles: Option<usize>,

    /// Write the report to this file instead of the terminal
    #[arg(long)]
    output: Option<PathBuf>,

    /// Configuration file (default: <config dir>/calendar-analyzer/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for the report
    let log_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("calendar_analyzer={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli) {
        match e.subject() {
            Some(subject) => debug!("Analysis aborted on {}: {:?}", subject, e),
            None => debug!("Analysis aborted: {:?}", e),
        }
        println!("{}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> AnalyzerResult<()> {
    let config = Config::load(cli.config.as_deref()).map_err(|e| AnalyzerError::Config {
        message: format!("{:#}", e),
    })?;
    info!("Calendar analyzer starting");

    let context = CommandContext::new(config, dirs::home_dir());

    let mut command = AnalyzeCommand {
        calendar: cli.calendar,
        start_date: cli.start_date,
        end_date: cli.end_date,
        days: cli.days,
        titles: cli.titles,
        output: cli.output,
    };

    command.execute(&context)
}
