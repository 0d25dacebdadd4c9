use std::path::PathBuf;
use clap::{Parser, ValueEnum};

use analyzer::{Dialect, GlobalResult, Level, SourceResult};

use crate::settings::Settings;

/// Analyze a set of log files in parallel and report on them.
#[derive(Debug, Parser)]
#[command(name = "loganalyzer", version, about)]
pub struct Args {
    /// JSON source list: [{"id": ..., "path": ..., "type": ...}]
    #[arg(short, long, env = "LOGANALYZER_SOURCES")]
    pub config: PathBuf,

    /// Write the report here (.csv for CSV, JSON otherwise)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only count records at this level (ERROR, WARN, ...)
    #[arg(long, value_parser = parse_level)]
    pub level: Option<Level>,

    /// Only analyze sources of this type (repeatable)
    #[arg(long = "type", value_parser = parse_dialect)]
    pub types: Vec<Dialect>,

    /// Only analyze the source with this id (repeatable)
    #[arg(long = "id")]
    pub ids: Vec<String>,

    /// Only show and export sources that succeeded (ok) or failed
    #[arg(long, value_enum, ignore_case = true)]
    pub status: Option<StatusFilter>,

    /// Number of parallel workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Fail lines with unparseable timestamps or layouts instead of guessing
    #[arg(long)]
    pub strict: bool,

    /// Prefix the output file name with the date (YYMMDD_)
    #[arg(long)]
    pub stamp: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Flags given on the command line win over file and environment settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(workers) = self.workers {
            settings.workers = workers;
        }
        if self.strict {
            settings.policy = analyzer::ParsePolicy::Strict;
        }
        if self.verbose {
            settings.logging.level = "debug".to_string();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    Ok,
    Failed,
}

impl StatusFilter {
    pub fn keeps(&self, result: &SourceResult) -> bool {
        match self {
            StatusFilter::Ok => !result.is_failed(),
            StatusFilter::Failed => result.is_failed(),
        }
    }

    /// Narrow the listed sources. Run totals are left as computed.
    pub fn apply(&self, global: &mut GlobalResult) {
        global.source_results.retain(|result| self.keeps(result));
    }
}

fn parse_level(raw: &str) -> Result<Level, String> {
    raw.parse::<Level>().map_err(|e| e.to_string())
}

fn parse_dialect(raw: &str) -> Result<Dialect, String> {
    match Dialect::from_type(raw) {
        Dialect::Unknown if !raw.trim().eq_ignore_ascii_case("unknown") => {
            let known: Vec<&str> = Dialect::KNOWN.iter().map(|d| d.as_str()).collect();
            Err(format!("unknown type '{}' (expected one of: {})", raw, known.join(", ")))
        }
        dialect => Ok(dialect),
    }
}
