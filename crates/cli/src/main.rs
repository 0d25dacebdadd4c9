mod args;
mod logging;
mod settings;
mod summary;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};

use analyzer::report::{self, stamp_file_name};
use analyzer::{conf, pipeline, AnalyzeOptions, PipelineOptions, SourceSelection};

use crate::{args::Args, settings::Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load().context("Failed to load settings")?;
    args.apply(&mut settings);
    logging::init(&settings.logging);

    info!("Starting loganalyzer v{}", env!("CARGO_PKG_VERSION"));

    let specs = conf::load_sources(&args.config)
        .with_context(|| format!("Failed to load source list {}", args.config.display()))?;

    let options = PipelineOptions {
        concurrency: settings.workers,
        analyze: AnalyzeOptions {
            level_filter: args.level,
            policy: settings.policy,
            hour_basis: settings.hour_basis,
            deadline: settings.deadline(),
        },
        selection: SourceSelection {
            ids: args.ids.clone(),
            types: args.types.clone(),
        },
        ..Default::default()
    };

    let mut global = pipeline::analyze(specs, &options)
        .await
        .context("Nothing to analyze")?;

    if let Some(status) = args.status {
        status.apply(&mut global);
    }

    print!("{}", summary::render(&global));

    if global.error_sources > 0 {
        warn!("{} of {} sources failed", global.error_sources, global.total_sources);
    }

    if let Some(output) = &args.output {
        let path = if args.stamp {
            stamp_file_name(output, Local::now().date_naive())
        } else {
            output.clone()
        };
        report::export(&path, &global, None)
            .with_context(|| format!("Failed to export report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}
