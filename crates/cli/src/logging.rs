use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::settings::{LogFormat, LoggingSettings};

/// Install the global subscriber. Logs go to stderr; stdout carries the summary.
pub fn init(logging: &LoggingSettings) {
    // Prefer RUST_LOG env var, fall back to settings level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
}
