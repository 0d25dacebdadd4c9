use std::time::Duration;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use analyzer::{HourBasis, ParsePolicy};

/// Runtime settings, layered defaults -> loganalyzer.toml -> LOGANALYZER__* env.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub workers: usize,
    pub policy: ParsePolicy,
    pub hour_basis: HourBasis,
    /// Per-source scan deadline; unset means no deadline
    #[serde(default)]
    pub deadline_secs: Option<u64>,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: 4,
            policy: ParsePolicy::Lenient,
            hour_basis: HourBasis::Utc,
            deadline_secs: None,
            logging: LoggingSettings {
                level: "info".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }
}

impl Settings {
    /// Load from loganalyzer.toml (cwd or config/) and the environment
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        Self::load_from(&["loganalyzer", "config/loganalyzer"])
    }

    /// Layer the given file names (extension optional) over the defaults, then env.
    pub fn load_from(files: &[&str]) -> Result<Self> {
        let defaults = config::Config::try_from(&Settings::default())
            .context("Failed to serialize default settings")?;

        let mut builder = config::Config::builder().add_source(defaults);

        for name in files {
            builder = builder.add_source(config::File::with_name(name).required(false));
        }

        // Double underscore for nested keys: LOGANALYZER__LOGGING__FORMAT
        builder = builder.add_source(
            config::Environment::with_prefix("LOGANALYZER")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Failed to deserialize settings")
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.filter(|secs| *secs > 0).map(Duration::from_secs)
    }
}
