use std::path::PathBuf;
use thiserror::Error;

/// Fatal: aborts the run before any source is analyzed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read source list {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse source list {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid source list: {0}")]
    Invalid(String),

    #[error("cannot write source list {}: {source}", path.display())]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
