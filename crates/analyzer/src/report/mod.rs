//! Report: export a finalized run as indented JSON or a per-source CSV summary.

pub mod json;
pub mod table;

use std::fs;
use std::path::{Path, PathBuf};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::aggregate::GlobalResult;

pub use json::{write_json, write_source_json};
pub use table::{render_csv, write_csv};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("report is not valid UTF-8: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

impl ReportFormat {
    /// `.csv` (any case) selects CSV, anything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ReportFormat::Csv,
            _ => ReportFormat::Json,
        }
    }
}

/// Write `global` to `path` in `format`, or the format implied by the extension.
pub fn export(path: &Path, global: &GlobalResult, format: Option<ReportFormat>) -> Result<(), ReportError> {
    let format = format.unwrap_or_else(|| ReportFormat::from_path(path));
    match format {
        ReportFormat::Json => write_json(path, global)?,
        ReportFormat::Csv => write_csv(path, global)?,
    }
    info!("Report written to {} ({:?})", path.display(), format);
    Ok(())
}

/// Prefix the file name (not the directory) with `YYMMDD_`.
pub fn stamp_file_name(path: &Path, date: NaiveDate) -> PathBuf {
    let stamp = date.format("%y%m%d");
    match path.file_name() {
        Some(name) => path.with_file_name(format!("{}_{}", stamp, name.to_string_lossy())),
        None => path.to_path_buf(),
    }
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), ReportError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| ReportError::Write {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
