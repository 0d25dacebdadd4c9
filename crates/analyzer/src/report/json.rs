use std::fs;
use std::path::Path;
use serde::Serialize;

use crate::aggregate::GlobalResult;
use crate::source::SourceResult;
use super::{ensure_parent, ReportError};

/// Indented JSON document of the whole run.
pub fn write_json(path: impl AsRef<Path>, global: &GlobalResult) -> Result<(), ReportError> {
    write_pretty(path.as_ref(), global)
}

/// Indented JSON document of a single source.
pub fn write_source_json(path: impl AsRef<Path>, result: &SourceResult) -> Result<(), ReportError> {
    write_pretty(path.as_ref(), result)
}

fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), ReportError> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}
