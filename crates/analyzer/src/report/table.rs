use std::fs;
use std::path::Path;

use crate::aggregate::GlobalResult;
use super::{ensure_parent, ReportError};

const HEADER: [&str; 6] = ["SourceID", "SourceType", "TotalLines", "ParsedLines", "ErrorLines", "Duration"];

/// One row per source. Failed sources report zeros and the failure inline.
pub fn render_csv(global: &GlobalResult) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for source in &global.source_results {
        let row = match &source.error {
            Some(error) => [
                source.source_id.clone(),
                source.source_type.to_string(),
                "0".to_string(),
                "0".to_string(),
                "0".to_string(),
                format!("ERROR: {}", error),
            ],
            None => [
                source.source_id.clone(),
                source.source_type.to_string(),
                source.total_lines.to_string(),
                source.parsed_lines.to_string(),
                source.error_lines.to_string(),
                format!("{:?}", source.duration),
            ],
        };
        writer.write_record(&row)?;
    }

    let bytes = writer.into_inner().map_err(|e| ReportError::Csv(e.into_error().into()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Encoding(e.to_string()))
}

pub fn write_csv(path: impl AsRef<Path>, global: &GlobalResult) -> Result<(), ReportError> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let rendered = render_csv(global)?;
    fs::write(path, rendered).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}
