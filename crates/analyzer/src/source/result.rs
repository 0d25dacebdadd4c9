use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;
use serde::Serialize;
use thiserror::Error;

use crate::parser::{Dialect, Level, LogRecord};
use crate::serde_utils::{serialize_display_opt, serialize_duration_secs};
use super::spec::SourceSpec;

/// Terminal error for one source. Ends that source's scan, never the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("path is a directory: {}", .0.display())]
    IsDirectory(PathBuf),

    #[error("cannot open {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("read failed after line {line}: {reason}")]
    MidRead { line: u64, reason: String },

    #[error("deadline of {0:?} exceeded")]
    Timeout(Duration),

    #[error("analysis task failed: {0}")]
    TaskFailed(String),
}

impl SourceError {
    /// Errors raised before any line was read.
    pub fn is_access_error(&self) -> bool {
        matches!(
            self,
            SourceError::NotFound(_) | SourceError::IsDirectory(_) | SourceError::Unreadable { .. }
        )
    }
}

/// Occurrences of one distinct error/fatal message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorStat {
    pub message: String,
    pub count: u64,
    pub level: Level,
    pub source_id: String,
}

/// Outcome of analyzing one source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceResult {
    pub source_id: String,
    pub source_type: Dialect,
    pub source_path: PathBuf,

    /// Lines read, whatever happened to them
    pub total_lines: u64,
    /// Lines parsed and kept by the level filter
    pub parsed_lines: u64,
    /// Lines the dialect could not parse
    pub error_lines: u64,

    pub level_stats: BTreeMap<String, u64>,
    pub hourly_stats: BTreeMap<u32, u64>,

    /// Error/fatal messages, most frequent first
    pub errors: Vec<ErrorStat>,

    #[serde(serialize_with = "serialize_duration_secs")]
    pub duration: Duration,

    #[serde(serialize_with = "serialize_display_opt", skip_serializing_if = "Option::is_none")]
    pub error: Option<SourceError>,
}

impl SourceResult {
    pub fn new(spec: &SourceSpec) -> Self {
        Self {
            source_id: spec.id.clone(),
            source_type: spec.dialect,
            source_path: spec.path.clone(),
            total_lines: 0,
            parsed_lines: 0,
            error_lines: 0,
            level_stats: BTreeMap::new(),
            hourly_stats: BTreeMap::new(),
            errors: Vec::new(),
            duration: Duration::ZERO,
            error: None,
        }
    }

    /// A source that could not be analyzed at all.
    pub fn failed(spec: &SourceSpec, error: SourceError, duration: Duration) -> Self {
        Self {
            duration,
            error: Some(error),
            ..Self::new(spec)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Count a parsed record into the level and hour histograms.
    pub(crate) fn record(&mut self, level: Level, hour: u32) {
        self.parsed_lines += 1;
        *self.level_stats.entry(level.as_str().to_string()).or_insert(0) += 1;
        *self.hourly_stats.entry(hour).or_insert(0) += 1;
    }
}

/// Insertion-ordered tally of error/fatal messages for one source.
#[derive(Debug, Default)]
pub(crate) struct ErrorTally {
    index: HashMap<String, usize>,
    stats: Vec<(String, u64, Level)>,
}

impl ErrorTally {
    pub(crate) fn observe(&mut self, record: &LogRecord) {
        if !record.level.is_error() {
            return;
        }
        match self.index.get(&record.message) {
            Some(&i) => {
                let entry = &mut self.stats[i];
                entry.1 += 1;
                entry.2 = entry.2.max(record.level);
            }
            None => {
                self.index.insert(record.message.clone(), self.stats.len());
                self.stats.push((record.message.clone(), 1, record.level));
            }
        }
    }

    /// Most frequent first; equal counts keep first-seen order.
    pub(crate) fn into_ranked(self, source_id: &str) -> Vec<ErrorStat> {
        let mut ranked: Vec<ErrorStat> = self
            .stats
            .into_iter()
            .map(|(message, count, level)| ErrorStat {
                message,
                count,
                level,
                source_id: source_id.to_string(),
            })
            .collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }
}
