use std::time::Instant;
use chrono::Utc;
use thiserror::Error;
use tracing::info;

use crate::aggregate::{Aggregator, GlobalResult, DEFAULT_TOP_ERRORS};
use crate::dispatch;
use crate::parser::Dialect;
use crate::source::{AnalyzeOptions, SourceSpec};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no sources to analyze")]
    NoSources,
}

/// Optional narrowing of the configured sources. Empty lists select everything.
#[derive(Debug, Clone, Default)]
pub struct SourceSelection {
    pub ids: Vec<String>,
    pub types: Vec<Dialect>,
}

impl SourceSelection {
    pub fn matches(&self, spec: &SourceSpec) -> bool {
        (self.ids.is_empty() || self.ids.iter().any(|id| *id == spec.id))
            && (self.types.is_empty() || self.types.contains(&spec.dialect))
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub concurrency: usize,
    pub analyze: AnalyzeOptions,
    pub selection: SourceSelection,
    pub top_k: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            analyze: AnalyzeOptions::default(),
            selection: SourceSelection::default(),
            top_k: DEFAULT_TOP_ERRORS,
        }
    }
}

/// Select, analyze in parallel, and reduce into one finalized summary.
pub async fn analyze(specs: Vec<SourceSpec>, options: &PipelineOptions) -> Result<GlobalResult, PipelineError> {
    let started = Instant::now();
    let start_time = Utc::now();

    let configured = specs.len();
    let selected: Vec<SourceSpec> = specs
        .into_iter()
        .filter(|spec| options.selection.matches(spec))
        .collect();

    if selected.is_empty() {
        return Err(PipelineError::NoSources);
    }
    info!("Analyzing {} of {} configured sources", selected.len(), configured);

    let results = dispatch::run(selected, options.concurrency, options.analyze.clone()).await;

    let global = results
        .into_iter()
        .fold(
            Aggregator::starting_at(started, start_time).with_top_k(options.top_k),
            |mut acc, result| {
                acc.add(result);
                acc
            },
        )
        .finalize();

    info!(
        "Analysis complete: {}/{} sources succeeded, {} lines in {:.3}s",
        global.successful_sources,
        global.total_sources,
        global.total_lines,
        global.analysis_duration.as_secs_f64()
    );

    Ok(global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use crate::parser::Level;
    use tempfile::{tempdir, NamedTempFile, TempDir};

    fn scenario() -> (NamedTempFile, TempDir, Vec<SourceSpec>) {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2024-01-01 10:00:00 ERROR disk full").unwrap();
        writeln!(file, "2024-01-01 10:00:01 INFO ok").unwrap();
        writeln!(file, "2024-01-01 10:00:02 ERROR disk full").unwrap();
        file.flush().unwrap();

        let dir = tempdir().unwrap();
        let specs = vec![
            SourceSpec::new("app", file.path(), Dialect::Generic),
            SourceSpec::new("ghost", dir.path().join("missing.log"), Dialect::Generic),
        ];
        (file, dir, specs)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_end_to_end_with_missing_source() {
        let (_file, _dir, specs) = scenario();
        let options = PipelineOptions {
            concurrency: 2,
            ..Default::default()
        };

        let global = analyze(specs, &options).await.unwrap();

        assert_eq!(global.total_sources, 2);
        assert_eq!(global.successful_sources, 1);
        assert_eq!(global.error_sources, 1);
        assert_eq!(global.total_lines, 3);
        assert_eq!(global.level_stats.len(), 2);
        assert_eq!(global.level_stats.get("ERROR"), Some(&2));
        assert_eq!(global.level_stats.get("INFO"), Some(&1));
        assert_eq!(global.top_errors[0].message, "disk full");
        assert_eq!(global.top_errors[0].count, 2);
        assert_eq!(global.source_results.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_level_filter_scenario() {
        let (_file, _dir, specs) = scenario();
        let options = PipelineOptions {
            concurrency: 2,
            analyze: AnalyzeOptions {
                level_filter: Some(Level::Error),
                ..Default::default()
            },
            ..Default::default()
        };

        let global = analyze(specs, &options).await.unwrap();

        assert_eq!(global.total_lines, 3);
        assert_eq!(global.parsed_lines, 2);
        assert_eq!(global.level_stats.len(), 1);
        assert_eq!(global.level_stats.get("ERROR"), Some(&2));
    }

    #[tokio::test]
    async fn test_selection_by_id_and_type() {
        let (_file, _dir, specs) = scenario();
        let options = PipelineOptions {
            selection: SourceSelection {
                ids: vec!["app".to_string()],
                types: vec![Dialect::Generic],
            },
            ..Default::default()
        };

        let global = analyze(specs, &options).await.unwrap();
        assert_eq!(global.total_sources, 1);
        assert_eq!(global.error_sources, 0);
    }

    #[test]
    fn test_empty_selection_is_an_error() {
        let (_file, _dir, specs) = scenario();
        let options = PipelineOptions {
            selection: SourceSelection {
                types: vec![Dialect::Json],
                ..Default::default()
            },
            ..Default::default()
        };

        let selected_none = tokio_test::block_on(analyze(specs, &options));
        assert!(matches!(selected_none, Err(PipelineError::NoSources)));

        let configured_none = tokio_test::block_on(analyze(Vec::new(), &PipelineOptions::default()));
        assert!(matches!(configured_none, Err(PipelineError::NoSources)));
    }
}
