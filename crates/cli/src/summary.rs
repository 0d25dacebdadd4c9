use std::fmt::Write;

use analyzer::GlobalResult;

/// Console report: one status line per source, a totals line, then top errors.
pub fn render(global: &GlobalResult) -> String {
    let mut out = String::new();

    for source in &global.source_results {
        match &source.error {
            Some(error) if error.is_access_error() => {
                let _ = writeln!(out, "✗ {} ({}) - {}", source.source_id, source.source_path.display(), error);
            }
            Some(error) => {
                let _ = writeln!(
                    out,
                    "✗ {} ({}) - {} lines read before: {}",
                    source.source_id,
                    source.source_path.display(),
                    source.total_lines,
                    error
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "✓ {} ({}) - {} lines, {} parsed, {} unparseable in {:.3}s",
                    source.source_id,
                    source.source_path.display(),
                    source.total_lines,
                    source.parsed_lines,
                    source.error_lines,
                    source.duration.as_secs_f64()
                );
            }
        }
    }

    let _ = writeln!(
        out,
        "\nSummary: {} succeeded, {} failed out of {} sources; {} lines ({} parsed) in {:.3}s",
        global.successful_sources,
        global.error_sources,
        global.total_sources,
        global.total_lines,
        global.parsed_lines,
        global.analysis_duration.as_secs_f64()
    );

    if !global.level_stats.is_empty() {
        let levels: Vec<String> = global
            .level_stats
            .iter()
            .map(|(level, count)| format!("{}={}", level, count))
            .collect();
        let _ = writeln!(out, "Levels: {}", levels.join(" "));
    }

    if !global.top_errors.is_empty() {
        let _ = writeln!(out, "Top errors:");
        for (rank, stat) in global.top_errors.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:>2}. [{}] {} x{} ({})",
                rank + 1,
                stat.level,
                stat.message,
                stat.count,
                stat.source_id
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use analyzer::{pipeline, Dialect, PipelineOptions, SourceSpec};
    use tempfile::{tempdir, NamedTempFile};

    use crate::args::StatusFilter;

    async fn mixed_run() -> (NamedTempFile, GlobalResult) {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2024-01-01 10:00:00 ERROR disk full").unwrap();
        writeln!(file, "2024-01-01 10:00:01 INFO ok").unwrap();
        file.flush().unwrap();
        let dir = tempdir().unwrap();
        let specs = vec![
            SourceSpec::new("app", file.path(), Dialect::Generic),
            SourceSpec::new("gone", dir.path().join("gone.log"), Dialect::Generic),
        ];

        let global = pipeline::analyze(specs, &PipelineOptions::default()).await.unwrap();
        (file, global)
    }

    #[tokio::test]
    async fn test_render_mixed_run() {
        let (_file, global) = mixed_run().await;
        let text = render(&global);

        assert!(text.contains("✓ app ("));
        assert!(text.contains("2 lines, 2 parsed, 0 unparseable"));
        assert!(text.contains("✗ gone ("));
        assert!(text.contains("file not found"));
        assert!(text.contains("Summary: 1 succeeded, 1 failed out of 2 sources"));
        assert!(text.contains("Levels: ERROR=1 INFO=1"));
        assert!(text.contains(" 1. [ERROR] disk full x1 (app)"));
    }

    #[tokio::test]
    async fn test_status_filter_narrows_listed_sources() {
        let (_file, mut global) = mixed_run().await;

        StatusFilter::Failed.apply(&mut global);
        let text = render(&global);

        assert!(text.contains("✗ gone ("));
        assert!(!text.contains("✓ app ("));
        // run totals still describe the whole run
        assert!(text.contains("Summary: 1 succeeded, 1 failed out of 2 sources"));
    }
}
