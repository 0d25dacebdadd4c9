//! Aggregate: fold per-source results into one ranked global summary.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::serde_utils::serialize_duration_secs;
use crate::source::{ErrorStat, SourceResult};

/// Length of the global error ranking unless configured otherwise.
pub const DEFAULT_TOP_ERRORS: usize = 10;

/// Finalized reduction over all sources of one run.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalResult {
    pub total_sources: u64,
    pub successful_sources: u64,
    pub error_sources: u64,

    pub total_lines: u64,
    pub parsed_lines: u64,
    pub error_lines: u64,

    pub level_stats: BTreeMap<String, u64>,
    /// Dialect name -> lines seen
    pub type_stats: BTreeMap<String, u64>,

    pub top_errors: Vec<ErrorStat>,
    /// Sorted by source id
    pub source_results: Vec<SourceResult>,

    #[serde(serialize_with = "serialize_duration_secs")]
    pub analysis_duration: Duration,
    pub start_time: DateTime<Utc>,
}

/// Accumulator threaded through a fold over the result stream.
#[derive(Debug, Clone)]
pub struct Aggregator {
    started: Instant,
    start_time: DateTime<Utc>,
    top_k: usize,

    successful_sources: u64,
    error_sources: u64,
    total_lines: u64,
    parsed_lines: u64,
    error_lines: u64,
    level_stats: BTreeMap<String, u64>,
    type_stats: BTreeMap<String, u64>,

    // (per-source rank, stat) so ties can be broken without arrival order
    errors: Vec<(usize, ErrorStat)>,
    results: Vec<SourceResult>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self::starting_at(Instant::now(), Utc::now())
    }

    /// Duration is measured from `started`, normally the pipeline start.
    pub fn starting_at(started: Instant, start_time: DateTime<Utc>) -> Self {
        Self {
            started,
            start_time,
            top_k: DEFAULT_TOP_ERRORS,
            successful_sources: 0,
            error_sources: 0,
            total_lines: 0,
            parsed_lines: 0,
            error_lines: 0,
            level_stats: BTreeMap::new(),
            type_stats: BTreeMap::new(),
            errors: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn add(&mut self, result: SourceResult) {
        // Any terminal error: counted as failed, statistics stay in the source result only
        if result.is_failed() {
            self.error_sources += 1;
            self.results.push(result);
            return;
        }
        self.successful_sources += 1;

        self.total_lines += result.total_lines;
        self.parsed_lines += result.parsed_lines;
        self.error_lines += result.error_lines;
        merge_counts(&mut self.level_stats, &result.level_stats);
        *self.type_stats.entry(result.source_type.to_string()).or_insert(0) += result.total_lines;

        self.errors.extend(result.errors.iter().cloned().enumerate());
        self.results.push(result);
    }

    /// Combine two partial accumulators. The earlier start wins.
    pub fn merge(mut self, other: Aggregator) -> Self {
        if other.started < self.started {
            self.started = other.started;
            self.start_time = other.start_time;
        }
        self.successful_sources += other.successful_sources;
        self.error_sources += other.error_sources;
        self.total_lines += other.total_lines;
        self.parsed_lines += other.parsed_lines;
        self.error_lines += other.error_lines;
        merge_counts(&mut self.level_stats, &other.level_stats);
        merge_counts(&mut self.type_stats, &other.type_stats);
        self.errors.extend(other.errors);
        self.results.extend(other.results);
        self
    }

    /// Rank errors by count, ties by source id then per-source rank, and keep the top K.
    pub fn finalize(self) -> GlobalResult {
        let Aggregator {
            started,
            start_time,
            top_k,
            successful_sources,
            error_sources,
            total_lines,
            parsed_lines,
            error_lines,
            level_stats,
            type_stats,
            mut errors,
            mut results,
        } = self;

        errors.sort_by(|(rank_a, a), (rank_b, b)| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.source_id.cmp(&b.source_id))
                .then_with(|| rank_a.cmp(rank_b))
        });
        errors.truncate(top_k);
        results.sort_by(|a, b| a.source_id.cmp(&b.source_id));

        let analysis_duration = started.elapsed();
        debug!(
            sources = results.len(),
            lines = total_lines,
            elapsed_ms = analysis_duration.as_millis() as u64,
            "aggregation finalized"
        );

        GlobalResult {
            total_sources: successful_sources + error_sources,
            successful_sources,
            error_sources,
            total_lines,
            parsed_lines,
            error_lines,
            level_stats,
            type_stats,
            top_errors: errors.into_iter().map(|(_, stat)| stat).collect(),
            source_results: results,
            analysis_duration,
            start_time,
        }
    }
}

fn merge_counts(into: &mut BTreeMap<String, u64>, from: &BTreeMap<String, u64>) {
    for (key, count) in from {
        *into.entry(key.clone()).or_insert(0) += count;
    }
}

/// Fold `results` into a finalized summary timed from `started`.
pub fn reduce<I>(results: I, started: Instant) -> GlobalResult
where
    I: IntoIterator<Item = SourceResult>,
{
    let elapsed = chrono::Duration::from_std(started.elapsed()).unwrap_or(chrono::Duration::zero());
    results
        .into_iter()
        .fold(Aggregator::starting_at(started, Utc::now() - elapsed), |mut acc, result| {
            acc.add(result);
            acc
        })
        .finalize()
}
