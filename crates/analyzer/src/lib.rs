// Module structure for the log analyzer core.

// Line parsing
pub mod parser;

// Per-source analysis and the worker pool around it
pub mod source;
pub mod dispatch;

// Reduction and the end-to-end driver
pub mod aggregate;
pub mod pipeline;

// Collaborators at the edges
pub mod conf;
pub mod report;

mod serde_utils;

pub use aggregate::{Aggregator, GlobalResult};
pub use parser::{Dialect, Level, LogRecord, ParsePolicy};
pub use pipeline::{PipelineError, PipelineOptions, SourceSelection};
pub use source::{AnalyzeOptions, ErrorStat, HourBasis, SourceError, SourceResult, SourceSpec};
