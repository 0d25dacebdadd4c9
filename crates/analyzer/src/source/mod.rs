//! Source: one configured log file and the analysis of it.

pub mod spec;
pub mod result;
pub mod analyze;

pub use spec::SourceSpec;
pub use result::{ErrorStat, SourceError, SourceResult};
pub use analyze::{analyze, AnalyzeOptions, HourBasis};
