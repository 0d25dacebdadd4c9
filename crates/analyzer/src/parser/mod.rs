/// Log line parsing and normalization module
///
/// Turns one raw text line into a normalized [`LogRecord`] using the parser
/// selected for the source's declared dialect.
///
/// # Architecture
///
/// - `traits.rs`: the `LogParser` strategy trait
/// - `model.rs`: dialects, records, parse policy and parse errors
/// - `level.rs`: the closed level vocabulary and level derivation rules
/// - `timestamp.rs`: dialect-fixed timestamp layouts
/// - `formats/`: one parser per dialect
///
/// Dialect selection is a closed `match` over [`Dialect`]; unrecognised types
/// fall back to the generic parser.

pub mod traits;
pub mod model;
pub mod level;
pub mod formats;
mod timestamp;

pub use traits::LogParser;
pub use model::{Dialect, LogRecord, ParseError, ParsePolicy};
pub use level::Level;

use formats::*;

// Constants
pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB

/// Build the parser for a dialect. Called once per source.
pub fn parser_for(dialect: Dialect, policy: ParsePolicy) -> Box<dyn LogParser> {
    match dialect {
        Dialect::NginxAccess => Box::new(AccessLogParser::nginx(policy)),
        Dialect::ApacheAccess => Box::new(AccessLogParser::apache(policy)),
        Dialect::NginxError => Box::new(NginxErrorParser::new(policy)),
        Dialect::ApacheError => Box::new(ApacheErrorParser::new(policy)),
        Dialect::MysqlError => Box::new(MysqlErrorParser::new(policy)),
        Dialect::CustomApp => Box::new(CustomAppParser::new(policy)),
        Dialect::Json => Box::new(JsonParser::new(policy)),
        Dialect::Generic | Dialect::Unknown => Box::new(GenericParser::new(dialect, policy)),
    }
}
