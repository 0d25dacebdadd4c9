/// Individual dialect parsers

pub mod generic;
pub mod access;
pub mod nginx_error;
pub mod apache_error;
pub mod mysql;
pub mod custom_app;
pub mod json;

// Re-export parser implementations
pub use generic::GenericParser;
pub use access::AccessLogParser;
pub use nginx_error::NginxErrorParser;
pub use apache_error::ApacheErrorParser;
pub use mysql::MysqlErrorParser;
pub use custom_app::CustomAppParser;
pub use json::JsonParser;

use chrono::Utc;
use regex::Regex;

use crate::parser::traits::*;

/// Compile one of the fixed layout patterns.
pub(crate) fn layout(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in layout pattern must compile")
}

/// Record for a line that matched no layout of a lenient dialect: the raw
/// line becomes the message and the level is sniffed from it.
pub(crate) fn best_effort(
    line: &str,
    line_number: usize,
    dialect: Dialect,
    policy: ParsePolicy,
) -> Result<LogRecord, ParseError> {
    match policy {
        ParsePolicy::Lenient => Ok(LogRecord::new(
            Utc::now(),
            Level::sniff(line),
            line,
            dialect,
            line_number,
        )),
        ParsePolicy::Strict => Err(ParseError::InvalidFormat(dialect)),
    }
}
