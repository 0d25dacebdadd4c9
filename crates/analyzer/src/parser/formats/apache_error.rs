use std::sync::LazyLock;
use regex::Regex;

use crate::parser::model::check_line;
use crate::parser::level::resolve_level;
use crate::parser::timestamp::{parse_timestamp, Layout};
use crate::parser::traits::*;
use super::layout;

/// `[Sun Oct 12 14:32:52.123456 2025] [level] [process] message`
static APACHE_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    layout(r"^\[([^\]]+)\] \[([^\]]+)\] \[([^\]]+)\] (.+)$")
});

/// Parser for Apache error logs. Side field: `process`.
///
/// Apache 2.4 writes the level as `module:level` (e.g. `core:error`); only the
/// level part is kept.
pub struct ApacheErrorParser {
    policy: ParsePolicy,
}

impl ApacheErrorParser {
    pub fn new(policy: ParsePolicy) -> Self {
        Self { policy }
    }
}

impl LogParser for ApacheErrorParser {
    fn parse(&self, line: &str, line_number: usize) -> Result<LogRecord, ParseError> {
        let line = check_line(line)?;

        let caps = APACHE_ERROR
            .captures(line)
            .ok_or(ParseError::InvalidFormat(Dialect::ApacheError))?;

        let timestamp = parse_timestamp(&caps[1], Layout::ApacheError, self.policy)?;

        let token = caps[2].rsplit(':').next().unwrap_or(&caps[2]);
        let level = resolve_level(token, &caps[4], self.policy)?;

        Ok(LogRecord::new(timestamp, level, &caps[4], Dialect::ApacheError, line_number)
            .with_field("process", &caps[3]))
    }

    fn dialect(&self) -> Dialect {
        Dialect::ApacheError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_apache_24_line() {
        let parser = ApacheErrorParser::new(ParsePolicy::Strict);
        let line = "[Sun Oct 12 14:32:52.123456 2025] [core:error] [pid 1234:tid 5678] AH00037: Symbolic link not allowed";
        let record = parser.parse(line, 1).unwrap();
        assert_eq!(record.level, Level::Error);
        assert_eq!(record.timestamp.hour(), 14);
        assert_eq!(record.field("process"), Some("pid 1234:tid 5678"));
        assert_eq!(record.message, "AH00037: Symbolic link not allowed");
    }

    #[test]
    fn test_parse_apache_22_line() {
        let parser = ApacheErrorParser::new(ParsePolicy::Lenient);
        let line = "[Sun Oct 12 14:32:52 2025] [warn] [client 10.0.0.4] mod_fcgid: stderr: deprecated";
        let record = parser.parse(line, 2).unwrap();
        assert_eq!(record.level, Level::Warn);
        assert_eq!(record.field("process"), Some("client 10.0.0.4"));
    }

    #[test]
    fn test_rejects_missing_brackets() {
        let parser = ApacheErrorParser::new(ParsePolicy::Lenient);
        assert_eq!(
            parser.parse("[Sun Oct 12 14:32:52 2025] error: oops", 1).unwrap_err(),
            ParseError::InvalidFormat(Dialect::ApacheError)
        );
    }
}
