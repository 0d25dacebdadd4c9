use std::sync::LazyLock;
use regex::Regex;

use crate::parser::model::check_line;
use crate::parser::level::resolve_level;
use crate::parser::timestamp::{parse_timestamp, Layout};
use crate::parser::traits::*;
use super::layout;

/// MySQL 5.7+: `2024-01-01T10:00:00.123456Z 12 [Warning] message`
static MYSQL_THREADED: LazyLock<Regex> = LazyLock::new(|| {
    layout(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+Z)\s+(\d+)\s+\[(\w+)\]\s+(.+)$")
});

/// Older servers: `2024-01-01 10:00:00 [ERROR] message`
static MYSQL_SIMPLE: LazyLock<Regex> = LazyLock::new(|| {
    layout(r"^(\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2})\s+\[(\w+)\]\s+(.+)$")
});

/// Parser for MySQL error logs. Side field: `thread` (threaded layout only).
pub struct MysqlErrorParser {
    policy: ParsePolicy,
}

impl MysqlErrorParser {
    pub fn new(policy: ParsePolicy) -> Self {
        Self { policy }
    }
}

impl LogParser for MysqlErrorParser {
    fn parse(&self, line: &str, line_number: usize) -> Result<LogRecord, ParseError> {
        let line = check_line(line)?;

        if let Some(caps) = MYSQL_THREADED.captures(line) {
            let timestamp = parse_timestamp(&caps[1], Layout::Rfc3339, self.policy)?;
            let level = resolve_level(&caps[3], &caps[4], self.policy)?;
            return Ok(
                LogRecord::new(timestamp, level, &caps[4], Dialect::MysqlError, line_number)
                    .with_field("thread", &caps[2]),
            );
        }

        let caps = MYSQL_SIMPLE
            .captures(line)
            .ok_or(ParseError::InvalidFormat(Dialect::MysqlError))?;
        let timestamp = parse_timestamp(&caps[1], Layout::Generic, self.policy)?;
        let level = resolve_level(&caps[2], &caps[3], self.policy)?;

        Ok(LogRecord::new(timestamp, level, &caps[3], Dialect::MysqlError, line_number))
    }

    fn dialect(&self) -> Dialect {
        Dialect::MysqlError
    }
}
