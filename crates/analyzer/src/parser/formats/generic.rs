use std::sync::LazyLock;
use regex::Regex;

use crate::parser::model::check_line;
use crate::parser::level::resolve_level;
use crate::parser::timestamp::{parse_timestamp, Layout};
use crate::parser::traits::*;
use super::{best_effort, layout};

/// `2024-01-01 10:00:00 [LEVEL] message`, brackets optional
static GENERIC_LINE: LazyLock<Regex> = LazyLock::new(|| {
    layout(r"^(\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2})\s+\[?(\w+)\]?\s+(.+)$")
});

/// Generic `timestamp LEVEL message` parser, also used for undeclared types.
///
/// Under the lenient policy every non-empty line yields a record.
pub struct GenericParser {
    dialect: Dialect,
    policy: ParsePolicy,
}

impl GenericParser {
    pub fn new(dialect: Dialect, policy: ParsePolicy) -> Self {
        Self { dialect, policy }
    }
}

impl LogParser for GenericParser {
    fn parse(&self, line: &str, line_number: usize) -> Result<LogRecord, ParseError> {
        let line = check_line(line)?;

        let Some(caps) = GENERIC_LINE.captures(line) else {
            return best_effort(line, line_number, self.dialect, self.policy);
        };

        let timestamp = parse_timestamp(&caps[1], Layout::Generic, self.policy)?;

        // The second word is only a level if it is a level word; otherwise it
        // belongs to the message.
        let (level, message) = match Level::from_token(&caps[2]) {
            Some(level) => (level, caps[3].to_string()),
            None => {
                let rest = line[caps.get(1).map_or(0, |m| m.end())..].trim_start();
                (resolve_level(&caps[2], rest, self.policy)?, rest.to_string())
            }
        };

        Ok(LogRecord::new(timestamp, level, message, self.dialect, line_number))
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }
}
