use std::sync::LazyLock;
use regex::Regex;

use crate::parser::model::check_line;
use crate::parser::level::resolve_level;
use crate::parser::timestamp::{parse_timestamp, Layout};
use crate::parser::traits::*;
use super::{best_effort, layout};

/// `[2024-01-01 10:00:00] LEVEL component: message`
static CUSTOM_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    layout(r"^\[([^\]]+)\]\s+(\w+)\s+([^:]+):\s+(.+)$")
});

/// `2024-01-01 10:00:00 LEVEL message`
static CUSTOM_SIMPLE: LazyLock<Regex> = LazyLock::new(|| {
    layout(r"^(\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2})\s+(\w+)\s+(.+)$")
});

/// Parser for application logs in the in-house layout.
///
/// Tries the component layout, then the simple layout, then falls back to a
/// best-effort record under the lenient policy.
pub struct CustomAppParser {
    policy: ParsePolicy,
}

impl CustomAppParser {
    pub fn new(policy: ParsePolicy) -> Self {
        Self { policy }
    }
}

impl LogParser for CustomAppParser {
    fn parse(&self, line: &str, line_number: usize) -> Result<LogRecord, ParseError> {
        let line = check_line(line)?;

        if let Some(caps) = CUSTOM_COMPONENT.captures(line) {
            let timestamp = parse_timestamp(&caps[1], Layout::Generic, self.policy)?;
            let level = resolve_level(&caps[2], &caps[4], self.policy)?;
            return Ok(
                LogRecord::new(timestamp, level, &caps[4], Dialect::CustomApp, line_number)
                    .with_field("component", caps[3].trim()),
            );
        }

        if let Some(caps) = CUSTOM_SIMPLE.captures(line) {
            let timestamp = parse_timestamp(&caps[1], Layout::Generic, self.policy)?;
            let level = resolve_level(&caps[2], &caps[3], self.policy)?;
            return Ok(LogRecord::new(timestamp, level, &caps[3], Dialect::CustomApp, line_number));
        }

        best_effort(line, line_number, Dialect::CustomApp, self.policy)
    }

    fn dialect(&self) -> Dialect {
        Dialect::CustomApp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_component_layout() {
        let parser = CustomAppParser::new(ParsePolicy::Strict);
        let record = parser
            .parse("[2024-05-01 17:45:00] ERROR billing: charge declined for order 991", 1)
            .unwrap();
        assert_eq!(record.level, Level::Error);
        assert_eq!(record.timestamp.hour(), 17);
        assert_eq!(record.field("component"), Some("billing"));
        assert_eq!(record.message, "charge declined for order 991");
    }

    #[test]
    fn test_parse_simple_layout() {
        let parser = CustomAppParser::new(ParsePolicy::Strict);
        let record = parser.parse("2024-05-01 17:45:00 DEBUG cache warmed", 2).unwrap();
        assert_eq!(record.level, Level::Debug);
        assert_eq!(record.message, "cache warmed");
        assert_eq!(record.field("component"), None);
    }

    #[test]
    fn test_fallback_follows_policy() {
        let line = "panic: runtime error: index out of range";
        let record = CustomAppParser::new(ParsePolicy::Lenient).parse(line, 3).unwrap();
        assert_eq!(record.level, Level::Error);
        assert_eq!(record.message, line);

        assert_eq!(
            CustomAppParser::new(ParsePolicy::Strict).parse(line, 3).unwrap_err(),
            ParseError::InvalidFormat(Dialect::CustomApp)
        );
    }
}
