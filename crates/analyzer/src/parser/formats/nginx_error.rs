use std::sync::LazyLock;
use regex::Regex;

use crate::parser::model::check_line;
use crate::parser::level::resolve_level;
use crate::parser::timestamp::{parse_timestamp, Layout};
use crate::parser::traits::*;
use super::layout;

/// `2024/01/01 10:00:00 [level] pid#tid: message`
static NGINX_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    layout(r"^(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}) \[(\w+)\] (\d+)#(\d+): (.+)$")
});

/// Parser for nginx error logs. Side fields: `pid`, `tid`.
pub struct NginxErrorParser {
    policy: ParsePolicy,
}

impl NginxErrorParser {
    pub fn new(policy: ParsePolicy) -> Self {
        Self { policy }
    }
}

impl LogParser for NginxErrorParser {
    fn parse(&self, line: &str, line_number: usize) -> Result<LogRecord, ParseError> {
        let line = check_line(line)?;

        let caps = NGINX_ERROR
            .captures(line)
            .ok_or(ParseError::InvalidFormat(Dialect::NginxError))?;

        let timestamp = parse_timestamp(&caps[1], Layout::NginxError, self.policy)?;
        let level = resolve_level(&caps[2], &caps[5], self.policy)?;

        Ok(LogRecord::new(timestamp, level, &caps[5], Dialect::NginxError, line_number)
            .with_field("pid", &caps[3])
            .with_field("tid", &caps[4]))
    }

    fn dialect(&self) -> Dialect {
        Dialect::NginxError
    }
}
