use std::sync::LazyLock;
use regex::Regex;

use crate::parser::model::check_line;
use crate::parser::timestamp::{parse_timestamp, Layout};
use crate::parser::traits::*;
use super::layout;

/// Combined Log Format: `ip ident user [time] "request" status size "referer" "user-agent"`
static NGINX_ACCESS: LazyLock<Regex> = LazyLock::new(|| {
    layout(r#"^(\S+) \S+ \S+ \[([^\]]+)\] "([^"]*)" (\d+) (\S+) "([^"]*)" "([^"]*)""#)
});

/// Common Log Format: `ip ident user [time] "request" status size`
static APACHE_ACCESS: LazyLock<Regex> = LazyLock::new(|| {
    layout(r#"^(\S+) \S+ \S+ \[([^\]]+)\] "([^"]*)" (\d+) (\S+)"#)
});

/// Parser for web-server access logs.
///
/// Access lines carry no level token; the level comes from the status code
/// (see [`Level::from_status`]). The message is `"<ip> <request> -> <status>"`.
pub struct AccessLogParser {
    dialect: Dialect,
    pattern: &'static LazyLock<Regex>,
    policy: ParsePolicy,
}

impl AccessLogParser {
    pub fn nginx(policy: ParsePolicy) -> Self {
        Self {
            dialect: Dialect::NginxAccess,
            pattern: &NGINX_ACCESS,
            policy,
        }
    }

    pub fn apache(policy: ParsePolicy) -> Self {
        Self {
            dialect: Dialect::ApacheAccess,
            pattern: &APACHE_ACCESS,
            policy,
        }
    }
}

impl LogParser for AccessLogParser {
    fn parse(&self, line: &str, line_number: usize) -> Result<LogRecord, ParseError> {
        let line = check_line(line)?;

        let caps = self
            .pattern
            .captures(line)
            .ok_or(ParseError::InvalidFormat(self.dialect))?;

        let timestamp = parse_timestamp(&caps[2], Layout::CommonLog, self.policy)?;

        let status: u32 = caps[4]
            .parse()
            .map_err(|_| ParseError::InvalidFormat(self.dialect))?;

        let ip = &caps[1];
        let request = &caps[3];
        let mut record = LogRecord::new(
            timestamp,
            Level::from_status(status),
            format!("{} {} -> {}", ip, request, status),
            self.dialect,
            line_number,
        )
        .with_field("ip", ip)
        .with_field("request", request)
        .with_field("status", &caps[4])
        .with_field("size", &caps[5]);

        if let (Some(referer), Some(user_agent)) = (caps.get(6), caps.get(7)) {
            record = record
                .with_field("referer", referer.as_str())
                .with_field("user_agent", user_agent.as_str());
        }

        Ok(record)
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }
}
