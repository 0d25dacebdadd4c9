use serde_json::{Map, Value};

use crate::parser::model::check_line;
use crate::parser::level::resolve_level;
use crate::parser::timestamp::{fallback_timestamp, parse_timestamp, Layout};
use crate::parser::traits::*;

/// Keys lifted into the record itself rather than the side fields.
const RESERVED_KEYS: [&str; 4] = ["timestamp", "level", "message", "msg"];

/// Parser for one-object-per-line JSON logs.
///
/// `timestamp` is read as RFC 3339, `level` defaults to `INFO` when absent and
/// the message comes from `message`, falling back to `msg`. Every other key
/// becomes a side field; non-string values keep their JSON text.
pub struct JsonParser {
    policy: ParsePolicy,
}

impl JsonParser {
    pub fn new(policy: ParsePolicy) -> Self {
        Self { policy }
    }
}

impl LogParser for JsonParser {
    fn parse(&self, line: &str, line_number: usize) -> Result<LogRecord, ParseError> {
        let line = check_line(line)?;

        let obj: Map<String, Value> = serde_json::from_str(line)
            .map_err(|e| ParseError::InvalidJson(e.to_string()))?;

        let timestamp = match obj.get("timestamp").and_then(Value::as_str) {
            Some(raw) => parse_timestamp(raw, Layout::Rfc3339, self.policy)?,
            None => fallback_timestamp("<missing>", self.policy)?,
        };

        let message = ["message", "msg"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();

        let level = match obj.get("level").and_then(Value::as_str) {
            Some(token) => resolve_level(token, token, self.policy)?,
            None => Level::Info,
        };

        let mut record = LogRecord::new(timestamp, level, message, Dialect::Json, line_number);
        record.fields = obj
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), stringify(value)))
            .collect();

        Ok(record)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Json
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_full_object() {
        let parser = JsonParser::new(ParsePolicy::Strict);
        let line = r#"{"timestamp":"2024-03-01T12:34:56Z","level":"error","message":"upstream timeout","service":"api","status":504,"retry":true}"#;
        let record = parser.parse(line, 1).unwrap();
        assert_eq!(record.level, Level::Error);
        assert_eq!(record.message, "upstream timeout");
        assert_eq!(record.timestamp.hour(), 12);
        assert_eq!(record.field("service"), Some("api"));
        assert_eq!(record.field("status"), Some("504"));
        assert_eq!(record.field("retry"), Some("true"));
        assert_eq!(record.field("level"), None);
        assert_eq!(record.field("timestamp"), None);
        assert_eq!(record.fields.len(), 3);
    }

    #[test]
    fn test_msg_key_and_default_level() {
        let parser = JsonParser::new(ParsePolicy::Lenient);
        let record = parser.parse(r#"{"msg":"started","pid":12}"#, 2).unwrap();
        assert_eq!(record.message, "started");
        assert_eq!(record.level, Level::Info);
        assert_eq!(record.field("msg"), None);
        assert_eq!(record.field("pid"), Some("12"));
    }

    #[test]
    fn test_nested_values_keep_json_text() {
        let parser = JsonParser::new(ParsePolicy::Lenient);
        let record = parser
            .parse(r#"{"level":"warn","message":"slow","ctx":{"ms":1200}}"#, 1)
            .unwrap();
        assert_eq!(record.field("ctx"), Some(r#"{"ms":1200}"#));
    }

    #[test]
    fn test_malformed_json_fails() {
        let parser = JsonParser::new(ParsePolicy::Lenient);
        assert!(matches!(parser.parse("{not json", 1), Err(ParseError::InvalidJson(_))));
        assert!(matches!(parser.parse("[1,2,3]", 1), Err(ParseError::InvalidJson(_))));
    }

    #[test]
    fn test_missing_timestamp_follows_policy() {
        let line = r#"{"level":"info","message":"tick"}"#;
        assert!(JsonParser::new(ParsePolicy::Lenient).parse(line, 1).is_ok());
        assert!(matches!(
            JsonParser::new(ParsePolicy::Strict).parse(line, 1),
            Err(ParseError::InvalidTimestamp(_))
        ));
    }
}
