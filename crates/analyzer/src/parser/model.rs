use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use chrono::{DateTime, Utc};
use crate::serde_utils::serialize_fields_as_map;
use super::level::Level;
use super::MAX_LINE_SIZE;

/// Log line dialects understood by the analyzer.
///
/// A source declares its dialect through the `type` key of the source list.
/// Any type string not listed here maps to [`Dialect::Unknown`], which is
/// parsed with the generic layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dialect {
    /// Nginx combined access log
    NginxAccess,
    /// Apache common access log
    ApacheAccess,
    /// Nginx error log
    NginxError,
    /// Apache error log
    ApacheError,
    /// MySQL server error log
    MysqlError,
    /// `[timestamp] LEVEL component: message` application logs
    CustomApp,
    /// One JSON object per line
    Json,
    /// `timestamp LEVEL message`
    Generic,
    /// Undeclared or unrecognised type
    Unknown,
}

impl Dialect {
    /// Every dialect with a type string of its own.
    pub const KNOWN: [Dialect; 8] = [
        Dialect::NginxAccess,
        Dialect::ApacheAccess,
        Dialect::NginxError,
        Dialect::ApacheError,
        Dialect::MysqlError,
        Dialect::CustomApp,
        Dialect::Json,
        Dialect::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::NginxAccess => "nginx-access",
            Dialect::ApacheAccess => "apache-access",
            Dialect::NginxError => "nginx-error",
            Dialect::ApacheError => "apache-error",
            Dialect::MysqlError => "mysql-error",
            Dialect::CustomApp => "custom-app",
            Dialect::Json => "json",
            Dialect::Generic => "generic",
            Dialect::Unknown => "unknown",
        }
    }

    /// Resolve a declared type string. Matching ignores case and surrounding
    /// whitespace; anything unrecognised is `Unknown`.
    pub fn from_type(declared: &str) -> Self {
        let declared = declared.trim();
        Self::KNOWN
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(declared))
            .unwrap_or(Dialect::Unknown)
    }

    /// Web-style dialects derive their level from the HTTP status code.
    pub fn is_status_coded(&self) -> bool {
        matches!(self, Dialect::NginxAccess | Dialect::ApacheAccess)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Dialect {
    fn from(declared: &str) -> Self {
        Dialect::from_type(declared)
    }
}

impl Serialize for Dialect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Dialect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let declared = String::deserialize(deserializer)?;
        Ok(Dialect::from_type(&declared))
    }
}

/// How parsers treat lines that only partially match their layout.
///
/// `Lenient` keeps such lines countable: an unparseable timestamp becomes the
/// current wall-clock time and generic/custom lines that match no layout become
/// a best-effort record with a sniffed level. `Strict` rejects both, which keeps
/// the hourly histogram exact at the cost of more failed lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    #[default]
    Lenient,
    Strict,
}

impl ParsePolicy {
    pub fn is_lenient(&self) -> bool {
        matches!(self, ParsePolicy::Lenient)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty line")]
    EmptyLine,

    #[error("Line too large: {0} bytes (max: {1} bytes)")]
    LineTooLarge(usize, usize),

    #[error("Invalid {0} format")]
    InvalidFormat(Dialect),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("Unknown level: {0:?}")]
    UnknownLevel(String),
}

/// One successfully parsed line.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// Timestamp carried by the line (or the parse time under the lenient policy)
    pub timestamp: DateTime<Utc>,

    pub level: Level,

    pub message: String,

    pub dialect: Dialect,

    /// Dialect-specific side fields (status code, pid, thread id, ...)
    #[serde(serialize_with = "serialize_fields_as_map")]
    pub fields: Vec<(String, String)>,

    /// 1-based position of the line in its source
    pub line_number: usize,
}

impl LogRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        level: Level,
        message: impl Into<String>,
        dialect: Dialect,
        line_number: usize,
    ) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
            dialect,
            fields: Vec::new(),
            line_number,
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    /// Look up a side field by name.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Reject lines no dialect can use. Returns the line with its trailing
/// whitespace removed.
pub(crate) fn check_line(line: &str) -> Result<&str, ParseError> {
    // SECURITY: bound per-line regex work
    if line.len() > MAX_LINE_SIZE {
        return Err(ParseError::LineTooLarge(line.len(), MAX_LINE_SIZE));
    }
    let trimmed = line.trim_end();
    if trimmed.trim_start().is_empty() {
        return Err(ParseError::EmptyLine);
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_type() {
        assert_eq!(Dialect::from_type("nginx-access"), Dialect::NginxAccess);
        assert_eq!(Dialect::from_type(" MySQL-Error "), Dialect::MysqlError);
        assert_eq!(Dialect::from_type("json"), Dialect::Json);
        assert_eq!(Dialect::from_type("generic"), Dialect::Generic);
        assert_eq!(Dialect::from_type("windows-event"), Dialect::Unknown);
        assert_eq!(Dialect::from_type(""), Dialect::Unknown);
    }

    #[test]
    fn test_dialect_round_trips_through_its_type_string() {
        for dialect in Dialect::KNOWN {
            assert_eq!(Dialect::from_type(dialect.as_str()), dialect);
        }
    }

    #[test]
    fn test_dialect_serde_uses_type_string() {
        let json = serde_json::to_string(&Dialect::ApacheError).unwrap();
        assert_eq!(json, "\"apache-error\"");

        let parsed: Dialect = serde_json::from_str("\"something-else\"").unwrap();
        assert_eq!(parsed, Dialect::Unknown);
    }

    #[test]
    fn test_status_coded_dialects() {
        assert!(Dialect::NginxAccess.is_status_coded());
        assert!(Dialect::ApacheAccess.is_status_coded());
        assert!(!Dialect::NginxError.is_status_coded());
        assert!(!Dialect::Json.is_status_coded());
    }

    #[test]
    fn test_parse_policy_default_is_lenient() {
        assert_eq!(ParsePolicy::default(), ParsePolicy::Lenient);
        let strict: ParsePolicy = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(strict, ParsePolicy::Strict);
    }

    #[test]
    fn test_check_line() {
        assert_eq!(check_line("hello  \r"), Ok("hello"));
        assert_eq!(check_line("   "), Err(ParseError::EmptyLine));
        assert_eq!(check_line(""), Err(ParseError::EmptyLine));

        let oversized = "x".repeat(MAX_LINE_SIZE + 1);
        assert!(matches!(check_line(&oversized), Err(ParseError::LineTooLarge(_, _))));
    }

    #[test]
    fn test_record_fields() {
        let record = LogRecord::new(Utc::now(), Level::Info, "ok", Dialect::NginxError, 3)
            .with_field("pid", "42")
            .with_field("tid", "7");
        assert_eq!(record.field("pid"), Some("42"));
        assert_eq!(record.field("tid"), Some("7"));
        assert_eq!(record.field("missing"), None);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fields"]["pid"], "42");
        assert_eq!(json["level"], "INFO");
        assert_eq!(json["dialect"], "nginx-error");
    }
}
