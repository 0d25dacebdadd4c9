//! Level: the closed level vocabulary and the rules that derive a level
//! from a token, an HTTP status code, or a whole line.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use super::model::{ParseError, ParsePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    /// Order in which [`Level::sniff`] looks for level words.
    const SNIFF_ORDER: [Level; 6] = [
        Level::Fatal,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Levels whose messages are tallied as errors.
    pub fn is_error(&self) -> bool {
        matches!(self, Level::Error | Level::Fatal)
    }

    /// Normalize a level token as written by a log producer.
    ///
    /// Aliases from syslog-style severities fold into the six canonical
    /// levels. Returns `None` for words that are not levels.
    pub fn from_token(token: &str) -> Option<Self> {
        let upper = token.trim().to_ascii_uppercase();
        let level = match upper.as_str() {
            "TRACE" => Level::Trace,
            "DEBUG" => Level::Debug,
            "INFO" | "NOTICE" | "NOTE" | "SYSTEM" => Level::Info,
            "WARN" | "WARNING" => Level::Warn,
            "ERROR" | "ERR" => Level::Error,
            "FATAL" | "CRIT" | "CRITICAL" | "ALERT" | "EMERG" | "EMERGENCY" | "PANIC"
            | "SEVERE" => Level::Fatal,
            _ => return None,
        };
        Some(level)
    }

    /// Web dialects carry no level token: 5xx and above is an error, 4xx a
    /// warning, anything else informational.
    pub fn from_status(status: u32) -> Self {
        if status >= 500 {
            Level::Error
        } else if status >= 400 {
            Level::Warn
        } else {
            Level::Info
        }
    }

    /// Guess a level by scanning a line for level words, most severe first.
    /// Defaults to `INFO` when none is present.
    pub fn sniff(line: &str) -> Self {
        let upper = line.to_ascii_uppercase();
        Self::SNIFF_ORDER
            .into_iter()
            .find(|level| upper.contains(level.as_str()))
            .unwrap_or(Level::Info)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::from_token(s).ok_or_else(|| ParseError::UnknownLevel(s.to_string()))
    }
}

/// Resolve a captured level token. Unknown tokens are sniffed from `context`
/// under the lenient policy and rejected under the strict one.
pub(crate) fn resolve_level(
    token: &str,
    context: &str,
    policy: ParsePolicy,
) -> Result<Level, ParseError> {
    match Level::from_token(token) {
        Some(level) => Ok(level),
        None if policy.is_lenient() => Ok(Level::sniff(context)),
        None => Err(ParseError::UnknownLevel(token.to_string())),
    }
}
