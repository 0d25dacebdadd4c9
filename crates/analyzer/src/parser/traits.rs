pub use super::model::{Dialect, LogRecord, ParseError, ParsePolicy};
pub use super::level::Level;

pub trait LogParser: Send + Sync {
    /// parse one raw line (without its line terminator) into a normalized record
    fn parse(&self, line: &str, line_number: usize) -> Result<LogRecord, ParseError>;
    fn dialect(&self) -> Dialect;
}
