//! Analyze: drive a dialect parser over one source, line by line.
//!
//! Blocking: callers on an async runtime run this on a blocking thread.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::time::{Duration, Instant};
use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::parser::{self, Level, LogRecord, ParseError, ParsePolicy, MAX_LINE_SIZE};
use super::result::{ErrorTally, SourceError, SourceResult};
use super::spec::SourceSpec;

/// Clock the hour-of-day histogram is read in. Fixed for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HourBasis {
    #[default]
    Utc,
    Local,
}

impl HourBasis {
    fn hour_of(&self, record: &LogRecord) -> u32 {
        match self {
            HourBasis::Utc => record.timestamp.hour(),
            HourBasis::Local => record.timestamp.with_timezone(&Local).hour(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Only records at this level are counted as parsed
    pub level_filter: Option<Level>,
    pub policy: ParsePolicy,
    pub hour_basis: HourBasis,
    /// Stop scanning once this much time has passed (checked between lines)
    pub deadline: Option<Duration>,
}

/// Analyze one source. Never fails: access and read errors end up in the
/// result's terminal `error`.
pub fn analyze(spec: &SourceSpec, options: &AnalyzeOptions) -> SourceResult {
    let started = Instant::now();

    let file = match open_source(&spec.path) {
        Ok(file) => file,
        Err(e) => {
            warn!(source_id = %spec.id, error = %e, "source not analyzed");
            return SourceResult::failed(spec, e, started.elapsed());
        }
    };

    debug!(source_id = %spec.id, path = %spec.path.display(), dialect = %spec.dialect, "analyzing source");

    let mut result = scan(spec, BufReader::new(file), options, started);
    result.duration = started.elapsed();

    debug!(
        source_id = %spec.id,
        total = result.total_lines,
        parsed = result.parsed_lines,
        failed = result.error_lines,
        elapsed_ms = result.duration.as_millis() as u64,
        "source analyzed"
    );

    result
}

/// Drive the dialect parser over `reader` until end of input, a read error
/// or the deadline. Statistics gathered before a stop are kept.
fn scan<R: BufRead>(spec: &SourceSpec, mut reader: R, options: &AnalyzeOptions, started: Instant) -> SourceResult {
    let parser = parser::parser_for(spec.dialect, options.policy);
    let mut result = SourceResult::new(spec);
    let mut tally = ErrorTally::default();
    let mut buf = Vec::with_capacity(256);

    loop {
        if let Some(deadline) = options.deadline {
            if started.elapsed() >= deadline {
                warn!(source_id = %spec.id, lines = result.total_lines, "source deadline exceeded");
                result.error = Some(SourceError::Timeout(deadline));
                break;
            }
        }

        let read = match read_bounded_line(&mut reader, &mut buf) {
            Ok(read) => read,
            Err(e) => {
                warn!(source_id = %spec.id, error = %e, "read failed mid-scan");
                result.error = Some(SourceError::MidRead {
                    line: result.total_lines,
                    reason: e.to_string(),
                });
                break;
            }
        };

        let parsed = match read {
            LineRead::Eof => break,
            LineRead::TooLarge(size) => {
                result.total_lines += 1;
                Err(ParseError::LineTooLarge(size, MAX_LINE_SIZE))
            }
            LineRead::Line => {
                result.total_lines += 1;
                let line = String::from_utf8_lossy(&buf);
                parser.parse(&line, result.total_lines as usize)
            }
        };

        let record = match parsed {
            Ok(record) => record,
            Err(e) => {
                trace!(source_id = %spec.id, line = result.total_lines, error = %e, "line skipped");
                result.error_lines += 1;
                continue;
            }
        };

        if options.level_filter.is_some_and(|wanted| wanted != record.level) {
            continue;
        }

        result.record(record.level, options.hour_basis.hour_of(&record));
        tally.observe(&record);
    }

    result.errors = tally.into_ranked(&spec.id);
    result
}

enum LineRead {
    Eof,
    /// `buf` holds the line without its terminator
    Line,
    /// Line exceeded the size limit and was skipped; carries its length
    TooLarge(usize),
}

/// Read one line into `buf`, holding at most `MAX_LINE_SIZE` bytes of it in memory.
fn read_bounded_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<LineRead> {
    buf.clear();
    // content plus "\r\n"
    let limit = MAX_LINE_SIZE as u64 + 2;
    let n = reader.by_ref().take(limit).read_until(b'\n', buf)?;
    if n == 0 {
        return Ok(LineRead::Eof);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        return Ok(LineRead::Line);
    }

    if (n as u64) < limit {
        // final line without terminator
        return Ok(LineRead::Line);
    }

    let rest = discard_line(reader)?;
    buf.clear();
    Ok(LineRead::TooLarge(n + rest))
}

/// Skip input up to and including the next newline. Returns the bytes skipped.
fn discard_line<R: BufRead>(reader: &mut R) -> io::Result<usize> {
    let mut skipped = 0;
    loop {
        let (found, used) = {
            let available = match reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(skipped);
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (true, i + 1),
                None => (false, available.len()),
            }
        };
        reader.consume(used);
        skipped += used;
        if found {
            return Ok(skipped);
        }
    }
}

fn open_source(path: &Path) -> Result<File, SourceError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
        _ => SourceError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    if metadata.is_dir() {
        return Err(SourceError::IsDirectory(path.to_path_buf()));
    }

    File::open(path).map_err(|e| SourceError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
