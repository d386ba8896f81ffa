// Positional block-trace parsing

use serde::{Deserialize, Serialize};
use std::io::{self, BufRead};
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use crate::models::{ParseStats, SkipReason, TraceEvent};
use crate::utils::constants::{DEFAULT_ENTRY_CAP, MIN_TRACE_FIELDS};
use crate::utils::open_trace;
use crate::{log, log_warn};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ParseOptions {
    /// Stop after this many events have been accepted.
    pub entry_cap: usize,
    /// Zero-based column holding a 0/1 hit flag, if the trace carries one.
    pub hit_field: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            entry_cap: DEFAULT_ENTRY_CAP,
            hit_field: None,
        }
    }
}

pub fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn parse_int(field: &str) -> Result<i64, SkipReason> {
    i64::from_str(field).map_err(|_| SkipReason::BadInt)
}

fn parse_time(field: &str) -> Result<f64, SkipReason> {
    match f64::from_str(field) {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(SkipReason::BadFloat),
    }
}

fn parse_optional_int(fields: &[&str], idx: usize) -> Result<Option<i64>, SkipReason> {
    fields.get(idx).map(|f| parse_int(f)).transpose()
}

/// Parses one non-comment line into an event.
pub fn parse_trace_line(line: &str, options: &ParseOptions) -> Result<TraceEvent, SkipReason> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_TRACE_FIELDS {
        return Err(SkipReason::ShortLine);
    }

    let hit = match options.hit_field {
        Some(idx) => match parse_optional_int(&fields, idx)? {
            Some(0) => Some(false),
            Some(1) => Some(true),
            Some(_) => return Err(SkipReason::BadInt),
            None => None,
        },
        None => None,
    };

    Ok(TraceEvent {
        block_id: parse_int(fields[0])?,
        offset: parse_int(fields[1])?,
        size_bytes: parse_int(fields[2])?,
        timestamp: parse_time(fields[3])?,
        op: parse_int(fields[4])?,
        pipeline_id: parse_int(fields[5])?,
        namespace_id: parse_int(fields[6])?,
        user_id: parse_int(fields[7])?,
        shard_id: parse_optional_int(&fields, 8)?,
        op_count: parse_optional_int(&fields, 9)?,
        hit,
    })
}

/// Lazy, single-pass event stream over a line-oriented trace.
///
/// Bad lines are counted in [`ParseStats`] and skipped. A read error ends
/// the stream; it is reported by [`TraceReader::finish`].
pub struct TraceReader<R: BufRead> {
    reader: R,
    options: ParseOptions,
    stats: ParseStats,
    buf: Vec<u8>,
    error: Option<io::Error>,
    done: bool,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R, options: ParseOptions) -> Self {
        TraceReader {
            reader,
            options,
            stats: ParseStats::default(),
            buf: Vec::with_capacity(128),
            error: None,
            done: false,
        }
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Consumes the reader, returning the final counters or the read error
    /// that cut the stream short.
    pub fn finish(self) -> io::Result<ParseStats> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.stats),
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = TraceEvent;

    fn next(&mut self) -> Option<TraceEvent> {
        while !self.done {
            if self.stats.parsed >= self.options.entry_cap {
                // Only flag truncation when unread input remains.
                self.stats.cap_reached =
                    !matches!(self.reader.fill_buf(), Ok(rest) if rest.is_empty());
                self.done = true;
                break;
            }

            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    self.error = Some(e);
                    self.done = true;
                    break;
                }
            }

            self.stats.lines_seen += 1;
            let line = String::from_utf8_lossy(&self.buf);
            if is_blank_or_comment(&line) {
                self.stats.blank_or_comment += 1;
                continue;
            }

            match parse_trace_line(&line, &self.options) {
                Ok(event) => {
                    self.stats.parsed += 1;
                    return Some(event);
                }
                Err(reason) => self.stats.record_skip(reason),
            }
        }
        None
    }
}

/// Events collected from one trace together with the line counters.
#[derive(Debug, Clone)]
pub struct ParsedTrace {
    pub events: Vec<TraceEvent>,
    pub stats: ParseStats,
}

pub fn parse_trace<R: BufRead>(reader: R, options: &ParseOptions) -> io::Result<ParsedTrace> {
    let start_time = Instant::now();
    let mut trace_reader = TraceReader::new(reader, options.clone());
    let events: Vec<TraceEvent> = trace_reader.by_ref().collect();
    let stats = trace_reader.finish()?;

    log!(
        "Loaded {} entries, skipped {} lines (short: {}, bad int: {}, bad float: {}), {} blank/comment, {:.3}s",
        stats.parsed,
        stats.skipped(),
        stats.short_line,
        stats.bad_int,
        stats.bad_float,
        stats.blank_or_comment,
        start_time.elapsed().as_secs_f64()
    );
    if stats.cap_reached {
        log_warn!(
            "Entry cap of {} reached after {} lines; remaining input ignored",
            options.entry_cap,
            stats.lines_seen
        );
    }

    Ok(ParsedTrace { events, stats })
}

pub fn parse_trace_file(path: &Path, options: &ParseOptions) -> io::Result<ParsedTrace> {
    log!("Parsing trace file: {}", path.display());
    parse_trace(open_trace(path)?, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse_str(input: &str, options: &ParseOptions) -> ParsedTrace {
        parse_trace(Cursor::new(input.to_string()), options).unwrap()
    }

    #[test]
    fn test_parse_full_line() {
        let event =
            parse_trace_line("42 8192 4096 10.250 3 7 1 2 5 9", &ParseOptions::default()).unwrap();
        assert_eq!(event.block_id, 42);
        assert_eq!(event.offset, 8192);
        assert_eq!(event.size_bytes, 4096);
        assert_eq!(event.timestamp, 10.25);
        assert_eq!(event.op, 3);
        assert_eq!(event.pipeline_id, 7);
        assert_eq!(event.namespace_id, 1);
        assert_eq!(event.user_id, 2);
        assert_eq!(event.shard_id, Some(5));
        assert_eq!(event.op_count, Some(9));
        assert_eq!(event.hit, None);
    }

    #[test]
    fn test_optional_trailing_fields() {
        let options = ParseOptions::default();
        let eight = parse_trace_line("1 0 4096 1.0 0 0 0 0", &options).unwrap();
        assert_eq!(eight.shard_id, None);
        assert_eq!(eight.op_count, None);

        let nine = parse_trace_line("1 0 4096 1.0 0 0 0 0 4", &options).unwrap();
        assert_eq!(nine.shard_id, Some(4));
        assert_eq!(nine.op_count, None);
    }

    #[test]
    fn test_skip_reasons() {
        let options = ParseOptions::default();
        assert_eq!(
            parse_trace_line("1 0 4096 10.000 0", &options),
            Err(SkipReason::ShortLine)
        );
        assert_eq!(
            parse_trace_line("x 0 4096 10.000 0 0 0 0", &options),
            Err(SkipReason::BadInt)
        );
        assert_eq!(
            parse_trace_line("1 0 4096 ten 0 0 0 0", &options),
            Err(SkipReason::BadFloat)
        );
        assert_eq!(
            parse_trace_line("1 0 4096 inf 0 0 0 0", &options),
            Err(SkipReason::BadFloat)
        );
        assert_eq!(
            parse_trace_line("1 0 4096 1.0 0 0 0 0 shard", &options),
            Err(SkipReason::BadInt)
        );
    }

    #[test]
    fn test_hit_field() {
        let options = ParseOptions {
            hit_field: Some(10),
            ..Default::default()
        };
        let hit = parse_trace_line("1 0 4096 1.0 0 0 0 0 0 1 1", &options).unwrap();
        assert_eq!(hit.hit, Some(true));
        let miss = parse_trace_line("1 0 4096 1.0 0 0 0 0 0 1 0", &options).unwrap();
        assert_eq!(miss.hit, Some(false));
        let absent = parse_trace_line("1 0 4096 1.0 0 0 0 0", &options).unwrap();
        assert_eq!(absent.hit, None);
    }

    #[test]
    fn test_hit_flag_outside_zero_one_is_rejected() {
        let options = ParseOptions {
            hit_field: Some(8),
            ..Default::default()
        };
        assert_eq!(
            parse_trace_line("1 0 4096 1.0 0 0 0 0 9", &options),
            Err(SkipReason::BadInt)
        );
        assert_eq!(
            parse_trace_line("1 0 4096 1.0 0 0 0 0 -1", &options),
            Err(SkipReason::BadInt)
        );
        assert_eq!(
            parse_trace_line("1 0 4096 1.0 0 0 0 0 1", &options).map(|e| e.hit),
            Ok(Some(true))
        );
    }

    #[test]
    fn test_short_line_is_counted_not_emitted() {
        let parsed = parse_str(
            "1 0 4096 10.000 0\n1 0 4096 10.000 0 0 0 0\n",
            &ParseOptions::default(),
        );
        assert_eq!(parsed.events.len(), 1);
        assert_eq!(parsed.stats.short_line, 1);
        assert_eq!(parsed.stats.skipped(), 1);
    }

    #[test]
    fn test_counters_add_up() {
        let input = "# header comment\n\
                     \n\
                     1 0 4096 10.000 0 0 0 0\n\
                     1 0 4096 nope 0 0 0 0\n\
                     \t  \n\
                     2 0 4096 10.500 0 1 0 0\n\
                     2 0 x 10.500 0 1 0 0\n\
                     3 1 2\n\
                     3 0 4096 11.000 0 2 0 0";
        let parsed = parse_str(input, &ParseOptions::default());
        let stats = &parsed.stats;

        assert_eq!(stats.lines_seen, 9);
        assert_eq!(stats.blank_or_comment, 3);
        assert_eq!(stats.parsed, 3);
        assert_eq!(stats.skipped_for(SkipReason::BadFloat), 1);
        assert_eq!(stats.skipped_for(SkipReason::BadInt), 1);
        assert_eq!(stats.skipped_for(SkipReason::ShortLine), 1);
        assert_eq!(
            stats.parsed + stats.skipped(),
            stats.lines_seen - stats.blank_or_comment
        );
        assert!(parsed.events.iter().all(|e| e.timestamp.is_finite()));
        assert!(!stats.cap_reached);
    }

    #[test]
    fn test_entry_cap_stops_early() {
        let input: String = (0..10)
            .map(|i| format!("{i} 0 4096 {}.0 0 0 0 0\n", i))
            .collect();
        let options = ParseOptions {
            entry_cap: 4,
            ..Default::default()
        };
        let parsed = parse_str(&input, &options);
        assert_eq!(parsed.events.len(), 4);
        assert!(parsed.stats.cap_reached);
        assert_eq!(parsed.stats.lines_seen, 4);
    }

    #[test]
    fn test_entry_cap_met_exactly_is_not_truncation() {
        let input: String = (0..4)
            .map(|i| format!("{i} 0 4096 {}.0 0 0 0 0\n", i))
            .collect();
        let options = ParseOptions {
            entry_cap: 4,
            ..Default::default()
        };
        let parsed = parse_str(&input, &options);
        assert_eq!(parsed.events.len(), 4);
        assert!(!parsed.stats.cap_reached);
    }

    #[test]
    fn test_reader_is_lazy() {
        let input = "1 0 4096 1.0 0 0 0 0\nbad\n2 0 4096 2.0 0 0 0 0\n";
        let mut reader = TraceReader::new(Cursor::new(input), ParseOptions::default());
        let first = reader.next().unwrap();
        assert_eq!(first.block_id, 1);
        assert_eq!(reader.stats().lines_seen, 1);
        let second = reader.next().unwrap();
        assert_eq!(second.block_id, 2);
        assert!(reader.next().is_none());
        let stats = reader.finish().unwrap();
        assert_eq!(stats.short_line, 1);
        assert_eq!(stats.parsed, 2);
    }

    #[test]
    fn test_invalid_utf8_is_skipped() {
        let mut bytes = b"1 0 4096 1.0 0 0 0 0\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b' ', b'1', b'\n']);
        bytes.extend_from_slice(b"2 0 4096 2.0 0 0 0 0\n");
        let parsed = parse_trace(Cursor::new(bytes), &ParseOptions::default()).unwrap();
        assert_eq!(parsed.events.len(), 2);
        assert_eq!(parsed.stats.skipped(), 1);
    }
}
