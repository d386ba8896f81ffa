use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a non-comment line was rejected by the trace parser.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ShortLine,
    BadInt,
    BadFloat,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkipReason::ShortLine => "short line",
            SkipReason::BadInt => "bad integer",
            SkipReason::BadFloat => "bad float",
        };
        f.write_str(name)
    }
}

/// Line counters of one parse run.
///
/// `parsed + skipped() == lines_seen - blank_or_comment` once a run ends.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines_seen: usize,
    pub blank_or_comment: usize,
    pub parsed: usize,
    pub short_line: usize,
    pub bad_int: usize,
    pub bad_float: usize,
    pub cap_reached: bool,
}

impl ParseStats {
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::ShortLine => self.short_line += 1,
            SkipReason::BadInt => self.bad_int += 1,
            SkipReason::BadFloat => self.bad_float += 1,
        }
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        match reason {
            SkipReason::ShortLine => self.short_line,
            SkipReason::BadInt => self.bad_int,
            SkipReason::BadFloat => self.bad_float,
        }
    }

    /// Malformed lines only; blank and comment lines are counted apart.
    pub fn skipped(&self) -> usize {
        self.short_line + self.bad_int + self.bad_float
    }
}
