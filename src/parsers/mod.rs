pub mod summary;
pub mod trace;

pub use summary::SummaryTable;
pub use trace::{
    is_blank_or_comment, parse_trace, parse_trace_file, parse_trace_line, ParseOptions,
    ParsedTrace, TraceReader,
};
