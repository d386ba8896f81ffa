pub mod error;
pub mod models;
pub mod output;
pub mod parsers;
pub mod pipeline;
pub mod processors;
pub mod utils;

// Main entry points
pub use error::{AnalysisError, Result};
pub use models::{Bin, GroupKey, LatencySample, SchemeSummary, SkipReason, TraceEvent};
pub use output::{print_metric_table, MetricTable, Unit};
pub use parsers::{parse_trace, parse_trace_file, ParseOptions, TraceReader};
pub use pipeline::Pipeline;
pub use utils::{open_trace, Logger, PipelineConfig};
