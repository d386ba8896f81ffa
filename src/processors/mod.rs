mod binning;
mod grouper;
mod interarrival;
mod scheme;
mod window;

pub use binning::{bin_pairs, BinAggregate};
pub use grouper::{group_events, select_top_groups, EventGroups};
pub use interarrival::{
    analyze_group, analyze_groups, filter_deltas, raw_deltas, AnalyzerConfig, SampleFilter,
    TypicalMetric,
};
pub use scheme::{summarize_by_scheme, HitRateAccumulator, SchemeAssignment, SchemeConfig, SchemeMetric};
pub use window::{smooth_windows, window_medians};
