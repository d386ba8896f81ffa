mod group_key;
mod latency;
mod parse_stats;
mod scheme;
mod trace_event;

pub use group_key::GroupKey;
pub use latency::{Bin, LatencySample, SweepPoint, WindowPoint};
pub use parse_stats::{ParseStats, SkipReason};
pub use scheme::{SchemePeak, SchemeSummary};
pub use trace_event::TraceEvent;
