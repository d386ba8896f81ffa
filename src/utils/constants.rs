// Seconds to milliseconds
pub const MILLISECONDS: f64 = 1000.0;

// Deltas at or above this are session gaps, not disk-head time (ms)
pub const DEFAULT_CEILING_MS: f64 = 20_000.0;

pub const DEFAULT_PERCENTILE: f64 = 95.0;

// Bounds memory of a single parse run
pub const DEFAULT_ENTRY_CAP: usize = 50_000;

pub const MIN_TRACE_FIELDS: usize = 8;

pub const DEFAULT_NUM_BINS: usize = 15;

pub const DEFAULT_WINDOW_SECONDS: f64 = 300.0;

pub const DEFAULT_SMOOTHING_SIGMA: f64 = 2.0;

pub const DEFAULT_TOP_GROUPS: usize = 8;

// Gaussian kernel radius in sigmas
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;
