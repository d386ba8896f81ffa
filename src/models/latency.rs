use serde::{Deserialize, Serialize};

/// Inter-arrival statistics for one group.
///
/// `inter_arrival_ms` only holds deltas in `(0, ceiling)`; a group with no
/// such delta never produces a sample.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LatencySample {
    pub group_key: i64,
    pub inter_arrival_ms: Vec<f64>,
    pub typical_ms: f64, // mean/median in ms, or 1000/mean for alpha_tti
    pub peak_ms: f64,    // percentile of inter_arrival_ms
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Bin {
    pub center: f64,
    pub aggregate_value: f64,
    pub member_count: usize,
}

/// A raw (x, y) pair before binning.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindowPoint {
    pub center_s: f64,
    pub median_ms: f64,
    pub request_count: f64, // smoothed series are fractional
}
