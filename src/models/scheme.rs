use serde::{Deserialize, Serialize};

/// Hit/miss tally of one eviction scheme, finalized after a full trace pass.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SchemeSummary {
    pub scheme_label: String,
    pub hit_count: u64,
    pub total_count: u64,
    pub hit_rate: f64,
}

impl SchemeSummary {
    /// Returns `None` for an empty tally; "no data" is not a 0% hit rate.
    pub fn new(scheme_label: String, hit_count: u64, total_count: u64) -> Option<Self> {
        if total_count == 0 {
            return None;
        }
        Some(Self {
            scheme_label,
            hit_count,
            total_count,
            hit_rate: hit_count as f64 / total_count as f64,
        })
    }
}

/// Mean of per-group peak/typical values for one scheme.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SchemePeak {
    pub scheme_label: String,
    pub mean_ms: f64,
    pub group_count: usize,
}
