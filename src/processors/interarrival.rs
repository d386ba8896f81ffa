use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;

use crate::log;
use crate::models::{LatencySample, TraceEvent};
use crate::processors::EventGroups;
use crate::utils::constants::{DEFAULT_CEILING_MS, DEFAULT_PERCENTILE, MILLISECONDS};
use crate::utils::stats::{mean, median, percentile};

/// What `LatencySample::typical_ms` holds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TypicalMetric {
    /// Mean inter-arrival time in ms (tau_DT sweeps).
    #[default]
    Mean,
    /// Median inter-arrival time in ms.
    Median,
    /// `1000 / mean`: an access rate, not a latency (alpha_tti sweeps).
    AlphaTti,
}

/// Exclusive bounds a finished sample must fall within to be kept.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SampleFilter {
    pub typical_min: f64,
    pub typical_max: Option<f64>,
    pub peak_min: f64,
    pub peak_max: Option<f64>,
}

impl Default for SampleFilter {
    fn default() -> Self {
        SampleFilter {
            typical_min: 0.0,
            typical_max: None,
            peak_min: 0.0,
            peak_max: None,
        }
    }
}

impl SampleFilter {
    /// The bounds the alpha_tti figure applies: `0 < alpha < 20`, `0 < peak < 10000`.
    pub fn alpha_tti() -> Self {
        SampleFilter {
            typical_max: Some(20.0),
            peak_max: Some(10_000.0),
            ..Default::default()
        }
    }

    pub fn accepts(&self, sample: &LatencySample) -> bool {
        let below = |value: f64, max: Option<f64>| max.map_or(true, |m| value < m);
        sample.typical_ms > self.typical_min
            && below(sample.typical_ms, self.typical_max)
            && sample.peak_ms > self.peak_min
            && below(sample.peak_ms, self.peak_max)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Deltas at or above this (ms) are dropped.
    pub ceiling_ms: f64,
    pub percentile: f64,
    pub typical: TypicalMetric,
    /// Only the first N events of a group (after sorting) are used.
    pub max_events_per_group: Option<usize>,
    pub sample_filter: Option<SampleFilter>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            ceiling_ms: DEFAULT_CEILING_MS,
            percentile: DEFAULT_PERCENTILE,
            typical: TypicalMetric::Mean,
            max_events_per_group: None,
            sample_filter: None,
        }
    }
}

/// Successive timestamp differences in ms; `events.len() - 1` values.
pub fn raw_deltas(events: &[TraceEvent]) -> Vec<f64> {
    events
        .windows(2)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp) * MILLISECONDS)
        .collect()
}

/// Keeps deltas strictly inside `(0, ceiling_ms)`. Nothing is clamped.
pub fn filter_deltas(deltas: Vec<f64>, ceiling_ms: f64) -> Vec<f64> {
    deltas
        .into_iter()
        .filter(|d| d.is_finite() && *d > 0.0 && *d < ceiling_ms)
        .collect()
}

pub(crate) fn sort_by_timestamp(events: &mut [TraceEvent]) {
    // stable: equal timestamps keep file order
    events.sort_by(|a, b| a.timestamp.partial_cmp(&b.timestamp).unwrap_or(Ordering::Equal));
}

/// Reduces one group to a sample, or `None` when it yields no usable delta.
pub fn analyze_group(
    group_key: i64,
    mut events: Vec<TraceEvent>,
    config: &AnalyzerConfig,
) -> Option<LatencySample> {
    if events.len() < 2 {
        return None;
    }

    sort_by_timestamp(&mut events);
    if let Some(limit) = config.max_events_per_group {
        events.truncate(limit);
    }

    let deltas = filter_deltas(raw_deltas(&events), config.ceiling_ms);
    let avg = mean(&deltas)?;

    let typical_ms = match config.typical {
        TypicalMetric::Mean => avg,
        TypicalMetric::Median => median(&deltas)?,
        TypicalMetric::AlphaTti => MILLISECONDS / avg,
    };
    let peak_ms = percentile(&deltas, config.percentile)?;

    let sample = LatencySample {
        group_key,
        inter_arrival_ms: deltas,
        typical_ms,
        peak_ms,
    };

    match &config.sample_filter {
        Some(filter) if !filter.accepts(&sample) => None,
        _ => Some(sample),
    }
}

/// Analyzes every group. The result is ordered by group key whether or not
/// the groups were processed in parallel.
pub fn analyze_groups(
    groups: EventGroups,
    config: &AnalyzerConfig,
    parallel: bool,
) -> Vec<LatencySample> {
    let start_time = Instant::now();
    let group_count = groups.len();

    let mut samples: Vec<LatencySample> = if parallel {
        groups
            .into_par_iter()
            .filter_map(|(key, events)| analyze_group(key, events, config))
            .collect()
    } else {
        groups
            .into_iter()
            .filter_map(|(key, events)| analyze_group(key, events, config))
            .collect()
    };
    samples.sort_by_key(|s| s.group_key);

    log!(
        "Analyzed {} groups: {} samples, {} dropped ({:.3}s)",
        group_count,
        samples.len(),
        group_count - samples.len(),
        start_time.elapsed().as_secs_f64()
    );

    samples
}
