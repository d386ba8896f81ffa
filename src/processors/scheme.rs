use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{LatencySample, SchemePeak, SchemeSummary, TraceEvent};
use crate::utils::stats::mean;

/// Rule mapping a pipeline id to an index into `SchemeConfig::labels`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SchemeAssignment {
    /// Pipelines missing from the table belong to no scheme.
    Explicit { table: BTreeMap<i64, usize> },
    /// `pipeline_id mod labels.len()`. A heuristic: nothing in the trace
    /// guarantees the buckets line up with the real schemes.
    Modulo,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SchemeConfig {
    pub labels: Vec<String>,
    pub assignment: SchemeAssignment,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        SchemeConfig {
            labels: vec!["E0".to_string(), "E1".to_string(), "E2".to_string()],
            assignment: SchemeAssignment::Modulo,
        }
    }
}

impl SchemeConfig {
    pub fn explicit(labels: Vec<String>, table: BTreeMap<i64, usize>) -> Self {
        SchemeConfig {
            labels,
            assignment: SchemeAssignment::Explicit { table },
        }
    }

    pub fn modulo(labels: Vec<String>) -> Self {
        SchemeConfig {
            labels,
            assignment: SchemeAssignment::Modulo,
        }
    }

    pub fn is_heuristic(&self) -> bool {
        matches!(self.assignment, SchemeAssignment::Modulo)
    }

    pub fn scheme_of(&self, pipeline_id: i64) -> Option<usize> {
        if self.labels.is_empty() {
            return None;
        }
        match &self.assignment {
            SchemeAssignment::Explicit { table } => table
                .get(&pipeline_id)
                .copied()
                .filter(|idx| *idx < self.labels.len()),
            SchemeAssignment::Modulo => {
                Some(pipeline_id.rem_euclid(self.labels.len() as i64) as usize)
            }
        }
    }

    pub fn label(&self, idx: usize) -> Option<&str> {
        self.labels.get(idx).map(String::as_str)
    }
}

/// Hit/total tallies per scheme over one trace pass.
///
/// Events without a hit flag, or whose pipeline maps to no scheme, are
/// counted apart and do not enter any tally.
#[derive(Debug, Clone)]
pub struct HitRateAccumulator<'a> {
    schemes: &'a SchemeConfig,
    hits: Vec<u64>,
    totals: Vec<u64>,
    unassigned: u64,
    unflagged: u64,
}

impl<'a> HitRateAccumulator<'a> {
    pub fn new(schemes: &'a SchemeConfig) -> Self {
        HitRateAccumulator {
            schemes,
            hits: vec![0; schemes.labels.len()],
            totals: vec![0; schemes.labels.len()],
            unassigned: 0,
            unflagged: 0,
        }
    }

    pub fn record(&mut self, event: &TraceEvent) {
        let Some(hit) = event.hit else {
            self.unflagged += 1;
            return;
        };
        match self.schemes.scheme_of(event.pipeline_id) {
            Some(idx) => {
                self.totals[idx] += 1;
                if hit {
                    self.hits[idx] += 1;
                }
            }
            None => self.unassigned += 1,
        }
    }

    pub fn unassigned(&self) -> u64 {
        self.unassigned
    }

    pub fn unflagged(&self) -> u64 {
        self.unflagged
    }

    /// Summaries in label order; schemes that saw no event are left out.
    pub fn finalize(self) -> Vec<SchemeSummary> {
        self.schemes
            .labels
            .iter()
            .enumerate()
            .filter_map(|(idx, label)| {
                SchemeSummary::new(label.clone(), self.hits[idx], self.totals[idx])
            })
            .collect()
    }
}

impl<'a> Extend<&'a TraceEvent> for HitRateAccumulator<'_> {
    fn extend<I: IntoIterator<Item = &'a TraceEvent>>(&mut self, iter: I) {
        for event in iter {
            self.record(event);
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchemeMetric {
    #[default]
    Peak,
    Typical,
}

/// Mean peak (or typical) value per scheme, from samples keyed by pipeline id.
pub fn summarize_by_scheme(
    samples: &[LatencySample],
    schemes: &SchemeConfig,
    metric: SchemeMetric,
) -> Vec<SchemePeak> {
    let mut per_scheme: Vec<Vec<f64>> = vec![Vec::new(); schemes.labels.len()];
    for sample in samples {
        if let Some(idx) = schemes.scheme_of(sample.group_key) {
            per_scheme[idx].push(match metric {
                SchemeMetric::Peak => sample.peak_ms,
                SchemeMetric::Typical => sample.typical_ms,
            });
        }
    }

    schemes
        .labels
        .iter()
        .zip(per_scheme)
        .filter_map(|(label, values)| {
            Some(SchemePeak {
                scheme_label: label.clone(),
                mean_ms: mean(&values)?,
                group_count: values.len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(pipeline_id: i64, hit: Option<bool>) -> TraceEvent {
        TraceEvent {
            block_id: 1,
            offset: 0,
            size_bytes: 4096,
            timestamp: 0.0,
            op: 0,
            pipeline_id,
            namespace_id: 0,
            user_id: 0,
            shard_id: None,
            op_count: None,
            hit,
        }
    }

    fn sample(group_key: i64, typical_ms: f64, peak_ms: f64) -> LatencySample {
        LatencySample {
            group_key,
            inter_arrival_ms: vec![typical_ms],
            typical_ms,
            peak_ms,
        }
    }

    #[test]
    fn test_hit_rate_of_bucket_zero() {
        let schemes = SchemeConfig::default();
        let mut acc = HitRateAccumulator::new(&schemes);
        for (pipeline, hit) in [(0, true), (3, false), (6, true), (0, true)] {
            acc.record(&event(pipeline, Some(hit)));
        }
        let summaries = acc.finalize();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].scheme_label, "E0");
        assert_eq!(summaries[0].hit_rate, 0.75);
    }

    #[test]
    fn test_empty_schemes_and_unflagged_events() {
        let schemes = SchemeConfig::default();
        let events = vec![
            event(1, Some(true)),
            event(4, Some(false)),
            event(2, None),
            event(5, None),
        ];
        let mut acc = HitRateAccumulator::new(&schemes);
        acc.extend(events.iter());
        assert_eq!(acc.unflagged(), 2);

        let summaries = acc.finalize();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].scheme_label, "E1");
        assert_eq!(summaries[0].total_count, 2);
        assert_eq!(summaries[0].hit_rate, 0.5);
        assert!(summaries
            .iter()
            .all(|s| (0.0..=1.0).contains(&s.hit_rate)
                && s.hit_rate == s.hit_count as f64 / s.total_count as f64));
    }

    #[test]
    fn test_explicit_table() {
        let table = BTreeMap::from([(100, 1), (200, 0)]);
        let schemes = SchemeConfig::explicit(vec!["LRU".to_string(), "DT-SLRU".to_string()], table);
        assert!(!schemes.is_heuristic());
        assert_eq!(schemes.scheme_of(100), Some(1));
        assert_eq!(schemes.scheme_of(200), Some(0));
        assert_eq!(schemes.scheme_of(300), None);

        let mut acc = HitRateAccumulator::new(&schemes);
        acc.record(&event(300, Some(true)));
        acc.record(&event(100, Some(true)));
        assert_eq!(acc.unassigned(), 1);
        let summaries = acc.finalize();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].scheme_label, "DT-SLRU");
    }

    #[test]
    fn test_modulo_handles_negative_ids() {
        let schemes = SchemeConfig::default();
        assert!(schemes.is_heuristic());
        assert_eq!(schemes.scheme_of(-1), Some(2));
        assert_eq!(schemes.scheme_of(4), Some(1));
    }

    #[test]
    fn test_summarize_by_scheme() {
        let schemes = SchemeConfig::default();
        let samples = vec![
            sample(0, 10.0, 100.0),
            sample(3, 20.0, 300.0),
            sample(2, 5.0, 50.0),
        ];

        let peaks = summarize_by_scheme(&samples, &schemes, SchemeMetric::Peak);
        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[0].scheme_label, "E0");
        assert_eq!(peaks[0].mean_ms, 200.0);
        assert_eq!(peaks[0].group_count, 2);
        assert_eq!(peaks[1].scheme_label, "E2");
        assert_eq!(peaks[1].mean_ms, 50.0);

        let typical = summarize_by_scheme(&samples, &schemes, SchemeMetric::Typical);
        assert_eq!(typical[0].mean_ms, 15.0);
    }
}
