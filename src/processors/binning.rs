use serde::{Deserialize, Serialize};

use crate::models::{Bin, SweepPoint};
use crate::utils::stats::{mean, median};

/// How the y values that share a bin are reduced.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BinAggregate {
    #[default]
    Median,
    Mean,
}

impl BinAggregate {
    fn reduce(&self, values: &[f64]) -> Option<f64> {
        match self {
            BinAggregate::Median => median(values),
            BinAggregate::Mean => mean(values),
        }
    }
}

// Index of the half-open interval [edges[i], edges[i+1]) holding x; the
// domain max lands in the last interval.
fn interval_of(x: f64, edges: &[f64]) -> usize {
    let last = edges.len() - 2;
    let width = edges[1] - edges[0];
    let mut idx = (((x - edges[0]) / width).floor().max(0.0) as usize).min(last);
    while idx > 0 && x < edges[idx] {
        idx -= 1;
    }
    while idx < last && x >= edges[idx + 1] {
        idx += 1;
    }
    idx
}

/// Reduces (x, y) points to at most `num_bins - 1` bins over `[min x, max x]`.
///
/// With `num_bins` edges spaced evenly over the x range, each point falls
/// in exactly one half-open interval (the maximum goes to the last one).
/// Empty intervals are left out. When there are no more points than
/// `num_bins`, the points are returned as they are with a count of 1.
pub fn bin_pairs(points: &[SweepPoint], num_bins: usize, aggregate: BinAggregate) -> Vec<Bin> {
    let points: Vec<SweepPoint> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();

    if points.len() <= num_bins || num_bins < 2 {
        return points
            .iter()
            .map(|p| Bin {
                center: p.x,
                aggregate_value: p.y,
                member_count: 1,
            })
            .collect();
    }

    let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);

    if min_x == max_x {
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        return aggregate
            .reduce(&ys)
            .map(|value| Bin {
                center: min_x,
                aggregate_value: value,
                member_count: ys.len(),
            })
            .into_iter()
            .collect();
    }

    let intervals = num_bins - 1;
    let step = (max_x - min_x) / intervals as f64;
    let edges: Vec<f64> = (0..num_bins)
        .map(|i| {
            if i == intervals {
                max_x
            } else if step.is_finite() {
                min_x + step * i as f64
            } else {
                // span overflows f64; interpolate between the endpoints instead
                let t = i as f64 / intervals as f64;
                min_x * (1.0 - t) + max_x * t
            }
        })
        .collect();

    let mut members: Vec<Vec<f64>> = vec![Vec::new(); intervals];
    for p in &points {
        members[interval_of(p.x, &edges)].push(p.y);
    }

    members
        .iter()
        .enumerate()
        .filter_map(|(i, ys)| {
            let value = aggregate.reduce(ys)?;
            Some(Bin {
                center: edges[i] / 2.0 + edges[i + 1] / 2.0,
                aggregate_value: value,
                member_count: ys.len(),
            })
        })
        .collect()
}
