use std::collections::BTreeMap;

use crate::models::{TraceEvent, WindowPoint};
use crate::processors::interarrival::{filter_deltas, raw_deltas, sort_by_timestamp};
use crate::utils::stats::{gaussian_smooth, median};

/// Median per-block inter-arrival time over fixed time windows.
///
/// Windows are `[t0 + i*w, t0 + (i+1)*w)` from the earliest timestamp `t0`.
/// Deltas never cross a window boundary. Windows without a usable delta
/// are left out.
pub fn window_medians(mut events: Vec<TraceEvent>, window_seconds: f64, ceiling_ms: f64) -> Vec<WindowPoint> {
    if events.is_empty() || !(window_seconds > 0.0) {
        return Vec::new();
    }
    sort_by_timestamp(&mut events);
    let t0 = events[0].timestamp;

    let mut windows: BTreeMap<u64, Vec<TraceEvent>> = BTreeMap::new();
    for event in events {
        let idx = ((event.timestamp - t0) / window_seconds).floor() as u64;
        windows.entry(idx).or_default().push(event);
    }

    windows
        .into_iter()
        .filter_map(|(idx, window_events)| {
            let request_count = window_events.len();

            let mut by_block: BTreeMap<i64, Vec<TraceEvent>> = BTreeMap::new();
            for event in window_events {
                by_block.entry(event.block_id).or_default().push(event);
            }

            let deltas: Vec<f64> = by_block
                .values()
                .filter(|evs| evs.len() >= 2)
                .flat_map(|evs| filter_deltas(raw_deltas(evs), ceiling_ms))
                .collect();

            Some(WindowPoint {
                center_s: t0 + (idx as f64 + 0.5) * window_seconds,
                median_ms: median(&deltas)?,
                request_count: request_count as f64,
            })
        })
        .collect()
}

/// Smooths the median and count series together; centers are unchanged.
pub fn smooth_windows(points: &[WindowPoint], sigma: f64) -> Vec<WindowPoint> {
    let medians: Vec<f64> = points.iter().map(|p| p.median_ms).collect();
    let counts: Vec<f64> = points.iter().map(|p| p.request_count).collect();
    let medians = gaussian_smooth(&medians, sigma);
    let counts = gaussian_smooth(&counts, sigma);

    points
        .iter()
        .zip(medians.into_iter().zip(counts))
        .map(|(p, (median_ms, request_count))| WindowPoint {
            center_s: p.center_s,
            median_ms,
            request_count,
        })
        .collect()
}
