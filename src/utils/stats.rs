//! Order statistics and smoothing shared by the analyzers.
//!
//! Every function here is total: empty input yields `None` (or an empty
//! vector) rather than a sentinel value.

use std::cmp::Ordering;

use crate::utils::constants::GAUSSIAN_TRUNCATE;

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Linear-interpolation percentile (`p` in 0..=100) over an unsorted slice.
///
/// The rank is `p / 100 * (n - 1)`; the result lies between the two
/// neighbouring order statistics. Sorting happens on a copy, so sorted and
/// unsorted inputs give the same answer.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    let p = p.clamp(0.0, 100.0);
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Divides every value by `values[reference_index]`.
pub fn normalize_to(values: &[f64], reference_index: usize) -> Option<Vec<f64>> {
    let reference = *values.get(reference_index)?;
    if reference == 0.0 || !reference.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| v / reference).collect())
}

// Mirror an out-of-range index back into 0..len, edge sample repeated
fn reflect_index(idx: isize, len: usize) -> usize {
    let period = 2 * len as isize;
    let mut i = idx.rem_euclid(period);
    if i >= len as isize {
        i = period - 1 - i;
    }
    i as usize
}

/// One-dimensional Gaussian smoothing with reflected boundaries.
pub fn gaussian_smooth(values: &[f64], sigma: f64) -> Vec<f64> {
    if values.is_empty() || sigma <= 0.0 {
        return values.to_vec();
    }
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as isize;
    let mut weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.iter_mut().for_each(|w| *w /= total);

    (0..values.len() as isize)
        .map(|center| {
            weights
                .iter()
                .zip(-radius..=radius)
                .map(|(w, offset)| w * values[reflect_index(center + offset, values.len())])
                .sum()
        })
        .collect()
}

/// Running min/max/mean of a series, for summary lines.
#[derive(Debug, Clone)]
pub struct SeriesStats {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Default for SeriesStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesStats {
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::MAX,
            max: f64::MIN,
        }
    }

    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn avg(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }
}

impl FromIterator<f64> for SeriesStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = SeriesStats::new();
        for value in iter {
            stats.add(value);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_percentile_interpolates_between_neighbours() {
        let p95 = percentile(&[50.0, 150.0], 95.0).unwrap();
        assert!(approx(p95, 145.0));

        let p50 = percentile(&[1.0, 2.0, 3.0, 4.0], 50.0).unwrap();
        assert!(approx(p50, 2.5));
    }

    #[test]
    fn test_percentile_same_for_sorted_and_unsorted() {
        let unsorted = [9.0, 1.0, 7.0, 3.0, 5.0, 2.0];
        let mut sorted = unsorted.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(percentile(&unsorted, 95.0), percentile(&sorted, 95.0));
        assert_eq!(percentile(&sorted, 95.0), percentile(&sorted, 95.0));
    }

    #[test]
    fn test_percentile_of_constant_list() {
        assert_eq!(percentile(&[12.5; 7], 95.0), Some(12.5));
        assert_eq!(percentile(&[3.0], 95.0), Some(3.0));
        assert_eq!(percentile(&[], 95.0), None);
    }

    #[test]
    fn test_mean_and_median() {
        assert_eq!(mean(&[50.0, 150.0]), Some(100.0));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_normalize_to_reference() {
        let normalized = normalize_to(&[2.0, 4.0, 1.0], 1).unwrap();
        assert_eq!(normalized, vec![0.5, 1.0, 0.25]);
        assert!(normalize_to(&[1.0], 3).is_none());
        assert!(normalize_to(&[0.0, 1.0], 0).is_none());
    }

    #[test]
    fn test_gaussian_smooth_keeps_constant_series() {
        let smoothed = gaussian_smooth(&[3.0; 12], 2.0);
        assert_eq!(smoothed.len(), 12);
        assert!(smoothed.iter().all(|v| approx(*v, 3.0)));
    }

    #[test]
    fn test_gaussian_smooth_flattens_spike() {
        let mut series = vec![0.0; 21];
        series[10] = 10.0;
        let smoothed = gaussian_smooth(&series, 2.0);
        assert!(smoothed[10] < 10.0);
        assert!(smoothed[9] > 0.0 && smoothed[11] > 0.0);
        assert!(approx(smoothed.iter().sum::<f64>(), 10.0));
    }

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 5), 0);
        assert_eq!(reflect_index(-2, 5), 1);
        assert_eq!(reflect_index(5, 5), 4);
        assert_eq!(reflect_index(6, 5), 3);
        assert_eq!(reflect_index(2, 5), 2);
    }

    #[test]
    fn test_series_stats() {
        let stats: SeriesStats = [3.0, 1.0, 2.0].into_iter().collect();
        assert_eq!(stats.count(), 3);
        assert_eq!(stats.avg(), Some(2.0));
        assert_eq!(stats.min(), Some(1.0));
        assert_eq!(stats.max(), Some(3.0));
        assert_eq!(SeriesStats::new().avg(), None);
    }
}
