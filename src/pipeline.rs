//! One entry point per figure family, each turning a trace (or a summary
//! CSV) into a [`MetricTable`].
//!
//! Parse → group → analyze → aggregate. Bad lines and empty groups are
//! absorbed along the way; a run that ends with nothing to show returns
//! [`AnalysisError::NoData`] so the caller can skip that figure.

use std::io::{BufRead, Read};
use std::time::Instant;

use crate::error::{AnalysisError, Result};
use crate::models::{GroupKey, LatencySample, SweepPoint};
use crate::output::{MetricTable, Unit};
use crate::parsers::{parse_trace, ParsedTrace, SummaryTable, TraceReader};
use crate::processors::{
    analyze_groups, bin_pairs, group_events, select_top_groups, smooth_windows,
    summarize_by_scheme, window_medians, HitRateAccumulator, SchemeMetric, TypicalMetric,
};
use crate::utils::PipelineConfig;
use crate::{log, log_warn};

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Pipeline { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn load<R: BufRead>(&self, reader: R) -> Result<ParsedTrace> {
        let parsed = parse_trace(reader, &self.config.parse)?;
        if parsed.events.is_empty() {
            return Err(AnalysisError::NoData(format!(
                "no parsable events in {} lines",
                parsed.stats.lines_seen
            )));
        }
        Ok(parsed)
    }

    fn samples<R: BufRead>(&self, reader: R, key: GroupKey) -> Result<Vec<LatencySample>> {
        let parsed = self.load(reader)?;
        let groups = group_events(parsed.events, key);
        log!("Found {} unique {} groups", groups.len(), key.display_name());

        let samples = analyze_groups(groups, &self.config.analyzer, self.config.parallel);
        if samples.is_empty() {
            return Err(AnalysisError::NoData(format!(
                "no {} group produced a valid inter-arrival delta",
                key.display_name()
            )));
        }
        Ok(samples)
    }

    fn scheme_note(&self) -> Option<String> {
        if self.config.schemes.is_heuristic() {
            log_warn!(
                "Schemes assigned by pipeline_id mod {}; supply an explicit table if the mapping is known",
                self.config.schemes.labels.len()
            );
            Some(format!(
                "scheme = pipeline_id mod {} (heuristic)",
                self.config.schemes.labels.len()
            ))
        } else {
            None
        }
    }

    fn typical_axis(&self) -> (&'static str, Unit) {
        match self.config.analyzer.typical {
            TypicalMetric::Mean => ("tau_dt", Unit::Milliseconds),
            TypicalMetric::Median => ("median_dt", Unit::Milliseconds),
            TypicalMetric::AlphaTti => ("alpha_tti", Unit::Opaque),
        }
    }

    /// Mean of per-pipeline peak (or typical) DT for each scheme.
    pub fn scheme_summary<R: BufRead>(&self, reader: R, metric: SchemeMetric) -> Result<MetricTable> {
        let start_time = Instant::now();
        let samples = self.samples(reader, GroupKey::Pipeline)?;
        let peaks = summarize_by_scheme(&samples, &self.config.schemes, metric);
        if peaks.is_empty() {
            return Err(AnalysisError::NoData(
                "no pipeline maps to a configured scheme".to_string(),
            ));
        }
        for peak in &peaks {
            log!(
                "Scheme {}: {} pipelines, mean {:.1} ms",
                peak.scheme_label,
                peak.group_count,
                peak.mean_ms
            );
        }

        let (title, value_name) = match metric {
            SchemeMetric::Peak => ("Peak DT across eviction schemes", "peak_dt"),
            SchemeMetric::Typical => ("Typical DT across eviction schemes", "typical_dt"),
        };
        let mut table = MetricTable::from_scheme_peaks(title, value_name, &peaks)?;
        if let Some(note) = self.scheme_note() {
            table = with_note(table, note)?;
        }
        log!("Scheme summary done in {:.3}s", start_time.elapsed().as_secs_f64());
        Ok(table)
    }

    pub fn peak_dt_by_scheme<R: BufRead>(&self, reader: R) -> Result<MetricTable> {
        self.scheme_summary(reader, SchemeMetric::Peak)
    }

    /// Streams the trace once; events are never collected.
    pub fn hit_rate_by_scheme<R: BufRead>(&self, reader: R) -> Result<MetricTable> {
        let mut trace_reader = TraceReader::new(reader, self.config.parse.clone());
        let mut accumulator = HitRateAccumulator::new(&self.config.schemes);
        for event in trace_reader.by_ref() {
            accumulator.record(&event);
        }
        let stats = trace_reader.finish()?;
        log!(
            "Hit-rate pass: {} events, {} skipped lines, {} without hit flag, {} unassigned",
            stats.parsed,
            stats.skipped(),
            accumulator.unflagged(),
            accumulator.unassigned()
        );

        let summaries = accumulator.finalize();
        if summaries.is_empty() {
            return Err(AnalysisError::NoData(match self.config.parse.hit_field {
                None => "trace has no hit column configured (parse.hit_field)".to_string(),
                Some(_) => "no event with a hit flag maps to a configured scheme".to_string(),
            }));
        }
        for summary in &summaries {
            log!(
                "Scheme {}: {} hits / {} requests = {:.2}",
                summary.scheme_label,
                summary.hit_count,
                summary.total_count,
                summary.hit_rate
            );
        }

        let mut table = MetricTable::from_hit_rates("Cache hit rate across eviction schemes", &summaries)?;
        if let Some(note) = self.scheme_note() {
            table = with_note(table, note)?;
        }
        Ok(table)
    }

    /// Typical DT (or alpha_tti) against peak DT, one point per group, binned
    /// to `num_bins` when there are more groups than that.
    pub fn peak_dt_sweep<R: BufRead>(&self, reader: R, key: GroupKey) -> Result<MetricTable> {
        let samples = self.samples(reader, key)?;
        let points: Vec<SweepPoint> = samples
            .iter()
            .map(|s| SweepPoint {
                x: s.typical_ms,
                y: s.peak_ms,
            })
            .collect();

        let bins = bin_pairs(&points, self.config.num_bins, self.config.bin_aggregate);
        log!("Binned {} samples into {} points", points.len(), bins.len());

        let (x_name, x_unit) = self.typical_axis();
        MetricTable::from_bins(
            &format!("Peak DT vs {x_name}"),
            (x_name, x_unit),
            ("peak_dt", Unit::Milliseconds),
            &bins,
        )
    }

    /// Peak DT of every group against its key (e.g. the pipeline id of a
    /// PROTECTED-cap sweep).
    pub fn peak_dt_by_group<R: BufRead>(&self, reader: R, key: GroupKey) -> Result<MetricTable> {
        let samples = self.samples(reader, key)?;
        let points: Vec<SweepPoint> = samples
            .iter()
            .map(|s| SweepPoint {
                x: s.group_key as f64,
                y: s.peak_ms,
            })
            .collect();
        MetricTable::from_points(
            &format!("Peak DT by {}", key.display_name()),
            (key.display_name(), Unit::Opaque),
            ("peak_dt", Unit::Milliseconds),
            &points,
        )
    }

    /// Peak DT for the `top_groups` most requested sizes.
    pub fn peak_dt_by_size<R: BufRead>(&self, reader: R) -> Result<MetricTable> {
        let parsed = self.load(reader)?;
        let groups = group_events(parsed.events, GroupKey::Size);
        log!("Found {} unique sizes", groups.len());
        let top = select_top_groups(groups, self.config.top_groups);
        log!(
            "Selected sizes: {:?}",
            top.keys().copied().collect::<Vec<_>>()
        );

        let samples = analyze_groups(top, &self.config.analyzer, self.config.parallel);
        if samples.is_empty() {
            return Err(AnalysisError::NoData(
                "no selected size produced a valid inter-arrival delta".to_string(),
            ));
        }
        let points: Vec<SweepPoint> = samples
            .iter()
            .map(|s| SweepPoint {
                x: s.group_key as f64,
                y: s.peak_ms,
            })
            .collect();
        MetricTable::from_points(
            "Peak DT vs cache size",
            ("size", Unit::Bytes),
            ("peak_dt", Unit::Milliseconds),
            &points,
        )
    }

    /// Median per-block DT over fixed time windows, optionally smoothed.
    pub fn median_dt_over_time<R: BufRead>(&self, reader: R) -> Result<MetricTable> {
        let parsed = self.load(reader)?;
        let mut points = window_medians(
            parsed.events,
            self.config.window_seconds,
            self.config.analyzer.ceiling_ms,
        );
        if points.is_empty() {
            return Err(AnalysisError::NoData(
                "no time window contains a repeated block access".to_string(),
            ));
        }
        log!("Calculated {} time windows", points.len());

        let mut smoothed = false;
        if let Some(sigma) = self.config.smoothing_sigma {
            if points.len() > self.config.smoothing_min_points {
                points = smooth_windows(&points, sigma);
                smoothed = true;
            }
        }

        let table = MetricTable::from_windows("Median DT over time", &points)?;
        if smoothed {
            let sigma = self.config.smoothing_sigma.unwrap_or_default();
            return with_note(table, format!("gaussian smoothed, sigma = {sigma}"));
        }
        Ok(table)
    }

    /// Two named columns of a summary CSV as an (x, y) table.
    pub fn summary_series<R: Read>(
        &self,
        reader: R,
        x: (&str, Unit),
        y: (&str, Unit),
    ) -> Result<MetricTable> {
        let summary = SummaryTable::from_reader(reader)?;
        let points = summary.pairs(x.0, y.0)?;
        if points.is_empty() {
            return Err(AnalysisError::NoData(format!(
                "summary has no rows for {} / {}",
                x.0, y.0
            )));
        }
        MetricTable::from_points(&format!("{} vs {}", y.0, x.0), x, y, &points)
    }

    /// A label column against a value column of a summary CSV, e.g. `scheme`
    /// and `peak_dt_s`.
    pub fn summary_by_label<R: Read>(
        &self,
        reader: R,
        label_column: &str,
        value: (&str, Unit),
    ) -> Result<MetricTable> {
        let summary = SummaryTable::from_reader(reader)?;
        let labeled = summary.labeled(label_column, value.0)?;
        if labeled.is_empty() {
            return Err(AnalysisError::NoData(format!(
                "summary has no rows for {label_column} / {}",
                value.0
            )));
        }

        let mut builder = MetricTable::builder(&format!("{} by {}", value.0, label_column))
            .column(label_column, Unit::Label)
            .column(value.0, value.1);
        for (label, v) in labeled {
            builder.push_row(vec![label.into(), v.into()]);
        }
        builder.build()
    }
}

// Rebuilds the table with an extra note; tables are otherwise immutable.
fn with_note(table: MetricTable, note: String) -> Result<MetricTable> {
    let mut builder = MetricTable::builder(table.title());
    for column in table.columns() {
        builder = builder.column(&column.name, column.unit);
    }
    for existing in table.notes() {
        builder = builder.note(existing.clone());
    }
    for row in table.rows() {
        builder.push_row(row.clone());
    }
    builder.note(note).build()
}
