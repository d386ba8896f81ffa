use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::parsers::ParseOptions;
use crate::processors::{AnalyzerConfig, BinAggregate, SchemeAssignment, SchemeConfig};
use crate::utils::constants::{
    DEFAULT_NUM_BINS, DEFAULT_SMOOTHING_SIGMA, DEFAULT_TOP_GROUPS, DEFAULT_WINDOW_SECONDS,
};

/// Every variation point of the reduction pipeline, chosen at call time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub parse: ParseOptions,
    pub analyzer: AnalyzerConfig,
    pub num_bins: usize,
    pub bin_aggregate: BinAggregate,
    pub window_seconds: f64,
    pub smoothing_sigma: Option<f64>,
    pub smoothing_min_points: usize,
    pub top_groups: usize,
    pub schemes: SchemeConfig,
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            parse: ParseOptions::default(),
            analyzer: AnalyzerConfig::default(),
            num_bins: DEFAULT_NUM_BINS,
            bin_aggregate: BinAggregate::Median,
            window_seconds: DEFAULT_WINDOW_SECONDS,
            smoothing_sigma: Some(DEFAULT_SMOOTHING_SIGMA),
            smoothing_min_points: 10,
            top_groups: DEFAULT_TOP_GROUPS,
            schemes: SchemeConfig::default(),
            parallel: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(AnalysisError::InvalidConfig(msg)) };

        if self.parse.entry_cap == 0 {
            return invalid("parse.entry_cap must be positive".to_string());
        }
        if self.num_bins < 2 {
            return invalid(format!("num_bins must be at least 2, got {}", self.num_bins));
        }
        if !(0.0..=100.0).contains(&self.analyzer.percentile) {
            return invalid(format!(
                "analyzer.percentile must be within [0, 100], got {}",
                self.analyzer.percentile
            ));
        }
        if !(self.analyzer.ceiling_ms > 0.0) {
            return invalid(format!(
                "analyzer.ceiling_ms must be positive, got {}",
                self.analyzer.ceiling_ms
            ));
        }
        if matches!(self.analyzer.max_events_per_group, Some(0 | 1)) {
            return invalid("analyzer.max_events_per_group must allow at least 2 events".to_string());
        }
        if !(self.window_seconds > 0.0) {
            return invalid(format!("window_seconds must be positive, got {}", self.window_seconds));
        }
        if let Some(sigma) = self.smoothing_sigma {
            if !(sigma > 0.0) {
                return invalid(format!("smoothing_sigma must be positive, got {sigma}"));
            }
        }
        if self.top_groups == 0 {
            return invalid("top_groups must be positive".to_string());
        }
        if self.schemes.labels.is_empty() {
            return invalid("schemes.labels must not be empty".to_string());
        }
        if let SchemeAssignment::Explicit { table } = &self.schemes.assignment {
            if let Some((pipeline, idx)) = table
                .iter()
                .find(|(_, idx)| **idx >= self.schemes.labels.len())
            {
                return invalid(format!(
                    "pipeline {pipeline} maps to scheme index {idx}, but only {} labels exist",
                    self.schemes.labels.len()
                ));
            }
        }
        Ok(())
    }
}
