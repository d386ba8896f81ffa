//! The hand-off format between the reduction pipeline and whatever renders it.
//!
//! A [`MetricTable`] carries its own title, column names and units, so a
//! consumer can draw or export it without knowing how it was computed.
//! Tables are immutable once built.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AnalysisError, Result};
use crate::models::{Bin, SchemePeak, SchemeSummary, SweepPoint, WindowPoint};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Milliseconds,
    Seconds,
    Fraction,
    Percent,
    Count,
    Ratio,
    Bytes,
    /// Categorical text, e.g. a scheme label.
    Label,
    /// A raw identifier or an externally defined parameter value.
    Opaque,
}

impl Unit {
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Milliseconds => "ms",
            Unit::Seconds => "s",
            Unit::Fraction => "fraction",
            Unit::Percent => "%",
            Unit::Count => "count",
            Unit::Ratio => "ratio",
            Unit::Bytes => "bytes",
            Unit::Label | Unit::Opaque => "",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub unit: Unit,
}

impl Column {
    /// `name (unit)`, or just `name` for unitless columns.
    pub fn header(&self) -> String {
        match self.unit.suffix() {
            "" => self.name.clone(),
            suffix => format!("{} ({})", self.name, suffix),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<usize> for Cell {
    fn from(v: usize) -> Self {
        Cell::Number(v as f64)
    }
}

impl From<u64> for Cell {
    fn from(v: u64) -> Self {
        Cell::Number(v as f64)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "MetricTableBuilder")]
pub struct MetricTable {
    title: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
    notes: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MetricTableBuilder {
    title: String,
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<Vec<Cell>>,
    #[serde(default)]
    notes: Vec<String>,
}

impl TryFrom<MetricTableBuilder> for MetricTable {
    type Error = AnalysisError;

    fn try_from(builder: MetricTableBuilder) -> Result<Self> {
        builder.build()
    }
}

impl MetricTableBuilder {
    pub fn column(mut self, name: &str, unit: Unit) -> Self {
        self.columns.push(Column {
            name: name.to_string(),
            unit,
        });
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn row(mut self, cells: Vec<Cell>) -> Self {
        self.rows.push(cells);
        self
    }

    pub fn push_row(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }

    pub fn build(self) -> Result<MetricTable> {
        if self.columns.is_empty() {
            return Err(AnalysisError::TableShape(format!(
                "table '{}' has no columns",
                self.title
            )));
        }
        if let Some((idx, row)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.columns.len())
        {
            return Err(AnalysisError::TableShape(format!(
                "row {} of '{}' has {} cells, expected {}",
                idx,
                self.title,
                row.len(),
                self.columns.len()
            )));
        }
        Ok(MetricTable {
            title: self.title,
            columns: self.columns,
            rows: self.rows,
            notes: self.notes,
        })
    }
}

impl MetricTable {
    pub fn builder(title: &str) -> MetricTableBuilder {
        MetricTableBuilder {
            title: title.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric values of one column, `None` if the column is absent or textual.
    pub fn values(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        self.rows.iter().map(|row| row.get(idx)?.as_f64()).collect()
    }

    pub fn labels(&self, name: &str) -> Option<Vec<String>> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        self.rows
            .iter()
            .map(|row| row.get(idx).map(|cell| cell.to_string()))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a table written by [`MetricTable::to_json`]. The same shape
    /// checks as [`MetricTableBuilder::build`] apply.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// x, aggregated y and member count per bin.
    pub fn from_bins(
        title: &str,
        x: (&str, Unit),
        y: (&str, Unit),
        bins: &[Bin],
    ) -> Result<Self> {
        let mut builder = MetricTable::builder(title)
            .column(x.0, x.1)
            .column(y.0, y.1)
            .column("member_count", Unit::Count);
        for bin in bins {
            builder.push_row(vec![
                bin.center.into(),
                bin.aggregate_value.into(),
                bin.member_count.into(),
            ]);
        }
        builder.build()
    }

    pub fn from_points(
        title: &str,
        x: (&str, Unit),
        y: (&str, Unit),
        points: &[SweepPoint],
    ) -> Result<Self> {
        let mut builder = MetricTable::builder(title).column(x.0, x.1).column(y.0, y.1);
        for point in points {
            builder.push_row(vec![point.x.into(), point.y.into()]);
        }
        builder.build()
    }

    pub fn from_scheme_peaks(title: &str, value_name: &str, peaks: &[SchemePeak]) -> Result<Self> {
        let mut builder = MetricTable::builder(title)
            .column("scheme", Unit::Label)
            .column(value_name, Unit::Milliseconds)
            .column("group_count", Unit::Count);
        for peak in peaks {
            builder.push_row(vec![
                peak.scheme_label.as_str().into(),
                peak.mean_ms.into(),
                peak.group_count.into(),
            ]);
        }
        builder.build()
    }

    pub fn from_hit_rates(title: &str, summaries: &[SchemeSummary]) -> Result<Self> {
        let mut builder = MetricTable::builder(title)
            .column("scheme", Unit::Label)
            .column("hit_count", Unit::Count)
            .column("total_count", Unit::Count)
            .column("hit_rate", Unit::Fraction);
        for summary in summaries {
            builder.push_row(vec![
                summary.scheme_label.as_str().into(),
                summary.hit_count.into(),
                summary.total_count.into(),
                summary.hit_rate.into(),
            ]);
        }
        builder.build()
    }

    pub fn from_windows(title: &str, points: &[WindowPoint]) -> Result<Self> {
        let mut builder = MetricTable::builder(title)
            .column("window_center", Unit::Seconds)
            .column("median_dt", Unit::Milliseconds)
            .column("request_count", Unit::Count);
        for point in points {
            builder.push_row(vec![
                point.center_s.into(),
                point.median_ms.into(),
                point.request_count.into(),
            ]);
        }
        builder.build()
    }
}
