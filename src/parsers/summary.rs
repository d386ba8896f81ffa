use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::models::SweepPoint;

/// A headed CSV summary (e.g. `tau_vals,hit_rate` or `scheme,peak_dt_s`).
///
/// Columns are only ever looked up by name, so reordering them in the
/// file does not change what is read.
#[derive(Debug, Clone)]
pub struct SummaryTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl SummaryTable {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let rows = csv_reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(SummaryTable { headers, rows })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))
    }

    pub fn column_str(&self, name: &str) -> Result<Vec<String>> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).unwrap_or("").to_string())
            .collect())
    }

    pub fn column_f64(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row_no, row)| {
                let raw = row.get(idx).unwrap_or("");
                raw.parse::<f64>().map_err(|_| AnalysisError::InvalidValue {
                    column: name.to_string(),
                    row: row_no + 1,
                    value: raw.to_string(),
                })
            })
            .collect()
    }

    /// Reads two numeric columns as an (x, y) series in file order.
    pub fn pairs(&self, x_column: &str, y_column: &str) -> Result<Vec<SweepPoint>> {
        let xs = self.column_f64(x_column)?;
        let ys = self.column_f64(y_column)?;
        Ok(xs
            .into_iter()
            .zip(ys)
            .map(|(x, y)| SweepPoint { x, y })
            .collect())
    }

    /// Reads a label column against a numeric column, e.g. `scheme` → `peak_dt_s`.
    pub fn labeled(&self, label_column: &str, value_column: &str) -> Result<Vec<(String, f64)>> {
        let labels = self.column_str(label_column)?;
        let values = self.column_f64(value_column)?;
        Ok(labels.into_iter().zip(values).collect())
    }
}
