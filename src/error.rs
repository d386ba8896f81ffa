use std::io;
use thiserror::Error;

/// Failures that escape the core.
///
/// Malformed lines and empty groups are handled locally and never show up
/// here; `NoData` is the only outcome for "the run produced nothing usable".
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No usable data: {0}")]
    NoData(String),

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed metric table: {0}")]
    TableShape(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    pub fn is_no_data(&self) -> bool {
        matches!(self, AnalysisError::NoData(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_messages_and_sources() {
        let err = AnalysisError::InvalidValue {
            column: "hit_rate".to_string(),
            row: 3,
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value 'abc' in column 'hit_rate' at row 3");
        assert!(err.source().is_none());

        let err: AnalysisError = io::Error::new(io::ErrorKind::NotFound, "trace.txt").into();
        assert!(matches!(err, AnalysisError::Io(_)));
        assert!(err.source().is_some());

        assert!(AnalysisError::NoData("empty trace".to_string()).is_no_data());
    }
}
