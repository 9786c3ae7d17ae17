// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading, validating or aggregating experiment data.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("File not found: '{0}'")]
    MissingFile(PathBuf),

    #[error("File is empty: '{0}'")]
    EmptyFile(PathBuf),

    #[error("Column '{column}' not found in '{table}'")]
    MissingColumn { column: String, table: String },

    #[error("Invalid value '{value}' in column '{column}', row {row} of '{table}'")]
    Parse {
        table: String,
        column: String,
        row: usize,
        value: String,
    },

    /// The table does not have the columns a pipeline stage requires.
    #[error("'{table}' rejected: {reason}")]
    Schema { table: String, reason: String },

    /// Event label outside the fixed event vocabulary.
    #[error("Unknown event label '{0}'")]
    UnknownEvent(String),

    #[error("Signal '{0}' contains no samples")]
    EmptySignal(String),

    #[error("No data: {0}")]
    NoData(String),
}

impl AnalysisError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            AnalysisError::MissingFile(path)
        } else {
            AnalysisError::Io { path, source }
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        AnalysisError::Csv {
            path: path.into(),
            source,
        }
    }

    /// True for the failures the quality scorer tolerates per station: the
    /// recording file or its channel is absent, or the channel holds no samples.
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            AnalysisError::MissingFile(_)
                | AnalysisError::EmptyFile(_)
                | AnalysisError::MissingColumn { .. }
                | AnalysisError::EmptySignal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_missing_file() {
        let err = AnalysisError::io(
            "exp_a/lion/EEG.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, AnalysisError::MissingFile(_)));
        assert!(err.is_missing_data());
    }

    #[test]
    fn test_other_io_errors_are_fatal() {
        let err = AnalysisError::io(
            "exp_a/lion/EEG.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, AnalysisError::Io { .. }));
        assert!(!err.is_missing_data());
        assert!(!AnalysisError::UnknownEvent("x".into()).is_missing_data());
    }
}
