// src/error.rs

use std::path::PathBuf;

/// Failure to build the in-memory table at startup. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("failed to open dataset {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset is missing required column `{0}`")]
    MissingColumn(String),

    #[error("malformed row {row}, column `{column}`: {reason}")]
    Malformed {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("unreadable CSV row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read CSV header: {0}")]
    Header(#[source] csv::Error),

    #[error("dataset contains no rows")]
    Empty,
}

/// Failure to serialize a trace list into a chart payload.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("trace `{trace}` has a non-finite value at index {index}")]
    NonFinite { trace: String, index: usize },

    #[error("failed to serialize traces: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure to produce a page: a chart payload or the HTML template.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("failed to render template: {0}")]
    Template(#[from] askama::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DataLoadError::MissingColumn("Rape".into());
        assert_eq!(err.to_string(), "dataset is missing required column `Rape`");

        let err = EncodingError::NonFinite {
            trace: "DV".into(),
            index: 3,
        };
        assert_eq!(
            err.to_string(),
            "trace `DV` has a non-finite value at index 3"
        );
    }
}
