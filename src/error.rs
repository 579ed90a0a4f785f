use thiserror::Error;

use crate::types::Scalar;

/// Convenience result type for chart data operations.
pub type ChartDataResult<T> = Result<T, ChartDataError>;

/// Error type returned by store, series, pipeline and ingestion functions.
///
/// A failed query never invalidates the value it was called on; every other operation remains
/// usable.
#[derive(Debug, Error)]
pub enum ChartDataError {
    /// A referenced column key is not declared on the store.
    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    /// A frame, group or point index is outside the valid range (or not an integer where one is
    /// required).
    #[error("index {index} out of range (len={len})")]
    IndexOutOfRange { index: String, len: usize },

    /// An argument is well-formed but not acceptable for the operation.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A construction-time contract was violated.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl ChartDataError {
    pub(crate) fn unknown_column(column: &str) -> Self {
        Self::UnknownColumn {
            column: column.to_owned(),
        }
    }

    pub(crate) fn index_out_of_range(index: impl ToString, len: usize) -> Self {
        Self::IndexOutOfRange {
            index: index.to_string(),
            len,
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Non-fatal data-quality diagnostics.
///
/// These never abort an operation; they are reported through
/// [`crate::observability::ChartDataObserver::on_warning`] and logged with `tracing`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataQualityWarning {
    /// More than one row of a frame matched a join key during interpolation. The first row wins.
    #[error("{matches} rows in frame {frame} share {primary_column}={value}; using the first")]
    DuplicateJoinKey {
        primary_column: String,
        value: Scalar,
        frame: usize,
        matches: usize,
    },

    /// A raw cell held a value outside the scalar domain and was replaced by null.
    #[error("row {row} column '{column}' is not a string, number or null; coerced to null")]
    CoercedToNull { row: usize, column: String },
}
