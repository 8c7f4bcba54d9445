//! data::errors — row-level validation and ingest errors.
//!
//! Purpose
//! -------
//! Describe why a raw input row was rejected ([`DataValidationError`]) and why
//! an input table could not be read at all ([`IngestError`]). Row errors are
//! recoverable: the cleaner drops the row, records the reason, and moves on.
//! Ingest errors are fatal to loading.
//!
//! Conventions
//! -----------
//! - Row indices are 0-based positions in the input sequence (not CSV line
//!   numbers); CSV callers add the header offset themselves when reporting.
//! - Field names are the input column names (`ad_cost`, `timestamp`, ...).
//! - Under `python-bindings` both types convert into `PyValueError`.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for single-row validation.
pub type DataResult<T> = Result<T, DataValidationError>;

/// Result alias for table loading.
pub type IngestResult<T> = Result<T, IngestError>;

/// DataValidationError — reasons an input row is excluded from modeling.
///
/// Variants
/// --------
/// - `MissingField { field }`
///   The field is absent or blank.
/// - `InvalidNumber { field, raw }`
///   The field could not be parsed as a number.
/// - `InvalidTimestamp { raw }`
///   The timestamp did not parse as a timezone-naive point in time.
/// - `NonFiniteValue { field, value }`
///   The value parsed but is NaN or ±∞.
/// - `NegativeAdCost { value }`
///   `ad_cost < 0`.
/// - `EmptyChannel`
///   `channel_name` is empty after trimming.
/// - `Undecodable { reason }`
///   The reader could not decode the row (e.g. invalid UTF-8).
#[derive(Debug, Clone, PartialEq)]
pub enum DataValidationError {
    MissingField { field: &'static str },
    InvalidNumber { field: &'static str, raw: String },
    InvalidTimestamp { raw: String },
    NonFiniteValue { field: &'static str, value: f64 },
    NegativeAdCost { value: f64 },
    EmptyChannel,
    Undecodable { reason: String },
}

impl std::error::Error for DataValidationError {}

impl std::fmt::Display for DataValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValidationError::MissingField { field } => {
                write!(f, "Required field '{field}' is missing or blank.")
            }
            DataValidationError::InvalidNumber { field, raw } => {
                write!(f, "Field '{field}' is not a number: '{raw}'.")
            }
            DataValidationError::InvalidTimestamp { raw } => {
                write!(f, "Timestamp '{raw}' is not a timezone-naive date/time.")
            }
            DataValidationError::NonFiniteValue { field, value } => {
                write!(f, "Field '{field}' must be finite; got: {value}")
            }
            DataValidationError::NegativeAdCost { value } => {
                write!(f, "ad_cost must be >= 0; got: {value}")
            }
            DataValidationError::EmptyChannel => write!(f, "channel_name must not be empty."),
            DataValidationError::Undecodable { reason } => {
                write!(f, "Row could not be decoded: {reason}")
            }
        }
    }
}

/// IngestError — failures that prevent an input table from being read.
#[derive(Debug)]
pub enum IngestError {
    /// The file could not be opened.
    Io { path: String, source: std::io::Error },
    /// The CSV reader failed on the header row or the byte stream.
    Csv(csv::Error),
    /// A required column is absent from the header row.
    MissingColumn { column: &'static str },
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Io { source, .. } => Some(source),
            IngestError::Csv(err) => Some(err),
            IngestError::MissingColumn { .. } => None,
        }
    }
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Io { path, source } => write!(f, "Failed to open '{path}': {source}"),
            IngestError::Csv(err) => write!(f, "Failed to read CSV input: {err}"),
            IngestError::MissingColumn { column } => {
                write!(f, "Input table is missing required column '{column}'.")
            }
        }
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::Csv(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<DataValidationError> for PyErr {
    fn from(err: DataValidationError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(feature = "python-bindings")]
impl From<IngestError> for PyErr {
    fn from(err: IngestError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
