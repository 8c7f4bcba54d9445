//! model::errors — fit-time error type for the modeling stack.
//!
//! Purpose
//! -------
//! Provide [`ModelError`] and the [`ModelResult`] alias used by the adstock
//! transform, feature construction, scaling, regression, cross-validation,
//! and pipeline configuration. Every variant here is fatal to the operation
//! that raised it; fitting is all-or-nothing, so a failed fit never leaves a
//! partially built pipeline behind.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of the violated constraint and embed the
//!   offending value.
//! - Under `python-bindings`, `ModelError` converts into `PyValueError`.
use crate::features::vector::Feature;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for modeling operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// ModelError — failures raised while transforming, fitting, or evaluating.
///
/// Variants
/// --------
/// - `InsufficientData { rows, required }`
///   Fewer rows than `features + 1`; the regression is underdetermined.
/// - `DegenerateFeature { feature, std }`
///   A feature's standard deviation is zero, so scaling is undefined.
/// - `NonFiniteStatistic { feature, mean, std }`
///   A feature's mean or standard deviation overflowed.
/// - `InvalidDecay { alpha }`
///   Adstock decay outside `[0, 1)` or non-finite.
/// - `NonFiniteSpend { index, value }`
///   A spend value fed to adstock is NaN/±∞.
/// - `AdstockOverflow { index, value }`
///   Finite spend accumulated past the range of `f64`.
/// - `DimensionMismatch { expected, actual, context }`
///   Two aligned containers disagree in length.
/// - `InvalidFolds { folds, rows }`
///   Fold count outside `2..=rows`.
/// - `SingularDesign { reason }`
///   The least-squares solver could not produce coefficients.
/// - `InvalidOption { name, reason }`
///   A configuration value failed validation.
/// - `Config { message }`
///   A configuration document could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Data volume / shape ----
    InsufficientData { rows: usize, required: usize },
    DimensionMismatch { expected: usize, actual: usize, context: &'static str },

    // ---- Numerical ----
    DegenerateFeature { feature: Feature, std: f64 },
    NonFiniteStatistic { feature: Feature, mean: f64, std: f64 },
    SingularDesign { reason: String },

    // ---- Adstock ----
    InvalidDecay { alpha: f64 },
    NonFiniteSpend { index: usize, value: f64 },
    AdstockOverflow { index: usize, value: f64 },

    // ---- Validation / configuration ----
    InvalidFolds { folds: usize, rows: usize },
    InvalidOption { name: &'static str, reason: String },
    Config { message: String },
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InsufficientData { rows, required } => {
                write!(f, "Need at least {required} valid rows to fit the model; got {rows}.")
            }
            ModelError::DimensionMismatch { expected, actual, context } => {
                write!(f, "Length mismatch in {context}: expected {expected}, got {actual}.")
            }
            ModelError::DegenerateFeature { feature, std } => {
                write!(
                    f,
                    "Feature '{}' has standard deviation {std}; scaling is undefined.",
                    feature.name()
                )
            }
            ModelError::NonFiniteStatistic { feature, mean, std } => {
                write!(
                    f,
                    "Feature '{}' statistics are non-finite (mean {mean}, std {std}); \
                     rescale the input.",
                    feature.name()
                )
            }
            ModelError::SingularDesign { reason } => {
                write!(f, "Least-squares solve failed: {reason}")
            }
            ModelError::InvalidDecay { alpha } => {
                write!(f, "Adstock decay must be finite and in [0, 1); got: {alpha}")
            }
            ModelError::NonFiniteSpend { index, value } => {
                write!(f, "Spend at index {index} is non-finite: {value}")
            }
            ModelError::AdstockOverflow { index, value } => {
                write!(f, "Adstocked spend at index {index} overflowed to {value}")
            }
            ModelError::InvalidFolds { folds, rows } => {
                write!(f, "Fold count must satisfy 2 <= k <= n ({rows}); got: {folds}")
            }
            ModelError::InvalidOption { name, reason } => {
                write!(f, "Invalid option '{name}': {reason}")
            }
            ModelError::Config { message } => write!(f, "Invalid configuration: {message}"),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<ModelError> for PyErr {
    fn from(err: ModelError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
