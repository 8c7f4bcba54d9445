//! simulation::errors — per-query scenario failures.
//!
//! Scenario errors are recoverable: the query is rejected and the fitted
//! pipeline it ran against is left exactly as it was.
use crate::model::errors::ModelError;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for scenario queries.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// ScenarioError — reasons a spend allocation could not be evaluated.
///
/// Variants
/// --------
/// - `InvalidAllocation { channel, spend }`
///   A spend is negative or non-finite, or the allocation total overflows.
/// - `UnknownChannel { channel }`
///   The allocation names a channel absent from the training data.
/// - `Model(ModelError)`
///   Scaling or prediction failed for the synthetic feature vector.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioError {
    InvalidAllocation { channel: String, spend: f64 },
    UnknownChannel { channel: String },
    Model(ModelError),
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioError::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::InvalidAllocation { channel, spend } => {
                write!(f, "Spend for '{channel}' must be finite and >= 0; got: {spend}")
            }
            ScenarioError::UnknownChannel { channel } => {
                write!(f, "Channel '{channel}' does not appear in the training data.")
            }
            ScenarioError::Model(err) => write!(f, "Scenario evaluation failed: {err}"),
        }
    }
}

impl From<ModelError> for ScenarioError {
    fn from(err: ModelError) -> Self {
        ScenarioError::Model(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<ScenarioError> for PyErr {
    fn from(err: ScenarioError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
