//! model::estimator — ordinary least squares demand estimator.
//!
//! Purpose
//! -------
//! Fit a linear map from scaled features to sales,
//!
//! ```text
//! ŷ = β₀ + Σⱼ βⱼ · zⱼ,
//! ```
//!
//! by ordinary least squares, and evaluate it deterministically afterwards.
//! The [`Regressor`] trait is the seam the cross-validator uses to train a
//! fresh estimator per fold.
//!
//! Key behaviors
//! -------------
//! - The design matrix `[1 | Z]` is copied into a `nalgebra::DMatrix` and
//!   solved by SVD least squares, so a rank-deficient design still yields the
//!   minimum-norm solution instead of failing.
//! - Fitting requires at least `p + 1` rows for `p` features.
//! - Prediction takes `&self`, never mutates the fitted coefficients, and is
//!   safe to call from many threads at once.
//!
//! Conventions
//! -----------
//! - Singular values at or below [`SVD_EPS`] × the largest singular value are
//!   treated as zero.
use crate::model::errors::{ModelError, ModelResult};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::Serialize;
use tracing::{debug, warn};

/// Relative cutoff for singular values in the least-squares solve.
pub const SVD_EPS: f64 = 1e-10;

/// A regression model that can be trained from scratch and queried.
pub trait Regressor: Sized + Send + Sync {
    /// Train a new model on `features` (`n × p`) and `targets` (`n`).
    fn fit(features: ArrayView2<'_, f64>, targets: ArrayView1<'_, f64>) -> ModelResult<Self>;

    /// Predict a single row of `p` features.
    fn predict_one(&self, features: ArrayView1<'_, f64>) -> ModelResult<f64>;

    /// Predict every row of an `n × p` matrix.
    fn predict(&self, features: ArrayView2<'_, f64>) -> ModelResult<Array1<f64>> {
        features.rows().into_iter().map(|row| self.predict_one(row)).collect()
    }
}

/// LinearRegression — OLS coefficients plus intercept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearRegression {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl LinearRegression {
    /// Build a model from known coefficients.
    pub fn from_parts(coefficients: Array1<f64>, intercept: f64) -> Self {
        LinearRegression { coefficients, intercept }
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

impl Regressor for LinearRegression {
    /// Ordinary least squares with intercept.
    ///
    /// Errors
    /// ------
    /// - `ModelError::DimensionMismatch` if `targets.len() != features.nrows()`.
    /// - `ModelError::InsufficientData` if `n < p + 1`.
    /// - `ModelError::SingularDesign` if the SVD solve fails or yields
    ///   non-finite coefficients.
    fn fit(features: ArrayView2<'_, f64>, targets: ArrayView1<'_, f64>) -> ModelResult<Self> {
        let (n, p) = features.dim();
        if targets.len() != n {
            return Err(ModelError::DimensionMismatch {
                expected: n,
                actual: targets.len(),
                context: "regression targets",
            });
        }
        if n < p + 1 {
            return Err(ModelError::InsufficientData { rows: n, required: p + 1 });
        }

        let design = DMatrix::<f64>::from_fn(n, p + 1, |i, j| {
            if j == 0 { 1.0 } else { features[[i, j - 1]] }
        });
        let rhs = DVector::<f64>::from_iterator(n, targets.iter().copied());

        let svd = design.svd(true, true);
        let max_sv = svd.singular_values.max();
        let eps = SVD_EPS * max_sv.max(1.0);
        let rank = svd.rank(eps);
        if rank < p + 1 {
            warn!(rank, columns = p + 1, "rank-deficient design; using minimum-norm solution");
        }
        let beta = svd
            .solve(&rhs, eps)
            .map_err(|reason| ModelError::SingularDesign { reason: reason.to_string() })?;
        if beta.iter().any(|b| !b.is_finite()) {
            return Err(ModelError::SingularDesign {
                reason: "non-finite coefficient in solution".to_string(),
            });
        }

        let intercept = beta[0];
        let coefficients = Array1::from_iter(beta.iter().skip(1).copied());
        debug!(rows = n, features = p, intercept, "fitted linear regression");
        Ok(LinearRegression { coefficients, intercept })
    }

    fn predict_one(&self, features: ArrayView1<'_, f64>) -> ModelResult<f64> {
        if features.len() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: features.len(),
                context: "prediction input",
            });
        }
        Ok(self.intercept + self.coefficients.dot(&features))
    }
}

/// Root-mean-squared error between predictions and targets.
///
/// Errors
/// ------
/// - `ModelError::DimensionMismatch` on length mismatch.
/// - `ModelError::InsufficientData` on empty input.
pub fn rmse(predicted: ArrayView1<'_, f64>, actual: ArrayView1<'_, f64>) -> ModelResult<f64> {
    if predicted.len() != actual.len() {
        return Err(ModelError::DimensionMismatch {
            expected: actual.len(),
            actual: predicted.len(),
            context: "rmse inputs",
        });
    }
    if actual.is_empty() {
        return Err(ModelError::InsufficientData { rows: 0, required: 1 });
    }
    let sse: f64 = predicted.iter().zip(actual.iter()).map(|(p, a)| (p - a).powi(2)).sum();
    Ok((sse / actual.len() as f64).sqrt())
}
