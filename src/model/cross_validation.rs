//! model::cross_validation — k-fold RMSE for any [`Regressor`].
//!
//! Purpose
//! -------
//! Estimate out-of-sample accuracy by partitioning the rows into `k` folds,
//! training a fresh estimator on `k − 1` folds, and scoring RMSE on the
//! held-out fold. The production estimator is never touched.
//!
//! Key behaviors
//! -------------
//! - [`fold_indices`] sizes folds so that the first `n % k` folds hold one
//!   extra row. Without a seed the folds are contiguous index blocks; with a
//!   seed the indices are shuffled once by `StdRng::seed_from_u64` first.
//! - [`cross_validate`] is generic over [`Regressor`] and returns a
//!   [`CvReport`] with the fold partition and per-fold RMSE.
//!
//! Invariants & assumptions
//! ------------------------
//! - Folds are pairwise disjoint and their union is `0..n`.
//! - The same `(n, options)` always yields the same partition.
use crate::model::{
    errors::{ModelError, ModelResult},
    estimator::{Regressor, rmse},
};
use ndarray::{ArrayView1, ArrayView2, Axis};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

/// Fold count used when none is configured.
pub const DEFAULT_FOLDS: usize = 5;

/// CvOptions — fold count and optional shuffle seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CvOptions {
    pub folds: usize,
    /// `None` keeps contiguous folds; `Some(seed)` shuffles rows first.
    pub seed: Option<u64>,
}

impl CvOptions {
    /// Validated constructor; `folds` must be at least 2.
    pub fn new(folds: usize, seed: Option<u64>) -> ModelResult<Self> {
        let opts = CvOptions { folds, seed };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.folds < 2 {
            return Err(ModelError::InvalidOption {
                name: "cv.folds",
                reason: format!("must be at least 2; got {}", self.folds),
            });
        }
        Ok(())
    }
}

impl Default for CvOptions {
    fn default() -> Self {
        CvOptions { folds: DEFAULT_FOLDS, seed: None }
    }
}

/// CvReport — fold partition and held-out RMSE per fold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvReport {
    pub folds: Vec<Vec<usize>>,
    pub fold_rmse: Vec<f64>,
}

impl CvReport {
    pub fn mean_rmse(&self) -> f64 {
        self.fold_rmse.iter().mean()
    }

    /// Sample standard deviation of the fold RMSEs (NaN for a single fold).
    pub fn std_rmse(&self) -> f64 {
        self.fold_rmse.iter().std_dev()
    }
}

/// Partition `0..n` into `options.folds` folds.
///
/// Errors
/// ------
/// - `ModelError::InvalidFolds` unless `2 <= k <= n`.
pub fn fold_indices(n: usize, options: &CvOptions) -> ModelResult<Vec<Vec<usize>>> {
    let k = options.folds;
    if k < 2 || k > n {
        return Err(ModelError::InvalidFolds { folds: k, rows: n });
    }
    let mut order: Vec<usize> = (0..n).collect();
    if let Some(seed) = options.seed {
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
    }

    let (base, extra) = (n / k, n % k);
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        folds.push(order[start..start + size].to_vec());
        start += size;
    }
    Ok(folds)
}

/// Train a fresh `R` per fold and score RMSE on the held-out rows.
///
/// Errors
/// ------
/// - `ModelError::DimensionMismatch` if `targets.len() != features.nrows()`.
/// - `ModelError::InvalidFolds` for an invalid fold count.
/// - Any error from `R::fit` on a training split.
pub fn cross_validate<R: Regressor>(
    features: ArrayView2<'_, f64>, targets: ArrayView1<'_, f64>, options: &CvOptions,
) -> ModelResult<CvReport> {
    let n = features.nrows();
    if targets.len() != n {
        return Err(ModelError::DimensionMismatch {
            expected: n,
            actual: targets.len(),
            context: "cross-validation targets",
        });
    }
    let folds = fold_indices(n, options)?;

    let mut fold_rmse = Vec::with_capacity(folds.len());
    for (i, test) in folds.iter().enumerate() {
        let train: Vec<usize> = folds
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .flat_map(|(_, f)| f.iter().copied())
            .collect();

        let model = R::fit(
            features.select(Axis(0), &train).view(),
            targets.select(Axis(0), &train).view(),
        )?;
        let predicted = model.predict(features.select(Axis(0), test).view())?;
        let score = rmse(predicted.view(), targets.select(Axis(0), test).view())?;
        debug!(
            fold = i,
            train = train.len(),
            test = test.len(),
            rmse = score,
            "cross-validation fold"
        );
        fold_rmse.push(score);
    }
    Ok(CvReport { folds, fold_rmse })
}
