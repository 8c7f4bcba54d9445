//! model — scaling, demand estimation, and cross-validation.
//!
//! Purpose
//! -------
//! Everything between the feature matrix and a sales prediction: the
//! [`StandardScaler`] fixed at fit time, the OLS [`LinearRegression`], the
//! [`Regressor`] seam, and seeded k-fold [`cross_validate`].
//!
//! Key behaviors
//! -------------
//! - [`scaler`]: per-feature standardisation; rejects constant features.
//! - [`estimator`]: OLS with intercept via SVD least squares, plus [`rmse`].
//! - [`cross_validation`]: fold partitioning and per-fold RMSE.
//! - [`errors`]: [`ModelError`] / [`ModelResult`] shared by the features and
//!   pipeline modules.
//!
//! Invariants & assumptions
//! ------------------------
//! - Fitted state (scaler statistics, coefficients) is immutable; inference
//!   goes through `&self`.

pub mod cross_validation;
pub mod errors;
pub mod estimator;
pub mod scaler;

pub use self::cross_validation::{CvOptions, CvReport, DEFAULT_FOLDS, cross_validate, fold_indices};
pub use self::errors::{ModelError, ModelResult};
pub use self::estimator::{LinearRegression, Regressor, rmse};
pub use self::scaler::{DEGENERATE_STD, ScalerState, StandardScaler};
