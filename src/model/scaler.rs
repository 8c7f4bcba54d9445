//! model::scaler — per-feature standardisation fixed at fit time.
//!
//! Purpose
//! -------
//! Learn per-feature mean and population standard deviation from the training
//! [`FeatureMatrix`] once, then map any feature vector or matrix to
//! `(x − mean) / std` using exactly those statistics. Scenario queries reuse
//! the training state; nothing in this module ever refits on inference data.
//!
//! Key behaviors
//! -------------
//! - [`StandardScaler::fit`] computes statistics with `statrs` and rejects a
//!   constant feature with [`ModelError::DegenerateFeature`]. Statistics that
//!   overflow are reported as [`ModelError::NonFiniteStatistic`] instead.
//! - [`StandardScaler::transform_vector`] / [`StandardScaler::transform_matrix`]
//!   are pure functions of the stored [`ScalerState`].
//! - [`StandardScaler::from_state`] rebuilds a scaler from explicit
//!   statistics; transform re-checks the stored std so a zero entry surfaces as
//!   an error rather than NaN/Inf.
//!
//! Conventions
//! -----------
//! - Population standard deviation (divisor `n`), matching the usual
//!   standard-scaler convention.
//! - A std at or below [`DEGENERATE_STD`] counts as zero.
use crate::{
    features::vector::{FEATURE_COUNT, Feature, FeatureMatrix, FeatureVector},
    model::errors::{ModelError, ModelResult},
};
use ndarray::{Array1, Array2, ArrayView2};
use serde::Serialize;
use statrs::statistics::Statistics;

/// Standard deviations at or below this value are treated as zero.
pub const DEGENERATE_STD: f64 = 1e-12;

/// Learned per-feature statistics, indexed by [`Feature::index`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalerState {
    pub mean: [f64; FEATURE_COUNT],
    pub std: [f64; FEATURE_COUNT],
}

/// StandardScaler — zero-mean / unit-variance scaling with frozen state.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    state: ScalerState,
}

impl StandardScaler {
    /// Learn mean and population std for every feature column.
    ///
    /// Errors
    /// ------
    /// - `ModelError::InsufficientData` if the matrix has no rows.
    /// - `ModelError::NonFiniteStatistic` if a column's mean or std is not
    ///   finite.
    /// - `ModelError::DegenerateFeature` for the first constant column.
    pub fn fit(matrix: &FeatureMatrix) -> ModelResult<Self> {
        if matrix.is_empty() {
            return Err(ModelError::InsufficientData { rows: 0, required: 1 });
        }
        let mut mean = [0.0; FEATURE_COUNT];
        let mut std = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            let column = matrix.column(feature);
            let j = feature.index();
            mean[j] = column.iter().mean();
            std[j] = column.iter().population_std_dev();
            if !mean[j].is_finite() || !std[j].is_finite() {
                return Err(ModelError::NonFiniteStatistic { feature, mean: mean[j], std: std[j] });
            }
            if !(std[j] > DEGENERATE_STD) {
                return Err(ModelError::DegenerateFeature { feature, std: std[j] });
            }
        }
        Ok(StandardScaler { state: ScalerState { mean, std } })
    }

    /// Rebuild a scaler from explicit statistics without validation.
    pub fn from_state(state: ScalerState) -> Self {
        StandardScaler { state }
    }

    pub fn state(&self) -> &ScalerState {
        &self.state
    }

    /// Scale one feature vector with the stored statistics.
    pub fn transform_vector(&self, vector: &FeatureVector) -> ModelResult<Array1<f64>> {
        self.check_state()?;
        let values = vector.to_array();
        Ok(Array1::from_iter(
            (0..FEATURE_COUNT).map(|j| (values[j] - self.state.mean[j]) / self.state.std[j]),
        ))
    }

    /// Scale every row of an `n × FEATURE_COUNT` matrix.
    ///
    /// Errors
    /// ------
    /// - `ModelError::DimensionMismatch` if the matrix has the wrong column
    ///   count.
    /// - `ModelError::DegenerateFeature` if a stored std is zero.
    pub fn transform_matrix(&self, values: ArrayView2<'_, f64>) -> ModelResult<Array2<f64>> {
        if values.ncols() != FEATURE_COUNT {
            return Err(ModelError::DimensionMismatch {
                expected: FEATURE_COUNT,
                actual: values.ncols(),
                context: "scaler input columns",
            });
        }
        self.check_state()?;
        let mut out = values.to_owned();
        for (j, mut column) in out.columns_mut().into_iter().enumerate() {
            let (m, s) = (self.state.mean[j], self.state.std[j]);
            column.mapv_inplace(|x| (x - m) / s);
        }
        Ok(out)
    }

    fn check_state(&self) -> ModelResult<()> {
        for feature in Feature::ALL {
            let std = self.state.std[feature.index()];
            if !(std > DEGENERATE_STD) || !std.is_finite() {
                return Err(ModelError::DegenerateFeature { feature, std });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn vector(seed: f64) -> FeatureVector {
        FeatureVector {
            adstocked_spend: 10.0 * seed,
            homepage_visits: 1000.0 + 7.0 * seed,
            branded_searches: 50.0 - seed,
            conversion_rate: 0.01 * seed,
            hour: seed,
            day_of_week: (seed as i64 % 7) as f64,
        }
    }

    fn matrix(rows: &[FeatureVector]) -> FeatureMatrix {
        let ts = NaiveDate::from_ymd_opt(2024, 4, 7).unwrap().and_hms_opt(0, 0, 0).unwrap();
        FeatureMatrix::from_rows(
            rows,
            vec![0.0; rows.len()],
            vec![ts; rows.len()],
            vec!["TV".to_string(); rows.len()],
        )
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Scaled training columns have zero mean and unit population variance.
    fn fit_then_transform_standardises_columns() {
        let rows: Vec<_> = (1..=8).map(|i| vector(i as f64)).collect();
        let m = matrix(&rows);

        let scaler = StandardScaler::fit(&m).unwrap();
        let scaled = scaler.transform_matrix(m.values()).unwrap();

        for column in scaled.columns() {
            assert_relative_eq!(column.iter().mean(), 0.0, epsilon = 1e-12);
            assert_relative_eq!(column.iter().population_std_dev(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Transform is pure: repeated calls with the same input agree exactly,
    // and a single row scaled as a vector matches its matrix row.
    fn transform_is_pure_and_vector_matches_matrix_row() {
        let rows: Vec<_> = (1..=6).map(|i| vector(i as f64)).collect();
        let m = matrix(&rows);
        let scaler = StandardScaler::fit(&m).unwrap();
        let before = scaler.state().clone();

        let once = scaler.transform_vector(&rows[2]).unwrap();
        let twice = scaler.transform_vector(&rows[2]).unwrap();
        let full = scaler.transform_matrix(m.values()).unwrap();

        assert_eq!(once, twice);
        assert_eq!(once, full.row(2).to_owned());
        assert_eq!(scaler.state(), &before);
    }

    #[test]
    // Purpose
    // -------
    // A constant feature makes fit fail and names the feature.
    //
    // Given
    // -----
    // - Rows whose `hour` is always 9.
    //
    // Expect
    // ------
    // - `DegenerateFeature { feature: Hour, std: 0 }`.
    fn fit_rejects_constant_feature() {
        let rows: Vec<_> = (1..=5)
            .map(|i| FeatureVector { hour: 9.0, ..vector(i as f64) })
            .collect();

        let err = StandardScaler::fit(&matrix(&rows)).unwrap_err();

        assert_eq!(err, ModelError::DegenerateFeature { feature: Feature::Hour, std: 0.0 });
    }

    #[test]
    // Purpose
    // -------
    // Finite values whose variance overflows are reported as non-finite
    // statistics, never as a constant feature.
    //
    // Given
    // -----
    // - `adstocked_spend` alternating between ±1e200.
    //
    // Expect
    // ------
    // - `NonFiniteStatistic` for `AdstockedSpend` with an infinite std.
    fn fit_separates_overflow_from_constant_feature() {
        let rows: Vec<_> = (1..=6)
            .map(|i| FeatureVector {
                adstocked_spend: if i % 2 == 0 { 1e200 } else { -1e200 },
                ..vector(i as f64)
            })
            .collect();

        let err = StandardScaler::fit(&matrix(&rows)).unwrap_err();

        assert!(matches!(
            err,
            ModelError::NonFiniteStatistic { feature: Feature::AdstockedSpend, std, .. }
                if !std.is_finite()
        ));
    }

    #[test]
    // Purpose
    // -------
    // A scaler rebuilt with a zero std refuses to transform instead of
    // producing infinities.
    fn transform_with_zero_std_state_errors() {
        let mut std = [1.0; FEATURE_COUNT];
        std[Feature::ConversionRate.index()] = 0.0;
        let scaler = StandardScaler::from_state(ScalerState { mean: [0.0; FEATURE_COUNT], std });

        let err = scaler.transform_vector(&vector(1.0)).unwrap_err();

        assert_eq!(
            err,
            ModelError::DegenerateFeature { feature: Feature::ConversionRate, std: 0.0 }
        );
    }

    #[test]
    fn transform_matrix_checks_column_count() {
        let scaler = StandardScaler::from_state(ScalerState {
            mean: [0.0; FEATURE_COUNT],
            std: [1.0; FEATURE_COUNT],
        });
        let wrong = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            scaler.transform_matrix(wrong.view()),
            Err(ModelError::DimensionMismatch { expected: 6, actual: 3, .. })
        ));
    }
}
