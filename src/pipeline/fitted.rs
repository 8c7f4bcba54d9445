//! FittedPipeline — the immutable result of one end-to-end fit.
//!
//! Purpose
//! -------
//! Run adstock → feature construction → scaling → OLS once over cleaned
//! observations and hold every piece of fitted state the scenario simulator
//! and the cross-validator need: the raw and scaled feature matrices, the
//! scaler, the estimator, per-channel averages, and the sales trend.
//!
//! Key behaviors
//! -------------
//! - [`FittedPipeline::fit`] is all-or-nothing: the value exists only if every
//!   step succeeded.
//! - [`FittedPipeline::predict_features`] scales with the stored statistics and
//!   predicts; it is the single inference path for training rows and
//!   synthetic scenario points alike.
//! - [`FittedPipeline::cross_validate`] trains fresh estimators on folds of the
//!   scaled training matrix and leaves the production estimator alone.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least `FEATURE_COUNT + 1` observations are required.
//! - After construction nothing is mutated; the value is `Send + Sync` and is
//!   shared by `Arc`.
use crate::{
    data::observation::Observation,
    features::{
        builder::FeatureBuilder,
        vector::{FEATURE_COUNT, FeatureMatrix, FeatureVector},
    },
    model::{
        cross_validation::{CvOptions, CvReport, cross_validate},
        errors::{ModelError, ModelResult},
        estimator::{LinearRegression, Regressor, rmse},
        scaler::StandardScaler,
    },
    pipeline::options::PipelineOptions,
    simulation::averages::{ChannelAverages, SalesTrend},
};
use chrono::NaiveDateTime;
use ndarray::{Array1, Array2, ArrayView2};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct FittedPipeline {
    options: PipelineOptions,
    features: FeatureMatrix,
    scaled: Array2<f64>,
    scaler: StandardScaler,
    estimator: LinearRegression,
    averages: ChannelAverages,
    trend: Arc<SalesTrend>,
    predicted_at: NaiveDateTime,
    training_rmse: f64,
}

impl FittedPipeline {
    /// Fit every stage on `data` (a `CleanedTable`, a slice, or a `Vec` of
    /// observations).
    ///
    /// Errors
    /// ------
    /// - Option validation errors.
    /// - `ModelError::InsufficientData` for fewer than `FEATURE_COUNT + 1`
    ///   rows.
    /// - `ModelError::AdstockOverflow` if carried spend leaves the `f64` range.
    /// - `ModelError::NonFiniteStatistic` / `ModelError::DegenerateFeature` if a
    ///   feature's statistics overflow or the feature is constant.
    /// - `ModelError::SingularDesign` if the least-squares solve fails.
    /// - `ModelError::InvalidOption` if the prediction timestamp overflows.
    pub fn fit<D>(data: &D, options: &PipelineOptions) -> ModelResult<Self>
    where
        D: AsRef<[Observation]> + ?Sized,
    {
        options.validate()?;
        let observations = data.as_ref();
        let required = FEATURE_COUNT + 1;
        if observations.len() < required {
            return Err(ModelError::InsufficientData { rows: observations.len(), required });
        }
        info!(
            rows = observations.len(),
            alpha = options.adstock.alpha,
            "fitting marketing-mix pipeline"
        );

        let features = FeatureBuilder::new(options.adstock).build(observations)?;
        let scaler = StandardScaler::fit(&features)?;
        let scaled = scaler.transform_matrix(features.values())?;
        let estimator = LinearRegression::fit(scaled.view(), features.targets())?;
        let averages = ChannelAverages::from_matrix(&features)?;
        let trend = SalesTrend::from_matrix(&features);

        let last = trend
            .last()
            .map(|p| p.timestamp)
            .ok_or(ModelError::InsufficientData { rows: 0, required })?;
        let predicted_at = last
            .checked_add_signed(options.scenario.prediction_offset())
            .ok_or_else(|| ModelError::InvalidOption {
                name: "scenario.prediction_offset_minutes",
                reason: format!("offset overflows the last timestamp {last}"),
            })?;

        let training_rmse = rmse(estimator.predict(scaled.view())?.view(), features.targets())?;
        info!(
            channels = averages.len(),
            intercept = estimator.intercept(),
            training_rmse,
            "pipeline fitted"
        );

        Ok(FittedPipeline {
            options: *options,
            features,
            scaled,
            scaler,
            estimator,
            averages,
            trend: Arc::new(trend),
            predicted_at,
            training_rmse,
        })
    }

    /// Scale `vector` with the fitted statistics and predict sales.
    pub fn predict_features(&self, vector: &FeatureVector) -> ModelResult<f64> {
        let scaled = self.scaler.transform_vector(vector)?;
        self.estimator.predict_one(scaled.view())
    }

    /// In-sample predictions for every training row.
    pub fn training_predictions(&self) -> ModelResult<Array1<f64>> {
        self.estimator.predict(self.scaled.view())
    }

    /// k-fold RMSE of fresh estimators on the scaled training matrix.
    pub fn cross_validate(&self, options: &CvOptions) -> ModelResult<CvReport> {
        options.validate()?;
        let report = cross_validate::<LinearRegression>(
            self.scaled.view(),
            self.features.targets(),
            options,
        )?;
        info!(
            folds = options.folds,
            seed = ?options.seed,
            mean_rmse = report.mean_rmse(),
            "cross-validation finished"
        );
        Ok(report)
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Unscaled training features with targets and provenance.
    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn scaled_features(&self) -> ArrayView2<'_, f64> {
        self.scaled.view()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn estimator(&self) -> &LinearRegression {
        &self.estimator
    }

    pub fn averages(&self) -> &ChannelAverages {
        &self.averages
    }

    pub fn trend(&self) -> &Arc<SalesTrend> {
        &self.trend
    }

    /// Last trend timestamp plus the configured prediction offset.
    pub fn predicted_at(&self) -> NaiveDateTime {
        self.predicted_at
    }

    pub fn training_rmse(&self) -> f64 {
        self.training_rmse
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Training channels in sorted order.
    pub fn channels(&self) -> impl Iterator<Item = &str> + '_ {
        self.averages.channels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::cleaner::DataCleaner, features::vector::Feature,
        pipeline::fixtures::sample_observations,
    };
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Fitting from a slice and from a cleaned table.
    // - The scale → predict round trip on training rows.
    // - Fatal fit errors (too few rows, constant feature, bad options).
    // - Cross-validation through the pipeline.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Predicting a training row's raw feature vector through the pipeline
    // equals the estimator applied to the stored scaled row.
    fn predict_features_round_trips_training_rows() {
        let pipeline =
            FittedPipeline::fit(&sample_observations(), &PipelineOptions::default()).unwrap();
        let in_sample = pipeline.training_predictions().unwrap();

        for i in 0..pipeline.n_rows() {
            let via_pipeline = pipeline.predict_features(&pipeline.features().row(i)).unwrap();
            assert_relative_eq!(via_pipeline, in_sample[i], epsilon = 1e-9, max_relative = 1e-12);
        }
        assert_eq!(pipeline.channels().collect::<Vec<_>>(), vec!["Radio", "TV"]);
        assert!(pipeline.training_rmse().is_finite());
    }

    #[test]
    fn fit_accepts_cleaned_table_and_slice_alike() {
        let observations = sample_observations();
        let table = DataCleaner::new().clean_observations(observations.clone());

        let from_table = FittedPipeline::fit(&table, &PipelineOptions::default()).unwrap();
        let from_slice =
            FittedPipeline::fit(&observations[..], &PipelineOptions::default()).unwrap();

        assert_eq!(from_table.estimator(), from_slice.estimator());
        assert_eq!(from_table.predicted_at(), from_slice.predicted_at());
    }

    #[test]
    // Purpose
    // -------
    // Fewer than FEATURE_COUNT + 1 rows is fatal before any work is done.
    fn fit_rejects_too_few_rows() {
        let observations = sample_observations();

        let err =
            FittedPipeline::fit(&observations[..6], &PipelineOptions::default()).unwrap_err();

        assert_eq!(err, ModelError::InsufficientData { rows: 6, required: 7 });
    }

    #[test]
    // Purpose
    // -------
    // A feature that never varies makes the fit fail and names it.
    fn fit_rejects_constant_feature() {
        let observations: Vec<Observation> = sample_observations()
            .into_iter()
            .map(|mut o| {
                o.conversion_rate = 0.05;
                o
            })
            .collect();

        let err = FittedPipeline::fit(&observations, &PipelineOptions::default()).unwrap_err();

        assert!(matches!(
            err,
            ModelError::DegenerateFeature { feature: Feature::ConversionRate, .. }
        ));
    }

    #[test]
    // Purpose
    // -------
    // Finite but huge spend that overflows during adstock fails the fit with
    // an overflow error rather than a misleading constant-feature error.
    //
    // Given
    // -----
    // - Sample rows with every `ad_cost` raised to 1.5e308 (α = 0.6).
    //
    // Expect
    // ------
    // - `AdstockOverflow` at a finite row position.
    fn fit_reports_adstock_overflow() {
        let observations: Vec<Observation> = sample_observations()
            .into_iter()
            .map(|mut o| {
                o.ad_cost = 1.5e308;
                o
            })
            .collect();

        let err = FittedPipeline::fit(&observations, &PipelineOptions::default()).unwrap_err();

        assert!(matches!(
            err,
            ModelError::AdstockOverflow { index, value }
                if index < observations.len() && value.is_infinite()
        ));
    }

    #[test]
    fn fit_validates_options() {
        let mut options = PipelineOptions::default();
        options.adstock.alpha = 1.0;
        let err = FittedPipeline::fit(&sample_observations(), &options).unwrap_err();
        assert_eq!(err, ModelError::InvalidDecay { alpha: 1.0 });
    }

    #[test]
    // Purpose
    // -------
    // Pipeline cross-validation is reproducible under a seed and does not
    // change the production estimator.
    fn cross_validate_is_reproducible_and_side_effect_free() {
        let pipeline =
            FittedPipeline::fit(&sample_observations(), &PipelineOptions::default()).unwrap();
        let before = pipeline.estimator().clone();
        let opts = CvOptions::new(4, Some(3)).unwrap();

        let a = pipeline.cross_validate(&opts).unwrap();
        let b = pipeline.cross_validate(&opts).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.fold_rmse.len(), 4);
        assert!(a.fold_rmse.iter().all(|r| r.is_finite() && *r >= 0.0));
        assert_eq!(pipeline.estimator(), &before);
    }
}
