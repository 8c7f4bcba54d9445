//! ScenarioSimulator — "what-if" sales predictions for spend allocations.
//!
//! Purpose
//! -------
//! Map a proposed [`SpendAllocation`] to a predicted sales figure using the
//! state frozen in a [`FittedPipeline`], and return it together with the
//! historical sales trend it should be plotted against.
//!
//! Key behaviors
//! -------------
//! - Every allocation entry must name a training channel and carry a finite,
//!   non-negative spend. Entries are checked in channel-name order; for each
//!   entry the channel is checked before the spend.
//! - Proportions are `spend / total` for every training channel (omitted
//!   channels get 0). The synthetic feature vector is
//!   `Σ proportion(ch) · average(ch)` over the channel averages.
//! - A zero total uses the overall historical average vector instead and
//!   flags the outcome with `used_fallback`.
//! - The vector is scaled with the fitted scaler and passed to the fitted
//!   estimator; nothing is refit.
//!
//! Invariants & assumptions
//! ------------------------
//! - Queries take `&self`; a failed query leaves no trace in shared state.
//! - Only the allocation's proportions matter: scaling every spend by the same
//!   positive factor yields the same prediction.
//! - The phase is `Computing` while at least one query is in flight and
//!   `Idle` otherwise; it is derived from an atomic counter, not a lock.
use crate::{
    features::vector::FeatureVector,
    model::errors::{ModelError, ModelResult},
    pipeline::FittedPipeline,
    simulation::{
        allocation::SpendAllocation,
        averages::SalesTrend,
        errors::{ScenarioError, ScenarioResult},
    },
};
use chrono::{NaiveDateTime, TimeDelta};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tracing::debug;

/// Offset between the last observed timestamp and the plotted prediction.
pub const DEFAULT_PREDICTION_OFFSET_MINUTES: i64 = 60;

/// Upper bound for the prediction offset (one leap year).
pub const MAX_PREDICTION_OFFSET_MINUTES: i64 = 366 * 24 * 60;

/// ScenarioOptions — presentation settings for scenario outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioOptions {
    /// Minutes after the last trend timestamp at which the prediction sits.
    pub prediction_offset_minutes: i64,
    /// Keep only the most recent `n` trend points in outcomes.
    pub trend_window: Option<usize>,
}

impl ScenarioOptions {
    pub fn new(prediction_offset_minutes: i64, trend_window: Option<usize>) -> ModelResult<Self> {
        let opts = ScenarioOptions { prediction_offset_minutes, trend_window };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if !(0..=MAX_PREDICTION_OFFSET_MINUTES).contains(&self.prediction_offset_minutes) {
            return Err(ModelError::InvalidOption {
                name: "scenario.prediction_offset_minutes",
                reason: format!(
                    "must be in [0, {MAX_PREDICTION_OFFSET_MINUTES}]; got {}",
                    self.prediction_offset_minutes
                ),
            });
        }
        if self.trend_window == Some(0) {
            return Err(ModelError::InvalidOption {
                name: "scenario.trend_window",
                reason: "must be at least 1 when set".to_string(),
            });
        }
        Ok(())
    }

    /// The offset as a chrono delta. Assumes `validate` passed.
    pub fn prediction_offset(&self) -> TimeDelta {
        TimeDelta::minutes(self.prediction_offset_minutes)
    }
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        ScenarioOptions {
            prediction_offset_minutes: DEFAULT_PREDICTION_OFFSET_MINUTES,
            trend_window: None,
        }
    }
}

/// Whether the simulator is currently evaluating a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulatorPhase {
    Idle,
    Computing,
}

/// ScenarioOutcome — one answered query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub predicted_sales: f64,
    /// Where the prediction is plotted: last trend timestamp plus the offset.
    pub predicted_at: NaiveDateTime,
    /// Unscaled synthetic feature vector fed to the model.
    pub synthetic_features: FeatureVector,
    /// Share of total spend per training channel.
    pub proportions: BTreeMap<String, f64>,
    pub total_spend: f64,
    /// `true` when the total was zero and the overall average was used.
    pub used_fallback: bool,
    pub historical_trend: Arc<SalesTrend>,
}

/// Feature-space point built from an allocation.
#[derive(Debug, Clone, PartialEq)]
struct Composition {
    features: FeatureVector,
    proportions: BTreeMap<String, f64>,
    total_spend: f64,
    used_fallback: bool,
}

/// Decrements the in-flight counter when a query finishes, on any path.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        InFlight(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Answers scenario queries against a shared, immutable fitted pipeline.
#[derive(Debug)]
pub struct ScenarioSimulator {
    pipeline: Arc<FittedPipeline>,
    trend: Arc<SalesTrend>,
    in_flight: AtomicUsize,
}

impl ScenarioSimulator {
    /// Wrap a fitted pipeline. The trend window from the pipeline's scenario
    /// options is applied once here.
    pub fn new(pipeline: Arc<FittedPipeline>) -> Self {
        let trend = match pipeline.options().scenario.trend_window {
            Some(window) => Arc::new(SalesTrend::from(pipeline.trend().recent(window).to_vec())),
            None => Arc::clone(pipeline.trend()),
        };
        ScenarioSimulator { pipeline, trend, in_flight: AtomicUsize::new(0) }
    }

    pub fn pipeline(&self) -> &Arc<FittedPipeline> {
        &self.pipeline
    }

    pub fn phase(&self) -> SimulatorPhase {
        if self.in_flight() > 0 { SimulatorPhase::Computing } else { SimulatorPhase::Idle }
    }

    /// Number of queries currently being evaluated.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Training channels in sorted order.
    pub fn channels(&self) -> impl Iterator<Item = &str> + '_ {
        self.pipeline.averages().channels()
    }

    /// The unscaled synthetic feature vector for `allocation`.
    pub fn synthetic_features(
        &self, allocation: &SpendAllocation,
    ) -> ScenarioResult<FeatureVector> {
        Ok(self.compose(allocation)?.features)
    }

    /// Evaluate one allocation.
    ///
    /// Errors
    /// ------
    /// - `ScenarioError::UnknownChannel` for a channel absent from training.
    /// - `ScenarioError::InvalidAllocation` for a negative or non-finite
    ///   spend, or a total that overflows.
    /// - `ScenarioError::Model` if scaling or prediction fails.
    pub fn simulate(&self, allocation: &SpendAllocation) -> ScenarioResult<ScenarioOutcome> {
        let _guard = InFlight::enter(&self.in_flight);
        let composition = self.compose(allocation)?;
        let predicted_sales = self.pipeline.predict_features(&composition.features)?;
        debug!(
            total_spend = composition.total_spend,
            used_fallback = composition.used_fallback,
            predicted_sales,
            "scenario evaluated"
        );
        Ok(ScenarioOutcome {
            predicted_sales,
            predicted_at: self.pipeline.predicted_at(),
            synthetic_features: composition.features,
            proportions: composition.proportions,
            total_spend: composition.total_spend,
            used_fallback: composition.used_fallback,
            historical_trend: Arc::clone(&self.trend),
        })
    }

    /// Evaluate many allocations in parallel; results keep input order.
    pub fn simulate_batch(
        &self, allocations: &[SpendAllocation],
    ) -> Vec<ScenarioResult<ScenarioOutcome>> {
        allocations.par_iter().map(|allocation| self.simulate(allocation)).collect()
    }

    // ---- Helper Methods ----

    fn compose(&self, allocation: &SpendAllocation) -> ScenarioResult<Composition> {
        let averages = self.pipeline.averages();
        for (channel, spend) in allocation.iter() {
            if !averages.contains(channel) {
                return Err(ScenarioError::UnknownChannel { channel: channel.to_string() });
            }
            if !spend.is_finite() || spend < 0.0 {
                let channel = channel.to_string();
                return Err(ScenarioError::InvalidAllocation { channel, spend });
            }
        }
        let total_spend = allocation.total();
        if !total_spend.is_finite() {
            return Err(ScenarioError::InvalidAllocation {
                channel: "(total)".to_string(),
                spend: total_spend,
            });
        }

        if total_spend == 0.0 {
            return Ok(Composition {
                features: *averages.overall(),
                proportions: averages.channels().map(|c| (c.to_string(), 0.0)).collect(),
                total_spend,
                used_fallback: true,
            });
        }

        let mut features = FeatureVector::default();
        let mut proportions = BTreeMap::new();
        for (channel, average) in averages.iter() {
            let share = allocation.get(channel) / total_spend;
            features = features.add_scaled(average, share);
            proportions.insert(channel.to_string(), share);
        }
        Ok(Composition { features, proportions, total_spend, used_fallback: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{PipelineOptions, fixtures::sample_observations};
    use crate::features::adstock::AdstockOptions;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The proportion-weighted synthetic vector (TV 0.75 / Radio 0.25).
    // - Magnitude invariance of predictions.
    // - Zero-spend fallback to the overall average.
    // - Rejection of unknown channels and invalid spends without side effects.
    // - Batch evaluation, phase tracking, and trend windowing.
    // -------------------------------------------------------------------------

    fn simulator_with(options: PipelineOptions) -> ScenarioSimulator {
        let pipeline = FittedPipeline::fit(&sample_observations(), &options).unwrap();
        ScenarioSimulator::new(Arc::new(pipeline))
    }

    fn simulator() -> ScenarioSimulator {
        simulator_with(PipelineOptions {
            adstock: AdstockOptions::new(0.0, 0.0).unwrap(),
            ..PipelineOptions::default()
        })
    }

    #[test]
    // Purpose
    // -------
    // The synthetic adstocked spend is the proportion-weighted mix of channel
    // averages.
    //
    // Given
    // -----
    // - Average adstocked spend TV = 120, Radio = 40 (α = 0).
    // - Allocation TV = 120, Radio = 40 → proportions 0.75 / 0.25.
    //
    // Expect
    // ------
    // - `adstocked_spend = 0.75·120 + 0.25·40 = 100`.
    fn synthetic_spend_is_proportion_weighted() {
        let sim = simulator();
        let alloc = SpendAllocation::new().with("TV", 120.0).with("Radio", 40.0);

        let outcome = sim.simulate(&alloc).unwrap();

        assert_relative_eq!(outcome.synthetic_features.adstocked_spend, 100.0, epsilon = 1e-9);
        assert_relative_eq!(outcome.proportions["TV"], 0.75);
        assert_relative_eq!(outcome.proportions["Radio"], 0.25);
        assert_eq!(outcome.total_spend, 160.0);
        assert!(!outcome.used_fallback);
    }

    #[test]
    // Purpose
    // -------
    // Only proportions matter: scaling the allocation leaves the synthetic
    // vector and the prediction unchanged.
    fn prediction_is_invariant_to_total_magnitude() {
        let sim = simulator();
        let small = SpendAllocation::new().with("TV", 3.0).with("Radio", 1.0);
        let large = SpendAllocation::new().with("TV", 1200.0).with("Radio", 400.0);

        let small = sim.simulate(&small).unwrap();
        let large = sim.simulate(&large).unwrap();

        assert_relative_eq!(small.synthetic_features.adstocked_spend, 100.0, epsilon = 1e-9);
        assert_relative_eq!(small.predicted_sales, large.predicted_sales, epsilon = 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // A zero total falls back to the overall historical average and still
    // predicts.
    fn zero_spend_uses_overall_average() {
        let sim = simulator();

        let outcome = sim.simulate(&SpendAllocation::new().with("TV", 0.0)).unwrap();
        let empty = sim.simulate(&SpendAllocation::new()).unwrap();

        assert!(outcome.used_fallback);
        assert_eq!(outcome.synthetic_features, *sim.pipeline().averages().overall());
        assert!(outcome.proportions.values().all(|&p| p == 0.0));
        assert_eq!(outcome.proportions.len(), 2);
        assert!(outcome.predicted_sales.is_finite());
        assert_eq!(outcome, empty);
    }

    #[test]
    // Purpose
    // -------
    // Rejected queries name the problem and leave the simulator unchanged.
    //
    // Given
    // -----
    // - An allocation naming "Podcast", and one with a negative TV spend.
    //
    // Expect
    // ------
    // - `UnknownChannel` / `InvalidAllocation`, and a later valid query
    //   returns the same outcome as before the failures.
    fn invalid_queries_are_rejected_without_side_effects() {
        let sim = simulator();
        let valid = SpendAllocation::new().with("TV", 50.0).with("Radio", 50.0);
        let before = sim.simulate(&valid).unwrap();

        let unknown = sim.simulate(&SpendAllocation::new().with("Podcast", 10.0).with("TV", 5.0));
        let negative = sim.simulate(&SpendAllocation::new().with("TV", -1.0));
        let nan = sim.simulate(&SpendAllocation::new().with("Radio", f64::NAN));

        assert_eq!(
            unknown.unwrap_err(),
            ScenarioError::UnknownChannel { channel: "Podcast".into() }
        );
        assert_eq!(
            negative.unwrap_err(),
            ScenarioError::InvalidAllocation { channel: "TV".into(), spend: -1.0 }
        );
        assert!(matches!(nan.unwrap_err(), ScenarioError::InvalidAllocation { .. }));
        assert_eq!(sim.simulate(&valid).unwrap(), before);
        assert_eq!(sim.phase(), SimulatorPhase::Idle);
    }

    #[test]
    fn unknown_channel_is_checked_before_spend() {
        let sim = simulator();
        let err = sim.simulate(&SpendAllocation::new().with("Podcast", -3.0)).unwrap_err();
        assert_eq!(err, ScenarioError::UnknownChannel { channel: "Podcast".into() });
    }

    #[test]
    // Purpose
    // -------
    // Parallel batch evaluation matches sequential evaluation in order.
    fn batch_matches_sequential() {
        let sim = simulator();
        let allocations: Vec<SpendAllocation> = (0..16)
            .map(|i| SpendAllocation::new().with("TV", i as f64).with("Radio", (16 - i) as f64))
            .chain(std::iter::once(SpendAllocation::new().with("Podcast", 1.0)))
            .collect();

        let batch = sim.simulate_batch(&allocations);
        let sequential: Vec<_> = allocations.iter().map(|a| sim.simulate(a)).collect();

        assert_eq!(batch, sequential);
        assert!(batch.last().unwrap().is_err());
        assert_eq!(sim.in_flight(), 0);
    }

    #[test]
    fn phase_reflects_in_flight_queries() {
        let sim = simulator();
        assert_eq!(sim.phase(), SimulatorPhase::Idle);
        {
            let _guard = InFlight::enter(&sim.in_flight);
            assert_eq!(sim.phase(), SimulatorPhase::Computing);
        }
        assert_eq!(sim.phase(), SimulatorPhase::Idle);
    }

    #[test]
    // Purpose
    // -------
    // The outcome is plotted one hour after the last observation by default,
    // and the trend window trims the shared trend.
    fn outcome_carries_timestamp_and_windowed_trend() {
        let full = simulator();
        let windowed = simulator_with(PipelineOptions {
            scenario: ScenarioOptions::new(30, Some(3)).unwrap(),
            ..PipelineOptions::default()
        });
        let alloc = SpendAllocation::new().with("TV", 1.0);

        let a = full.simulate(&alloc).unwrap();
        let b = windowed.simulate(&alloc).unwrap();

        let last = full.pipeline().trend().last().unwrap().timestamp;
        assert_eq!(a.predicted_at, last + TimeDelta::hours(1));
        assert_eq!(b.predicted_at, last + TimeDelta::minutes(30));
        assert!(Arc::ptr_eq(&a.historical_trend, full.pipeline().trend()));
        assert_eq!(b.historical_trend.points(), full.pipeline().trend().recent(3));
    }

    #[test]
    fn scenario_options_validate_ranges() {
        assert!(ScenarioOptions::new(-1, None).is_err());
        assert!(ScenarioOptions::new(60, Some(0)).is_err());
        assert_eq!(ScenarioOptions::default().prediction_offset(), TimeDelta::hours(1));
    }
}
