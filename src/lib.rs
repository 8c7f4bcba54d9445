//! rust_mmm — marketing-mix modeling with what-if spend simulation.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the fitted pipeline to Python via the `_rust_mmm` extension module. The
//! core estimates how spend across channels drives sales (adstock features,
//! standardisation, OLS), reports cross-validated accuracy, and answers
//! scenario queries against the frozen fit.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`data`, `features`, `model`,
//!   `pipeline`, `simulation`) as the public crate surface.
//! - Define the `MixModel` / `MixScenario` `#[pyclass]` wrappers and the
//!   `#[pymodule]` initializer for the `_rust_mmm` Python extension.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input conversion, and error mapping.
//! - A `MixModel` always wraps a successfully fitted pipeline; there is no
//!   unfitted state visible from Python.
//!
//! Conventions
//! -----------
//! - Python-exposed classes live under `_rust_mmm.mix_model` and are meant to
//!   be wrapped by a thin pure-Python facade (for example a dashboard shell).
//! - Errors from core Rust code are rich error types internally and become
//!   `ValueError` at the PyO3 boundary.
//! - Timestamps cross the boundary as ISO-8601 strings without timezone.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code: `data::load_cleaned` → `pipeline::FittedPipeline::fit`
//!   → `simulation::ScenarioSimulator`.
//! - The `mmm` binary wraps the same path for the command line.

pub mod data;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod simulation;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use std::{collections::BTreeMap, sync::Arc};

#[cfg(feature = "python-bindings")]
use crate::{
    data::{DataCleaner, load_cleaned},
    model::CvOptions,
    pipeline::FittedPipeline,
    simulation::{ScenarioOutcome, ScenarioSimulator, SpendAllocation},
    utils::{extract_column, extract_pipeline_options, records_from_columns},
};

#[cfg(feature = "python-bindings")]
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// MixModel — Python-facing handle on a fitted marketing-mix pipeline.
///
/// Purpose
/// -------
/// Fit the pipeline from a CSV file or from in-memory columns and answer
/// scenario queries, so a Python UI shell only has to collect spends and
/// plot the result.
///
/// Key behaviors
/// -------------
/// - `MixModel.from_csv(path, ...)` / `MixModel.from_columns(...)` clean the
///   rows exactly like the Rust loaders and fit once.
/// - `simulate(spend)` maps a `{channel: spend}` dict to a [`MixScenario`].
/// - `cross_validate(folds=5, seed=None)` returns the per-fold RMSE list.
///
/// Parameters
/// ----------
/// Shared keyword arguments of the constructors:
/// - `alpha`, `carryover_seed`: `Option<f64>`
///   Adstock overrides; default to the pipeline defaults (0.6, 0.0).
/// - `config`: `Option<&str>`
///   TOML document with full pipeline options, applied before the overrides.
///
/// Notes
/// -----
/// - Rust callers should use [`FittedPipeline`] and [`ScenarioSimulator`]
///   directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_mmm.mix_model")]
pub struct MixModel {
    simulator: ScenarioSimulator,
}

#[cfg(feature = "python-bindings")]
impl MixModel {
    fn from_pipeline(pipeline: FittedPipeline) -> Self {
        MixModel { simulator: ScenarioSimulator::new(Arc::new(pipeline)) }
    }
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl MixModel {
    #[staticmethod]
    #[pyo3(
        signature = (path, alpha = None, carryover_seed = None, config = None),
        text_signature = "(path, /, alpha=None, carryover_seed=None, config=None)"
    )]
    pub fn from_csv(
        path: &str, alpha: Option<f64>, carryover_seed: Option<f64>, config: Option<&str>,
    ) -> PyResult<Self> {
        let options = extract_pipeline_options(alpha, carryover_seed, config)?;
        let table = load_cleaned(path)?;
        let pipeline = FittedPipeline::fit(&table, &options)?;
        Ok(MixModel::from_pipeline(pipeline))
    }

    #[staticmethod]
    #[pyo3(
        signature = (
            timestamps,
            channel_names,
            ad_cost,
            sales,
            homepage_visits,
            branded_searches,
            conversion_rate,
            alpha = None,
            carryover_seed = None,
            config = None,
        ),
        text_signature = "(timestamps, channel_names, ad_cost, sales, homepage_visits, \
                          branded_searches, conversion_rate, /, alpha=None, \
                          carryover_seed=None, config=None)"
    )]
    pub fn from_columns<'py>(
        py: Python<'py>, timestamps: Vec<String>, channel_names: Vec<String>,
        ad_cost: &Bound<'py, PyAny>, sales: &Bound<'py, PyAny>,
        homepage_visits: &Bound<'py, PyAny>, branded_searches: &Bound<'py, PyAny>,
        conversion_rate: &Bound<'py, PyAny>, alpha: Option<f64>, carryover_seed: Option<f64>,
        config: Option<&str>,
    ) -> PyResult<Self> {
        let n = timestamps.len();
        if channel_names.len() != n {
            return Err(PyValueError::new_err(format!(
                "channel_names has {} entries; expected {n}",
                channel_names.len()
            )));
        }
        let ad_cost = extract_column(py, ad_cost, "ad_cost", n)?;
        let sales = extract_column(py, sales, "sales", n)?;
        let visits = extract_column(py, homepage_visits, "homepage_visits", n)?;
        let searches = extract_column(py, branded_searches, "branded_searches", n)?;
        let conversion = extract_column(py, conversion_rate, "conversion_rate", n)?;

        let options = extract_pipeline_options(alpha, carryover_seed, config)?;
        let records = records_from_columns(
            &timestamps,
            &channel_names,
            [&ad_cost[..], &sales[..], &visits[..], &searches[..], &conversion[..]],
        );
        let table = DataCleaner::new().clean(records);
        let pipeline = FittedPipeline::fit(&table, &options)?;
        Ok(MixModel::from_pipeline(pipeline))
    }

    #[pyo3(signature = (folds = 5, seed = None), text_signature = "(self, /, folds=5, seed=None)")]
    pub fn cross_validate(&self, folds: usize, seed: Option<u64>) -> PyResult<Vec<f64>> {
        let options = CvOptions::new(folds, seed)?;
        let report = self.simulator.pipeline().cross_validate(&options)?;
        Ok(report.fold_rmse)
    }

    #[pyo3(text_signature = "(self, spend, /)")]
    pub fn simulate(&self, spend: BTreeMap<String, f64>) -> PyResult<MixScenario> {
        let allocation: SpendAllocation = spend.into_iter().collect();
        let outcome = self.simulator.simulate(&allocation)?;
        Ok(MixScenario { inner: outcome })
    }

    #[getter]
    pub fn channels(&self) -> Vec<String> {
        self.simulator.channels().map(str::to_string).collect()
    }

    #[getter]
    pub fn coefficients(&self) -> Vec<f64> {
        self.simulator.pipeline().estimator().coefficients().to_vec()
    }

    #[getter]
    pub fn intercept(&self) -> f64 {
        self.simulator.pipeline().estimator().intercept()
    }

    #[getter]
    pub fn training_rmse(&self) -> f64 {
        self.simulator.pipeline().training_rmse()
    }

    #[getter]
    pub fn n_rows(&self) -> usize {
        self.simulator.pipeline().n_rows()
    }
}

/// MixScenario — one answered scenario query, read-only from Python.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_mmm.mix_model")]
pub struct MixScenario {
    inner: ScenarioOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl MixScenario {
    #[getter]
    pub fn predicted_sales(&self) -> f64 {
        self.inner.predicted_sales
    }

    #[getter]
    pub fn predicted_at(&self) -> String {
        self.inner.predicted_at.format(ISO_FORMAT).to_string()
    }

    #[getter]
    pub fn proportions(&self) -> BTreeMap<String, f64> {
        self.inner.proportions.clone()
    }

    #[getter]
    pub fn total_spend(&self) -> f64 {
        self.inner.total_spend
    }

    #[getter]
    pub fn used_fallback(&self) -> bool {
        self.inner.used_fallback
    }

    #[getter]
    pub fn synthetic_features(&self) -> Vec<f64> {
        self.inner.synthetic_features.to_array().to_vec()
    }

    #[getter]
    pub fn trend_timestamps(&self) -> Vec<String> {
        self.inner
            .historical_trend
            .points()
            .iter()
            .map(|p| p.timestamp.format(ISO_FORMAT).to_string())
            .collect()
    }

    #[getter]
    pub fn trend_sales(&self) -> Vec<f64> {
        self.inner.historical_trend.points().iter().map(|p| p.sales).collect()
    }
}

/// _rust_mmm — PyO3 module initializer for the Python extension.
///
/// Creates the `mix_model` submodule, attaches it to `_rust_mmm`, and
/// registers it in `sys.modules` so `rust_mmm.mix_model` is importable by
/// dotted path.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_mmm<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let mix_model_mod = PyModule::new(_py, "mix_model")?;
    mix_model(_py, m, &mix_model_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_mmm.mix_model", mix_model_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn mix_model<'py>(
    _py: Python, rust_mmm: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<MixModel>()?;
    m.add_class::<MixScenario>()?;
    rust_mmm.add_submodule(m)?;
    Ok(())
}
