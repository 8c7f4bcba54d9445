//! simulation — scenario queries against a fitted pipeline.
//!
//! Purpose
//! -------
//! Answer "what if we spent this much on each channel?" by turning a
//! [`SpendAllocation`] into a synthetic feature vector built from historical
//! channel averages, then scaling and predicting with the frozen model.
//!
//! Key behaviors
//! -------------
//! - [`scenario`]: [`ScenarioSimulator`], [`ScenarioOptions`],
//!   [`ScenarioOutcome`], and the Idle/Computing [`SimulatorPhase`].
//! - [`averages`]: [`ChannelAverages`] and [`SalesTrend`], fixed at fit time.
//! - [`allocation`]: [`SpendAllocation`], the query input.
//! - [`errors`]: [`ScenarioError`], recoverable per query.
//!
//! Invariants & assumptions
//! ------------------------
//! - The simulator shares the fitted pipeline through an `Arc` and never
//!   mutates it; concurrent queries are independent.

pub mod allocation;
pub mod averages;
pub mod errors;
pub mod scenario;

pub use self::allocation::SpendAllocation;
pub use self::averages::{ChannelAverages, SalesTrend, TrendPoint};
pub use self::errors::{ScenarioError, ScenarioResult};
pub use self::scenario::{
    DEFAULT_PREDICTION_OFFSET_MINUTES, MAX_PREDICTION_OFFSET_MINUTES, ScenarioOptions,
    ScenarioOutcome, ScenarioSimulator, SimulatorPhase,
};
