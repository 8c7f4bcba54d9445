//! Adstock — carryover of advertising spend across periods.
//!
//! Purpose
//! -------
//! Apply the geometric adstock recursion
//!
//! ```text
//! a[t] = x[t] + α · a[t−1],     a[−1] = seed
//! ```
//!
//! to raw per-period spend, modeling the lingering effect of past exposure on
//! the current period. The recursion runs independently per channel, in that
//! channel's chronological order, and the result is written back to the
//! rows' original positions.
//!
//! Invariants & assumptions
//! ------------------------
//! - `α` is finite and in `[0, 1)`; `seed` is finite. Both are validated once
//!   by [`AdstockOptions::new`] and again at the recursion entry point.
//! - Spend values are finite; the first non-finite value aborts the pass.
//! - Every adstocked value is finite; a carry that overflows aborts the pass.
//! - With `α = 0` the output equals the input exactly.
//!
//! Conventions
//! -----------
//! - Within a channel, rows are ordered by timestamp with a stable sort, so
//!   rows sharing a timestamp keep their input order.
//! - The output of [`adstock_by_channel`] is aligned 1:1 with its input.
use crate::{
    data::observation::Observation,
    model::errors::{ModelError, ModelResult},
};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default geometric decay per period.
pub const DEFAULT_ALPHA: f64 = 0.6;

/// AdstockOptions — decay factor and the carryover value before the first
/// period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdstockOptions {
    /// Decay factor `α ∈ [0, 1)`.
    pub alpha: f64,
    /// Adstocked value assumed for the period before the first observation.
    pub carryover_seed: f64,
}

impl AdstockOptions {
    /// Validated constructor.
    ///
    /// Errors
    /// ------
    /// - `ModelError::InvalidDecay` if `alpha` is non-finite or outside `[0, 1)`.
    /// - `ModelError::InvalidOption` if `carryover_seed` is non-finite.
    pub fn new(alpha: f64, carryover_seed: f64) -> ModelResult<Self> {
        let opts = AdstockOptions { alpha, carryover_seed };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> ModelResult<()> {
        validate_alpha(self.alpha)?;
        if !self.carryover_seed.is_finite() {
            return Err(ModelError::InvalidOption {
                name: "adstock.carryover_seed",
                reason: format!("must be finite; got {}", self.carryover_seed),
            });
        }
        Ok(())
    }
}

impl Default for AdstockOptions {
    fn default() -> Self {
        AdstockOptions { alpha: DEFAULT_ALPHA, carryover_seed: 0.0 }
    }
}

/// Geometric adstock over one chronologically ordered spend series.
///
/// Errors
/// ------
/// - `ModelError::InvalidDecay` for `alpha` outside `[0, 1)`.
/// - `ModelError::NonFiniteSpend` for the first NaN/±∞ spend value.
/// - `ModelError::AdstockOverflow` if finite spend accumulates to ±∞.
/// - `ModelError::InvalidOption` for a non-finite seed.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_mmm::features::adstock::geometric_adstock;
/// let out = geometric_adstock(array![100.0, 0.0, 0.0].view(), 0.5, 0.0).unwrap();
/// assert_eq!(out.to_vec(), vec![100.0, 50.0, 25.0]);
/// ```
pub fn geometric_adstock(
    spend: ArrayView1<'_, f64>, alpha: f64, carryover_seed: f64,
) -> ModelResult<Array1<f64>> {
    AdstockOptions::new(alpha, carryover_seed)?;
    let mut out = Array1::<f64>::zeros(spend.len());
    let mut carry = carryover_seed;
    for (index, (&x, slot)) in spend.iter().zip(out.iter_mut()).enumerate() {
        if !x.is_finite() {
            return Err(ModelError::NonFiniteSpend { index, value: x });
        }
        carry = x + alpha * carry;
        if !carry.is_finite() {
            return Err(ModelError::AdstockOverflow { index, value: carry });
        }
        *slot = carry;
    }
    Ok(out)
}

/// Adstock every channel's `ad_cost` independently and return the result
/// aligned with `observations`.
pub fn adstock_by_channel(
    observations: &[Observation], opts: &AdstockOptions,
) -> ModelResult<Array1<f64>> {
    opts.validate()?;
    let mut out = Array1::<f64>::zeros(observations.len());
    for (_, indices) in channel_series(observations) {
        let spend: Array1<f64> = indices.iter().map(|&i| observations[i].ad_cost).collect();
        let adstocked = geometric_adstock(spend.view(), opts.alpha, opts.carryover_seed)
            .map_err(|err| match err {
                ModelError::NonFiniteSpend { index, value } => {
                    ModelError::NonFiniteSpend { index: indices[index], value }
                }
                ModelError::AdstockOverflow { index, value } => {
                    ModelError::AdstockOverflow { index: indices[index], value }
                }
                other => other,
            })?;
        for (&row, &value) in indices.iter().zip(adstocked.iter()) {
            out[row] = value;
        }
    }
    Ok(out)
}

/// Row indices grouped by channel, each group stably sorted by timestamp.
pub fn channel_series(observations: &[Observation]) -> BTreeMap<&str, Vec<usize>> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, obs) in observations.iter().enumerate() {
        groups.entry(obs.channel_name.as_str()).or_default().push(i);
    }
    for indices in groups.values_mut() {
        indices.sort_by_key(|&i| observations[i].timestamp);
    }
    groups
}

// ---- Helper Methods ----

fn validate_alpha(alpha: f64) -> ModelResult<()> {
    if alpha.is_finite() && (0.0..1.0).contains(&alpha) {
        Ok(())
    } else {
        Err(ModelError::InvalidDecay { alpha })
    }
}
