//! PipelineOptions — every tunable of a fit, in one validated value.
//!
//! Purpose
//! -------
//! Group the adstock, cross-validation, and scenario settings so a fit can be
//! described by a single value or a single TOML document.
//!
//! Key behaviors
//! -------------
//! - `Default`: α = 0.6, carryover seed 0,
//!   5 unshuffled folds, prediction plotted one hour after the last
//!   observation.
//! - [`PipelineOptions::from_toml_str`] fills missing keys with defaults and
//!   validates the result.
//!
//! Examples
//! --------
//! ```rust
//! # use rust_mmm::pipeline::PipelineOptions;
//! let doc = "[adstock]\nalpha = 0.3\n\n[cv]\nseed = 11\n";
//! let opts = PipelineOptions::from_toml_str(doc).unwrap();
//! assert_eq!(opts.adstock.alpha, 0.3);
//! assert_eq!(opts.cv.folds, 5);
//! assert_eq!(opts.cv.seed, Some(11));
//! ```
use crate::{
    features::adstock::AdstockOptions,
    model::{
        cross_validation::CvOptions,
        errors::{ModelError, ModelResult},
    },
    simulation::scenario::ScenarioOptions,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineOptions {
    pub adstock: AdstockOptions,
    pub cv: CvOptions,
    pub scenario: ScenarioOptions,
}

impl PipelineOptions {
    /// Validated constructor.
    pub fn new(
        adstock: AdstockOptions, cv: CvOptions, scenario: ScenarioOptions,
    ) -> ModelResult<Self> {
        let opts = PipelineOptions { adstock, cv, scenario };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> ModelResult<()> {
        self.adstock.validate()?;
        self.cv.validate()?;
        self.scenario.validate()
    }

    /// Parse and validate a TOML document.
    ///
    /// Errors
    /// ------
    /// - `ModelError::Config` if the document does not parse.
    /// - Any validation error of the parsed options.
    pub fn from_toml_str(doc: &str) -> ModelResult<Self> {
        let opts: PipelineOptions =
            toml::from_str(doc).map_err(|err| ModelError::Config { message: err.to_string() })?;
        opts.validate()?;
        Ok(opts)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let doc = std::fs::read_to_string(path).map_err(|err| ModelError::Config {
            message: format!("failed to read '{}': {err}", path.display()),
        })?;
        PipelineOptions::from_toml_str(&doc)
    }
}
