//! features — adstock transform and feature-matrix construction.
//!
//! Purpose
//! -------
//! Turn cleaned observations into the fixed-order numeric representation the
//! regression consumes: per-channel adstocked spend, the raw feature-source
//! fields, and calendar features.
//!
//! Key behaviors
//! -------------
//! - [`adstock`]: geometric carryover recursion, applied per channel in
//!   chronological order ([`adstock_by_channel`]).
//! - [`calendar`]: hour-of-day and Monday-based day-of-week.
//! - [`vector`]: the [`Feature`] order, [`FeatureVector`], and
//!   [`FeatureMatrix`].
//! - [`builder`]: [`FeatureBuilder`] and [`feature_vector`], the only path
//!   from an observation to a feature vector.
//!
//! Invariants & assumptions
//! ------------------------
//! - Feature order is defined once in [`vector`] and is identical for
//!   training rows and scenario points.
//! - Inputs are validated [`Observation`](crate::data::Observation)s; the
//!   only failures here are invalid adstock options and misaligned lengths.

pub mod adstock;
pub mod builder;
pub mod calendar;
pub mod vector;

pub use self::adstock::{AdstockOptions, DEFAULT_ALPHA, adstock_by_channel, geometric_adstock};
pub use self::builder::{FeatureBuilder, build_features, feature_vector};
pub use self::calendar::{day_of_week, hour_of_day};
pub use self::vector::{FEATURE_COUNT, Feature, FeatureMatrix, FeatureVector};
