//! Feature layout — the fixed feature order shared by training and inference.
//!
//! Purpose
//! -------
//! Define the single source of truth for which features the model uses and
//! in what order. Training rows and scenario points are both expressed as a
//! [`FeatureVector`], and the only conversions between a `FeatureVector` and
//! a positional array are [`FeatureVector::to_array`] and
//! [`FeatureVector::from_array`]. Any other code that needs column `j` goes
//! through [`Feature::ALL`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Column `j` of every [`FeatureMatrix`] holds `Feature::ALL[j]`.
//! - `FeatureMatrix::values` has exactly `targets.len()` rows and
//!   [`FEATURE_COUNT`] columns.
//!
//! Conventions
//! -----------
//! - Calendar features (`hour`, `day_of_week`) are stored as `f64` so the
//!   whole vector is homogeneous.
use crate::model::errors::{ModelError, ModelResult};
use chrono::NaiveDateTime;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Number of model features.
pub const FEATURE_COUNT: usize = 6;

/// Model features in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    AdstockedSpend,
    HomepageVisits,
    BrandedSearches,
    ConversionRate,
    Hour,
    DayOfWeek,
}

impl Feature {
    /// All features in column order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::AdstockedSpend,
        Feature::HomepageVisits,
        Feature::BrandedSearches,
        Feature::ConversionRate,
        Feature::Hour,
        Feature::DayOfWeek,
    ];

    /// Column name as used in reports and input tables.
    pub fn name(self) -> &'static str {
        match self {
            Feature::AdstockedSpend => "adstocked_spend",
            Feature::HomepageVisits => "homepage_visits",
            Feature::BrandedSearches => "branded_searches",
            Feature::ConversionRate => "conversion_rate",
            Feature::Hour => "hour",
            Feature::DayOfWeek => "day_of_week",
        }
    }

    /// Column index of this feature.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// `FeatureVector` — one observation (or one synthetic scenario point) in
/// feature space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub adstocked_spend: f64,
    pub homepage_visits: f64,
    pub branded_searches: f64,
    pub conversion_rate: f64,
    pub hour: f64,
    pub day_of_week: f64,
}

impl FeatureVector {
    /// Values in column order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.adstocked_spend,
            self.homepage_visits,
            self.branded_searches,
            self.conversion_rate,
            self.hour,
            self.day_of_week,
        ]
    }

    /// Inverse of [`FeatureVector::to_array`].
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let [
            adstocked_spend,
            homepage_visits,
            branded_searches,
            conversion_rate,
            hour,
            day_of_week,
        ] = values;
        FeatureVector {
            adstocked_spend,
            homepage_visits,
            branded_searches,
            conversion_rate,
            hour,
            day_of_week,
        }
    }

    /// Read a feature vector from a length-`FEATURE_COUNT` view.
    pub fn from_view(values: ArrayView1<'_, f64>) -> ModelResult<Self> {
        if values.len() != FEATURE_COUNT {
            return Err(ModelError::DimensionMismatch {
                expected: FEATURE_COUNT,
                actual: values.len(),
                context: "feature vector",
            });
        }
        let mut out = [0.0; FEATURE_COUNT];
        out.iter_mut().zip(values.iter()).for_each(|(o, &v)| *o = v);
        Ok(FeatureVector::from_array(out))
    }

    /// Value of a single feature.
    pub fn get(&self, feature: Feature) -> f64 {
        self.to_array()[feature.index()]
    }

    pub fn to_array1(&self) -> Array1<f64> {
        Array1::from(self.to_array().to_vec())
    }

    /// `self + weight * other`, feature by feature.
    pub fn add_scaled(&self, other: &FeatureVector, weight: f64) -> FeatureVector {
        let a = self.to_array();
        let b = other.to_array();
        let mut out = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            out[j] = a[j] + weight * b[j];
        }
        FeatureVector::from_array(out)
    }
}

/// `FeatureMatrix` — training rows in feature space with aligned targets.
///
/// Fields
/// ------
/// - `values`: `n × FEATURE_COUNT` matrix, column `j` = `Feature::ALL[j]`.
/// - `targets`: length-`n` sales vector.
/// - `timestamps`, `channels`: per-row provenance, aligned with `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    values: Array2<f64>,
    targets: Array1<f64>,
    timestamps: Vec<NaiveDateTime>,
    channels: Vec<String>,
}

impl FeatureMatrix {
    /// Assemble a matrix from row vectors and their aligned metadata.
    ///
    /// Errors
    /// ------
    /// - `ModelError::DimensionMismatch` if `targets`, `timestamps`, or
    ///   `channels` differ in length from `rows`.
    pub fn from_rows(
        rows: &[FeatureVector], targets: Vec<f64>, timestamps: Vec<NaiveDateTime>,
        channels: Vec<String>,
    ) -> ModelResult<Self> {
        let n = rows.len();
        for (actual, context) in [
            (targets.len(), "feature matrix targets"),
            (timestamps.len(), "feature matrix timestamps"),
            (channels.len(), "feature matrix channels"),
        ] {
            if actual != n {
                return Err(ModelError::DimensionMismatch { expected: n, actual, context });
            }
        }
        let mut values = Array2::<f64>::zeros((n, FEATURE_COUNT));
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.to_array().into_iter().enumerate() {
                values[[i, j]] = v;
            }
        }
        Ok(FeatureMatrix { values, targets: Array1::from(targets), timestamps, channels })
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn targets(&self) -> ArrayView1<'_, f64> {
        self.targets.view()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Row `i` as a [`FeatureVector`]. Panics if `i >= nrows()`.
    pub fn row(&self, i: usize) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        out.iter_mut().zip(self.values.row(i).iter()).for_each(|(o, &v)| *o = v);
        FeatureVector::from_array(out)
    }

    /// Column for a single feature.
    pub fn column(&self, feature: Feature) -> ArrayView1<'_, f64> {
        self.values.column(feature.index())
    }
}
