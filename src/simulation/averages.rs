//! Historical summaries captured at fit time for scenario queries.
//!
//! Purpose
//! -------
//! - [`ChannelAverages`]: the mean raw (unscaled) [`FeatureVector`] of every
//!   training channel, plus the row-weighted mean over all training rows used
//!   when a scenario allocates no spend at all.
//! - [`SalesTrend`]: total sales per distinct timestamp, summed across
//!   channels, in ascending time order.
//!
//! Both are computed once from the training [`FeatureMatrix`] and never
//! change afterwards.
use crate::{
    features::vector::{FeatureMatrix, FeatureVector},
    model::errors::{ModelError, ModelResult},
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-channel and overall mean feature vectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelAverages {
    per_channel: BTreeMap<String, FeatureVector>,
    overall: FeatureVector,
}

impl ChannelAverages {
    /// Average the raw feature rows by channel.
    ///
    /// Errors
    /// ------
    /// - `ModelError::InsufficientData` if the matrix is empty.
    pub fn from_matrix(matrix: &FeatureMatrix) -> ModelResult<Self> {
        if matrix.is_empty() {
            return Err(ModelError::InsufficientData { rows: 0, required: 1 });
        }
        let mut sums: BTreeMap<&str, (FeatureVector, usize)> = BTreeMap::new();
        let mut total = FeatureVector::default();
        for (i, channel) in matrix.channels().iter().enumerate() {
            let row = matrix.row(i);
            let entry = sums.entry(channel.as_str()).or_default();
            entry.0 = entry.0.add_scaled(&row, 1.0);
            entry.1 += 1;
            total = total.add_scaled(&row, 1.0);
        }

        let per_channel = sums
            .into_iter()
            .map(|(channel, (sum, count))| {
                (channel.to_string(), FeatureVector::default().add_scaled(&sum, 1.0 / count as f64))
            })
            .collect();
        let overall = FeatureVector::default().add_scaled(&total, 1.0 / matrix.nrows() as f64);
        Ok(ChannelAverages { per_channel, overall })
    }

    pub fn get(&self, channel: &str) -> Option<&FeatureVector> {
        self.per_channel.get(channel)
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.per_channel.contains_key(channel)
    }

    /// Channels in sorted order.
    pub fn channels(&self) -> impl Iterator<Item = &str> + '_ {
        self.per_channel.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureVector)> + '_ {
        self.per_channel.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn overall(&self) -> &FeatureVector {
        &self.overall
    }

    pub fn len(&self) -> usize {
        self.per_channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_channel.is_empty()
    }
}

/// One point of the historical sales trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: NaiveDateTime,
    pub sales: f64,
}

/// Total sales per timestamp, ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SalesTrend {
    points: Vec<TrendPoint>,
}

impl SalesTrend {
    /// Sum `targets` per distinct timestamp of the matrix rows.
    pub fn from_matrix(matrix: &FeatureMatrix) -> Self {
        let mut totals: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
        for (ts, sales) in matrix.timestamps().iter().zip(matrix.targets().iter()) {
            *totals.entry(*ts).or_insert(0.0) += sales;
        }
        let points =
            totals.into_iter().map(|(timestamp, sales)| TrendPoint { timestamp, sales }).collect();
        SalesTrend { points }
    }

    pub fn points(&self) -> &[TrendPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&TrendPoint> {
        self.points.last()
    }

    /// The most recent `window` points (all of them if fewer exist).
    pub fn recent(&self, window: usize) -> &[TrendPoint] {
        &self.points[self.points.len().saturating_sub(window)..]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<TrendPoint>> for SalesTrend {
    fn from(points: Vec<TrendPoint>) -> Self {
        SalesTrend { points }
    }
}
