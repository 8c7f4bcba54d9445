//! FeatureBuilder — assemble the modeling matrix from cleaned observations.
//!
//! Purpose
//! -------
//! Combine each observation's adstocked spend, raw feature-source fields, and
//! calendar features into a [`FeatureVector`], and stack those into a
//! [`FeatureMatrix`] aligned with the `sales` targets.
//!
//! Key behaviors
//! -------------
//! - [`feature_vector`] is the only place an `Observation` becomes a
//!   `FeatureVector`; training rows never take another path.
//! - [`FeatureBuilder::build`] runs the per-channel adstock pass with its
//!   configured [`AdstockOptions`] and then builds the matrix.
//! - [`build_features`] accepts a precomputed adstock series for callers that
//!   run the transform themselves.
use crate::{
    data::observation::Observation,
    features::{
        adstock::{AdstockOptions, adstock_by_channel},
        calendar::{day_of_week, hour_of_day},
        vector::{FeatureMatrix, FeatureVector},
    },
    model::errors::{ModelError, ModelResult},
};
use ndarray::ArrayView1;

/// Feature vector for one observation given its adstocked spend.
pub fn feature_vector(obs: &Observation, adstocked_spend: f64) -> FeatureVector {
    FeatureVector {
        adstocked_spend,
        homepage_visits: obs.homepage_visits,
        branded_searches: obs.branded_searches,
        conversion_rate: obs.conversion_rate,
        hour: f64::from(hour_of_day(&obs.timestamp)),
        day_of_week: f64::from(day_of_week(&obs.timestamp)),
    }
}

/// Build the feature matrix from observations and an aligned adstock series.
///
/// Errors
/// ------
/// - `ModelError::DimensionMismatch` if `adstocked.len() != observations.len()`.
pub fn build_features(
    observations: &[Observation], adstocked: ArrayView1<'_, f64>,
) -> ModelResult<FeatureMatrix> {
    if adstocked.len() != observations.len() {
        return Err(ModelError::DimensionMismatch {
            expected: observations.len(),
            actual: adstocked.len(),
            context: "adstocked spend",
        });
    }
    let rows: Vec<FeatureVector> = observations
        .iter()
        .zip(adstocked.iter())
        .map(|(obs, &spend)| feature_vector(obs, spend))
        .collect();
    FeatureMatrix::from_rows(
        &rows,
        observations.iter().map(|o| o.sales).collect(),
        observations.iter().map(|o| o.timestamp).collect(),
        observations.iter().map(|o| o.channel_name.clone()).collect(),
    )
}

/// Adstock + feature assembly with fixed options.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeatureBuilder {
    adstock: AdstockOptions,
}

impl FeatureBuilder {
    pub fn new(adstock: AdstockOptions) -> Self {
        FeatureBuilder { adstock }
    }

    pub fn adstock_options(&self) -> &AdstockOptions {
        &self.adstock
    }

    /// Run the per-channel adstock pass and build the feature matrix.
    pub fn build(&self, observations: &[Observation]) -> ModelResult<FeatureMatrix> {
        let adstocked = adstock_by_channel(observations, &self.adstock)?;
        build_features(observations, adstocked.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::observation::parse_timestamp, features::vector::Feature};
    use ndarray::array;

    fn obs(ts: &str, channel: &str, ad_cost: f64, sales: f64) -> Observation {
        Observation::new(parse_timestamp(ts).unwrap(), channel, ad_cost, sales, 1200.0, 80.0, 0.04)
            .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Verify each column of a built row comes from the right source.
    //
    // Given
    // -----
    // - One TV row at Monday 2024-04-08 15:00 with spend 50, α = 0.6.
    //
    // Expect
    // ------
    // - `adstocked_spend = 50`, raw fields copied, `hour = 15`,
    //   `day_of_week = 0`, target = sales.
    fn build_populates_every_column() {
        let observations = vec![obs("2024-04-08 15:00:00", "TV", 50.0, 321.0)];

        let matrix = FeatureBuilder::default().build(&observations).unwrap();
        let row = matrix.row(0);

        assert_eq!(row.adstocked_spend, 50.0);
        assert_eq!(row.homepage_visits, 1200.0);
        assert_eq!(row.branded_searches, 80.0);
        assert_eq!(row.conversion_rate, 0.04);
        assert_eq!(row.hour, 15.0);
        assert_eq!(row.day_of_week, 0.0);
        assert_eq!(matrix.targets()[0], 321.0);
        assert_eq!(matrix.channels(), &["TV".to_string()]);
    }

    #[test]
    // Purpose
    // -------
    // The builder applies carryover per channel before assembling rows.
    fn build_uses_configured_adstock() {
        let observations = vec![
            obs("2024-04-08 00:00:00", "TV", 100.0, 1.0),
            obs("2024-04-08 01:00:00", "TV", 0.0, 1.0),
        ];
        let builder = FeatureBuilder::new(AdstockOptions::new(0.25, 0.0).unwrap());

        let matrix = builder.build(&observations).unwrap();

        assert_eq!(matrix.column(Feature::AdstockedSpend).to_vec(), vec![100.0, 25.0]);
    }

    #[test]
    fn build_features_rejects_misaligned_adstock() {
        let observations = vec![obs("2024-04-08 00:00:00", "TV", 1.0, 1.0)];
        let err = build_features(&observations, array![1.0, 2.0].view()).unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { expected: 1, actual: 2, .. }));
    }
}
