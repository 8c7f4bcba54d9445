//! DataCleaner — validate raw rows and drop the ones that cannot be modeled.
//!
//! Purpose
//! -------
//! Turn a sequence of [`RawRecord`]s into a [`CleanedTable`]: the rows that
//! passed validation, in input order, plus a record of every rejected row and
//! why it was rejected. Rejection is never fatal; whether enough rows remain
//! to fit a model is decided later by the fit entry point.
//!
//! Key behaviors
//! -------------
//! - Each row is validated independently via [`Observation::from_raw`].
//! - Rejections are logged at `debug` level one by one and summarised at
//!   `info` (or `warn` if every row was rejected).
use crate::data::{
    errors::DataValidationError,
    observation::{Observation, RawRecord},
};
use tracing::{debug, info, warn};

/// A row dropped by the cleaner together with its 0-based input position.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub index: usize,
    pub error: DataValidationError,
}

/// `CleanedTable` — output of the cleaning pass.
///
/// Fields
/// ------
/// - `observations`: rows that passed validation, in input order.
/// - `rejected`: rows that failed, with their reason.
/// - `rows_read`: total number of rows seen.
///
/// Invariants
/// ----------
/// - `observations.len() + rejected.len() == rows_read`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedTable {
    pub observations: Vec<Observation>,
    pub rejected: Vec<RejectedRow>,
    pub rows_read: usize,
}

impl CleanedTable {
    /// Number of rows kept for modeling.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl AsRef<[Observation]> for CleanedTable {
    fn as_ref(&self) -> &[Observation] {
        &self.observations
    }
}

/// Stateless row filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataCleaner;

impl DataCleaner {
    pub fn new() -> Self {
        DataCleaner
    }

    /// Validate every record and split them into kept and rejected rows.
    pub fn clean<I>(&self, records: I) -> CleanedTable
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut table = CleanedTable::default();
        for (index, raw) in records.into_iter().enumerate() {
            table.rows_read += 1;
            match Observation::from_raw(&raw) {
                Ok(obs) => table.observations.push(obs),
                Err(error) => {
                    debug!(row = index, %error, "dropping invalid row");
                    table.rejected.push(RejectedRow { index, error });
                }
            }
        }
        self.log_summary(&table);
        table
    }

    /// Apply the same filter to already-typed observations.
    ///
    /// Rows built through [`Observation::new`] are valid by construction; this
    /// entry point exists for callers that assemble `Observation` literals
    /// directly and re-checks them through the same validation.
    pub fn clean_observations<I>(&self, observations: I) -> CleanedTable
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut table = CleanedTable::default();
        for (index, obs) in observations.into_iter().enumerate() {
            table.rows_read += 1;
            match Observation::new(
                obs.timestamp,
                obs.channel_name,
                obs.ad_cost,
                obs.sales,
                obs.homepage_visits,
                obs.branded_searches,
                obs.conversion_rate,
            ) {
                Ok(valid) => table.observations.push(valid),
                Err(error) => {
                    debug!(row = index, %error, "dropping invalid row");
                    table.rejected.push(RejectedRow { index, error });
                }
            }
        }
        self.log_summary(&table);
        table
    }

    fn log_summary(&self, table: &CleanedTable) {
        if table.rows_read > 0 && table.observations.is_empty() {
            warn!(rows_read = table.rows_read, "every input row was rejected");
        } else {
            info!(
                rows_read = table.rows_read,
                kept = table.observations.len(),
                rejected = table.rejected.len(),
                "cleaned input table"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::observation::parse_timestamp;

    fn raw(ts: &str, channel: &str, ad_cost: &str) -> RawRecord {
        RawRecord {
            timestamp: Some(ts.to_string()),
            channel_name: Some(channel.to_string()),
            ad_cost: Some(ad_cost.to_string()),
            sales: Some("100".to_string()),
            homepage_visits: Some("1000".to_string()),
            branded_searches: Some("50".to_string()),
            conversion_rate: Some("0.05".to_string()),
            ..RawRecord::default()
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the cleaner keeps valid rows in input order and records each
    // rejected row with its position and reason.
    //
    // Given
    // -----
    // - Four rows: valid, negative ad cost, missing timestamp, valid.
    //
    // Expect
    // ------
    // - Two observations kept (rows 0 and 3, in that order).
    // - Rejections at indices 1 and 2 with matching reasons.
    // - `rows_read == 4`.
    fn clean_splits_valid_and_rejected_rows() {
        let mut missing_ts = raw("2024-04-07 02:00:00", "Radio", "5");
        missing_ts.timestamp = None;
        let records = vec![
            raw("2024-04-07 00:00:00", "TV", "10"),
            raw("2024-04-07 01:00:00", "TV", "-2"),
            missing_ts,
            raw("2024-04-07 03:00:00", "Radio", "0"),
        ];

        let table = DataCleaner::new().clean(records);

        assert_eq!(table.rows_read, 4);
        assert_eq!(table.len(), 2);
        assert_eq!(table.observations[0].channel_name, "TV");
        assert_eq!(table.observations[1].channel_name, "Radio");
        assert_eq!(table.observations[1].ad_cost, 0.0);
        assert_eq!(
            table.rejected,
            vec![
                RejectedRow {
                    index: 1,
                    error: DataValidationError::NegativeAdCost { value: -2.0 }
                },
                RejectedRow {
                    index: 2,
                    error: DataValidationError::MissingField { field: "timestamp" }
                },
            ]
        );
    }

    #[test]
    // Purpose
    // -------
    // Typed observations that bypassed the constructor are re-validated.
    fn clean_observations_rechecks_literals() {
        let ts = parse_timestamp("2024-04-07").unwrap();
        let good = Observation::new(ts, "TV", 1.0, 2.0, 3.0, 4.0, 0.1).unwrap();
        let mut bad = good.clone();
        bad.sales = f64::NAN;

        let table = DataCleaner::new().clean_observations(vec![good.clone(), bad]);

        assert_eq!(table.observations, vec![good]);
        assert_eq!(table.rejected.len(), 1);
        assert!(matches!(
            table.rejected[0].error,
            DataValidationError::NonFiniteValue { field: "sales", .. }
        ));
    }

    #[test]
    fn clean_of_empty_input_is_empty() {
        let table = DataCleaner::new().clean(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.rows_read, 0);
    }
}
