//! Observation records — raw input rows and their validated form.
//!
//! Purpose
//! -------
//! Define the two shapes an input row takes on its way into the modeling
//! stack: [`RawRecord`], an untyped row whose fields are optional text, and
//! [`Observation`], a fully parsed and validated row. Parsing and validation
//! live here so every entry point (CSV, Python, programmatic) enforces the
//! same invariants.
//!
//! Invariants & assumptions
//! ------------------------
//! - An [`Observation`] always has a non-empty channel name, a finite
//!   non-negative `ad_cost`, and finite values for every other numeric field.
//! - Timestamps are timezone-naive (`chrono::NaiveDateTime`); strings carrying
//!   an offset are rejected rather than silently converted.
//!
//! Conventions
//! -----------
//! - Accepted timestamp layouts are listed in [`TIMESTAMP_FORMATS`]; a bare
//!   date is interpreted as midnight.
//! - Column names match the input table headers exactly.
use crate::data::errors::{DataResult, DataValidationError};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Accepted timezone-naive timestamp layouts, tried in order.
pub const TIMESTAMP_FORMATS: [&str; 3] =
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Header names the input table must provide.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "timestamp",
    "channel_name",
    "ad_cost",
    "sales",
    "homepage_visits",
    "branded_searches",
    "conversion_rate",
];

/// `RawRecord` — one unparsed input row.
///
/// Every field is optional text so that a blank or malformed cell surfaces as
/// a [`DataValidationError`] for that row instead of aborting the whole read.
/// Columns not listed here are ignored by the CSV reader.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    pub timestamp: Option<String>,
    pub channel_name: Option<String>,
    pub ad_cost: Option<String>,
    pub sales: Option<String>,
    pub homepage_visits: Option<String>,
    pub branded_searches: Option<String>,
    pub conversion_rate: Option<String>,
    /// Reader error for a row that could not be decoded at all.
    #[serde(skip)]
    pub decode_error: Option<String>,
}

impl RawRecord {
    /// Placeholder for a row the CSV reader could not decode.
    pub fn undecodable(reason: impl Into<String>) -> Self {
        RawRecord { decode_error: Some(reason.into()), ..RawRecord::default() }
    }
}

/// `Observation` — a validated row of the modeling table.
///
/// Fields
/// ------
/// - `timestamp`: `NaiveDateTime`
///   Period the row describes.
/// - `channel_name`: `String`
///   Marketing channel; trimmed, non-empty.
/// - `ad_cost`: `f64`
///   Spend in the period; finite and `>= 0`.
/// - `sales`: `f64`
///   Regression target; finite.
/// - `homepage_visits`, `branded_searches`, `conversion_rate`: `f64`
///   Feature-source fields; finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub channel_name: String,
    pub ad_cost: f64,
    pub sales: f64,
    pub homepage_visits: f64,
    pub branded_searches: f64,
    pub conversion_rate: f64,
}

impl Observation {
    /// Construct a validated [`Observation`] from typed values.
    ///
    /// Errors
    /// ------
    /// - `DataValidationError::EmptyChannel` if `channel_name` is blank.
    /// - `DataValidationError::NonFiniteValue` for the first non-finite field.
    /// - `DataValidationError::NegativeAdCost` if `ad_cost < 0`.
    pub fn new(
        timestamp: NaiveDateTime, channel_name: impl Into<String>, ad_cost: f64, sales: f64,
        homepage_visits: f64, branded_searches: f64, conversion_rate: f64,
    ) -> DataResult<Self> {
        let channel_name = channel_name.into().trim().to_string();
        if channel_name.is_empty() {
            return Err(DataValidationError::EmptyChannel);
        }
        for (field, value) in [
            ("ad_cost", ad_cost),
            ("sales", sales),
            ("homepage_visits", homepage_visits),
            ("branded_searches", branded_searches),
            ("conversion_rate", conversion_rate),
        ] {
            if !value.is_finite() {
                return Err(DataValidationError::NonFiniteValue { field, value });
            }
        }
        if ad_cost < 0.0 {
            return Err(DataValidationError::NegativeAdCost { value: ad_cost });
        }
        Ok(Observation {
            timestamp,
            channel_name,
            ad_cost,
            sales,
            homepage_visits,
            branded_searches,
            conversion_rate,
        })
    }

    /// Parse and validate a [`RawRecord`].
    ///
    /// Fields are checked in column order, so the reported error is the first
    /// problem found in the row. A row the reader could not decode is
    /// rejected as `Undecodable` before any field is looked at.
    pub fn from_raw(raw: &RawRecord) -> DataResult<Self> {
        if let Some(reason) = &raw.decode_error {
            return Err(DataValidationError::Undecodable { reason: reason.clone() });
        }
        let timestamp = parse_timestamp(required("timestamp", &raw.timestamp)?)?;
        let channel_name = required("channel_name", &raw.channel_name)?;
        let ad_cost = parse_number("ad_cost", &raw.ad_cost)?;
        let sales = parse_number("sales", &raw.sales)?;
        let homepage_visits = parse_number("homepage_visits", &raw.homepage_visits)?;
        let branded_searches = parse_number("branded_searches", &raw.branded_searches)?;
        let conversion_rate = parse_number("conversion_rate", &raw.conversion_rate)?;
        Observation::new(
            timestamp,
            channel_name,
            ad_cost,
            sales,
            homepage_visits,
            branded_searches,
            conversion_rate,
        )
    }
}

/// Parse a timezone-naive timestamp in one of [`TIMESTAMP_FORMATS`] or a bare
/// `YYYY-MM-DD` date (midnight).
pub fn parse_timestamp(raw: &str) -> DataResult<NaiveDateTime> {
    let trimmed = raw.trim();
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| DataValidationError::InvalidTimestamp { raw: raw.to_string() })
}

// ---- Helper Methods ----

fn required<'a>(field: &'static str, value: &'a Option<String>) -> DataResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DataValidationError::MissingField { field }),
    }
}

fn parse_number(field: &'static str, value: &Option<String>) -> DataResult<f64> {
    let raw = required(field, value)?;
    raw.parse::<f64>()
        .map_err(|_| DataValidationError::InvalidNumber { field, raw: raw.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Timestamp layouts accepted by `parse_timestamp`.
    // - Field-level rejection in `Observation::from_raw` / `Observation::new`.
    // -------------------------------------------------------------------------

    fn make_raw() -> RawRecord {
        RawRecord {
            timestamp: Some("2024-04-07 13:00:00".to_string()),
            channel_name: Some("TV".to_string()),
            ad_cost: Some("120.5".to_string()),
            sales: Some("640".to_string()),
            homepage_visits: Some("2500".to_string()),
            branded_searches: Some("310".to_string()),
            conversion_rate: Some("0.07".to_string()),
            ..RawRecord::default()
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that every documented layout parses to the same instant and a
    // bare date maps to midnight.
    fn parse_timestamp_accepts_documented_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 4, 7).unwrap().and_hms_opt(13, 0, 0).unwrap();

        assert_eq!(parse_timestamp("2024-04-07 13:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-04-07T13:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-04-07 13:00").unwrap(), expected);
        assert_eq!(parse_timestamp(" 2024-04-07 13:00:00.000 ").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-04-07").unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 7).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    // Purpose
    // -------
    // Ensure timestamps carrying a UTC offset are rejected instead of being
    // silently reinterpreted as naive local time.
    fn parse_timestamp_rejects_offsets_and_garbage() {
        assert!(matches!(
            parse_timestamp("2024-04-07T13:00:00+02:00"),
            Err(DataValidationError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(DataValidationError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify the happy path of `Observation::from_raw`, including trimming of
    // the channel name.
    fn from_raw_parses_valid_row() {
        let mut raw = make_raw();
        raw.channel_name = Some("  TV ".to_string());

        let obs = Observation::from_raw(&raw).unwrap();

        assert_eq!(obs.channel_name, "TV");
        assert_eq!(obs.ad_cost, 120.5);
        assert_eq!(obs.conversion_rate, 0.07);
    }

    #[test]
    // Purpose
    // -------
    // Each kind of malformed field maps to its own error variant.
    //
    // Given
    // -----
    // - Copies of a valid row with one field broken at a time.
    //
    // Expect
    // ------
    // - Missing, unparsable, non-finite, negative, and blank-channel inputs
    //   report `MissingField`, `InvalidNumber`, `NonFiniteValue`,
    //   `NegativeAdCost`, and `MissingField { channel_name }` respectively.
    fn from_raw_reports_first_problem_per_row() {
        let mut missing = make_raw();
        missing.sales = None;
        assert_eq!(
            Observation::from_raw(&missing).unwrap_err(),
            DataValidationError::MissingField { field: "sales" }
        );

        let mut bad = make_raw();
        bad.homepage_visits = Some("lots".to_string());
        assert_eq!(
            Observation::from_raw(&bad).unwrap_err(),
            DataValidationError::InvalidNumber { field: "homepage_visits", raw: "lots".to_string() }
        );

        let mut inf = make_raw();
        inf.branded_searches = Some("inf".to_string());
        assert!(matches!(
            Observation::from_raw(&inf).unwrap_err(),
            DataValidationError::NonFiniteValue { field: "branded_searches", .. }
        ));

        let mut negative = make_raw();
        negative.ad_cost = Some("-1".to_string());
        assert_eq!(
            Observation::from_raw(&negative).unwrap_err(),
            DataValidationError::NegativeAdCost { value: -1.0 }
        );

        let mut blank = make_raw();
        blank.channel_name = Some("   ".to_string());
        assert_eq!(
            Observation::from_raw(&blank).unwrap_err(),
            DataValidationError::MissingField { field: "channel_name" }
        );
    }

    #[test]
    fn new_rejects_empty_channel() {
        let ts = parse_timestamp("2024-04-07").unwrap();
        assert_eq!(
            Observation::new(ts, "", 1.0, 1.0, 1.0, 1.0, 0.1).unwrap_err(),
            DataValidationError::EmptyChannel
        );
    }
}
