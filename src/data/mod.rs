//! data — input rows, validation, and CSV ingest.
//!
//! Purpose
//! -------
//! Own everything that happens before modeling: reading the observational
//! table, parsing each row into a typed [`Observation`], and dropping rows
//! that violate the input contract. Downstream modules can assume every
//! `Observation` they receive is valid.
//!
//! Key behaviors
//! -------------
//! - [`RawRecord`] is the untyped row shape produced by readers.
//! - [`Observation::from_raw`] / [`Observation::new`] enforce the row
//!   invariants (finite numbers, `ad_cost >= 0`, non-empty channel,
//!   timezone-naive timestamp).
//! - [`DataCleaner`] applies that validation to a whole table and records
//!   rejected rows in a [`CleanedTable`] instead of failing.
//! - [`ingest`] reads headered CSV via the `csv` crate.
//!
//! Conventions
//! -----------
//! - Row rejection is a recovered condition ([`DataValidationError`]); only
//!   schema-level failures ([`IngestError`]) abort loading.
//! - Input order is preserved; chronological ordering per channel is the
//!   adstock pass's responsibility, not the cleaner's.

pub mod cleaner;
pub mod errors;
pub mod ingest;
pub mod observation;

pub use self::cleaner::{CleanedTable, DataCleaner, RejectedRow};
pub use self::errors::{DataResult, DataValidationError, IngestError, IngestResult};
pub use self::ingest::{load_cleaned, load_csv, read_records};
pub use self::observation::{Observation, RawRecord, REQUIRED_COLUMNS, parse_timestamp};
