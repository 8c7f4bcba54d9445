//! CSV ingest for the observation table.
//!
//! Reads a headered CSV into [`RawRecord`]s. Schema problems (missing
//! required columns, unreadable stream) are fatal [`IngestError`]s; problems
//! inside a single row are left for the cleaner so one bad cell never aborts
//! the load. Extra columns such as `region` or `bounce_rate` are ignored.
use crate::data::{
    cleaner::{CleanedTable, DataCleaner},
    errors::{IngestError, IngestResult},
    observation::{RawRecord, REQUIRED_COLUMNS},
};
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info};

/// Read raw records from any CSV byte stream.
///
/// Errors
/// ------
/// - `IngestError::Csv` if the header row cannot be read.
/// - `IngestError::MissingColumn` for the first required column not present.
///
/// Rows whose byte layout cannot be decoded at all (e.g. invalid UTF-8) are
/// kept as [`RawRecord::undecodable`] placeholders carrying the reader error,
/// so they surface as a row-level rejection with the real reason.
pub fn read_records<R: Read>(reader: R) -> IngestResult<Vec<RawRecord>> {
    let mut csv_reader =
        csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(IngestError::MissingColumn { column });
        }
    }

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<RawRecord>().enumerate() {
        match row {
            Ok(record) => records.push(record),
            Err(err) => {
                debug!(row = index, %err, "undecodable CSV row");
                records.push(RawRecord::undecodable(err.to_string()));
            }
        }
    }
    Ok(records)
}

/// Open `path` and read its raw records.
pub fn load_csv(path: impl AsRef<Path>) -> IngestResult<Vec<RawRecord>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|source| IngestError::Io { path: path.display().to_string(), source })?;
    let records = read_records(file)?;
    info!(path = %path.display(), rows = records.len(), "loaded input table");
    Ok(records)
}

/// Load and clean a CSV file in one step.
pub fn load_cleaned(path: impl AsRef<Path>) -> IngestResult<CleanedTable> {
    let records = load_csv(path)?;
    Ok(DataCleaner::new().clean(records))
}
