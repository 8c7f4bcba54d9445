//! Python-boundary helpers shared by the `#[pyclass]` wrappers in `lib.rs`.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

#[cfg(feature = "python-bindings")]
use crate::{
    data::observation::RawRecord, features::adstock::AdstockOptions,
    pipeline::options::PipelineOptions,
};

/// Accept a contiguous float64 ndarray, a pandas Series, or any sequence of
/// floats, copying only when the input is not already contiguous float64.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Extract a numeric column and check it has `expected_len` entries.
#[cfg(feature = "python-bindings")]
pub fn extract_column<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, name: &str, expected_len: usize,
) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{name} must be a 1-D contiguous float64 array or sequence"))
    })?;
    if slice.len() != expected_len {
        return Err(PyValueError::new_err(format!(
            "{name} has {} entries; expected {expected_len}",
            slice.len()
        )));
    }
    Ok(slice.to_vec())
}

/// Zip column data into raw records so they pass through the same cleaner as
/// CSV rows.
#[cfg(feature = "python-bindings")]
pub fn records_from_columns(
    timestamps: &[String], channel_names: &[String], numeric: [&[f64]; 5],
) -> Vec<RawRecord> {
    let [ad_cost, sales, homepage_visits, branded_searches, conversion_rate] = numeric;
    (0..timestamps.len())
        .map(|i| RawRecord {
            timestamp: Some(timestamps[i].clone()),
            channel_name: Some(channel_names[i].clone()),
            ad_cost: Some(ad_cost[i].to_string()),
            sales: Some(sales[i].to_string()),
            homepage_visits: Some(homepage_visits[i].to_string()),
            branded_searches: Some(branded_searches[i].to_string()),
            conversion_rate: Some(conversion_rate[i].to_string()),
            ..RawRecord::default()
        })
        .collect()
}

/// Default pipeline options with an optional adstock override.
#[cfg(feature = "python-bindings")]
pub fn extract_pipeline_options(
    alpha: Option<f64>, carryover_seed: Option<f64>, config: Option<&str>,
) -> PyResult<PipelineOptions> {
    let mut opts = match config {
        Some(doc) => PipelineOptions::from_toml_str(doc)?,
        None => PipelineOptions::default(),
    };
    if alpha.is_some() || carryover_seed.is_some() {
        opts.adstock = AdstockOptions::new(
            alpha.unwrap_or(opts.adstock.alpha),
            carryover_seed.unwrap_or(opts.adstock.carryover_seed),
        )?;
    }
    Ok(opts)
}
