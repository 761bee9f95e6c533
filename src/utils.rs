//! utils — conversion helpers for the PyO3 bindings.
//!
//! Everything here is compiled only with the `python-bindings` feature and
//! turns Python objects into the crate's validated Rust types.
#[cfg(feature = "python-bindings")]
use ndarray::Array2;

#[cfg(feature = "python-bindings")]
use numpy::PyReadonlyArray2;

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
use crate::simulation::{Paired, SampleMatrices, VariantSamples};

/// Copy a 2-D array-like of `f64` into an owned `Array2`.
///
/// Accepts a `numpy.ndarray`, anything exposing `to_numpy()` (e.g. a
/// `pandas.DataFrame`), or a nested sequence of floats with equal row
/// lengths.
///
/// Errors
/// ------
/// - `TypeError` when `raw_data` is none of the above.
/// - `ValueError` when a nested sequence is ragged.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(raw_data: &Bound<'py, PyAny>, name: &str) -> PyResult<Array2<f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr_ro.as_array().to_owned());
    }

    if let Ok(obj) = raw_data.call_method0("to_numpy") {
        if let Ok(frame_ro) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(frame_ro.as_array().to_owned());
        }
    }

    let rows: Vec<Vec<f64>> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err(format!(
            "{name}: expected a 2-D numpy.ndarray, pandas.DataFrame, or nested sequence of float64"
        ))
    })?;
    let n_cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != n_cols) {
        return Err(PyValueError::new_err(format!("{name}: rows must all have the same length")));
    }
    let n_rows = rows.len();
    Array2::from_shape_vec((n_rows, n_cols), rows.into_iter().flatten().collect())
        .map_err(|e| PyValueError::new_err(format!("{name}: {e}")))
}

/// Assemble validated [`SampleMatrices`] from four Python matrices.
///
/// The observed CTRs stand in for the ground-truth rates, which callers
/// supplying their own data do not have.
#[cfg(feature = "python-bindings")]
pub fn extract_samples<'py>(
    views_0: &Bound<'py, PyAny>, clicks_0: &Bound<'py, PyAny>, views_1: &Bound<'py, PyAny>,
    clicks_1: &Bound<'py, PyAny>,
) -> PyResult<SampleMatrices> {
    let control = VariantSamples::new(
        extract_f64_matrix(views_0, "views_0")?,
        extract_f64_matrix(clicks_0, "clicks_0")?,
    );
    let treatment = VariantSamples::new(
        extract_f64_matrix(views_1, "views_1")?,
        extract_f64_matrix(clicks_1, "clicks_1")?,
    );
    if control.views.dim() != control.clicks.dim() || treatment.views.dim() != treatment.clicks.dim()
    {
        return Err(PyValueError::new_err("views and clicks must have the same shape"));
    }
    let ground_truth =
        Paired::new(&control.clicks / &control.views, &treatment.clicks / &treatment.views);
    Ok(SampleMatrices::new(control, treatment, ground_truth)?)
}
