//! estimators::validation — shared shape guards for estimator inputs.
//!
//! Purpose
//! -------
//! Centralize the shape checks every estimator performs before touching the
//! data, so error semantics stay consistent across tests.
//!
//! Conventions
//! -----------
//! - Inputs are repetition-major `NN × N` matrices; estimators pair row `r`
//!   of one variant with row `r` of the other.
//! - Variants may differ in their number of users (columns) unless a test
//!   needs elementwise pairing (values with their weights).
//! - This module performs no numeric checks; finiteness and positivity of
//!   counts are guaranteed upstream by `SampleMatrices::new`.
use ndarray::{ArrayView1, ArrayView2};

use crate::estimators::errors::{EstimatorError, EstimatorResult};

/// Require that `a` and `b` have the same number of repetitions.
pub fn validate_rows(a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> EstimatorResult<()> {
    if a.nrows() != b.nrows() {
        return Err(EstimatorError::RowMismatch { left: a.nrows(), right: b.nrows() });
    }
    Ok(())
}

/// Require identical shapes, e.g. a value matrix and its weights.
pub fn validate_same_shape(
    name: &'static str, expected: &ArrayView2<f64>, found: &ArrayView2<f64>,
) -> EstimatorResult<()> {
    if expected.dim() != found.dim() {
        return Err(EstimatorError::ShapeMismatch {
            name,
            expected: expected.dim(),
            found: found.dim(),
        });
    }
    Ok(())
}

/// Require at least `required` users per repetition.
pub fn validate_min_columns(
    name: &'static str, x: &ArrayView2<f64>, required: usize,
) -> EstimatorResult<()> {
    if x.ncols() < required {
        return Err(EstimatorError::InsufficientData { name, found: x.ncols(), required });
    }
    Ok(())
}

/// Require two per-repetition vectors of equal length.
pub fn validate_lengths(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> EstimatorResult<()> {
    if a.len() != b.len() {
        return Err(EstimatorError::RowMismatch { left: a.len(), right: b.len() });
    }
    Ok(())
}
