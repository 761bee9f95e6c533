//! estimators::errors — shared error type for A/B estimators.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias for every estimator, transform
//! and option constructor in this subtree, so callers can propagate
//! failures with `?` and the sweep can attach the failing codename.
//!
//! Key behaviors
//! -------------
//! - Attach human-readable `Display` messages to each variant, phrased in
//!   domain terms ("arrays must have the same number of repetitions").
//! - Keep variants small and cloneable; distribution failures from `statrs`
//!   are captured as strings.
//!
//! Invariants & assumptions
//! ------------------------
//! - Estimators validate shapes and tuning constants up front and return
//!   [`EstimatorResult<T>`] instead of panicking.
//! - Degenerate *data* (zero variance, all ties) is not an error: the
//!   affected repetition yields `NaN`, matching the usual convention of
//!   statistical libraries.
//!
//! Testing notes
//! -------------
//! - Unit tests verify that each variant's `Display` embeds its payload.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type EstimatorResult<T> = Result<T, EstimatorError>;

/// EstimatorError — validation and computation failures of estimators.
///
/// Variants
/// --------
/// - `RowMismatch { left, right }`
///   Two inputs disagree on the number of repetitions (rows).
/// - `ShapeMismatch { name, expected, found }`
///   An input that must match another elementwise (e.g. values and their
///   weights) has a different shape.
/// - `InsufficientData { name, found, required }`
///   Too few users/columns for the requested test.
/// - `InvalidOption { name, value, reason }`
///   A tuning constant (bootstrap size, bucket count, smoothing factor) is
///   out of range.
/// - `Distribution { reason }`
///   A `statrs` distribution could not be constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimatorError {
    //------ Input validation errors ------
    RowMismatch { left: usize, right: usize },
    ShapeMismatch { name: &'static str, expected: (usize, usize), found: (usize, usize) },
    InsufficientData { name: &'static str, found: usize, required: usize },

    //------ Options ------
    InvalidOption { name: &'static str, value: f64, reason: &'static str },

    //------ Backend ------
    Distribution { reason: String },
}

impl std::error::Error for EstimatorError {}

impl std::fmt::Display for EstimatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimatorError::RowMismatch { left, right } => {
                write!(
                    f,
                    "Arrays must have the same number of repetitions; got {left} and {right}."
                )
            }
            EstimatorError::ShapeMismatch { name, expected, found } => {
                write!(
                    f,
                    "Input {name} has shape {}x{}, expected {}x{}.",
                    found.0, found.1, expected.0, expected.1
                )
            }
            EstimatorError::InsufficientData { name, found, required } => {
                write!(f, "Input {name} has {found} columns; at least {required} are required.")
            }
            EstimatorError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid {name} value: {value}. {reason}")
            }
            EstimatorError::Distribution { reason } => {
                write!(f, "Distribution construction failed: {reason}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<EstimatorError> for PyErr {
    fn from(err: EstimatorError) -> PyErr {
        PyValueError::new_err(format!("EstimatorError: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify that `RowMismatch` reports both row counts.
    //
    // Given
    // -----
    // - `RowMismatch { left: 10, right: 9 }`.
    //
    // Expect
    // ------
    // - The message contains "10" and "9".
    fn estimator_error_row_mismatch_includes_both_counts() {
        // Arrange
        let err = EstimatorError::RowMismatch { left: 10, right: 9 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("10") && msg.contains('9'), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Verify that `InvalidOption` includes the option name and value.
    //
    // Given
    // -----
    // - `InvalidOption` for `n_buckets = 1`.
    //
    // Expect
    // ------
    // - The message contains "n_buckets" and "1".
    fn estimator_error_invalid_option_includes_payload() {
        // Arrange
        let err = EstimatorError::InvalidOption {
            name: "n_buckets",
            value: 1.0,
            reason: "Must be at least 2.",
        };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("n_buckets") && msg.contains('1'), "Got: {msg}");
    }

    #[test]
    fn estimator_error_insufficient_data_has_nonempty_display_message() {
        let err = EstimatorError::InsufficientData { name: "a", found: 1, required: 2 };
        assert!(!err.to_string().trim().is_empty());
    }
}
