//! simulation::errors — error type for synthetic experiment generation.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias used by the data-generation
//! layer: parameter validation of a [`ParameterPoint`](super::ParameterPoint),
//! sample-matrix shape/invariant checks, and failures reported by the
//! underlying `rand_distr` distributions.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of the violated domain constraint
//!   ("success_rate must lie in (0, 1)") rather than low-level details.
//! - Distribution failures keep the upstream message as a `String` so the
//!   enum stays `Clone + PartialEq` for tests and higher-level orchestration.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type SimulationResult<T> = Result<T, SimulationError>;

/// SimulationError — failures while producing [`SampleMatrices`](super::SampleMatrices).
///
/// Variants
/// --------
/// - `InvalidParameter { name, value, reason }`
///   A field of the requested parameter point is outside the domain the
///   generator supports (e.g. `success_rate · (1 + uplift) ≥ 1`).
/// - `InvalidDimension { name, value, reason }`
///   `NN` or `N` is too small to produce usable samples.
/// - `ShapeMismatch { name, expected, found }`
///   A matrix handed to [`SampleMatrices::new`](super::SampleMatrices::new)
///   does not have the `NN × N` shape shared by the rest.
/// - `InvalidCounts { row, col, views, clicks }`
///   The elementwise invariant `views ≥ clicks ≥ 0`, `views > 0` is broken.
/// - `Distribution { distribution, reason }`
///   A `rand_distr` constructor rejected its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    // ---- Parameter point ----
    InvalidParameter { name: &'static str, value: f64, reason: &'static str },
    InvalidDimension { name: &'static str, value: usize, reason: &'static str },

    // ---- Sample matrices ----
    ShapeMismatch { name: &'static str, expected: (usize, usize), found: (usize, usize) },
    InvalidCounts { row: usize, col: usize, views: f64, clicks: f64 },

    // ---- Sampling backend ----
    Distribution { distribution: &'static str, reason: String },
}

impl std::error::Error for SimulationError {}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::InvalidParameter { name, value, reason } => {
                write!(f, "Invalid parameter {name} = {value}: {reason}")
            }
            SimulationError::InvalidDimension { name, value, reason } => {
                write!(f, "Invalid dimension {name} = {value}: {reason}")
            }
            SimulationError::ShapeMismatch { name, expected, found } => {
                write!(
                    f,
                    "Matrix {name} has shape {}x{}, expected {}x{}",
                    found.0, found.1, expected.0, expected.1
                )
            }
            SimulationError::InvalidCounts { row, col, views, clicks } => {
                write!(
                    f,
                    "Counts at ({row}, {col}) violate views >= clicks >= 0 and views > 0: \
                     views = {views}, clicks = {clicks}"
                )
            }
            SimulationError::Distribution { distribution, reason } => {
                write!(f, "Could not build {distribution} distribution: {reason}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<SimulationError> for PyErr {
    fn from(err: SimulationError) -> PyErr {
        PyValueError::new_err(format!("SimulationError: {err}"))
    }
}
