//! sweep::errors — aggregate error of the sweep orchestrator.
//!
//! Purpose
//! -------
//! Attach sweep context (condition, estimator codename) to failures coming
//! from the generator, the estimator library and the cache, so an aborted
//! run reports *where* it stopped.
//!
//! Conventions
//! -----------
//! - Wrapped errors keep their own `Display` text after a short prefix.
//! - `From<CacheError>` lets `ResultCache::compute_if_absent` propagate
//!   store failures through a `SweepError` provider.

use crate::{
    cache::CacheError, estimators::EstimatorError, simulation::Condition,
    simulation::SimulationError,
};

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type SweepResult<T> = Result<T, SweepError>;

/// SweepError — the first failure of a sweep.
///
/// Variants
/// --------
/// - `Simulation { condition, source }`
///   The data generator failed for one condition.
/// - `Intermediate { condition, source }`
///   A shared intermediate could not be derived from the samples.
/// - `Estimator { codename, condition, source }`
///   An estimator configuration failed.
/// - `ResultLength { codename, condition, expected, found }`
///   An estimator returned a result whose length is not `NN`.
/// - `Cache(CacheError)`
///   Reading or writing the result store failed.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepError {
    Simulation { condition: Condition, source: SimulationError },
    Intermediate { condition: Condition, source: EstimatorError },
    Estimator { codename: &'static str, condition: Condition, source: EstimatorError },
    ResultLength { codename: &'static str, condition: Condition, expected: usize, found: usize },
    Cache(CacheError),
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweepError::Simulation { source, .. } => Some(source),
            SweepError::Intermediate { source, .. } | SweepError::Estimator { source, .. } => {
                Some(source)
            }
            SweepError::Cache(source) => Some(source),
            SweepError::ResultLength { .. } => None,
        }
    }
}

impl std::fmt::Display for SweepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepError::Simulation { condition, source } => {
                write!(f, "Data generation failed for {condition}: {source}")
            }
            SweepError::Intermediate { condition, source } => {
                write!(f, "Intermediate computation failed for {condition}: {source}")
            }
            SweepError::Estimator { codename, condition, source } => {
                write!(f, "Estimator {codename} failed for {condition}: {source}")
            }
            SweepError::ResultLength { codename, condition, expected, found } => {
                write!(
                    f,
                    "Estimator {codename} returned {found} values for {condition}; expected {expected}."
                )
            }
            SweepError::Cache(source) => write!(f, "Result cache failure: {source}"),
        }
    }
}

impl From<CacheError> for SweepError {
    fn from(err: CacheError) -> Self {
        SweepError::Cache(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<SweepError> for PyErr {
    fn from(err: SweepError) -> PyErr {
        match err {
            SweepError::Cache(inner) => inner.into(),
            other => PyValueError::new_err(format!("SweepError: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    // Purpose
    // -------
    // Estimator failures name the configuration and condition.
    //
    // Given
    // -----
    // - An `Estimator` error for `bootstrap` on AA.
    //
    // Expect
    // ------
    // - The message contains "bootstrap" and "AA"; `source()` is the
    //   wrapped estimator error.
    fn estimator_error_names_codename_and_condition() {
        // Arrange
        let inner = EstimatorError::InvalidOption { name: "n_bootstrap", value: 0.0, reason: "x" };
        let err = SweepError::Estimator {
            codename: "bootstrap",
            condition: Condition::AA,
            source: inner.clone(),
        };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("bootstrap") && msg.contains("AA"), "Got: {msg}");
        assert_eq!(err.source().map(|s| s.to_string()), Some(inner.to_string()));
    }

    #[test]
    fn cache_errors_convert_with_question_mark() {
        fn fails() -> SweepResult<()> {
            let missing: Result<(), CacheError> =
                Err(CacheError::InvalidCodename { codename: String::new(), reason: "empty" });
            missing?;
            Ok(())
        }
        assert!(matches!(fails(), Err(SweepError::Cache(_))));
    }
}
