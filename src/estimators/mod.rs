//! estimators — two-sample tests and transforms for click/view experiments.
//!
//! Purpose
//! -------
//! Collect the numeric tests applied to every simulated experiment and the
//! derived arrays they share. Each routine is a pure function of its inputs
//! (plus an explicit RNG for the randomized ones) returning one value per
//! repetition.
//!
//! Key behaviors
//! -------------
//! - Closed-form tests in [`parametric`] (t-test, delta method, binomial
//!   z-test) and [`rank`] (Mann-Whitney U).
//! - Randomized tests in [`resampling`] (Poisson bootstrap, permutation).
//! - [`bucketization`] reduces users to bucket-level weighted means.
//! - [`transforms`] builds CTRs, weights, linearized clicks and smoothed
//!   CTRs.
//! - [`EstimatorLibrary`] is the seam consumed by the sweep;
//!   [`StandardEstimators`] wires the functions above to it.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are repetition-major `NN × N` matrices; row `r` of variant 0 is
//!   paired with row `r` of variant 1.
//! - Shape problems and bad tuning constants surface as [`EstimatorError`];
//!   degenerate data yields `NaN` for the affected repetition.
//!
//! Testing notes
//! -------------
//! - Closed-form tests are checked against hand-derived reference values.
//! - Randomized tests are checked for effect detection, bounds and seeded
//!   reproducibility, never for exact p-values.

pub mod bucketization;
pub mod errors;
pub mod library;
pub mod parametric;
pub mod rank;
pub mod resampling;
pub mod transforms;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{EstimatorError, EstimatorResult};
pub use self::library::{EstimatorLibrary, EstimatorOptions, StandardEstimators, TransformPair};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{EstimatorError, EstimatorResult};
    pub use super::library::{EstimatorLibrary, EstimatorOptions, StandardEstimators};
}
