//! simulation::samples — validated view/click matrices for one condition.
//!
//! Purpose
//! -------
//! Hold the output of one data-generation call: `views` and `clicks` for the
//! control and treatment variants, plus the ground-truth per-user success
//! rates that produced them.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every matrix is `NN × N` (repetition-major: row `r` is repetition `r`,
//!   column `j` is user `j`).
//! - `views ≥ clicks ≥ 0` and `views > 0` elementwise, so per-user CTRs
//!   `clicks / views` are always defined.
//! - Both invariants are checked once in [`SampleMatrices::new`]; downstream
//!   estimators rely on them without re-checking.
use ndarray::Array2;

use crate::simulation::errors::{SimulationError, SimulationResult};

/// Paired — one value per experiment variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Paired<T> {
    pub control: T,
    pub treatment: T,
}

impl<T> Paired<T> {
    pub fn new(control: T, treatment: T) -> Paired<T> {
        Paired { control, treatment }
    }

    /// Apply `f` to both sides.
    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> Paired<U> {
        Paired { control: f(&self.control), treatment: f(&self.treatment) }
    }
}

/// VariantSamples — views and clicks for one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSamples {
    pub views: Array2<f64>,
    pub clicks: Array2<f64>,
}

impl VariantSamples {
    pub fn new(views: Array2<f64>, clicks: Array2<f64>) -> VariantSamples {
        VariantSamples { views, clicks }
    }
}

/// SampleMatrices — validated samples for one (ParameterPoint, Condition).
///
/// Purpose
/// -------
/// Bundle both variants' samples and the ground truth, guaranteeing shape
/// agreement and count invariants so intermediates and estimators can
/// divide by `views` without further checks.
///
/// Fields
/// ------
/// - `control`, `treatment`: [`VariantSamples`]
///   Variant 0 and variant 1 of the experiment.
/// - `ground_truth`: `Paired<Array2<f64>>`
///   Per-user success probabilities drawn by the generator.
///
/// Invariants
/// ----------
/// - All six matrices share the shape `(nn, n)` with `nn ≥ 1`, `n ≥ 1`.
/// - `views ≥ clicks ≥ 0`, `views > 0` for both variants.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrices {
    pub control: VariantSamples,
    pub treatment: VariantSamples,
    pub ground_truth: Paired<Array2<f64>>,
}

impl SampleMatrices {
    /// Validate and assemble the samples of one condition.
    ///
    /// Parameters
    /// ----------
    /// - `control`: [`VariantSamples`]
    ///   Variant 0 views/clicks. Its `views` shape defines the expected
    ///   `(nn, n)` for every other matrix.
    /// - `treatment`: [`VariantSamples`]
    ///   Variant 1 views/clicks.
    /// - `ground_truth`: `Paired<Array2<f64>>`
    ///   True per-user rates for both variants.
    ///
    /// Returns
    /// -------
    /// `SimulationResult<SampleMatrices>`
    ///
    /// Errors
    /// ------
    /// - `SimulationError::InvalidDimension`
    ///   When the control views matrix has zero rows or zero columns.
    /// - `SimulationError::ShapeMismatch`
    ///   When any matrix differs in shape from `control.views`.
    /// - `SimulationError::InvalidCounts`
    ///   At the first cell (row-major, control before treatment) where
    ///   `views ≥ clicks ≥ 0`, `views > 0` fails, including non-finite
    ///   counts.
    pub fn new(
        control: VariantSamples, treatment: VariantSamples, ground_truth: Paired<Array2<f64>>,
    ) -> SimulationResult<SampleMatrices> {
        let expected = control.views.dim();
        if expected.0 == 0 {
            return Err(SimulationError::InvalidDimension {
                name: "NN",
                value: 0,
                reason: "at least one repetition is required",
            });
        }
        if expected.1 == 0 {
            return Err(SimulationError::InvalidDimension {
                name: "N",
                value: 0,
                reason: "at least one user per variant is required",
            });
        }

        let shapes = [
            ("control.clicks", control.clicks.dim()),
            ("treatment.views", treatment.views.dim()),
            ("treatment.clicks", treatment.clicks.dim()),
            ("ground_truth.control", ground_truth.control.dim()),
            ("ground_truth.treatment", ground_truth.treatment.dim()),
        ];
        for (name, found) in shapes {
            if found != expected {
                return Err(SimulationError::ShapeMismatch { name, expected, found });
            }
        }

        check_counts(&control)?;
        check_counts(&treatment)?;

        Ok(SampleMatrices { control, treatment, ground_truth })
    }

    /// Number of repetitions (`NN`).
    pub fn repetitions(&self) -> usize {
        self.control.views.nrows()
    }

    /// Users per variant (`N`).
    pub fn users(&self) -> usize {
        self.control.views.ncols()
    }
}

fn check_counts(samples: &VariantSamples) -> SimulationResult<()> {
    for ((row, col), &views) in samples.views.indexed_iter() {
        let clicks = samples.clicks[[row, col]];
        let ok = views.is_finite() && clicks.is_finite() && views > 0.0 && clicks >= 0.0 && views >= clicks;
        if !ok {
            return Err(SimulationError::InvalidCounts { row, col, views, clicks });
        }
    }
    Ok(())
}
