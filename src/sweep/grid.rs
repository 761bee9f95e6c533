//! sweep::grid — parameter grids and the reference presets.
//!
//! Purpose
//! -------
//! Build ordered lists of [`ParameterPoint`]s for the orchestrator. The
//! presets vary one distribution-shape parameter at a time around a fixed
//! baseline, which is how power and false-positive curves are produced.
//!
//! Conventions
//! -----------
//! - Grid values come from `ndarray`'s `linspace`/`logspace`, so they are
//!   whatever those produce in `f64`; the cache key formats them with
//!   `Display`, so repeated runs on the same platform address the same
//!   entries.
//! - All presets use `uplift = 0.2`.
use std::str::FromStr;

use ndarray::Array1;

use crate::simulation::ParameterPoint;

/// Uplift used by every preset.
pub const REFERENCE_UPLIFT: f64 = 0.2;

/// Named preset grids.
///
/// Variants
/// --------
/// - `Beta`: 20 values of `beta` from 1000 down to 1 (log-spaced),
///   `success_rate = 0.02`, `skew = 1`.
/// - `Skew`: 20 values of `skew` in `[0.1, 4]` (linear), `beta = 1000`,
///   `success_rate = 0.02`.
/// - `SuccessRate`: 20 values of `success_rate` in `[10⁻³, 10⁻⁰·³]`
///   (log-spaced), `beta = 500`, `skew = 1`.
/// - `Reference`: `Beta`, then `Skew`, then `SuccessRate`.
///
/// Parsing
/// -------
/// Case-insensitive `"beta"`, `"skew"`, `"success_rate"` (or
/// `"success-rate"`), `"reference"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridPreset {
    Beta,
    Skew,
    SuccessRate,
    Reference,
}

/// Error of [`GridPreset::from_str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPreset {
    pub name: String,
}

impl std::error::Error for UnknownPreset {}

impl std::fmt::Display for UnknownPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unknown grid preset {:?}. Valid options are 'beta', 'skew', 'success_rate' or 'reference'.",
            self.name
        )
    }
}

impl FromStr for GridPreset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beta" => Ok(GridPreset::Beta),
            "skew" => Ok(GridPreset::Skew),
            "success_rate" | "success-rate" => Ok(GridPreset::SuccessRate),
            "reference" => Ok(GridPreset::Reference),
            _ => Err(UnknownPreset { name: s.to_string() }),
        }
    }
}

/// SweepGrid — an ordered list of parameter points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepGrid {
    points: Vec<ParameterPoint>,
}

impl SweepGrid {
    pub fn new(points: Vec<ParameterPoint>) -> SweepGrid {
        SweepGrid { points }
    }

    /// Grid of `preset` for `nn` repetitions of `n` users.
    pub fn preset(preset: GridPreset, nn: usize, n: usize) -> SweepGrid {
        match preset {
            GridPreset::Beta => SweepGrid::beta_sweep(nn, n),
            GridPreset::Skew => SweepGrid::skew_sweep(nn, n),
            GridPreset::SuccessRate => SweepGrid::success_rate_sweep(nn, n),
            GridPreset::Reference => SweepGrid::reference(nn, n),
        }
    }

    /// `beta` from 1000 down to 1, `success_rate = 0.02`, `skew = 1`.
    pub fn beta_sweep(nn: usize, n: usize) -> SweepGrid {
        let betas = Array1::logspace(10.0, 0.0, 3.0, 20);
        let points = betas
            .iter()
            .rev()
            .map(|&beta| ParameterPoint::new(nn, n, REFERENCE_UPLIFT, 0.02, beta, 1.0))
            .collect();
        SweepGrid { points }
    }

    /// `skew` over `[0.1, 4]`, `beta = 1000`, `success_rate = 0.02`.
    pub fn skew_sweep(nn: usize, n: usize) -> SweepGrid {
        let points = Array1::linspace(0.1, 4.0, 20)
            .iter()
            .map(|&skew| ParameterPoint::new(nn, n, REFERENCE_UPLIFT, 0.02, 1000.0, skew))
            .collect();
        SweepGrid { points }
    }

    /// `success_rate` over `[10⁻³, 10⁻⁰·³]`, `beta = 500`, `skew = 1`.
    pub fn success_rate_sweep(nn: usize, n: usize) -> SweepGrid {
        let points = Array1::logspace(10.0, -3.0, -0.3, 20)
            .iter()
            .map(|&rate| ParameterPoint::new(nn, n, REFERENCE_UPLIFT, rate, 500.0, 1.0))
            .collect();
        SweepGrid { points }
    }

    /// The three one-at-a-time sweeps concatenated (60 points).
    pub fn reference(nn: usize, n: usize) -> SweepGrid {
        let mut points = SweepGrid::beta_sweep(nn, n).points;
        points.extend(SweepGrid::skew_sweep(nn, n).points);
        points.extend(SweepGrid::success_rate_sweep(nn, n).points);
        SweepGrid { points }
    }

    pub fn points(&self) -> &[ParameterPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterPoint> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a SweepGrid {
    type Item = &'a ParameterPoint;
    type IntoIter = std::slice::Iter<'a, ParameterPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
