//! simulation — synthetic A/B experiment data.
//!
//! Purpose
//! -------
//! Produce the paired `(views, clicks)` matrices every estimator consumes.
//! This subtree owns the parameter-point value type, the AB/AA condition
//! split, the validated sample container, and the [`DataGenerator`] seam with
//! its reference implementation [`ClickGenerator`].
//!
//! Key behaviors
//! -------------
//! - [`ParameterPoint`] identifies one scenario; [`ParameterPoint::null_control`]
//!   derives its A/A companion with uplift forced to zero.
//! - [`SampleMatrices::new`] is the single place where shape agreement and
//!   `views ≥ clicks ≥ 0`, `views > 0` are enforced.
//! - [`ClickGenerator`] draws log-normal views, Beta user rates and binomial
//!   clicks, reproducibly when given a seed.
//!
//! Invariants & assumptions
//! ------------------------
//! - Sample matrices are repetition-major `NN × N` `ndarray::Array2<f64>`.
//! - Generators never cache: every call returns fresh matrices owned by the
//!   caller.
//!
//! Downstream usage
//! ----------------
//! - The sweep orchestrator calls [`DataGenerator::generate`] once per
//!   condition per point and hands the result to the intermediate stage.
//! - Tests substitute their own `DataGenerator` to inject fixed samples or
//!   failures.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule: error messages, point
//!   validation branches, sample invariants, and seeded determinism of the
//!   generator.

pub mod errors;
pub mod generator;
pub mod params;
pub mod samples;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{SimulationError, SimulationResult};
pub use self::generator::{ClickGenerator, DataGenerator};
pub use self::params::{Condition, ParameterPoint};
pub use self::samples::{Paired, SampleMatrices, VariantSamples};
pub use self::validation::validate_point;
