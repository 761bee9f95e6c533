//! sweep — memoized evaluation of estimator configurations over a grid.
//!
//! Purpose
//! -------
//! Tie the generator, the estimator library and the result cache together:
//! for each parameter point, generate the A/B and A/A experiments, derive
//! shared intermediates once, and run every registered configuration through
//! the cache's compute-if-absent contract.
//!
//! Key behaviors
//! -------------
//! - [`SweepOrchestrator`] runs points in order and reports computed and
//!   skipped configurations per point.
//! - [`registry`] names the configurations; [`standard_registry`] is the
//!   full reference set.
//! - [`context`] owns the per-point samples and intermediates.
//! - [`SeedPolicy`] decides how AB and AA generations are seeded.
//! - [`SweepGrid`] builds the reference parameter grids.
//!
//! Invariants & assumptions
//! ------------------------
//! - Sequential, single-process; one writer per cache root.
//! - Rerunning an interrupted sweep recomputes only missing entries.
//!
//! Downstream usage
//! ----------------
//! ```rust,no_run
//! use rust_stattests::prelude::*;
//!
//! let mut sweep = SweepOrchestrator::new(
//!     ResultCache::new("results"),
//!     ClickGenerator::new(),
//!     StandardEstimators::default(),
//!     standard_registry(),
//!     SweepOptions::default(),
//! );
//! let grid = SweepGrid::reference(2000, 5000);
//! let report = sweep.run_points(&grid)?;
//! # Ok::<(), SweepError>(())
//! ```

pub mod context;
pub mod errors;
pub mod grid;
pub mod options;
pub mod orchestrator;
pub mod registry;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::context::{ConditionData, Intermediates, PointContext};
pub use self::errors::{SweepError, SweepResult};
pub use self::grid::{GridPreset, SweepGrid, UnknownPreset};
pub use self::options::{SeedPolicy, SweepOptions};
pub use self::orchestrator::{PointReport, SweepOrchestrator, SweepReport};
pub use self::registry::{ComputeFn, EstimatorConfig, STANDARD_CODENAMES, standard_registry};
