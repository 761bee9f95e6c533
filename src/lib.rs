//! rust_stattests — memoized A/B-test estimator sweeps with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the result cache and the estimator battery to Python via the
//! `_rust_stattests` extension module. The crate simulates click-through
//! experiments, runs a fixed family of estimator configurations on them and
//! stores one pair of p-value vectors per (parameter point, configuration).
//!
//! Key behaviors
//! -------------
//! - [`simulation`] generates A/B and A/A click/view matrices per point.
//! - [`estimators`] holds the hypothesis tests and the transforms they
//!   share.
//! - [`cache`] persists results in a directory tree keyed by the point's
//!   parameters and the configuration codename.
//! - [`sweep`] orchestrates generation, intermediates and the cache so that
//!   an interrupted run resumes where it stopped.
//! - [`summary`] turns stored p-values into power and false-positive rates.
//!
//! Invariants & assumptions
//! ------------------------
//! - All heavy numerical work lives in the inner modules; the PyO3 items
//!   here only convert inputs, release the GIL and map errors.
//! - Error enums of the inner modules convert into `PyErr` at the boundary
//!   (`ValueError` in general, `FileNotFoundError`/`OSError` for cache I/O).
//!
//! Conventions
//! -----------
//! - Python-exposed items live under `_rust_stattests.cache` and
//!   `_rust_stattests.sweep`, also importable as `rust_stattests.cache` and
//!   `rust_stattests.sweep`.
//! - Matrices cross the boundary as `NN × N` float64 arrays; results come
//!   back as 1-D `numpy.ndarray`s of length `NN`.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should import from [`prelude`] or the inner modules.
//! - The `stattests-sweep` binary runs preset grids from the command line.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   the end-to-end cache/sweep tests under `tests/`.

pub mod cache;
pub mod estimators;
pub mod simulation;
pub mod summary;
pub mod sweep;
pub mod utils;

/// Everything needed to configure and run a sweep.
pub mod prelude {
    pub use crate::cache::{CacheEntry, CacheError, CacheOutcome, ResultCache};
    pub use crate::estimators::{
        EstimatorError, EstimatorLibrary, EstimatorOptions, StandardEstimators,
    };
    pub use crate::simulation::{
        ClickGenerator, Condition, DataGenerator, ParameterPoint, SampleMatrices,
        SimulationError,
    };
    pub use crate::summary::RejectionSummary;
    pub use crate::sweep::{
        EstimatorConfig, GridPreset, SeedPolicy, SweepError, SweepGrid, SweepOptions,
        SweepOrchestrator, SweepReport, standard_registry,
    };
}

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::PyValueError,
    prelude::*,
    types::{PyAny, PyDict},
};

#[cfg(feature = "python-bindings")]
use crate::{
    cache::ResultCache,
    estimators::{EstimatorOptions, StandardEstimators},
    simulation::{ClickGenerator, Condition, ParameterPoint},
    sweep::{
        ConditionData, GridPreset, SeedPolicy, SweepGrid, SweepOptions, SweepOrchestrator,
        standard_registry,
    },
    utils::extract_samples,
};

/// ExperimentCache — Python-facing read access to a result cache.
///
/// Purpose
/// -------
/// Let analysis code load stored p-values and rejection rates without
/// knowing the on-disk layout.
///
/// Parameters
/// ----------
/// Constructed from Python via `ExperimentCache(root)`:
/// - `root`: `str`
///   Cache root directory; it does not need to exist yet.
///
/// Notes
/// -----
/// - Every method takes the six key parameters
///   `(nn, n, uplift, success_rate, beta, skew)` followed by the codename.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_stattests.cache")]
pub struct ExperimentCache {
    inner: ResultCache,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl ExperimentCache {
    #[new]
    #[pyo3(text_signature = "(root, /)")]
    pub fn new(root: String) -> ExperimentCache {
        ExperimentCache { inner: ResultCache::new(root) }
    }

    /// Cache root directory.
    #[getter]
    pub fn root(&self) -> String {
        self.inner.root().display().to_string()
    }

    /// Whether both artifacts of the entry are present.
    #[pyo3(signature = (nn, n, uplift, success_rate, beta, skew, codename))]
    pub fn exists(
        &self, nn: usize, n: usize, uplift: f64, success_rate: f64, beta: f64, skew: f64,
        codename: &str,
    ) -> bool {
        let point = ParameterPoint::new(nn, n, uplift, success_rate, beta, skew);
        self.inner.exists(&point, codename)
    }

    /// Stored `(ab_result, aa_result)` p-value arrays.
    ///
    /// Raises `FileNotFoundError` when either artifact is missing and
    /// `ValueError` when one cannot be parsed.
    #[pyo3(signature = (nn, n, uplift, success_rate, beta, skew, codename))]
    pub fn read<'py>(
        &self, py: Python<'py>, nn: usize, n: usize, uplift: f64, success_rate: f64, beta: f64,
        skew: f64, codename: &str,
    ) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>)> {
        let point = ParameterPoint::new(nn, n, uplift, success_rate, beta, skew);
        let entry = self.inner.read(&point, codename)?;
        Ok((entry.ab_result.into_pyarray(py), entry.aa_result.into_pyarray(py)))
    }

    /// `(power, false_positive_rate)` of the entry at level `alpha`.
    #[pyo3(signature = (nn, n, uplift, success_rate, beta, skew, codename, alpha = 0.05))]
    pub fn summarize(
        &self, nn: usize, n: usize, uplift: f64, success_rate: f64, beta: f64, skew: f64,
        codename: &str, alpha: f64,
    ) -> PyResult<(f64, f64)> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(PyValueError::new_err("alpha must lie in (0, 1)"));
        }
        let point = ParameterPoint::new(nn, n, uplift, success_rate, beta, skew);
        let summary = self.inner.summarize(&point, codename, alpha)?;
        Ok((summary.power, summary.false_positive_rate))
    }
}

/// Run every standard configuration on caller-supplied samples.
///
/// Parameters
/// ----------
/// - `views_0`, `clicks_0`, `views_1`, `clicks_1`: 2-D array-likes
///   `NN × N` matrices of the control and treatment variants.
/// - `n_bootstrap`, `n_buckets`, `n_permutations`, `smoothing_factor`,
///   `seed`: estimator options; see [`EstimatorOptions`].
///
/// Returns
/// -------
/// `dict[str, numpy.ndarray]`
///   Codename to the `NN` p-values of that configuration. Nothing is cached.
///
/// Errors
/// ------
/// - `ValueError` for invalid options, malformed samples or an estimator
///   failure.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (
    views_0, clicks_0, views_1, clicks_1, n_bootstrap = 2000, n_buckets = 200,
    n_permutations = 2000, smoothing_factor = 200.0, seed = None
))]
#[allow(clippy::too_many_arguments)]
pub fn apply_all_tests<'py>(
    py: Python<'py>, views_0: &Bound<'py, PyAny>, clicks_0: &Bound<'py, PyAny>,
    views_1: &Bound<'py, PyAny>, clicks_1: &Bound<'py, PyAny>, n_bootstrap: usize,
    n_buckets: usize, n_permutations: usize, smoothing_factor: f64, seed: Option<u64>,
) -> PyResult<Bound<'py, PyDict>> {
    let samples = extract_samples(views_0, clicks_0, views_1, clicks_1)?;
    let options =
        EstimatorOptions::new(n_bootstrap, n_buckets, n_permutations, smoothing_factor, seed)?;
    let mut library = StandardEstimators::new(options);
    let data = ConditionData::prepare(Condition::AB, samples, &mut library)?;

    let results = PyDict::new(py);
    for config in standard_registry() {
        let p_values = (config.compute)(&data, &mut library)?;
        results.set_item(config.codename, p_values.into_pyarray(py))?;
    }
    Ok(results)
}

/// Run a preset grid through the standard registry into `root`.
///
/// Returns `(computed, skipped)` configuration counts. The GIL is released
/// for the duration of the sweep.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (root, preset = "reference", nn = 2000, n = 5000, seed = None))]
pub fn run_sweep(
    py: Python<'_>, root: String, preset: &str, nn: usize, n: usize, seed: Option<u64>,
) -> PyResult<(usize, usize)> {
    let preset: GridPreset = preset.parse().map_err(|e| PyValueError::new_err(format!("{e}")))?;
    let grid = SweepGrid::preset(preset, nn, n);
    let seed_policy = seed.map_or(SeedPolicy::Entropy, SeedPolicy::Independent);
    let mut orchestrator = SweepOrchestrator::new(
        ResultCache::new(root),
        ClickGenerator::new(),
        StandardEstimators::default(),
        standard_registry(),
        SweepOptions::new(seed_policy, true),
    );
    let report = py.allow_threads(move || orchestrator.run_points(&grid))?;
    Ok((report.computed(), report.skipped()))
}

/// _rust_stattests — PyO3 module initializer for the Python extension.
///
/// Key behaviors
/// -------------
/// - Create the `cache` and `sweep` submodules and attach them to the parent.
/// - Register both in `sys.modules` so dotted imports work.
///
/// Errors
/// ------
/// - `PyErr`
///   If creating submodules or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_stattests<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let cache_mod = PyModule::new(_py, "cache")?;
    let sweep_mod = PyModule::new(_py, "sweep")?;
    cache(_py, m, &cache_mod)?;
    sweep(_py, m, &sweep_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_stattests.cache", cache_mod)?;

    _py.import("sys")?.getattr("modules")?.set_item("rust_stattests.sweep", sweep_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn cache<'py>(
    _py: Python, rust_stattests: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<ExperimentCache>()?;
    rust_stattests.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn sweep<'py>(
    _py: Python, rust_stattests: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(apply_all_tests, m)?)?;
    m.add_function(wrap_pyfunction!(run_sweep, m)?)?;
    rust_stattests.add_submodule(m)?;
    Ok(())
}
