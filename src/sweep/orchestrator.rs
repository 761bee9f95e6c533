//! sweep::orchestrator — memoized evaluation of a parameter grid.
//!
//! Purpose
//! -------
//! Drive every registered estimator configuration over every parameter
//! point through the result cache, generating data and intermediates only
//! for points that still have work to do.
//!
//! Key behaviors
//! -------------
//! - Per point: generate AB and AA samples (seeded per [`SeedPolicy`]),
//!   prepare a [`PointContext`] once, then submit each configuration to
//!   [`ResultCache::compute_if_absent`] in registration order.
//! - With `skip_complete_points`, a point whose every codename is cached
//!   performs no generation at all.
//! - The first failure aborts the run; entries written before it stay on
//!   disk and are skipped on the next run.
//!
//! Invariants & assumptions
//! ------------------------
//! - Single-threaded and sequential: points in grid order, configurations
//!   in registration order, AB before AA.
//! - Every stored result has exactly `NN` values; anything else is a
//!   `SweepError::ResultLength` and nothing is written for it.
//! - Duplicate codenames are tolerated: the later registration always finds
//!   the earlier one's entry and is skipped.
//! - The estimator library is reseeded per (point, condition, codename)
//!   before each evaluation; with a fixed estimator seed a stored entry does
//!   not depend on which other entries were already cached.
//!
//! [`SeedPolicy`]: crate::sweep::SeedPolicy
use std::collections::HashSet;

use ndarray::Array1;
use tracing::{debug, info, warn};

use crate::{
    cache::{CacheOutcome, ResultCache},
    estimators::EstimatorLibrary,
    simulation::{Condition, DataGenerator, ParameterPoint},
    sweep::{
        context::{ConditionData, PointContext},
        errors::{SweepError, SweepResult},
        options::{SweepOptions, estimator_stream},
        registry::EstimatorConfig,
    },
};

/// Outcome of one parameter point.
///
/// Fields
/// ------
/// - `point`: the evaluated point.
/// - `computed`: configurations evaluated and written.
/// - `skipped`: configurations found in the cache.
/// - `generated`: whether samples were generated for this point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointReport {
    pub point: ParameterPoint,
    pub computed: usize,
    pub skipped: usize,
    pub generated: bool,
}

/// Outcome of a whole sweep, one report per point in grid order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    pub points: Vec<PointReport>,
}

impl SweepReport {
    /// Configurations computed over all points.
    pub fn computed(&self) -> usize {
        self.points.iter().map(|p| p.computed).sum()
    }

    /// Configurations skipped over all points.
    pub fn skipped(&self) -> usize {
        self.points.iter().map(|p| p.skipped).sum()
    }
}

/// SweepOrchestrator — runs a registry of configurations over a grid.
///
/// Type parameters
/// ---------------
/// - `G`: [`DataGenerator`] producing the samples of each condition.
/// - `L`: [`EstimatorLibrary`] providing the tests and transforms.
///
/// Examples
/// --------
/// ```rust
/// # use rust_stattests::cache::ResultCache;
/// # use rust_stattests::estimators::{EstimatorOptions, StandardEstimators};
/// # use rust_stattests::simulation::{ClickGenerator, ParameterPoint};
/// # use rust_stattests::sweep::{standard_registry, SeedPolicy, SweepOptions, SweepOrchestrator};
/// # let dir = tempfile::tempdir().unwrap();
/// let library = StandardEstimators::new(EstimatorOptions::new(50, 5, 50, 200.0, Some(1)).unwrap());
/// let options = SweepOptions::new(SeedPolicy::Independent(1), true);
/// let mut sweep = SweepOrchestrator::new(
///     ResultCache::new(dir.path()),
///     ClickGenerator::new(),
///     library,
///     standard_registry(),
///     options,
/// );
/// let point = ParameterPoint::new(4, 20, 0.2, 0.05, 100.0, 1.0);
/// let report = sweep.run_point(&point).unwrap();
/// assert_eq!(report.computed, 21);
/// assert_eq!(sweep.run_point(&point).unwrap().skipped, 21);
/// ```
#[derive(Debug)]
pub struct SweepOrchestrator<G: DataGenerator, L: EstimatorLibrary> {
    cache: ResultCache,
    generator: G,
    library: L,
    registry: Vec<EstimatorConfig>,
    options: SweepOptions,
}

impl<G: DataGenerator, L: EstimatorLibrary> SweepOrchestrator<G, L> {
    /// Assemble an orchestrator. Duplicate codenames are kept and logged.
    pub fn new(
        cache: ResultCache, generator: G, library: L, registry: Vec<EstimatorConfig>,
        options: SweepOptions,
    ) -> SweepOrchestrator<G, L> {
        let mut seen = HashSet::new();
        for config in &registry {
            if !seen.insert(config.codename) {
                warn!(
                    codename = config.codename,
                    "duplicate codename registered; later entry is a no-op"
                );
            }
        }
        SweepOrchestrator { cache, generator, library, registry, options }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn registry(&self) -> &[EstimatorConfig] {
        &self.registry
    }

    pub fn options(&self) -> &SweepOptions {
        &self.options
    }

    /// Evaluate every configuration at `point`, computing only cache misses.
    ///
    /// Errors
    /// ------
    /// - `SweepError::Simulation` / `SweepError::Intermediate` while preparing
    ///   the point; nothing is written for it.
    /// - `SweepError::Estimator` / `SweepError::ResultLength` for the first
    ///   failing configuration; earlier configurations stay cached.
    /// - `SweepError::Cache` on store failures.
    pub fn run_point(&mut self, point: &ParameterPoint) -> SweepResult<PointReport> {
        if self.options.skip_complete_points
            && self.registry.iter().all(|c| self.cache.exists(point, c.codename))
        {
            info!(%point, "all configurations cached; point skipped");
            return Ok(PointReport {
                point: *point,
                computed: 0,
                skipped: self.registry.len(),
                generated: false,
            });
        }

        info!(%point, configurations = self.registry.len(), "point started");
        let ab = self.prepare(point, Condition::AB)?;
        let aa = self.prepare(point, Condition::AA)?;
        let context = PointContext { point: *point, ab, aa };

        let (mut computed, mut skipped) = (0, 0);
        let library = &mut self.library;
        for config in &self.registry {
            let outcome = self.cache.compute_if_absent(point, config.codename, |condition| {
                evaluate(config, &context, condition, &mut *library)
            })?;
            match outcome {
                CacheOutcome::Computed => computed += 1,
                CacheOutcome::Skipped => skipped += 1,
            }
        }

        info!(%point, computed, skipped, "point finished");
        Ok(PointReport { point: *point, computed, skipped, generated: true })
    }

    /// Evaluate `points` in order, stopping at the first failure.
    pub fn run_points<'a, I>(&mut self, points: I) -> SweepResult<SweepReport>
    where
        I: IntoIterator<Item = &'a ParameterPoint>,
    {
        let mut report = SweepReport::default();
        for point in points {
            report.points.push(self.run_point(point)?);
        }
        info!(
            points = report.points.len(),
            computed = report.computed(),
            skipped = report.skipped(),
            "sweep finished"
        );
        Ok(report)
    }

    fn prepare(
        &mut self, point: &ParameterPoint, condition: Condition,
    ) -> SweepResult<ConditionData> {
        let seed = self.options.seed_policy.seed_for(point, condition);
        let samples = self
            .generator
            .generate(&point.for_condition(condition), seed)
            .map_err(|source| SweepError::Simulation { condition, source })?;
        debug!(%condition, ?seed, "samples generated");
        ConditionData::prepare(condition, samples, &mut self.library)
    }
}

/// Run one configuration on one condition and check the result length.
///
/// The library is reseeded from (point, condition, codename) first, so a
/// seeded entry comes out the same whether or not its neighbours were
/// cached.
fn evaluate(
    config: &EstimatorConfig, context: &PointContext, condition: Condition,
    library: &mut dyn EstimatorLibrary,
) -> SweepResult<Array1<f64>> {
    library.reseed(estimator_stream(&context.point, condition, config.codename));
    let values = (config.compute)(context.condition(condition), library).map_err(|source| {
        SweepError::Estimator { codename: config.codename, condition, source }
    })?;
    let expected = context.point.nn;
    if values.len() != expected {
        return Err(SweepError::ResultLength {
            codename: config.codename,
            condition,
            expected,
            found: values.len(),
        });
    }
    debug!(codename = config.codename, %condition, "configuration evaluated");
    Ok(values)
}
