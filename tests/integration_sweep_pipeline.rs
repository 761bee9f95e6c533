//! Integration tests for the cached estimator sweep.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: from a parameter point, through data
//!   generation and the estimator registry, to the on-disk result layout.
//! - Exercise resumability the way a long sweep relies on it: reruns,
//!   partial caches and a configuration that keeps failing.
//!
//! Coverage
//! --------
//! - `cache::ResultCache`: directory layout, artifact format, write-once
//!   semantics.
//! - `sweep::SweepOrchestrator`: skip counters, AA derivation, failure
//!   isolation between configurations, seeded results independent of the
//!   cache state.
//! - A/A rejection rates of every standard configuration at a small point.
//!
//! Exclusions
//! ----------
//! - Numerical properties of individual estimators; those are covered by
//!   unit tests in `estimators`.
//! - Python bindings.
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use ndarray::{Array1, array};
use rust_stattests::{
    cache::{AA_ARTIFACT, AB_ARTIFACT, CacheOutcome, ResultCache, entry_relative_path},
    estimators::{
        EstimatorError, EstimatorLibrary, EstimatorOptions, EstimatorResult, StandardEstimators,
    },
    simulation::{ClickGenerator, DataGenerator, ParameterPoint, SampleMatrices, SimulationResult},
    sweep::{
        ConditionData, EstimatorConfig, SeedPolicy, SweepError, SweepOptions, SweepOrchestrator,
        standard_registry,
    },
};
use tempfile::TempDir;

/// Purpose
/// -------
/// The reference point used across these tests: 10 repetitions of 5 users.
fn small_point() -> ParameterPoint {
    ParameterPoint::new(10, 5, 0.2, 0.02, 1000.0, 1.0)
}

/// Standard configurations whose codenames appear in `names`, in standard
/// order.
fn configs(names: &[&str]) -> Vec<EstimatorConfig> {
    standard_registry().into_iter().filter(|c| names.contains(&c.codename)).collect()
}

fn always_fails(_: &ConditionData, _: &mut dyn EstimatorLibrary) -> EstimatorResult<Array1<f64>> {
    Err(EstimatorError::InsufficientData { name: "always_fails", found: 0, required: 1 })
}

fn sweep_over<G: DataGenerator>(
    root: &Path, generator: G, registry: Vec<EstimatorConfig>,
) -> SweepOrchestrator<G, StandardEstimators> {
    let options = EstimatorOptions::new(100, 4, 100, 50.0, Some(17)).unwrap();
    SweepOrchestrator::new(
        ResultCache::new(root),
        generator,
        StandardEstimators::new(options),
        registry,
        SweepOptions::new(SeedPolicy::Independent(2024), true),
    )
}

/// Bytes and modification time of both artifacts of an entry.
fn snapshot(
    cache: &ResultCache, point: &ParameterPoint, codename: &str,
) -> Vec<(Vec<u8>, SystemTime)> {
    let dir = cache.entry_dir(point, codename).unwrap();
    [AB_ARTIFACT, AA_ARTIFACT]
        .iter()
        .map(|name| {
            let path = dir.join(name);
            (fs::read(&path).unwrap(), fs::metadata(&path).unwrap().modified().unwrap())
        })
        .collect()
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

/// Records the points it was asked to generate.
struct PointLog {
    inner: ClickGenerator,
    points: Vec<ParameterPoint>,
}

impl DataGenerator for PointLog {
    fn generate(
        &mut self, point: &ParameterPoint, seed: Option<u64>,
    ) -> SimulationResult<SampleMatrices> {
        self.points.push(*point);
        self.inner.generate(point, seed)
    }
}

#[test]
// Purpose
// -------
// A fresh sweep of one configuration produces exactly one entry with the
// documented layout.
//
// Given
// -----
// - An empty root, the point (NN=10, N=5, uplift=0.2, success_rate=0.02,
//   beta=1000, skew=1) and only `ttest_successes_count`.
//
// Expect
// ------
// - The entry directory is
//   `NN=10/N=5/uplift=0.2/success_rate=0.02/beta=1000/skew=1/ttest_successes_count`.
// - It holds exactly `ab_data` and `aa_data`, each a single line of 10
//   comma-separated numbers.
fn fresh_sweep_writes_expected_layout() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let point = small_point();
    let registry = configs(&["ttest_successes_count"]);
    let mut sweep = sweep_over(dir.path(), ClickGenerator::new(), registry);

    // Act
    let report = sweep.run_point(&point).unwrap();

    // Assert
    assert_eq!((report.computed, report.skipped), (1, 0));
    let parent: PathBuf =
        dir.path().join("NN=10/N=5/uplift=0.2/success_rate=0.02/beta=1000/skew=1");
    assert_eq!(file_names(&parent), BTreeSet::from(["ttest_successes_count".to_string()]));

    let entry = parent.join("ttest_successes_count");
    assert_eq!(
        file_names(&entry),
        BTreeSet::from([AB_ARTIFACT.to_string(), AA_ARTIFACT.to_string()])
    );
    for name in [AB_ARTIFACT, AA_ARTIFACT] {
        let text = fs::read_to_string(entry.join(name)).unwrap();
        assert!(!text.contains('\n'));
        assert_eq!(text.split(',').count(), 10);
    }
}

#[test]
// Purpose
// -------
// Rerunning a completed sweep is a no-op on disk.
//
// Given
// -----
// - A root populated by one run of two configurations.
//
// Expect
// ------
// - A second orchestrator over the same root skips both configurations,
//   generates nothing, and leaves bytes and modification times untouched.
fn rerun_leaves_cache_untouched() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let point = small_point();
    let names = ["t_test_ctrs", "mw_ctrs"];
    sweep_over(dir.path(), ClickGenerator::new(), configs(&names)).run_point(&point).unwrap();
    let cache = ResultCache::new(dir.path());
    let before: Vec<_> = names.iter().map(|name| snapshot(&cache, &point, name)).collect();

    // Act
    let log = PointLog { inner: ClickGenerator::new(), points: Vec::new() };
    let mut rerun = sweep_over(dir.path(), log, configs(&names));
    let report = rerun.run_point(&point).unwrap();

    // Assert
    assert_eq!((report.computed, report.skipped, report.generated), (0, 2, false));
    assert!(rerun.generator().points.is_empty());
    let after: Vec<_> = names.iter().map(|name| snapshot(&cache, &point, name)).collect();
    assert_eq!(before, after);
}

#[test]
// Purpose
// -------
// Skip counters follow the cache state across the full standard registry.
//
// Given
// -----
// - A point small enough to run all 21 configurations quickly.
// - After the first run, one entry is deleted by hand.
//
// Expect
// ------
// - Runs report (21, 0), then (1, 20) with generation, then (0, 21)
//   without generation.
fn skip_counters_track_cache_state() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let point = ParameterPoint::new(4, 20, 0.2, 0.05, 100.0, 1.0);
    let mut sweep = sweep_over(dir.path(), ClickGenerator::new(), standard_registry());

    // Act
    let first = sweep.run_point(&point).unwrap();
    fs::remove_dir_all(sweep.cache().entry_dir(&point, "mw_smoothed").unwrap()).unwrap();
    let second = sweep.run_point(&point).unwrap();
    let third = sweep.run_point(&point).unwrap();

    // Assert
    assert_eq!((first.computed, first.skipped), (21, 0));
    assert_eq!((second.computed, second.skipped, second.generated), (1, 20, true));
    assert_eq!((third.computed, third.skipped, third.generated), (0, 21, false));
}

#[test]
// Purpose
// -------
// Values survive a write/read cycle exactly, including ones whose shortest
// decimal form is long.
//
// Given
// -----
// - AB result [0.1, 0.2, 0.30000000000000004], AA result [1.0, 0.5, 0.0].
//
// Expect
// ------
// - `ab_data` reads back bit-identical and its text is the shortest
//   round-trip representation.
fn artifacts_round_trip_exactly() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let cache = ResultCache::new(dir.path());
    let point = ParameterPoint::new(3, 5, 0.2, 0.02, 1000.0, 1.0);
    let ab = array![0.1, 0.2, 0.1 + 0.2];
    let aa = array![1.0, 0.5, 0.0];

    // Act
    let outcome = cache.write(&point, "delta", &ab, &aa).unwrap();
    let entry = cache.read(&point, "delta").unwrap();

    // Assert
    assert_eq!(outcome, CacheOutcome::Computed);
    assert_eq!(entry.ab_result, ab);
    assert_eq!(entry.aa_result, aa);
    let text = fs::read_to_string(cache.entry_dir(&point, "delta").unwrap().join(AB_ARTIFACT));
    assert_eq!(text.unwrap(), "0.1,0.2,0.30000000000000004");
}

#[test]
// Purpose
// -------
// The cache key is a pure function of the six fields and the codename.
//
// Given
// -----
// - Two equal points built separately, and variants differing in one field.
//
// Expect
// ------
// - Equal points map to the same path; any field change maps elsewhere.
fn cache_key_is_deterministic() {
    let a = small_point();
    let b = ParameterPoint::new(10, 5, 0.2, 0.02, 1000.0, 1.0);
    let key = |point: &ParameterPoint, codename: &str| entry_relative_path(point, codename).unwrap();
    assert_eq!(key(&a, "delta"), key(&b, "delta"));

    let changed = [
        ParameterPoint { nn: 11, ..a },
        ParameterPoint { uplift: 0.0, ..a },
        ParameterPoint { skew: 1.5, ..a },
    ];
    for point in changed {
        assert_ne!(key(&point, "delta"), key(&a, "delta"));
    }
    assert_ne!(key(&a, "delta"), key(&a, "bootstrap"));
}

#[test]
// Purpose
// -------
// The A/A experiment differs from the A/B one only in its uplift.
//
// Given
// -----
// - A point with uplift 0.2 and one configuration.
//
// Expect
// ------
// - The generator sees the point itself, then a copy with uplift exactly 0.
// - The entry is still keyed by the AB point.
fn aa_condition_uses_zero_uplift() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let point = small_point();
    let log = PointLog { inner: ClickGenerator::new(), points: Vec::new() };
    let mut sweep = sweep_over(dir.path(), log, configs(&["delta"]));

    // Act
    sweep.run_point(&point).unwrap();

    // Assert
    let seen = &sweep.generator().points;
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], point);
    assert_eq!(seen[1].uplift, 0.0);
    assert_eq!(seen[1], ParameterPoint { uplift: 0.0, ..point });
    let cache = ResultCache::new(dir.path());
    assert!(cache.exists(&point, "delta"));
    assert!(!cache.exists(&ParameterPoint { uplift: 0.0, ..point }, "delta"));
}

#[test]
// Purpose
// -------
// A configuration that keeps failing never disturbs the ones before it.
//
// Given
// -----
// - Five working configurations followed by one that always errors.
//
// Expect
// ------
// - The first run fails on the sixth configuration with the five entries
//   complete and no entry for the failing one.
// - The rerun fails the same way and leaves the five entries byte- and
//   mtime-identical.
fn resume_after_failure_keeps_completed_entries() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let point = small_point();
    let working = ["ttest_successes_count", "delta", "t_test_ctrs", "mw_ctrs", "binomial_test"];
    let registry = || {
        let mut registry = configs(&working);
        registry.push(EstimatorConfig::new("always_fails", always_fails));
        registry
    };

    // Act
    let first = sweep_over(dir.path(), ClickGenerator::new(), registry()).run_point(&point);
    let cache = ResultCache::new(dir.path());
    let before: Vec<_> = working.iter().map(|name| snapshot(&cache, &point, name)).collect();
    let second = sweep_over(dir.path(), ClickGenerator::new(), registry()).run_point(&point);

    // Assert
    for result in [&first, &second] {
        assert!(matches!(
            result,
            Err(SweepError::Estimator { codename: "always_fails", .. })
        ));
    }
    assert!(working.iter().all(|name| cache.exists(&point, name)));
    assert!(!cache.exists(&point, "always_fails"));
    assert!(!cache.entry_dir(&point, "always_fails").unwrap().exists());
    let after: Vec<_> = working.iter().map(|name| snapshot(&cache, &point, name)).collect();
    assert_eq!(before, after);
}

#[test]
// Purpose
// -------
// With fixed seeds, an entry's bytes do not depend on which entries were
// cached when it was computed.
//
// Given
// -----
// - Root A: a run of `bootstrap` alone, then a run of `bootstrap`,
//   `weighted_bootstrap` and `permutation_test` that resumes from it.
// - Root B: one fresh run of the same three configurations.
// - Identical estimator and generator seeds everywhere.
//
// Expect
// ------
// - Both artifacts of all three entries are byte-identical across roots.
fn seeded_results_do_not_depend_on_cache_state() {
    // Arrange
    let resumed = TempDir::new().unwrap();
    let fresh = TempDir::new().unwrap();
    let point = small_point();
    let randomized = ["bootstrap", "weighted_bootstrap", "permutation_test"];

    // Act
    sweep_over(resumed.path(), ClickGenerator::new(), configs(&["bootstrap"]))
        .run_point(&point)
        .unwrap();
    let report = sweep_over(resumed.path(), ClickGenerator::new(), configs(&randomized))
        .run_point(&point)
        .unwrap();
    sweep_over(fresh.path(), ClickGenerator::new(), configs(&randomized))
        .run_point(&point)
        .unwrap();

    // Assert
    assert_eq!((report.computed, report.skipped), (2, 1));
    let resumed_cache = ResultCache::new(resumed.path());
    let fresh_cache = ResultCache::new(fresh.path());
    for codename in randomized {
        let artifacts = |cache: &ResultCache| -> Vec<Vec<u8>> {
            snapshot(cache, &point, codename).into_iter().map(|(bytes, _)| bytes).collect()
        };
        assert_eq!(artifacts(&resumed_cache), artifacts(&fresh_cache), "{codename}");
    }
}

#[test]
// Purpose
// -------
// Under the null every configuration rejects at roughly its nominal level,
// including on sparse rows where ties and zero-click repetitions dominate.
//
// Given
// -----
// - The point (NN=400, N=5, uplift=0.2, success_rate=0.02, beta=1000,
//   skew=1) run through the full standard registry, α = 0.05.
//
// Expect
// ------
// - Every configuration's A/A rejection rate is at most 0.2 wherever at
//   least 40 repetitions give a defined p-value.
fn aa_rejection_rate_stays_near_alpha() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let point = ParameterPoint::new(400, 5, 0.2, 0.02, 1000.0, 1.0);

    // Act
    sweep_over(dir.path(), ClickGenerator::new(), standard_registry()).run_point(&point).unwrap();

    // Assert
    let cache = ResultCache::new(dir.path());
    for config in standard_registry() {
        let summary = cache.summarize(&point, config.codename, 0.05).unwrap();
        if summary.aa_valid < 40 {
            continue;
        }
        assert!(
            summary.false_positive_rate <= 0.2,
            "{}: A/A rejection rate {} over {} repetitions",
            config.codename,
            summary.false_positive_rate,
            summary.aa_valid
        );
    }
}
