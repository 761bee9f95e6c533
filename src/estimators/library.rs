//! estimators::library — the estimator interface consumed by the sweep.
//!
//! Purpose
//! -------
//! Define [`EstimatorLibrary`], the seam between the sweep orchestrator and
//! the numeric tests, together with [`EstimatorOptions`] and the reference
//! implementation [`StandardEstimators`].
//!
//! Key behaviors
//! -------------
//! - Every method maps per-variant sample arrays (or array + weight pairs)
//!   to one value per repetition, or to a pair of derived matrices for the
//!   transforms.
//! - Methods take `&mut self` so implementations may own an RNG and advance
//!   it across calls; deterministic tests ignore the receiver's state.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are repetition-major `NN × N` matrices; outputs have length `NN`.
//! - [`StandardEstimators`] seeded with `Some(seed)` replays the same
//!   sequence of randomized results for the same sequence of calls.
//! - [`EstimatorLibrary::reseed`] restarts the random stream from an
//!   identifier of the computation, so a seeded result depends only on that
//!   identifier and not on the calls made before it.
//!
//! Conventions
//! -----------
//! - Transforms return `(control, treatment)` tuples.
//! - Tuning constants live in [`EstimatorOptions`] rather than in method
//!   signatures so every configuration of one sweep shares them.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::{SeedableRng, rngs::StdRng};

use crate::estimators::{
    bucketization,
    errors::{EstimatorError, EstimatorResult},
    parametric, rank, resampling, transforms,
};

/// Pair of derived matrices `(control, treatment)`.
pub type TransformPair = (Array2<f64>, Array2<f64>);

/// Tuning constants shared by the randomized and bucketed estimators.
///
/// Fields
/// ------
/// - `n_bootstrap`: `usize`
///   Bootstrap replicates per call (≥ 1).
/// - `n_buckets`: `usize`
///   Requested buckets per variant (≥ 2).
/// - `n_permutations`: `usize`
///   Permutations per call (≥ 1).
/// - `smoothing_factor`: `f64`
///   Prior strength, in pseudo-views, of the smoothed CTRs (finite, ≥ 0).
/// - `seed`: `Option<u64>`
///   RNG seed of the randomized tests; `None` draws from OS entropy.
///
/// Default
/// -------
/// `n_bootstrap = 2000`, `n_buckets = 200`, `n_permutations = 2000`,
/// `smoothing_factor = 200.0`, `seed = None`.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorOptions {
    pub n_bootstrap: usize,
    pub n_buckets: usize,
    pub n_permutations: usize,
    pub smoothing_factor: f64,
    pub seed: Option<u64>,
}

impl EstimatorOptions {
    /// Validate and build estimator options.
    ///
    /// Errors
    /// ------
    /// - `EstimatorError::InvalidOption` naming the first out-of-range field.
    pub fn new(
        n_bootstrap: usize, n_buckets: usize, n_permutations: usize, smoothing_factor: f64,
        seed: Option<u64>,
    ) -> EstimatorResult<Self> {
        if n_bootstrap == 0 {
            return Err(EstimatorError::InvalidOption {
                name: "n_bootstrap",
                value: 0.0,
                reason: "Must be at least 1.",
            });
        }
        if n_buckets < 2 {
            return Err(EstimatorError::InvalidOption {
                name: "n_buckets",
                value: n_buckets as f64,
                reason: "Must be at least 2.",
            });
        }
        if n_permutations == 0 {
            return Err(EstimatorError::InvalidOption {
                name: "n_permutations",
                value: 0.0,
                reason: "Must be at least 1.",
            });
        }
        if !smoothing_factor.is_finite() || smoothing_factor < 0.0 {
            return Err(EstimatorError::InvalidOption {
                name: "smoothing_factor",
                value: smoothing_factor,
                reason: "Must be finite and non-negative.",
            });
        }
        Ok(Self { n_bootstrap, n_buckets, n_permutations, smoothing_factor, seed })
    }
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            n_bootstrap: 2000,
            n_buckets: 200,
            n_permutations: 2000,
            smoothing_factor: 200.0,
            seed: None,
        }
    }
}

/// Numeric tests and transforms used by the sweep.
///
/// Implementors provide one method per test family; the sweep's registry
/// decides which inputs (raw counts, CTRs, weights, linearized clicks) each
/// configuration feeds in.
///
/// Required:
/// - Tests return `EstimatorResult<Array1<f64>>` of length `NN`.
/// - Transforms return `(control, treatment)` matrices shaped like their
///   inputs.
pub trait EstimatorLibrary {
    /// Two-sample t-test on per-user values.
    fn t_test(&mut self, a: ArrayView2<f64>, b: ArrayView2<f64>) -> EstimatorResult<Array1<f64>>;

    /// Mann-Whitney U test on per-user values.
    fn mannwhitney(
        &mut self, a: ArrayView2<f64>, b: ArrayView2<f64>,
    ) -> EstimatorResult<Array1<f64>>;

    /// Delta-method test on the ratio of summed clicks to summed views.
    fn delta_method(
        &mut self, clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>, clicks_1: ArrayView2<f64>,
        views_1: ArrayView2<f64>,
    ) -> EstimatorResult<Array1<f64>>;

    /// Bootstrap of the weighted mean difference.
    fn bootstrap(
        &mut self, values_0: ArrayView2<f64>, weights_0: ArrayView2<f64>,
        values_1: ArrayView2<f64>, weights_1: ArrayView2<f64>,
    ) -> EstimatorResult<Array1<f64>>;

    /// Bucketed weighted means compared with a t-test.
    fn bucketization(
        &mut self, values_0: ArrayView2<f64>, weights_0: ArrayView2<f64>,
        values_1: ArrayView2<f64>, weights_1: ArrayView2<f64>,
    ) -> EstimatorResult<Array1<f64>>;

    /// Two-proportion test on aggregate CTRs.
    fn binomial_test(
        &mut self, global_ctr_0: ArrayView1<f64>, total_views_0: ArrayView1<f64>,
        global_ctr_1: ArrayView1<f64>, total_views_1: ArrayView1<f64>,
    ) -> EstimatorResult<Array1<f64>>;

    /// Permutation test of the aggregate CTR difference.
    fn permutation_test(
        &mut self, clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>,
        clicks_1: ArrayView2<f64>, views_1: ArrayView2<f64>,
    ) -> EstimatorResult<Array1<f64>>;

    /// Linearized clicks for both variants.
    fn linearization(
        &mut self, clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>,
        clicks_1: ArrayView2<f64>, views_1: ArrayView2<f64>,
    ) -> EstimatorResult<TransformPair>;

    /// Intra-user correlation-aware weights for both variants.
    fn correlation_aware_weights(
        &mut self, clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>, views_1: ArrayView2<f64>,
    ) -> EstimatorResult<TransformPair>;

    /// Smoothed CTRs for both variants.
    fn smoothed_ctrs(
        &mut self, clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>,
        clicks_1: ArrayView2<f64>, views_1: ArrayView2<f64>,
    ) -> EstimatorResult<TransformPair>;

    /// Restart the randomized tests from the stream `stream`.
    ///
    /// Called by the sweep before every configuration evaluation with a
    /// hash of (point, condition, codename). Libraries without randomness,
    /// or without a fixed seed, may ignore it.
    fn reseed(&mut self, _stream: u64) {}
}

/// Reference [`EstimatorLibrary`] backed by the functions of this subtree.
///
/// Owns the options and the RNG of the randomized tests (bootstrap and
/// permutation). One instance is meant to serve a whole sweep.
#[derive(Debug, Clone)]
pub struct StandardEstimators {
    options: EstimatorOptions,
    rng: StdRng,
}

impl StandardEstimators {
    pub fn new(options: EstimatorOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { options, rng }
    }

    pub fn options(&self) -> &EstimatorOptions {
        &self.options
    }
}

impl Default for StandardEstimators {
    fn default() -> Self {
        Self::new(EstimatorOptions::default())
    }
}

impl EstimatorLibrary for StandardEstimators {
    fn t_test(&mut self, a: ArrayView2<f64>, b: ArrayView2<f64>) -> EstimatorResult<Array1<f64>> {
        parametric::t_test(a, b)
    }

    fn mannwhitney(
        &mut self, a: ArrayView2<f64>, b: ArrayView2<f64>,
    ) -> EstimatorResult<Array1<f64>> {
        rank::mannwhitney(a, b)
    }

    fn delta_method(
        &mut self, clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>, clicks_1: ArrayView2<f64>,
        views_1: ArrayView2<f64>,
    ) -> EstimatorResult<Array1<f64>> {
        parametric::delta_method_ctrs(clicks_0, views_0, clicks_1, views_1)
    }

    fn bootstrap(
        &mut self, values_0: ArrayView2<f64>, weights_0: ArrayView2<f64>,
        values_1: ArrayView2<f64>, weights_1: ArrayView2<f64>,
    ) -> EstimatorResult<Array1<f64>> {
        resampling::bootstrap(
            values_0,
            weights_0,
            values_1,
            weights_1,
            self.options.n_bootstrap,
            &mut self.rng,
        )
    }

    fn bucketization(
        &mut self, values_0: ArrayView2<f64>, weights_0: ArrayView2<f64>,
        values_1: ArrayView2<f64>, weights_1: ArrayView2<f64>,
    ) -> EstimatorResult<Array1<f64>> {
        bucketization::bucketization(values_0, weights_0, values_1, weights_1, self.options.n_buckets)
    }

    fn binomial_test(
        &mut self, global_ctr_0: ArrayView1<f64>, total_views_0: ArrayView1<f64>,
        global_ctr_1: ArrayView1<f64>, total_views_1: ArrayView1<f64>,
    ) -> EstimatorResult<Array1<f64>> {
        parametric::binomial_test(global_ctr_0, total_views_0, global_ctr_1, total_views_1)
    }

    fn permutation_test(
        &mut self, clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>,
        clicks_1: ArrayView2<f64>, views_1: ArrayView2<f64>,
    ) -> EstimatorResult<Array1<f64>> {
        resampling::permutation_test(
            clicks_0,
            views_0,
            clicks_1,
            views_1,
            self.options.n_permutations,
            &mut self.rng,
        )
    }

    fn linearization(
        &mut self, clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>,
        clicks_1: ArrayView2<f64>, views_1: ArrayView2<f64>,
    ) -> EstimatorResult<TransformPair> {
        transforms::linearization_of_clicks(clicks_0, views_0, clicks_1, views_1)
    }

    fn correlation_aware_weights(
        &mut self, clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>, views_1: ArrayView2<f64>,
    ) -> EstimatorResult<TransformPair> {
        transforms::intra_user_correlation_aware_weights(clicks_0, views_0, views_1)
    }

    fn smoothed_ctrs(
        &mut self, clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>,
        clicks_1: ArrayView2<f64>, views_1: ArrayView2<f64>,
    ) -> EstimatorResult<TransformPair> {
        transforms::smoothed_ctrs(
            clicks_0,
            views_0,
            clicks_1,
            views_1,
            self.options.smoothing_factor,
        )
    }

    /// No-op for entropy-seeded options.
    fn reseed(&mut self, stream: u64) {
        if let Some(seed) = self.options.seed {
            self.rng = StdRng::seed_from_u64(seed ^ stream);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    // Purpose
    // -------
    // `EstimatorOptions::new` rejects each out-of-range field.
    //
    // Given
    // -----
    // - Zero bootstrap replicates, one bucket, zero permutations, NaN
    //   smoothing.
    //
    // Expect
    // ------
    // - `InvalidOption` naming the offending field each time; defaults pass.
    fn estimator_options_validate_each_field() {
        // Arrange / Act / Assert
        let named = |r: EstimatorResult<EstimatorOptions>| match r {
            Err(EstimatorError::InvalidOption { name, .. }) => name,
            other => panic!("expected InvalidOption, got {other:?}"),
        };
        assert_eq!(named(EstimatorOptions::new(0, 200, 10, 1.0, None)), "n_bootstrap");
        assert_eq!(named(EstimatorOptions::new(10, 1, 10, 1.0, None)), "n_buckets");
        assert_eq!(named(EstimatorOptions::new(10, 200, 0, 1.0, None)), "n_permutations");
        assert_eq!(named(EstimatorOptions::new(10, 200, 10, f64::NAN, None)), "smoothing_factor");

        let d = EstimatorOptions::default();
        assert_eq!(
            EstimatorOptions::new(d.n_bootstrap, d.n_buckets, d.n_permutations, d.smoothing_factor, d.seed),
            Ok(d)
        );
    }

    #[test]
    // Purpose
    // -------
    // Two libraries with the same seed replay the same randomized results.
    //
    // Given
    // -----
    // - Seed 11, small bootstrap and permutation counts, identical inputs.
    //
    // Expect
    // ------
    // - Identical bootstrap and permutation outputs across instances.
    fn seeded_library_is_reproducible() {
        // Arrange
        let options = EstimatorOptions::new(50, 4, 50, 10.0, Some(11)).unwrap();
        let views = Array2::from_shape_fn((2, 12), |(r, j)| 2.0 + ((r * 3 + j) % 5) as f64);
        let clicks = views.mapv(|v| (v / 2.0).floor());
        let ctrs = &clicks / &views;
        let mut first = StandardEstimators::new(options.clone());
        let mut second = StandardEstimators::new(options);

        // Act
        let run = |lib: &mut StandardEstimators| {
            let b = lib.bootstrap(ctrs.view(), views.view(), ctrs.view(), views.view()).unwrap();
            let p = lib
                .permutation_test(clicks.view(), views.view(), clicks.view(), views.view())
                .unwrap();
            (b, p)
        };

        // Assert
        assert_eq!(run(&mut first), run(&mut second));
    }

    #[test]
    // Purpose
    // -------
    // After a reseed, randomized results depend only on the stream and not
    // on how much of the RNG earlier calls consumed.
    //
    // Given
    // -----
    // - Two libraries with seed 11; the first runs an extra bootstrap
    //   before both are reseeded with stream 77.
    //
    // Expect
    // ------
    // - Identical permutation outputs after the reseed.
    fn reseed_detaches_results_from_call_history() {
        // Arrange
        let options = EstimatorOptions::new(50, 4, 50, 10.0, Some(11)).unwrap();
        let views = Array2::from_shape_fn((3, 12), |(r, j)| 2.0 + ((r * 3 + j) % 5) as f64);
        let clicks_0 = views.mapv(|v| (v / 3.0).floor());
        let clicks_1 = views.mapv(|v| (v / 2.0).floor());
        let ctrs = &clicks_0 / &views;
        let mut warmed = StandardEstimators::new(options.clone());
        let mut fresh = StandardEstimators::new(options);
        warmed.bootstrap(ctrs.view(), views.view(), ctrs.view(), views.view()).unwrap();

        // Act
        let run = |lib: &mut StandardEstimators, stream: u64| {
            lib.reseed(stream);
            lib.permutation_test(clicks_0.view(), views.view(), clicks_1.view(), views.view())
                .unwrap()
        };
        let from_warmed = run(&mut warmed, 77);
        let from_fresh = run(&mut fresh, 77);

        // Assert
        assert_eq!(from_warmed, from_fresh);
    }
}
