//! sweep::registry — named estimator configurations.
//!
//! Purpose
//! -------
//! Bind each codename (the last segment of a cache key) to the computation
//! that produces its per-repetition results from one condition's data.
//! Configurations are plain function pointers over [`ConditionData`], so
//! they read intermediates by reference and never recompute them.
//!
//! Key behaviors
//! -------------
//! - [`standard_registry`] lists the 21 configurations of the reference
//!   sweep in their fixed evaluation order.
//! - Variants of one test family (plain, per-user CTR, correlation-weighted,
//!   √views-weighted, smoothed) differ only in which intermediates they pass.
//!
//! Conventions
//! -----------
//! - Configuration functions are named after their codename.
//! - "weighted_*" uses the correlation-aware weights, "weighted_sqr_*" the
//!   square roots of the views.
use ndarray::{Array1, Array2};

use crate::{
    estimators::{EstimatorLibrary, EstimatorResult, transforms},
    simulation::Paired,
    sweep::context::ConditionData,
};

/// Computation of one configuration on one condition.
pub type ComputeFn = fn(&ConditionData, &mut dyn EstimatorLibrary) -> EstimatorResult<Array1<f64>>;

/// EstimatorConfig — a codename and the computation stored under it.
#[derive(Clone, Copy)]
pub struct EstimatorConfig {
    pub codename: &'static str,
    pub compute: ComputeFn,
}

impl std::fmt::Debug for EstimatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EstimatorConfig").field("codename", &self.codename).finish_non_exhaustive()
    }
}

impl EstimatorConfig {
    pub const fn new(codename: &'static str, compute: ComputeFn) -> EstimatorConfig {
        EstimatorConfig { codename, compute }
    }
}

/// Codenames of [`standard_registry`], in evaluation order.
pub const STANDARD_CODENAMES: [&str; 21] = [
    "ttest_successes_count",
    "mannwhitney_successes_count",
    "delta",
    "bootstrap",
    "linearization",
    "buckets",
    "buckets_ctrs",
    "t_test_ctrs",
    "mw_ctrs",
    "weighted_bootstrap",
    "weighted_linearization",
    "weighted_t_test_ctrs",
    "weighted_buckets",
    "weighted_sqr_bootstrap",
    "weighted_sqr_linearization",
    "weighted_sqr_t_test_ctrs",
    "weighted_sqr_buckets",
    "ttest_smoothed",
    "mw_smoothed",
    "binomial_test",
    "permutation_test",
];

/// The reference configurations in evaluation order.
pub fn standard_registry() -> Vec<EstimatorConfig> {
    vec![
        EstimatorConfig::new("ttest_successes_count", ttest_successes_count),
        EstimatorConfig::new("mannwhitney_successes_count", mannwhitney_successes_count),
        EstimatorConfig::new("delta", delta),
        EstimatorConfig::new("bootstrap", bootstrap),
        EstimatorConfig::new("linearization", linearization),
        EstimatorConfig::new("buckets", buckets),
        EstimatorConfig::new("buckets_ctrs", buckets_ctrs),
        EstimatorConfig::new("t_test_ctrs", t_test_ctrs),
        EstimatorConfig::new("mw_ctrs", mw_ctrs),
        EstimatorConfig::new("weighted_bootstrap", weighted_bootstrap),
        EstimatorConfig::new("weighted_linearization", weighted_linearization),
        EstimatorConfig::new("weighted_t_test_ctrs", weighted_t_test_ctrs),
        EstimatorConfig::new("weighted_buckets", weighted_buckets),
        EstimatorConfig::new("weighted_sqr_bootstrap", weighted_sqr_bootstrap),
        EstimatorConfig::new("weighted_sqr_linearization", weighted_sqr_linearization),
        EstimatorConfig::new("weighted_sqr_t_test_ctrs", weighted_sqr_t_test_ctrs),
        EstimatorConfig::new("weighted_sqr_buckets", weighted_sqr_buckets),
        EstimatorConfig::new("ttest_smoothed", ttest_smoothed),
        EstimatorConfig::new("mw_smoothed", mw_smoothed),
        EstimatorConfig::new("binomial_test", binomial_test),
        EstimatorConfig::new("permutation_test", permutation_test),
    ]
}

// ---- Raw counts -----------------------------------------------------------

fn ttest_successes_count(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let s = &data.samples;
    lib.t_test(s.control.clicks.view(), s.treatment.clicks.view())
}

fn mannwhitney_successes_count(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let s = &data.samples;
    lib.mannwhitney(s.control.clicks.view(), s.treatment.clicks.view())
}

fn delta(data: &ConditionData, lib: &mut dyn EstimatorLibrary) -> EstimatorResult<Array1<f64>> {
    let s = &data.samples;
    lib.delta_method(
        s.control.clicks.view(),
        s.control.views.view(),
        s.treatment.clicks.view(),
        s.treatment.views.view(),
    )
}

fn binomial_test(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let im = &data.intermediates;
    lib.binomial_test(
        im.global_ctrs.control.view(),
        im.total_views.control.view(),
        im.global_ctrs.treatment.view(),
        im.total_views.treatment.view(),
    )
}

fn permutation_test(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let s = &data.samples;
    lib.permutation_test(
        s.control.clicks.view(),
        s.control.views.view(),
        s.treatment.clicks.view(),
        s.treatment.views.view(),
    )
}

// ---- Per-user CTRs --------------------------------------------------------

fn bootstrap(data: &ConditionData, lib: &mut dyn EstimatorLibrary) -> EstimatorResult<Array1<f64>> {
    let views = Paired::new(&data.samples.control.views, &data.samples.treatment.views);
    weighted_bootstrap_with(data, lib, views)
}

fn linearization(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let lin = &data.intermediates.linearized;
    lib.t_test(lin.control.view(), lin.treatment.view())
}

fn buckets(data: &ConditionData, lib: &mut dyn EstimatorLibrary) -> EstimatorResult<Array1<f64>> {
    let ones = &data.intermediates.unit_weights;
    buckets_with(data, lib, Paired::new(&ones.control, &ones.treatment))
}

/// Each variant's CTRs are weighted by that variant's own views, in the AA
/// condition as well.
fn buckets_ctrs(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let views = Paired::new(&data.samples.control.views, &data.samples.treatment.views);
    buckets_with(data, lib, views)
}

fn t_test_ctrs(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let ctrs = &data.intermediates.ctrs;
    lib.t_test(ctrs.control.view(), ctrs.treatment.view())
}

fn mw_ctrs(data: &ConditionData, lib: &mut dyn EstimatorLibrary) -> EstimatorResult<Array1<f64>> {
    let ctrs = &data.intermediates.ctrs;
    lib.mannwhitney(ctrs.control.view(), ctrs.treatment.view())
}

// ---- Correlation-aware weights --------------------------------------------

fn weighted_bootstrap(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let w = &data.intermediates.corr_weights;
    weighted_bootstrap_with(data, lib, Paired::new(&w.control, &w.treatment))
}

fn weighted_linearization(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let w = &data.intermediates.corr_weights;
    weighted_linearization_with(data, lib, Paired::new(&w.control, &w.treatment))
}

fn weighted_t_test_ctrs(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let w = &data.intermediates.corr_weights;
    weighted_t_test_with(data, lib, Paired::new(&w.control, &w.treatment))
}

fn weighted_buckets(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let w = &data.intermediates.corr_weights;
    buckets_with(data, lib, Paired::new(&w.control, &w.treatment))
}

// ---- √views weights -------------------------------------------------------

fn weighted_sqr_bootstrap(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let w = &data.intermediates.sqrt_views;
    weighted_bootstrap_with(data, lib, Paired::new(&w.control, &w.treatment))
}

fn weighted_sqr_linearization(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let w = &data.intermediates.sqrt_views;
    weighted_linearization_with(data, lib, Paired::new(&w.control, &w.treatment))
}

fn weighted_sqr_t_test_ctrs(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let w = &data.intermediates.sqrt_views;
    weighted_t_test_with(data, lib, Paired::new(&w.control, &w.treatment))
}

fn weighted_sqr_buckets(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let w = &data.intermediates.sqrt_views;
    buckets_with(data, lib, Paired::new(&w.control, &w.treatment))
}

// ---- Smoothed CTRs --------------------------------------------------------

fn ttest_smoothed(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let s = &data.intermediates.smoothed_ctrs;
    lib.t_test(s.control.view(), s.treatment.view())
}

fn mw_smoothed(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Array1<f64>> {
    let s = &data.intermediates.smoothed_ctrs;
    lib.mannwhitney(s.control.view(), s.treatment.view())
}

//
// ---------- Shared bodies of the weighted families ----------
//

fn weighted_bootstrap_with(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary, weights: Paired<&Array2<f64>>,
) -> EstimatorResult<Array1<f64>> {
    let ctrs = &data.intermediates.ctrs;
    lib.bootstrap(
        ctrs.control.view(),
        weights.control.view(),
        ctrs.treatment.view(),
        weights.treatment.view(),
    )
}

fn buckets_with(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary, weights: Paired<&Array2<f64>>,
) -> EstimatorResult<Array1<f64>> {
    let ctrs = &data.intermediates.ctrs;
    lib.bucketization(
        ctrs.control.view(),
        weights.control.view(),
        ctrs.treatment.view(),
        weights.treatment.view(),
    )
}

/// t-test of the linearized clicks scaled by `weights`.
fn weighted_linearization_with(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary, weights: Paired<&Array2<f64>>,
) -> EstimatorResult<Array1<f64>> {
    let lin = &data.intermediates.linearized;
    weighted_t_test(lib, Paired::new(&lin.control, &lin.treatment), weights)
}

fn weighted_t_test_with(
    data: &ConditionData, lib: &mut dyn EstimatorLibrary, weights: Paired<&Array2<f64>>,
) -> EstimatorResult<Array1<f64>> {
    let ctrs = &data.intermediates.ctrs;
    weighted_t_test(lib, Paired::new(&ctrs.control, &ctrs.treatment), weights)
}

fn weighted_t_test(
    lib: &mut dyn EstimatorLibrary, values: Paired<&Array2<f64>>, weights: Paired<&Array2<f64>>,
) -> EstimatorResult<Array1<f64>> {
    let values_0 = transforms::weighted_values(values.control.view(), weights.control.view())?;
    let values_1 = transforms::weighted_values(values.treatment.view(), weights.treatment.view())?;
    lib.t_test(values_0.view(), values_1.view())
}
