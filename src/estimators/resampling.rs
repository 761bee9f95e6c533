//! estimators::resampling — Poisson bootstrap and permutation test.
//!
//! Purpose
//! -------
//! Implement the two randomized tests of the sweep. Both consume an
//! explicit RNG so that callers decide between reproducible and
//! entropy-seeded runs.
//!
//! Key behaviors
//! -------------
//! - [`bootstrap`]: Poisson(1) weights per user and replicate, applied to the
//!   weighted mean of per-user CTRs in each variant; the p-value is twice the
//!   smaller tail share of replicate differences around zero.
//! - [`permutation_test`]: pooled users are shuffled into two groups of the
//!   original sizes; the observed aggregate-CTR difference is compared with
//!   the null distribution of relabeled differences.
//! - Both tails are counted inclusively (`≤` and `≥`), so a tie with the
//!   pivot supports the null hypothesis instead of rejecting it.
//!
//! Invariants & assumptions
//! ------------------------
//! - One set of bootstrap weights (per variant) and one sequence of
//!   permutations is drawn per call and shared by all repetitions, so cost
//!   is dominated by arithmetic, not sampling.
//! - p-values lie in `[0, 1]`. `NaN` resamples are left out of the tail
//!   shares; a repetition with no finite resample is `NaN`.
//!
//! Performance
//! -----------
//! - The bootstrap uses two matrix products per variant
//!   (`NN × N` · `N × B`); memory is `O(NN · B + B · N)`.
//! - The permutation test stores the `NN × P` null statistics and scans the
//!   pooled users once per permutation.
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::{Rng, seq::SliceRandom};
use rand_distr::{Distribution, Poisson};

use crate::estimators::{
    errors::{EstimatorError, EstimatorResult},
    validation::{validate_min_columns, validate_rows, validate_same_shape},
};

/// Poisson bootstrap of the weighted-CTR difference.
///
/// Parameters
/// ----------
/// - `ctrs_0`, `weights_0`: `ArrayView2<f64>`
///   Control per-user CTRs and their weights, identical `NN × n₀` shapes.
/// - `ctrs_1`, `weights_1`: `ArrayView2<f64>`
///   Treatment counterparts, identical `NN × n₁` shapes.
/// - `n_bootstrap`: `usize`
///   Number of bootstrap replicates `B ≥ 1`.
/// - `rng`: `&mut R`
///   Source of the Poisson(1) resampling weights.
///
/// Returns
/// -------
/// `EstimatorResult<Array1<f64>>`
///   For each repetition, `min(1, 2 · min(n≤, n≥) / B)` where `n≤` and `n≥`
///   count replicates whose treatment-minus-control weighted CTR `Δ` is
///   `≤ 0` and `≥ 0`. Replicates with a `NaN` Δ (a zero weight sum) are
///   dropped from `B`; the p-value is `NaN` when every Δ is `NaN`.
///
/// Errors
/// ------
/// - Shape and row mismatches between the four inputs.
/// - `EstimatorError::InvalidOption` when `n_bootstrap == 0`.
pub fn bootstrap<R: Rng + ?Sized>(
    ctrs_0: ArrayView2<f64>, weights_0: ArrayView2<f64>, ctrs_1: ArrayView2<f64>,
    weights_1: ArrayView2<f64>, n_bootstrap: usize, rng: &mut R,
) -> EstimatorResult<Array1<f64>> {
    validate_same_shape("weights_0", &ctrs_0, &weights_0)?;
    validate_same_shape("weights_1", &ctrs_1, &weights_1)?;
    validate_rows(&ctrs_0, &ctrs_1)?;
    validate_min_columns("ctrs_0", &ctrs_0, 1)?;
    validate_min_columns("ctrs_1", &ctrs_1, 1)?;
    if n_bootstrap == 0 {
        return Err(EstimatorError::InvalidOption {
            name: "n_bootstrap",
            value: 0.0,
            reason: "Must be at least 1.",
        });
    }

    let poisson = Poisson::new(1.0_f64)
        .map_err(|e| EstimatorError::Distribution { reason: e.to_string() })?;
    let draws_0 =
        Array2::from_shape_simple_fn((n_bootstrap, ctrs_0.ncols()), || poisson.sample(rng));
    let draws_1 =
        Array2::from_shape_simple_fn((n_bootstrap, ctrs_1.ncols()), || poisson.sample(rng));

    let means_0 = (&ctrs_0 * &weights_0).dot(&draws_0.t()) / weights_0.dot(&draws_0.t());
    let means_1 = (&ctrs_1 * &weights_1).dot(&draws_1.t()) / weights_1.dot(&draws_1.t());
    let deltas = means_1 - means_0;

    let p_values = deltas
        .axis_iter(Axis(0))
        .map(|row| two_sided_share(row.iter().copied(), 0.0))
        .collect();
    Ok(p_values)
}

/// Permutation test of the aggregate-CTR difference.
///
/// Parameters
/// ----------
/// - `clicks_0`, `views_0`: `ArrayView2<f64>`
///   Control clicks/views, identical `NN × n₀` shapes.
/// - `clicks_1`, `views_1`: `ArrayView2<f64>`
///   Treatment clicks/views, identical `NN × n₁` shapes.
/// - `n_permutations`: `usize`
///   Number of random relabelings `P ≥ 1`.
/// - `rng`: `&mut R`
///   Source of the shuffles.
///
/// Returns
/// -------
/// `EstimatorResult<Array1<f64>>`
///   For each repetition, `min(1, 2 · min(n≤, n≥) / P)` where `n≤` and `n≥`
///   count null statistics `≤` and `≥` the observed `Σc₁/Σv₁ − Σc₀/Σv₀`.
///   A `NaN` observed difference gives `NaN`.
///
/// Errors
/// ------
/// - Shape and row mismatches between the four inputs.
/// - `EstimatorError::InvalidOption` when `n_permutations == 0`.
pub fn permutation_test<R: Rng + ?Sized>(
    clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>, clicks_1: ArrayView2<f64>,
    views_1: ArrayView2<f64>, n_permutations: usize, rng: &mut R,
) -> EstimatorResult<Array1<f64>> {
    validate_same_shape("views_0", &clicks_0, &views_0)?;
    validate_same_shape("views_1", &clicks_1, &views_1)?;
    validate_rows(&clicks_0, &clicks_1)?;
    validate_min_columns("clicks_0", &clicks_0, 1)?;
    validate_min_columns("clicks_1", &clicks_1, 1)?;
    if n_permutations == 0 {
        return Err(EstimatorError::InvalidOption {
            name: "n_permutations",
            value: 0.0,
            reason: "Must be at least 1.",
        });
    }

    let n_0 = clicks_0.ncols();
    let pooled_clicks = ndarray::concatenate(Axis(1), &[clicks_0.view(), clicks_1.view()])
        .map_err(|e| EstimatorError::Distribution { reason: e.to_string() })?;
    let pooled_views = ndarray::concatenate(Axis(1), &[views_0.view(), views_1.view()])
        .map_err(|e| EstimatorError::Distribution { reason: e.to_string() })?;

    let mut order: Vec<usize> = (0..pooled_clicks.ncols()).collect();
    let mut null_stats = Array2::<f64>::zeros((clicks_0.nrows(), n_permutations));
    for k in 0..n_permutations {
        order.shuffle(rng);
        let (group_0, group_1) = order.split_at(n_0);
        for (r, (c, v)) in pooled_clicks.outer_iter().zip(pooled_views.outer_iter()).enumerate() {
            let ctr_0 = group_0.iter().map(|&j| c[j]).sum::<f64>()
                / group_0.iter().map(|&j| v[j]).sum::<f64>();
            let ctr_1 = group_1.iter().map(|&j| c[j]).sum::<f64>()
                / group_1.iter().map(|&j| v[j]).sum::<f64>();
            null_stats[[r, k]] = ctr_1 - ctr_0;
        }
    }

    let mut p_values = Array1::<f64>::zeros(clicks_0.nrows());
    for (r, p) in p_values.iter_mut().enumerate() {
        let observed = clicks_1.row(r).sum() / views_1.row(r).sum()
            - clicks_0.row(r).sum() / views_0.row(r).sum();
        *p = two_sided_share(null_stats.row(r).iter().copied(), observed);
    }
    Ok(p_values)
}

//
// ---------- Private helpers (compact docs) ----------
//

/// `min(1, 2 · min(n≤, n≥) / n)` over the non-`NaN` values, with both tails
/// counted inclusively around `pivot`. `NaN` when `pivot` is `NaN` or no
/// value is finite.
fn two_sided_share(values: impl Iterator<Item = f64>, pivot: f64) -> f64 {
    if pivot.is_nan() {
        return f64::NAN;
    }
    let (mut n, mut at_most, mut at_least) = (0usize, 0usize, 0usize);
    for value in values.filter(|v| !v.is_nan()) {
        n += 1;
        if value <= pivot {
            at_most += 1;
        }
        if value >= pivot {
            at_least += 1;
        }
    }
    if n == 0 {
        return f64::NAN;
    }
    (2.0 * at_most.min(at_least) as f64 / n as f64).min(1.0)
}
