//! estimators::parametric — t-test, delta method and binomial z-test.
//!
//! Purpose
//! -------
//! Implement the closed-form two-sample tests used by the sweep: the pooled
//! Student t-test on per-user values, the delta-method z-test on the ratio
//! of summed clicks to summed views, and the pooled two-proportion z-test on
//! aggregate CTRs.
//!
//! Key behaviors
//! -------------
//! - Every test works row by row: row `r` of variant 0 is compared with row
//!   `r` of variant 1 and yields one two-sided p-value.
//! - Degenerate rows (zero pooled variance with equal means, zero overall
//!   CTR) yield `NaN` rather than an error.
//!
//! Conventions
//! -----------
//! - The t-test uses the unbiased (`ddof = 1`) per-group variances pooled
//!   over `n₀ + n₁ − 2` degrees of freedom.
//! - The delta method uses population (`ddof = 0`) moments, as in the
//!   classic ratio-metric linearization.
//! - Two-sided p-values are computed from survival functions
//!   (`2 · sf(|z|)`) to keep precision in the tails.
use ndarray::{Array1, ArrayView1, ArrayView2, Zip};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::estimators::{
    errors::{EstimatorError, EstimatorResult},
    validation::{validate_lengths, validate_min_columns, validate_rows, validate_same_shape},
};

/// Pooled two-sample Student t-test, one p-value per repetition.
///
/// Parameters
/// ----------
/// - `a`: `ArrayView2<f64>`
///   Variant 0 values, `NN × n₀` with `n₀ ≥ 2`.
/// - `b`: `ArrayView2<f64>`
///   Variant 1 values, `NN × n₁` with `n₁ ≥ 2`.
///
/// Returns
/// -------
/// `EstimatorResult<Array1<f64>>`
///   Two-sided p-values of length `NN`. A row whose pooled standard error
///   is zero gives `0.0` when the means differ and `NaN` when they agree.
///
/// Errors
/// ------
/// - `EstimatorError::RowMismatch` if `a` and `b` disagree on `NN`.
/// - `EstimatorError::InsufficientData` if either side has fewer than two
///   columns.
/// - `EstimatorError::Distribution` if the Student t law cannot be built.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_stattests::estimators::parametric::t_test;
/// let a = array![[1.0, 2.0, 3.0, 4.0], [1.0, 2.0, 3.0, 4.0]];
/// let b = array![[1.0, 2.0, 3.0, 4.0], [11.0, 12.0, 13.0, 14.0]];
/// let p = t_test(a.view(), b.view()).unwrap();
/// assert!((p[0] - 1.0).abs() < 1e-12);
/// assert!(p[1] < 1e-4);
/// ```
pub fn t_test(a: ArrayView2<f64>, b: ArrayView2<f64>) -> EstimatorResult<Array1<f64>> {
    validate_rows(&a, &b)?;
    validate_min_columns("a", &a, 2)?;
    validate_min_columns("b", &b, 2)?;

    let df = (a.ncols() + b.ncols() - 2) as f64;
    let students_t = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| EstimatorError::Distribution { reason: e.to_string() })?;

    let p_values = a
        .outer_iter()
        .zip(b.outer_iter())
        .map(|(row_a, row_b)| {
            let t = pooled_t_statistic(row_a, row_b);
            if t.is_nan() {
                f64::NAN
            } else if t.is_infinite() {
                0.0
            } else {
                (2.0 * students_t.sf(t.abs())).min(1.0)
            }
        })
        .collect();
    Ok(p_values)
}

/// Delta-method z-test on the ratio `Σ clicks / Σ views`.
///
/// Parameters
/// ----------
/// - `clicks_0`, `views_0`: `ArrayView2<f64>`
///   Control clicks and views, identical shapes `NN × n₀`.
/// - `clicks_1`, `views_1`: `ArrayView2<f64>`
///   Treatment clicks and views, identical shapes `NN × n₁`.
///
/// Returns
/// -------
/// `EstimatorResult<Array1<f64>>`
///   Two-sided p-values of `(CTR₁ − CTR₀) / √(σ₀²/n₀ + σ₁²/n₁)`, where σ² is
///   the delta-method variance of the per-user ratio estimator.
///
/// Errors
/// ------
/// - Shape/row mismatches and fewer than one column per variant.
pub fn delta_method_ctrs(
    clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>, clicks_1: ArrayView2<f64>,
    views_1: ArrayView2<f64>,
) -> EstimatorResult<Array1<f64>> {
    validate_same_shape("views_0", &clicks_0, &views_0)?;
    validate_same_shape("views_1", &clicks_1, &views_1)?;
    validate_rows(&clicks_0, &clicks_1)?;
    validate_min_columns("clicks_0", &clicks_0, 1)?;
    validate_min_columns("clicks_1", &clicks_1, 1)?;

    let normal = standard_normal()?;
    let (n_0, n_1) = (clicks_0.ncols() as f64, clicks_1.ncols() as f64);

    let mut p_values = Array1::<f64>::zeros(clicks_0.nrows());
    for (r, p) in p_values.iter_mut().enumerate() {
        let (c_0, v_0) = (clicks_0.row(r), views_0.row(r));
        let (c_1, v_1) = (clicks_1.row(r), views_1.row(r));
        let ctr_0 = c_0.sum() / v_0.sum();
        let ctr_1 = c_1.sum() / v_1.sum();
        let se = (ratio_variance(c_0, v_0) / n_0 + ratio_variance(c_1, v_1) / n_1).sqrt();
        *p = two_sided_normal(&normal, (ctr_1 - ctr_0) / se);
    }
    Ok(p_values)
}

/// Pooled two-proportion z-test on aggregate CTRs.
///
/// Parameters
/// ----------
/// - `global_ctr_0`, `total_views_0`: `ArrayView1<f64>`
///   Control aggregate CTR and aggregate views per repetition.
/// - `global_ctr_1`, `total_views_1`: `ArrayView1<f64>`
///   Same for the treatment.
///
/// Returns
/// -------
/// `EstimatorResult<Array1<f64>>`
///   Two-sided p-values; `NaN` where the pooled CTR is 0 or 1.
pub fn binomial_test(
    global_ctr_0: ArrayView1<f64>, total_views_0: ArrayView1<f64>, global_ctr_1: ArrayView1<f64>,
    total_views_1: ArrayView1<f64>,
) -> EstimatorResult<Array1<f64>> {
    validate_lengths(&global_ctr_0, &total_views_0)?;
    validate_lengths(&global_ctr_0, &global_ctr_1)?;
    validate_lengths(&global_ctr_1, &total_views_1)?;

    let normal = standard_normal()?;
    let mut p_values = Array1::<f64>::zeros(global_ctr_0.len());
    Zip::from(&mut p_values)
        .and(&global_ctr_0)
        .and(&total_views_0)
        .and(&global_ctr_1)
        .and(&total_views_1)
        .for_each(|p, &g_0, &t_0, &g_1, &t_1| {
            let overall = (g_0 * t_0 + g_1 * t_1) / (t_0 + t_1);
            let se = (overall * (1.0 - overall) * (1.0 / t_0 + 1.0 / t_1)).sqrt();
            *p = two_sided_normal(&normal, (g_0 - g_1) / se);
        });
    Ok(p_values)
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Standard normal N(0, 1).
pub(crate) fn standard_normal() -> EstimatorResult<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| EstimatorError::Distribution { reason: e.to_string() })
}

/// `2 · sf(|z|)`, `NaN` in → `NaN` out.
#[inline]
pub(crate) fn two_sided_normal(normal: &Normal, z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    if z.is_infinite() {
        return 0.0;
    }
    (2.0 * normal.sf(z.abs())).min(1.0)
}

/// Pooled-variance t statistic `(x̄_a − x̄_b) / (s_p √(1/n_a + 1/n_b))`.
#[inline]
fn pooled_t_statistic(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let (n_a, n_b) = (a.len() as f64, b.len() as f64);
    let mean_a = a.sum() / n_a;
    let mean_b = b.sum() / n_b;
    let ss_a: f64 = a.iter().map(|x| (x - mean_a).powi(2)).sum();
    let ss_b: f64 = b.iter().map(|x| (x - mean_b).powi(2)).sum();
    let pooled_var = (ss_a + ss_b) / (n_a + n_b - 2.0);
    (mean_a - mean_b) / (pooled_var * (1.0 / n_a + 1.0 / n_b)).sqrt()
}

/// Delta-method variance of the per-user ratio mean(c) / mean(v), population moments.
#[inline]
fn ratio_variance(clicks: ArrayView1<f64>, views: ArrayView1<f64>) -> f64 {
    let n = clicks.len() as f64;
    let mean_c = clicks.sum() / n;
    let mean_v = views.sum() / n;
    let (mut var_c, mut var_v, mut cov) = (0.0, 0.0, 0.0);
    for (c, v) in clicks.iter().zip(views.iter()) {
        let (dc, dv) = (c - mean_c, v - mean_v);
        var_c += dc * dc;
        var_v += dv * dv;
        cov += dc * dv;
    }
    let (var_c, var_v, cov) = (var_c / n, var_v / n, cov / n);

    var_c / mean_v.powi(2) + var_v * mean_c.powi(2) / mean_v.powi(4)
        - 2.0 * mean_c / mean_v.powi(3) * cov
}
