//! estimators::transforms — per-user and per-repetition derived arrays.
//!
//! Purpose
//! -------
//! Build the intermediate arrays that several tests share: per-user CTRs,
//! square-root view weights, linearized clicks, correlation-aware weights,
//! smoothed CTRs, weighted values and aggregate (global) CTRs with
//! their view totals.
//!
//! Key behaviors
//! -------------
//! - Transforms that need a reference level (linearization, smoothing,
//!   correlation weights) estimate it from the *control* row and apply it to
//!   both variants, so the treatment never leaks into the reference.
//! - All outputs keep the repetition-major layout of their inputs.
//!
//! Invariants & assumptions
//! ------------------------
//! - `views > 0` wherever a ratio is formed; the reference generator
//!   guarantees `views ≥ 1`. Zero views propagate as `NaN`/`inf`, they are
//!   not masked here.
//!
//! Downstream usage
//! ----------------
//! - `sweep::context` calls these once per condition and hands the results
//!   to every estimator configuration that needs them.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::estimators::{
    errors::{EstimatorError, EstimatorResult},
    validation::{validate_min_columns, validate_rows, validate_same_shape},
};

/// Per-user click-through rates `clicks / views`.
///
/// Errors
/// ------
/// - `EstimatorError::ShapeMismatch` if the matrices differ in shape.
pub fn ctrs(clicks: ArrayView2<f64>, views: ArrayView2<f64>) -> EstimatorResult<Array2<f64>> {
    validate_same_shape("views", &clicks, &views)?;
    Ok(&clicks / &views)
}

/// Square roots of the view counts, used as dampened weights.
pub fn sqrt_weights(views: ArrayView2<f64>) -> Array2<f64> {
    views.mapv(f64::sqrt)
}

/// Aggregate CTR `Σ clicks / Σ views` and total views, per repetition.
///
/// Errors
/// ------
/// - `EstimatorError::ShapeMismatch` if the matrices differ in shape.
pub fn global_ctrs(
    clicks: ArrayView2<f64>, views: ArrayView2<f64>,
) -> EstimatorResult<(Array1<f64>, Array1<f64>)> {
    validate_same_shape("views", &clicks, &views)?;
    let total_views = views.sum_axis(Axis(1));
    let global = clicks.sum_axis(Axis(1)) / &total_views;
    Ok((global, total_views))
}

/// Elementwise product `x · w` of values and their weights.
///
/// Errors
/// ------
/// - `EstimatorError::ShapeMismatch` if the matrices differ in shape.
pub fn weighted_values(
    values: ArrayView2<f64>, weights: ArrayView2<f64>,
) -> EstimatorResult<Array2<f64>> {
    validate_same_shape("weights", &values, &weights)?;
    Ok(&values * &weights)
}

/// Linearized clicks `clicks − k · views` for both variants.
///
/// Parameters
/// ----------
/// - `clicks_0`, `views_0`, `clicks_1`, `views_1`: `ArrayView2<f64>`
///   Per-variant counts with matching shapes inside each variant.
///
/// Returns
/// -------
/// `EstimatorResult<(Array2<f64>, Array2<f64>)>`
///   `(control, treatment)` linearized matrices, where `k` is the control
///   aggregate CTR of the same repetition.
///
/// Notes
/// -----
/// - The mean of the linearized control row is exactly zero up to rounding,
///   so a t-test on the linearized values tests the ratio metric.
pub fn linearization_of_clicks(
    clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>, clicks_1: ArrayView2<f64>,
    views_1: ArrayView2<f64>,
) -> EstimatorResult<(Array2<f64>, Array2<f64>)> {
    validate_same_shape("views_0", &clicks_0, &views_0)?;
    validate_same_shape("views_1", &clicks_1, &views_1)?;
    validate_rows(&clicks_0, &clicks_1)?;

    let (k, _) = global_ctrs(clicks_0, views_0)?;
    let k = k.insert_axis(Axis(1));
    let linearized_0 = &clicks_0 - &(&views_0 * &k);
    let linearized_1 = &clicks_1 - &(&views_1 * &k);
    Ok((linearized_0, linearized_1))
}

/// Intra-user correlation-aware weights `v / (1 + (v − 1) · ρ)`.
///
/// Parameters
/// ----------
/// - `clicks_0`, `views_0`: `ArrayView2<f64>`
///   Control counts, used to estimate ρ per repetition.
/// - `views_1`: `ArrayView2<f64>`
///   Treatment views; weighted with the control's ρ.
///
/// Returns
/// -------
/// `EstimatorResult<(Array2<f64>, Array2<f64>)>`
///   `(control, treatment)` weights.
///
/// Errors
/// ------
/// - Shape/row mismatches; fewer than 2 control users.
///
/// Notes
/// -----
/// - ρ is the one-way ANOVA intra-class correlation of clicks within users,
///   `(MSB − MSW) / (MSB + (n₀' − 1) · MSW)`, clipped below at 0. An
///   undefined estimate (e.g. every user has a single view) is treated as
///   ρ = 0, which reduces the weights to the raw views.
/// - With ρ = 1 every user weighs 1, i.e. users count as single trials.
pub fn intra_user_correlation_aware_weights(
    clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>, views_1: ArrayView2<f64>,
) -> EstimatorResult<(Array2<f64>, Array2<f64>)> {
    validate_same_shape("views_0", &clicks_0, &views_0)?;
    validate_rows(&views_0, &views_1)?;
    validate_min_columns("clicks_0", &clicks_0, 2)?;

    let rho: Array1<f64> = clicks_0
        .outer_iter()
        .zip(views_0.outer_iter())
        .map(|(c, v)| intra_class_correlation(c, v))
        .collect();
    let rho = rho.insert_axis(Axis(1));
    let weigh = |views: ArrayView2<f64>| &views / &((&views - 1.0) * &rho + 1.0);
    Ok((weigh(views_0), weigh(views_1)))
}

/// Smoothed CTRs `(clicks + α · p) / (views + α)` for both variants.
///
/// Parameters
/// ----------
/// - `clicks_0`, `views_0`, `clicks_1`, `views_1`: `ArrayView2<f64>`
///   Per-variant counts.
/// - `smoothing_factor`: `f64`
///   Prior strength α ≥ 0 in pseudo-views; α = 0 gives the raw CTRs.
///
/// Returns
/// -------
/// `EstimatorResult<(Array2<f64>, Array2<f64>)>`
///   `(control, treatment)` smoothed CTRs. The prior `p` is the control
///   aggregate CTR of the repetition.
///
/// Errors
/// ------
/// - `EstimatorError::InvalidOption` if α is negative or non-finite.
/// - Shape/row mismatches.
pub fn smoothed_ctrs(
    clicks_0: ArrayView2<f64>, views_0: ArrayView2<f64>, clicks_1: ArrayView2<f64>,
    views_1: ArrayView2<f64>, smoothing_factor: f64,
) -> EstimatorResult<(Array2<f64>, Array2<f64>)> {
    if !smoothing_factor.is_finite() || smoothing_factor < 0.0 {
        return Err(EstimatorError::InvalidOption {
            name: "smoothing_factor",
            value: smoothing_factor,
            reason: "Must be finite and non-negative.",
        });
    }
    validate_same_shape("views_0", &clicks_0, &views_0)?;
    validate_same_shape("views_1", &clicks_1, &views_1)?;
    validate_rows(&clicks_0, &clicks_1)?;

    let (prior, _) = global_ctrs(clicks_0, views_0)?;
    let prior = prior.insert_axis(Axis(1)) * smoothing_factor;
    let smooth =
        |clicks: ArrayView2<f64>, views: ArrayView2<f64>| (&clicks + &prior) / (&views + smoothing_factor);
    Ok((smooth(clicks_0, views_0), smooth(clicks_1, views_1)))
}

//
// ---------- Private helpers (compact docs) ----------
//

/// ANOVA ICC of one control row, clipped to `[0, ∞)`; undefined → 0.
fn intra_class_correlation(clicks: ArrayView1<f64>, views: ArrayView1<f64>) -> f64 {
    let n = clicks.len() as f64;
    let total_views = views.sum();
    let p = clicks.sum() / total_views;

    let mut between = 0.0;
    let mut within = 0.0;
    let mut sum_sq_views = 0.0;
    for (&c, &v) in clicks.iter().zip(views.iter()) {
        let ctr = c / v;
        between += v * (ctr - p).powi(2);
        within += v * ctr * (1.0 - ctr);
        sum_sq_views += v * v;
    }
    let msb = between / (n - 1.0);
    let msw = within / (total_views - n);
    let n_adj = (total_views - sum_sq_views / total_views) / (n - 1.0);
    let rho = (msb - msw) / (msb + (n_adj - 1.0) * msw);
    // f64::max drops a NaN operand
    rho.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Hand-computed values for CTRs, global CTRs, linearization and
    //   smoothing.
    // - The ρ = 0 fallback and the ρ > 0 dampening of correlation weights.
    // - Rejection of invalid smoothing factors.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Global CTRs are ratios of row sums, not means of ratios.
    //
    // Given
    // -----
    // - clicks [[1, 3]], views [[2, 6]] and [[0, 1]], [[1, 9]].
    //
    // Expect
    // ------
    // - Global CTRs [0.5, 0.1] and totals [8, 10]; per-user CTRs elementwise.
    fn global_ctrs_are_ratio_of_sums() {
        // Arrange
        let clicks = array![[1.0, 3.0], [0.0, 1.0]];
        let views = array![[2.0, 6.0], [1.0, 9.0]];

        // Act
        let (global, totals) = global_ctrs(clicks.view(), views.view()).unwrap();
        let per_user = ctrs(clicks.view(), views.view()).unwrap();

        // Assert
        assert_relative_eq!(global[0], 0.5);
        assert_relative_eq!(global[1], 0.1);
        assert_eq!(totals, array![8.0, 10.0]);
        assert_relative_eq!(per_user[[1, 1]], 1.0 / 9.0);
    }

    #[test]
    // Purpose
    // -------
    // Linearization subtracts k · views with k from the control row.
    //
    // Given
    // -----
    // - Control clicks [1, 3], views [2, 6] → k = 0.5.
    // - Treatment clicks [2, 2], views [2, 4].
    //
    // Expect
    // ------
    // - Control [0, 0]; treatment [1, 0].
    fn linearization_uses_control_ratio_per_repetition() {
        // Arrange
        let (c_0, v_0) = (array![[1.0, 3.0]], array![[2.0, 6.0]]);
        let (c_1, v_1) = (array![[2.0, 2.0]], array![[2.0, 4.0]]);

        // Act
        let (l_0, l_1) =
            linearization_of_clicks(c_0.view(), v_0.view(), c_1.view(), v_1.view()).unwrap();

        // Assert
        assert_eq!(l_0, array![[0.0, 0.0]]);
        assert_eq!(l_1, array![[1.0, 0.0]]);
    }

    #[test]
    // Purpose
    // -------
    // Smoothing pulls sparse users toward the control aggregate CTR.
    //
    // Given
    // -----
    // - Control clicks [0, 2], views [1, 3] → prior 0.5; α = 2.
    //
    // Expect
    // ------
    // - Control smoothed [(0 + 1)/3, (2 + 1)/5]; α = 0 returns raw CTRs.
    fn smoothed_ctrs_shrink_toward_prior() {
        // Arrange
        let (c, v) = (array![[0.0, 2.0]], array![[1.0, 3.0]]);

        // Act
        let (s_0, s_1) = smoothed_ctrs(c.view(), v.view(), c.view(), v.view(), 2.0).unwrap();
        let (raw, _) = smoothed_ctrs(c.view(), v.view(), c.view(), v.view(), 0.0).unwrap();

        // Assert
        assert_relative_eq!(s_0[[0, 0]], 1.0 / 3.0);
        assert_relative_eq!(s_0[[0, 1]], 3.0 / 5.0);
        assert_eq!(s_0, s_1);
        assert_relative_eq!(raw[[0, 1]], 2.0 / 3.0);
    }

    #[test]
    fn weighted_values_multiply_elementwise() {
        let values = array![[1.0, 3.0], [0.5, 0.0]];
        let weights = array![[1.0, 3.0], [4.0, 2.0]];
        let out = weighted_values(values.view(), weights.view()).unwrap();
        assert_eq!(out, array![[1.0, 9.0], [2.0, 0.0]]);
        let short = weights.row(0).insert_axis(Axis(0));
        assert!(weighted_values(values.view(), short).is_err());
    }

    #[test]
    fn smoothed_ctrs_reject_negative_factor() {
        let x = array![[1.0, 1.0]];
        let result = smoothed_ctrs(x.view(), x.view(), x.view(), x.view(), -1.0);
        assert!(matches!(
            result,
            Err(EstimatorError::InvalidOption { name: "smoothing_factor", .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Single-view users give an undefined ICC, which falls back to ρ = 0.
    //
    // Given
    // -----
    // - Every control user has exactly one view.
    //
    // Expect
    // ------
    // - Weights equal the raw views for both variants.
    fn correlation_weights_fall_back_to_views() {
        // Arrange
        let c_0 = array![[0.0, 1.0, 1.0]];
        let v_0 = array![[1.0, 1.0, 1.0]];
        let v_1 = array![[4.0, 2.0, 7.0]];

        // Act
        let (w_0, w_1) =
            intra_user_correlation_aware_weights(c_0.view(), v_0.view(), v_1.view()).unwrap();

        // Assert
        assert_eq!(w_0, v_0);
        assert_eq!(w_1, v_1);
    }

    #[test]
    // Purpose
    // -------
    // Strongly clustered clicks give ρ > 0 and dampen heavy users.
    //
    // Given
    // -----
    // - Users either always click or never click, 10 views each.
    //
    // Expect
    // ------
    // - ρ = 1 so every weight equals 1.
    fn correlation_weights_dampen_clustered_users() {
        // Arrange
        let c_0 = array![[0.0, 10.0, 0.0, 10.0]];
        let v_0 = array![[10.0, 10.0, 10.0, 10.0]];

        // Act
        let (w_0, w_1) =
            intra_user_correlation_aware_weights(c_0.view(), v_0.view(), v_0.view()).unwrap();

        // Assert
        for &w in w_0.iter().chain(w_1.iter()) {
            assert_relative_eq!(w, 1.0, epsilon = 1e-12);
        }
    }
}
