//! estimators::bucketization — bucketed weighted means followed by a t-test.
//!
//! Users of each repetition are split into contiguous buckets; each bucket is
//! summarized by its weighted mean `Σ wᵢ·xᵢ / Σ wᵢ` and the two variants'
//! bucket means are compared with the pooled t-test. With unit weights this
//! is the plain bucket-mean method; with view weights it averages CTRs into
//! bucket-level aggregate CTRs.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};

use crate::estimators::{
    errors::{EstimatorError, EstimatorResult},
    parametric::t_test,
    validation::{validate_min_columns, validate_rows, validate_same_shape},
};

/// Bucketize both variants and t-test the bucket means.
///
/// Parameters
/// ----------
/// - `values_0`, `weights_0`: `ArrayView2<f64>`
///   Control values and weights, identical `NN × n₀` shapes.
/// - `values_1`, `weights_1`: `ArrayView2<f64>`
///   Treatment values and weights, identical `NN × n₁` shapes.
/// - `n_buckets`: `usize`
///   Requested bucket count, at least 2. Capped at the number of users of
///   each variant, so every bucket holds at least one user.
///
/// Returns
/// -------
/// `EstimatorResult<Array1<f64>>`
///   One t-test p-value per repetition.
///
/// Errors
/// ------
/// - `EstimatorError::InvalidOption` if `n_buckets < 2`.
/// - `EstimatorError::InsufficientData` if a variant has fewer than 2 users.
/// - Shape and row mismatches.
///
/// Notes
/// -----
/// - Bucket `b` of `nb` over `n` users covers columns
///   `[b·n/nb, (b+1)·n/nb)`; bucket sizes differ by at most one.
/// - A bucket whose weights sum to zero yields a `NaN` mean, which turns the
///   repetition's p-value into `NaN`.
pub fn bucketization(
    values_0: ArrayView2<f64>, weights_0: ArrayView2<f64>, values_1: ArrayView2<f64>,
    weights_1: ArrayView2<f64>, n_buckets: usize,
) -> EstimatorResult<Array1<f64>> {
    if n_buckets < 2 {
        return Err(EstimatorError::InvalidOption {
            name: "n_buckets",
            value: n_buckets as f64,
            reason: "Must be at least 2.",
        });
    }
    validate_same_shape("weights_0", &values_0, &weights_0)?;
    validate_same_shape("weights_1", &values_1, &weights_1)?;
    validate_rows(&values_0, &values_1)?;
    validate_min_columns("values_0", &values_0, 2)?;
    validate_min_columns("values_1", &values_1, 2)?;

    let buckets_0 = bucket_means(values_0, weights_0, n_buckets);
    let buckets_1 = bucket_means(values_1, weights_1, n_buckets);
    t_test(buckets_0.view(), buckets_1.view())
}

/// `NN × nb` matrix of weighted bucket means.
fn bucket_means(values: ArrayView2<f64>, weights: ArrayView2<f64>, n_buckets: usize) -> Array2<f64> {
    let n = values.ncols();
    let nb = n_buckets.min(n);
    let mut out = Array2::<f64>::zeros((values.nrows(), nb));
    for (mut out_row, (v_row, w_row)) in out
        .axis_iter_mut(Axis(0))
        .zip(values.axis_iter(Axis(0)).zip(weights.axis_iter(Axis(0))))
    {
        for (b, slot) in out_row.iter_mut().enumerate() {
            let (lo, hi) = (b * n / nb, (b + 1) * n / nb);
            *slot = weighted_mean(v_row.slice(s![lo..hi]), w_row.slice(s![lo..hi]));
        }
    }
    out
}

fn weighted_mean(values: ArrayView1<f64>, weights: ArrayView1<f64>) -> f64 {
    values.dot(&weights) / weights.sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};

    #[test]
    // Purpose
    // -------
    // Check bucket boundaries and weighted means on a hand-computed case.
    //
    // Given
    // -----
    // - 5 users, 2 buckets → columns [0, 2) and [2, 5).
    // - values [1, 3, 2, 2, 8], weights [1, 1, 1, 2, 1].
    //
    // Expect
    // ------
    // - Bucket means 2.0 and (2 + 4 + 8) / 4 = 3.5.
    fn bucket_means_follow_contiguous_boundaries() {
        // Arrange
        let values = array![[1.0, 3.0, 2.0, 2.0, 8.0]];
        let weights = array![[1.0, 1.0, 1.0, 2.0, 1.0]];

        // Act
        let means = bucket_means(values.view(), weights.view(), 2);

        // Assert
        assert_eq!(means.dim(), (1, 2));
        assert_relative_eq!(means[[0, 0]], 2.0);
        assert_relative_eq!(means[[0, 1]], 3.5);
    }

    #[test]
    // Purpose
    // -------
    // The bucket count is capped at the number of users.
    //
    // Given
    // -----
    // - 3 users and 200 requested buckets.
    //
    // Expect
    // ------
    // - 3 buckets, each equal to the single user's value.
    fn bucket_count_is_capped_by_users() {
        // Arrange
        let values = array![[0.1, 0.2, 0.3]];
        let weights = Array2::<f64>::ones((1, 3));

        // Act
        let means = bucket_means(values.view(), weights.view(), 200);

        // Assert
        assert_eq!(means, values);
    }

    #[test]
    // Purpose
    // -------
    // A shifted treatment is detected through the bucket means.
    //
    // Given
    // -----
    // - 40 users per variant with values varying around 1.0 vs 3.0,
    //   unit weights, 10 buckets.
    //
    // Expect
    // ------
    // - p-value below 1e-6.
    fn bucketization_detects_shift() {
        // Arrange
        let base = Array2::from_shape_fn((1, 40), |(_, j)| (j % 7) as f64 * 0.1);
        let values_0 = base.mapv(|x| 1.0 + x);
        let values_1 = base.mapv(|x| 3.0 + x);
        let weights = Array2::<f64>::ones((1, 40));

        // Act
        let p = bucketization(values_0.view(), weights.view(), values_1.view(), weights.view(), 10)
            .unwrap();

        // Assert
        assert!(p[0] < 1e-6, "p = {}", p[0]);
    }

    #[test]
    // Purpose
    // -------
    // Degenerate repetitions give NaN instead of a spurious rejection.
    //
    // Given
    // -----
    // - Row 0: the first control bucket has weights summing to zero.
    // - Row 1: every value is zero (no clicks) with positive weights.
    //
    // Expect
    // ------
    // - Both p-values are NaN.
    fn bucketization_degenerate_rows_are_nan() {
        // Arrange
        let values_0 = array![[0.2, 0.4, 0.1, 0.3], [0.0, 0.0, 0.0, 0.0]];
        let weights_0 = array![[0.0, 0.0, 1.0, 2.0], [3.0, 1.0, 2.0, 5.0]];
        let values_1 = array![[0.3, 0.1, 0.2, 0.5], [0.0, 0.0, 0.0, 0.0]];
        let weights_1 = array![[1.0, 1.0, 2.0, 1.0], [2.0, 4.0, 1.0, 1.0]];

        // Act
        let p =
            bucketization(values_0.view(), weights_0.view(), values_1.view(), weights_1.view(), 2)
                .unwrap();

        // Assert
        assert!(p[0].is_nan(), "p = {p:?}");
        assert!(p[1].is_nan(), "p = {p:?}");
    }

    #[test]
    fn bucketization_rejects_single_bucket() {
        let x = Array2::<f64>::ones((1, 4));
        let result = bucketization(x.view(), x.view(), x.view(), x.view(), 1);
        assert!(matches!(result, Err(EstimatorError::InvalidOption { name: "n_buckets", .. })));
    }
}
