//! summary — rejection rates of stored p-values.
//!
//! Turns the two arrays of one cache entry into the quantities the sweep is
//! run for: the power (share of A/B repetitions rejected at level `alpha`)
//! and the false-positive rate (share of A/A repetitions rejected).
use ndarray::Array1;

/// Rejection rates of one estimator configuration at one parameter point.
///
/// Fields
/// ------
/// - `alpha`: significance level used.
/// - `power`: rejection rate on the A/B condition, `NaN` if no A/B value
///   was finite.
/// - `false_positive_rate`: rejection rate on the A/A condition, `NaN` if
///   no A/A value was finite.
/// - `ab_valid`, `aa_valid`: number of non-`NaN` values counted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RejectionSummary {
    pub alpha: f64,
    pub power: f64,
    pub false_positive_rate: f64,
    pub ab_valid: usize,
    pub aa_valid: usize,
}

impl RejectionSummary {
    /// Summarize A/B and A/A p-values; `NaN` entries are ignored.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::array;
    /// # use rust_stattests::summary::RejectionSummary;
    /// let s = RejectionSummary::from_p_values(
    ///     &array![0.01, 0.2, 0.03, f64::NAN],
    ///     &array![0.5, 0.04, 0.9, 0.7],
    ///     0.05,
    /// );
    /// assert!((s.power - 2.0 / 3.0).abs() < 1e-12);
    /// assert_eq!(s.false_positive_rate, 0.25);
    /// ```
    pub fn from_p_values(ab: &Array1<f64>, aa: &Array1<f64>, alpha: f64) -> RejectionSummary {
        let (power, ab_valid) = rejection_rate(ab, alpha);
        let (false_positive_rate, aa_valid) = rejection_rate(aa, alpha);
        RejectionSummary { alpha, power, false_positive_rate, ab_valid, aa_valid }
    }
}

fn rejection_rate(p_values: &Array1<f64>, alpha: f64) -> (f64, usize) {
    let valid = p_values.iter().filter(|p| !p.is_nan()).count();
    if valid == 0 {
        return (f64::NAN, 0);
    }
    let rejected = p_values.iter().filter(|&&p| p < alpha).count();
    (rejected as f64 / valid as f64, valid)
}
