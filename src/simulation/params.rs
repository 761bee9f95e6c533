//! simulation::params — parameter points and experiment conditions.
//!
//! Purpose
//! -------
//! Define the six-field [`ParameterPoint`] that identifies one simulated
//! experiment scenario, and the [`Condition`] enum distinguishing the real
//! A/B experiment from its A/A null control.
//!
//! Invariants & assumptions
//! ------------------------
//! - A `ParameterPoint` is a plain value: equality is exact field equality,
//!   with no tolerance on the floating-point fields.
//! - The A/A point derived by [`ParameterPoint::null_control`] differs from
//!   its source only in `uplift`, which is exactly `0.0`.
//! - Domain checks (positivity, rate bounds) are *not* enforced here; the
//!   generator validates a point before sampling from it.

/// Condition — which half of the experiment pair is being simulated.
///
/// - `AB`: the point's configured uplift is applied to variant 1.
/// - `AA`: uplift is forced to zero; used to measure the false-positive rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    AB,
    AA,
}

impl Condition {
    /// Both conditions in evaluation order (AB first).
    pub const ALL: [Condition; 2] = [Condition::AB, Condition::AA];

    /// Short lowercase tag used in logs and seed derivation.
    pub fn tag(self) -> &'static str {
        match self {
            Condition::AB => "ab",
            Condition::AA => "aa",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::AB => write!(f, "AB"),
            Condition::AA => write!(f, "AA"),
        }
    }
}

/// ParameterPoint — one configuration of the synthetic experiment.
///
/// Purpose
/// -------
/// Fully identify a simulated scenario. The same tuple is used as the key
/// prefix of every cached estimator result produced for it.
///
/// Fields
/// ------
/// - `nn`: `usize`
///   Number of independent experiment repetitions (rows of every sample
///   matrix, and the length of every estimator result).
/// - `n`: `usize`
///   Number of users per variant in one repetition (matrix columns).
/// - `uplift`: `f64`
///   Relative lift applied to the treatment success rate.
/// - `success_rate`: `f64`
///   Mean per-view success probability of the control variant.
/// - `beta`: `f64`
///   Second shape parameter of the per-user Beta success-rate law; larger
///   values concentrate user rates around `success_rate`.
/// - `skew`: `f64`
///   Standard deviation of the log-normal views-per-user law.
///
/// Notes
/// -----
/// - The derived `PartialEq` compares `f64` fields with `==`, so `NaN`
///   points never compare equal. Such points are rejected by the generator
///   anyway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterPoint {
    pub nn: usize,
    pub n: usize,
    pub uplift: f64,
    pub success_rate: f64,
    pub beta: f64,
    pub skew: f64,
}

impl ParameterPoint {
    /// Build a point from its six fields, in key order.
    pub fn new(
        nn: usize, n: usize, uplift: f64, success_rate: f64, beta: f64, skew: f64,
    ) -> ParameterPoint {
        ParameterPoint { nn, n, uplift, success_rate, beta, skew }
    }

    /// The A/A companion of this point: identical except `uplift = 0.0`.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use rust_stattests::simulation::ParameterPoint;
    /// let ab = ParameterPoint::new(2000, 5000, 0.2, 0.02, 1000.0, 1.0);
    /// let aa = ab.null_control();
    /// assert_eq!(aa.uplift, 0.0);
    /// assert_eq!(aa.beta, ab.beta);
    /// ```
    pub fn null_control(&self) -> ParameterPoint {
        ParameterPoint { uplift: 0.0, ..*self }
    }

    /// The point actually simulated for `condition`.
    pub fn for_condition(&self, condition: Condition) -> ParameterPoint {
        match condition {
            Condition::AB => *self,
            Condition::AA => self.null_control(),
        }
    }

    /// Success rate of the treatment variant, `success_rate · (1 + uplift)`.
    pub fn treatment_rate(&self) -> f64 {
        self.success_rate * (1.0 + self.uplift)
    }
}

impl std::fmt::Display for ParameterPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NN={} N={} uplift={} success_rate={} beta={} skew={}",
            self.nn, self.n, self.uplift, self.success_rate, self.beta, self.skew
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // The null control must carry uplift exactly 0.0 regardless of the
    // source uplift, and leave every other field untouched.
    //
    // Given
    // -----
    // - Points with uplifts 0.2, -0.5, 3.0 and 0.0.
    //
    // Expect
    // ------
    // - `null_control().uplift == 0.0` and the remaining five fields match.
    fn null_control_forces_zero_uplift_and_keeps_other_fields() {
        for uplift in [0.2_f64, -0.5, 3.0, 0.0] {
            // Arrange
            let ab = ParameterPoint::new(10, 5, uplift, 0.02, 1000.0, 1.0);

            // Act
            let aa = ab.null_control();

            // Assert
            assert_eq!(aa.uplift.to_bits(), 0.0_f64.to_bits());
            assert_eq!((aa.nn, aa.n), (ab.nn, ab.n));
            assert_eq!(aa.success_rate, ab.success_rate);
            assert_eq!(aa.beta, ab.beta);
            assert_eq!(aa.skew, ab.skew);
        }
    }

    #[test]
    // Purpose
    // -------
    // `for_condition` returns the point itself for AB and the null control
    // for AA.
    //
    // Given
    // -----
    // - A point with uplift 0.2.
    //
    // Expect
    // ------
    // - AB keeps 0.2; AA yields 0.0.
    fn for_condition_selects_point_per_condition() {
        // Arrange
        let point = ParameterPoint::new(10, 5, 0.2, 0.02, 1000.0, 1.0);

        // Act / Assert
        assert_eq!(point.for_condition(Condition::AB), point);
        assert_eq!(point.for_condition(Condition::AA).uplift, 0.0);
    }

    #[test]
    fn treatment_rate_applies_relative_uplift() {
        let point = ParameterPoint::new(10, 5, 0.5, 0.02, 1000.0, 1.0);
        assert!((point.treatment_rate() - 0.03).abs() < 1e-15);
    }
}
