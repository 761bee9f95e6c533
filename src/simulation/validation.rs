//! simulation::validation — domain guards for parameter points.
//!
//! Purpose
//! -------
//! Reject parameter points the click generator cannot simulate before any
//! random draws happen, mapping each violated constraint to a structured
//! [`SimulationError`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `NN ≥ 1` and `N ≥ 2` (two-sample tests need at least two users).
//! - All floating-point fields are finite.
//! - `0 < success_rate < 1` and `0 < success_rate · (1 + uplift) < 1`, so both
//!   Beta laws have a strictly positive first shape parameter.
//! - `beta > 0` and `skew ≥ 0`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover every error branch and the reference sweep corner
//!   points.
use crate::simulation::{
    errors::{SimulationError, SimulationResult},
    params::ParameterPoint,
};

/// Validate that `point` lies in the generator's supported domain.
///
/// Errors
/// ------
/// - `SimulationError::InvalidDimension` for `nn == 0` or `n < 2`.
/// - `SimulationError::InvalidParameter` for the first offending float
///   field, checked in key order (`uplift`, `success_rate`, `beta`, `skew`),
///   followed by the treatment-rate bound.
pub fn validate_point(point: &ParameterPoint) -> SimulationResult<()> {
    if point.nn == 0 {
        return Err(SimulationError::InvalidDimension {
            name: "NN",
            value: point.nn,
            reason: "at least one repetition is required",
        });
    }
    if point.n < 2 {
        return Err(SimulationError::InvalidDimension {
            name: "N",
            value: point.n,
            reason: "at least two users per variant are required",
        });
    }

    let fields = [
        ("uplift", point.uplift),
        ("success_rate", point.success_rate),
        ("beta", point.beta),
        ("skew", point.skew),
    ];
    for (name, value) in fields {
        if !value.is_finite() {
            return Err(SimulationError::InvalidParameter { name, value, reason: "must be finite" });
        }
    }

    if point.uplift <= -1.0 {
        return Err(SimulationError::InvalidParameter {
            name: "uplift",
            value: point.uplift,
            reason: "must be greater than -1",
        });
    }
    if point.success_rate <= 0.0 || point.success_rate >= 1.0 {
        return Err(SimulationError::InvalidParameter {
            name: "success_rate",
            value: point.success_rate,
            reason: "must lie in (0, 1)",
        });
    }
    if point.beta <= 0.0 {
        return Err(SimulationError::InvalidParameter {
            name: "beta",
            value: point.beta,
            reason: "must be strictly positive",
        });
    }
    if point.skew < 0.0 {
        return Err(SimulationError::InvalidParameter {
            name: "skew",
            value: point.skew,
            reason: "must be non-negative",
        });
    }
    if point.treatment_rate() >= 1.0 {
        return Err(SimulationError::InvalidParameter {
            name: "success_rate * (1 + uplift)",
            value: point.treatment_rate(),
            reason: "treatment success rate must stay below 1",
        });
    }

    Ok(())
}
