//! sweep::options — run configuration and seed derivation.
//!
//! Purpose
//! -------
//! Hold the knobs of a sweep that are not part of the parameter grid: how
//! generator seeds are chosen for the AB and AA conditions, and whether a
//! point whose every configuration is cached may skip data generation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Derived seeds depend only on the policy's base seed, the exact bits of
//!   the point's fields and the condition; they are stable across runs,
//!   platforms and toolchains (no `std` hasher is involved).
//! - `SeedPolicy::Shared` gives AB and AA the same seed, i.e. common random
//!   numbers: both conditions see the same views and user-rate draws up to
//!   the injected uplift.
use crate::simulation::{Condition, ParameterPoint};

/// How the generator is seeded for each condition.
///
/// Variants
/// --------
/// - `Entropy`
///   Every generation draws fresh OS entropy; AB and AA are independent and
///   reruns are not reproducible.
/// - `Independent(base)`
///   Reproducible; AB and AA get different seeds derived from `base`.
/// - `Shared(base)`
///   Reproducible; AA reuses the AB seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    #[default]
    Entropy,
    Independent(u64),
    Shared(u64),
}

impl SeedPolicy {
    /// Seed handed to the generator for `(point, condition)`.
    ///
    /// Returns
    /// -------
    /// `Option<u64>`
    ///   `None` under `Entropy`, otherwise the derived seed.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use rust_stattests::simulation::{Condition, ParameterPoint};
    /// # use rust_stattests::sweep::SeedPolicy;
    /// let point = ParameterPoint::new(10, 5, 0.2, 0.02, 1000.0, 1.0);
    /// let shared = SeedPolicy::Shared(7);
    /// assert_eq!(shared.seed_for(&point, Condition::AB), shared.seed_for(&point, Condition::AA));
    /// let independent = SeedPolicy::Independent(7);
    /// assert_ne!(
    ///     independent.seed_for(&point, Condition::AB),
    ///     independent.seed_for(&point, Condition::AA)
    /// );
    /// ```
    pub fn seed_for(&self, point: &ParameterPoint, condition: Condition) -> Option<u64> {
        match *self {
            SeedPolicy::Entropy => None,
            SeedPolicy::Independent(base) => Some(derive_seed(base, point, condition)),
            SeedPolicy::Shared(base) => Some(derive_seed(base, point, Condition::AB)),
        }
    }
}

/// SweepOptions — sweep-level configuration.
///
/// Fields
/// ------
/// - `seed_policy`: [`SeedPolicy`]
///   Generator seeding per condition. Default `Entropy`.
/// - `skip_complete_points`: `bool`
///   When every registered configuration of a point is cached, skip data
///   generation for that point entirely. Default `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    pub seed_policy: SeedPolicy,
    pub skip_complete_points: bool,
}

impl SweepOptions {
    pub fn new(seed_policy: SeedPolicy, skip_complete_points: bool) -> SweepOptions {
        SweepOptions { seed_policy, skip_complete_points }
    }
}

impl Default for SweepOptions {
    fn default() -> Self {
        SweepOptions { seed_policy: SeedPolicy::Entropy, skip_complete_points: true }
    }
}

//
// ---------- Private helpers (compact docs) ----------
//

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the point's field bits and the condition tag, mixed with
/// `base` through a splitmix64 finalizer.
fn derive_seed(base: u64, point: &ParameterPoint, condition: Condition) -> u64 {
    splitmix64(point_hash(point, condition, "") ^ base)
}

/// Random stream of one configuration's evaluation: FNV-1a over the point,
/// the condition tag and the codename, finalized with splitmix64. Handed to
/// [`EstimatorLibrary::reseed`](crate::estimators::EstimatorLibrary::reseed)
/// so a configuration's randomized p-values do not depend on which other
/// entries were computed before it.
pub(crate) fn estimator_stream(
    point: &ParameterPoint, condition: Condition, codename: &str,
) -> u64 {
    splitmix64(point_hash(point, condition, codename))
}

fn point_hash(point: &ParameterPoint, condition: Condition, suffix: &str) -> u64 {
    let words = [
        point.nn as u64,
        point.n as u64,
        point.uplift.to_bits(),
        point.success_rate.to_bits(),
        point.beta.to_bits(),
        point.skew.to_bits(),
    ];
    let mut hash = FNV_OFFSET;
    let bytes = words
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .chain(condition.tag().bytes())
        .chain(suffix.bytes());
    for byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
