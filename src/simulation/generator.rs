//! simulation::generator — synthetic click/view experiments.
//!
//! Purpose
//! -------
//! Define the [`DataGenerator`] seam the sweep orchestrator consumes and
//! provide [`ClickGenerator`], the reference implementation that draws
//! heavy-tailed per-user view counts, heterogeneous per-user success rates,
//! and binomial clicks for a control and a treatment variant.
//!
//! Key behaviors
//! -------------
//! - Views per user: `⌊exp(Z)⌋ + 1` with `Z ~ Normal(1, skew)`, so every user
//!   has at least one view and `skew` controls the tail.
//! - Success rate per user: `Beta(α, beta)` with
//!   `α = rate · beta / (1 − rate)`, which has mean `rate`. The control uses
//!   `success_rate`, the treatment `success_rate · (1 + uplift)`.
//! - Clicks per user: `Binomial(views, user_rate)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - A given `(point, Some(seed))` pair always yields identical matrices; a
//!   `None` seed draws from OS entropy.
//! - Points are validated with
//!   [`validate_point`](crate::simulation::validation::validate_point)
//!   before sampling.
//! - Control cells are drawn before treatment cells, each matrix row-major;
//!   this ordering is part of the reproducibility contract.
//!
//! Conventions
//! -----------
//! - The generator never decides *which* seed to use for AB vs AA; the caller
//!   (the sweep's seed policy) owns that choice.
use ndarray::Array2;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Beta, Binomial, Distribution, Normal};

use crate::simulation::{
    errors::{SimulationError, SimulationResult},
    params::ParameterPoint,
    samples::{Paired, SampleMatrices, VariantSamples},
    validation::validate_point,
};

/// Upper clamp on `⌊exp(Z)⌋` to keep extreme skews inside `u64` binomial
/// trials and exact `f64` integers.
pub const MAX_VIEWS_PER_USER: f64 = 1.0e12;

/// DataGenerator — source of paired experiment samples.
///
/// Implementations map a parameter point to validated [`SampleMatrices`]
/// of shape `NN × N`. `seed = Some(s)` must make the output a pure function
/// of `(point, s)`; `None` lets the implementation pick its own entropy.
pub trait DataGenerator {
    fn generate(
        &mut self, point: &ParameterPoint, seed: Option<u64>,
    ) -> SimulationResult<SampleMatrices>;
}

/// ClickGenerator — reference log-normal / Beta / Binomial click simulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickGenerator;

impl ClickGenerator {
    pub fn new() -> ClickGenerator {
        ClickGenerator
    }
}

impl DataGenerator for ClickGenerator {
    /// Simulate one experiment for `point`.
    ///
    /// Errors
    /// ------
    /// - Any [`SimulationError`] from point validation.
    /// - `SimulationError::Distribution` if `rand_distr` rejects a derived
    ///   parameter (not expected for validated points).
    fn generate(
        &mut self, point: &ParameterPoint, seed: Option<u64>,
    ) -> SimulationResult<SampleMatrices> {
        validate_point(point)?;
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (control, control_truth) = simulate_variant(&mut rng, point, point.success_rate)?;
        let (treatment, treatment_truth) =
            simulate_variant(&mut rng, point, point.treatment_rate())?;

        SampleMatrices::new(control, treatment, Paired::new(control_truth, treatment_truth))
    }
}

/// Draw views, per-user rates and clicks for one variant with mean rate `rate`.
fn simulate_variant(
    rng: &mut StdRng, point: &ParameterPoint, rate: f64,
) -> SimulationResult<(VariantSamples, Array2<f64>)> {
    let log_views = Normal::new(1.0, point.skew).map_err(|e| SimulationError::Distribution {
        distribution: "Normal",
        reason: e.to_string(),
    })?;
    let alpha = rate * point.beta / (1.0 - rate);
    let user_rates = Beta::new(alpha, point.beta).map_err(|e| SimulationError::Distribution {
        distribution: "Beta",
        reason: e.to_string(),
    })?;

    let shape = (point.nn, point.n);
    let mut views = Array2::<f64>::zeros(shape);
    let mut clicks = Array2::<f64>::zeros(shape);
    let mut truth = Array2::<f64>::zeros(shape);

    for ((v, c), t) in views.iter_mut().zip(clicks.iter_mut()).zip(truth.iter_mut()) {
        let user_views = log_views.sample(rng).exp().floor().min(MAX_VIEWS_PER_USER) + 1.0;
        let user_rate = user_rates.sample(rng);
        let trials = Binomial::new(user_views as u64, user_rate).map_err(|e| {
            SimulationError::Distribution { distribution: "Binomial", reason: e.to_string() }
        })?;
        *v = user_views;
        *t = user_rate;
        *c = trials.sample(rng) as f64;
    }

    Ok((VariantSamples::new(views, clicks), truth))
}
