//! sweep::context — per-point samples and shared intermediates.
//!
//! Purpose
//! -------
//! Hold everything the estimator configurations of one parameter point read:
//! the samples of each condition and the intermediates derived from them.
//! Intermediates are computed exactly once per condition and borrowed by
//! every configuration that needs them.
//!
//! Key behaviors
//! -------------
//! - [`ConditionData::prepare`] derives CTRs, square-root weights, unit
//!   weights, linearized clicks, correlation-aware weights, smoothed CTRs
//!   and aggregate CTRs/views from one condition's samples.
//! - [`PointContext`] owns both conditions and is dropped after the point,
//!   so no state carries across points.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every intermediate shares the `NN × N` (or `NN`) shape of its samples.
//! - The context is never mutated after preparation; configurations only
//!   take shared references.
use ndarray::{Array1, Array2};
use tracing::debug;

use crate::{
    estimators::{EstimatorLibrary, EstimatorResult, transforms},
    simulation::{Condition, Paired, ParameterPoint, SampleMatrices},
    sweep::errors::{SweepError, SweepResult},
};

/// Intermediates — derived arrays shared by several configurations.
///
/// Fields
/// ------
/// - `ctrs`: per-user `clicks / views`.
/// - `sqrt_views`: `√views`, the dampened weights of the `weighted_sqr_*`
///   configurations.
/// - `unit_weights`: all-ones weights, for unweighted bucket means.
/// - `linearized`: `clicks − k · views` with `k` the control aggregate CTR.
/// - `corr_weights`: intra-user correlation-aware weights.
/// - `smoothed_ctrs`: CTRs shrunk toward the control aggregate CTR.
/// - `global_ctrs`, `total_views`: per-repetition aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct Intermediates {
    pub ctrs: Paired<Array2<f64>>,
    pub sqrt_views: Paired<Array2<f64>>,
    pub unit_weights: Paired<Array2<f64>>,
    pub linearized: Paired<Array2<f64>>,
    pub corr_weights: Paired<Array2<f64>>,
    pub smoothed_ctrs: Paired<Array2<f64>>,
    pub global_ctrs: Paired<Array1<f64>>,
    pub total_views: Paired<Array1<f64>>,
}

/// Samples and intermediates of one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionData {
    pub condition: Condition,
    pub samples: SampleMatrices,
    pub intermediates: Intermediates,
}

impl ConditionData {
    /// Derive every intermediate of `samples` once.
    ///
    /// Parameters
    /// ----------
    /// - `condition`: [`Condition`]
    ///   Which half of the experiment the samples belong to; used for error
    ///   context and logging.
    /// - `samples`: [`SampleMatrices`]
    ///   Validated generator output, moved into the returned value.
    /// - `library`: `&mut dyn EstimatorLibrary`
    ///   Provides the replaceable transforms (linearization,
    ///   correlation-aware weights, smoothing).
    ///
    /// Errors
    /// ------
    /// - `SweepError::Intermediate` wrapping the first failing transform.
    pub fn prepare(
        condition: Condition, samples: SampleMatrices, library: &mut dyn EstimatorLibrary,
    ) -> SweepResult<ConditionData> {
        let intermediates = derive_intermediates(&samples, library)
            .map_err(|source| SweepError::Intermediate { condition, source })?;
        debug!(%condition, "intermediates prepared");
        Ok(ConditionData { condition, samples, intermediates })
    }

    /// Number of repetitions of this condition.
    pub fn repetitions(&self) -> usize {
        self.samples.repetitions()
    }
}

fn derive_intermediates(
    samples: &SampleMatrices, library: &mut dyn EstimatorLibrary,
) -> EstimatorResult<Intermediates> {
    let (c_0, v_0) = (samples.control.clicks.view(), samples.control.views.view());
    let (c_1, v_1) = (samples.treatment.clicks.view(), samples.treatment.views.view());

    let ctrs = Paired::new(transforms::ctrs(c_0, v_0)?, transforms::ctrs(c_1, v_1)?);
    let sqrt_views = Paired::new(transforms::sqrt_weights(v_0), transforms::sqrt_weights(v_1));
    let unit_weights = Paired::new(Array2::ones(v_0.dim()), Array2::ones(v_1.dim()));
    let (g_0, t_0) = transforms::global_ctrs(c_0, v_0)?;
    let (g_1, t_1) = transforms::global_ctrs(c_1, v_1)?;

    let (l_0, l_1) = library.linearization(c_0, v_0, c_1, v_1)?;
    let (w_0, w_1) = library.correlation_aware_weights(c_0, v_0, v_1)?;
    let (s_0, s_1) = library.smoothed_ctrs(c_0, v_0, c_1, v_1)?;

    Ok(Intermediates {
        ctrs,
        sqrt_views,
        unit_weights,
        linearized: Paired::new(l_0, l_1),
        corr_weights: Paired::new(w_0, w_1),
        smoothed_ctrs: Paired::new(s_0, s_1),
        global_ctrs: Paired::new(g_0, g_1),
        total_views: Paired::new(t_0, t_1),
    })
}

/// PointContext — both conditions of one parameter point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointContext {
    pub point: ParameterPoint,
    pub ab: ConditionData,
    pub aa: ConditionData,
}

impl PointContext {
    /// Data of `condition`.
    pub fn condition(&self, condition: Condition) -> &ConditionData {
        match condition {
            Condition::AB => &self.ab,
            Condition::AA => &self.aa,
        }
    }
}
