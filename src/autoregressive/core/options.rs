//! Configuration for arDCA fitting and sampling workflows.
//!
//! Purpose
//! -------
//! Collect the configuration knobs for training ([`FitOptions`]) and
//! sampling ([`SampleOpts`]) in one place, with validated constructors and
//! sensible defaults, so call sites pass explicit options instead of
//! ad-hoc argument lists.
//!
//! Invariants & assumptions
//! ------------------------
//! - [`FitOptions::new`] rejects out-of-range values eagerly
//!   (ConfigurationError-class variants); downstream code assumes a valid
//!   instance.
//! - A `None` pseudocount means "derive it from the data": the training
//!   loop substitutes `1 / effective_size` at fit time.
//! - Seeds are always explicit; every stochastic path in the crate is
//!   reproducible given the same options.
use crate::autoregressive::{
    core::params::Init,
    errors::{ArError, ArResult},
    sampler::DrawMode,
};

/// Default conditioning split for prediction-style evaluation: condition
/// on the first two-thirds of the order, evaluate on the last third.
pub const DEFAULT_CONDITIONED_FRACTION: f64 = 2.0 / 3.0;

/// Training configuration for [`ArdcaModel::fit`](crate::autoregressive::models::ardca::ArdcaModel::fit).
///
/// Fields
/// ------
/// - `learning_rate`: Adam step size (> 0).
/// - `reg_fields` / `reg_couplings`: L2 coefficients (≥ 0).
/// - `use_entropic_order`: entropic order when `true` (default), identity
///   order otherwise.
/// - `epsconv`: relative-loss convergence threshold (> 0).
/// - `max_epochs`: epoch budget (> 0).
/// - `pseudocount`: frequency-table pseudocount in (0, 1), or `None` to
///   default to `1 / effective_size` at fit time.
/// - `init`: parameter initialization policy.
/// - `seed`: RNG seed for initialization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub learning_rate: f64,
    pub reg_fields: f64,
    pub reg_couplings: f64,
    pub use_entropic_order: bool,
    pub epsconv: f64,
    pub max_epochs: usize,
    pub pseudocount: Option<f64>,
    pub init: Init,
    pub seed: u64,
}

impl FitOptions {
    /// Construct validated training options.
    ///
    /// Errors
    /// ------
    /// - [`ArError::InvalidLearningRate`] for a non-finite or ≤ 0 rate.
    /// - [`ArError::InvalidRegularization`] for a non-finite or negative
    ///   L2 coefficient (the offending one is named).
    /// - [`ArError::InvalidConvergenceThreshold`] for a non-finite or ≤ 0
    ///   `epsconv`.
    /// - [`ArError::InvalidMaxEpochs`] for a zero epoch budget.
    /// - [`ArError::InvalidPseudocount`] for a pseudocount outside (0, 1).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        learning_rate: f64,
        reg_fields: f64,
        reg_couplings: f64,
        use_entropic_order: bool,
        epsconv: f64,
        max_epochs: usize,
        pseudocount: Option<f64>,
        init: Init,
        seed: u64,
    ) -> ArResult<Self> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(ArError::InvalidLearningRate { value: learning_rate });
        }
        if !reg_fields.is_finite() || reg_fields < 0.0 {
            return Err(ArError::InvalidRegularization { name: "reg_fields", value: reg_fields });
        }
        if !reg_couplings.is_finite() || reg_couplings < 0.0 {
            return Err(ArError::InvalidRegularization {
                name: "reg_couplings",
                value: reg_couplings,
            });
        }
        if !epsconv.is_finite() || epsconv <= 0.0 {
            return Err(ArError::InvalidConvergenceThreshold { value: epsconv });
        }
        if max_epochs == 0 {
            return Err(ArError::InvalidMaxEpochs { value: max_epochs });
        }
        if let Some(pc) = pseudocount {
            if !pc.is_finite() || pc <= 0.0 || pc >= 1.0 {
                return Err(ArError::InvalidPseudocount { value: pc });
            }
        }
        Ok(Self {
            learning_rate,
            reg_fields,
            reg_couplings,
            use_entropic_order,
            epsconv,
            max_epochs,
            pseudocount,
            init,
            seed,
        })
    }
}

impl Default for FitOptions {
    /// Defaults mirroring common arDCA training setups: Adam at 1e-2,
    /// weak field penalty, stronger coupling penalty, entropic order,
    /// data-derived pseudocount.
    fn default() -> Self {
        Self {
            learning_rate: 1e-2,
            reg_fields: 1e-4,
            reg_couplings: 1e-2,
            use_entropic_order: true,
            epsconv: 1e-4,
            max_epochs: 1000,
            pseudocount: None,
            init: Init::Zeros,
            seed: 0,
        }
    }
}

/// Sampling configuration for the ancestral sampler.
///
/// Fields
/// ------
/// - `num_samples`: number of sequences to draw (> 0).
/// - `draw`: stochastic categorical draws or deterministic
///   maximum-likelihood picks.
/// - `seed`: RNG seed (ignored by [`DrawMode::MostLikely`], which is
///   deterministic by construction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleOpts {
    pub num_samples: usize,
    pub draw: DrawMode,
    pub seed: u64,
}

impl SampleOpts {
    /// Construct validated sampling options.
    ///
    /// Errors
    /// ------
    /// - [`ArError::InvalidSampleCount`] when `num_samples` is zero.
    pub fn new(num_samples: usize, draw: DrawMode, seed: u64) -> ArResult<Self> {
        if num_samples == 0 {
            return Err(ArError::InvalidSampleCount { value: num_samples });
        }
        Ok(Self { num_samples, draw, seed })
    }
}

impl Default for SampleOpts {
    fn default() -> Self {
        Self { num_samples: 1, draw: DrawMode::Stochastic, seed: 0 }
    }
}
