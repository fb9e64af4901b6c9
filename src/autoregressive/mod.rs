//! autoregressive — arDCA stack: core numerics, models, sampler, and errors.
//!
//! Purpose
//! -------
//! Provide a cohesive autoregressive DCA layer that bundles validated data
//! containers, position orders, the masked parameter store, conditional
//! distributions, likelihood/gradient numerics, the training-loop model
//! type, and ancestral sampling under a single namespace. This is the main
//! entry point for arDCA models in the crate and the surface most
//! consumers should depend on.
//!
//! Key behaviors
//! -------------
//! - Collect core numerical and structural building blocks in [`core`]:
//!   one-hot sequence data with sample weights, identity/entropic orders,
//!   the causally masked parameter store with its serializable snapshot,
//!   teacher-forced conditionals, and the L2-regularized weighted NLL with
//!   analytic gradients.
//! - Expose the user-facing model API in [`models`] via [`ArdcaModel`]:
//!   fitting with Adam, held-out tracking, ML prediction, evaluation, and
//!   state persistence.
//! - Draw sequences position-by-position in [`sampler`], free or seeded,
//!   stochastic or most-likely.
//! - Centralize arDCA error types in [`errors`] ([`ArError`] and the
//!   [`ArResult`] alias) so callers see a uniform error surface.
//!
//! Invariants & assumptions
//! ------------------------
//! - Sequence data are carried in validated [`SeqData`] instances: exactly
//!   one-hot per (sample, position), finite non-negative weights with a
//!   positive sum.
//! - The autoregressive factorization follows a [`SiteOrder`] permutation;
//!   the coupling mask zeroes every (rank i, rank j) block with j ≥ i, so
//!   position i's conditional depends only on earlier ranks. An optional
//!   restriction graph further zeroes disallowed position pairs.
//! - All softmax/log-softmax evaluations subtract the row maximum first;
//!   conditionals are finite for finite parameters.
//! - Parameter tensors use the flat index `rank·q + state` throughout.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based. "Original" indexing is the position order of the
//!   input data; "order" indexing is the fitted permutation. Public inputs
//!   and outputs are in original indexing; reindexing happens exactly once
//!   on entry and once on exit.
//! - The stack performs no I/O beyond the JSON snapshot helpers and no
//!   logging; callers orchestrate persistence. Error conditions surface as
//!   [`ArResult`]; panics indicate programming errors such as internal
//!   shape mismatches.
//!
//! Downstream usage
//! ----------------
//! - Typical end-to-end flow:
//!   1. Encode sequences one-hot and construct [`SeqData`] (with weights
//!      or `with_uniform_weights`).
//!   2. Build [`FitOptions`] and an [`ArdcaModel`] via `ArdcaModel::new`.
//!   3. Fit with `fit(&data, holdout)`; inspect the [`FitReport`].
//!   4. Use `sample` / `sample_conditioned` / `predict_ml` for generation
//!      and `evaluate` for the two-point/agreement report.
//!   5. Persist with `state()` + `ModelState::to_json`, restore with
//!      `ArdcaModel::from_state`.
//! - Advanced callers can work directly with submodules (e.g.
//!   `core::conditional`, `core::likelihood`) when they need lower-level
//!   control over distributions or gradients.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`core`] cover data validation, order selection and
//!   reindexing round-trips, mask construction under restriction graphs,
//!   conditional normalization and causality, and analytic gradients
//!   against central finite differences.
//! - Unit tests in [`models`] cover the training state machine (both
//!   terminal states plus divergence), held-out tracking, prediction,
//!   evaluation, and snapshot round-trips; [`sampler`] tests cover
//!   one-hot output, seed determinism, and prefix preservation.

pub mod core;
pub mod errors;
pub mod models;
pub mod sampler;

// ---- Re-exports (primary public surface) ----------------------------------
//
// The everyday types most users need. Lower-level numerics (conditionals,
// gradients, frequency helpers) remain under their submodules.

pub use self::core::{
    ArParams, FitOptions, Init, ModelState, SampleOpts, SeqData, SiteOrder,
    DEFAULT_CONDITIONED_FRACTION,
};

pub use self::errors::{ArError, ArResult};

pub use self::models::{ArdcaModel, EvalReport, FitReport, FitStatus};

pub use self::sampler::{ancestral_sample, ancestral_sample_conditioned, DrawMode};
