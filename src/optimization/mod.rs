//! optimization — update rules and guarded numeric transforms.
//!
//! Purpose
//! -------
//! House the optimizer-facing building blocks of the crate: the Adam
//! update rule driven by the training loop ([`adam`]) and numerically
//! stable implementations of the normalized-exponential transforms used
//! by the conditional model ([`numerical_stability`]).
//!
//! The training loop itself lives with the model
//! (`autoregressive::models`); this module only supplies the update rule
//! and the guarded numeric kernels, keeping model semantics and
//! optimization mechanics separable.

pub mod adam;
pub mod numerical_stability;

pub use adam::Adam;
pub use numerical_stability::{stable_log_softmax_inplace, stable_softmax};
