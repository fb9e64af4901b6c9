//! Core building blocks of the autoregressive model.
//!
//! - [`data`] — validated one-hot sequence container with sample weights.
//! - [`order`] — autoregressive position orders (identity, entropic) and
//!   reindexing between original and order space.
//! - [`params`] — the masked parameter store (fields, padded couplings,
//!   causal/graph mask) and its serializable snapshot.
//! - [`conditional`] — teacher-forced conditional distributions and the
//!   single-step distribution used by the sampler.
//! - [`likelihood`] — weighted NLL, the L2-regularized training loss, and
//!   its analytic gradients.
//! - [`options`] — validated training and sampling option bundles.

pub mod conditional;
pub mod data;
pub mod likelihood;
pub mod options;
pub mod order;
pub mod params;

pub use conditional::{
    flatten_one_hot, next_state_distribution, teacher_forced_distributions,
    teacher_forced_log_distributions,
};
pub use data::SeqData;
pub use likelihood::{loss_and_grad, total_loss, weighted_nll, LossGrad};
pub use options::{FitOptions, SampleOpts, DEFAULT_CONDITIONED_FRACTION};
pub use order::SiteOrder;
pub use params::{ArParams, Init, ModelState};
