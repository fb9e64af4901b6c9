//! ardca — autoregressive Direct Coupling Analysis for categorical sequences.
//!
//! Purpose
//! -------
//! Serve as the crate root for the arDCA stack: generative autoregressive
//! models over fixed-length categorical sequences (protein families and
//! similar alignments), fitted by weighted maximum likelihood with L2
//! regularization and an explicit causal mask.
//!
//! Key behaviors
//! -------------
//! - Re-export the core module trees ([`autoregressive`], [`optimization`],
//!   [`stats`]) as the public crate surface.
//! - [`autoregressive`] carries the model itself: data containers, orders,
//!   the masked parameter store, conditionals, the likelihood engine, the
//!   training loop, and the ancestral sampler.
//! - [`optimization`] carries the Adam optimizer and the numerically
//!   stable softmax primitives shared across the stack.
//! - [`stats`] carries weighted frequency tables with pseudocount
//!   correction and the evaluation metrics (connected two-point Pearson
//!   correlation, per-position agreement).
//!
//! Invariants & assumptions
//! ------------------------
//! - All heavy numerics run on `ndarray` tensors of `f64`; one-hot data
//!   enters through validated constructors and is trusted downstream.
//! - Randomness (Gaussian initialization, stochastic sampling) is always
//!   seeded; identical inputs and seeds reproduce identical results.
//!
//! Downstream usage
//! ----------------
//! - Most callers should depend on [`autoregressive`] (or its re-exports
//!   here) and drive everything through [`ArdcaModel`].
//! - Lower-level numerics are public for callers that need direct access
//!   to conditionals, gradients, or frequency tables.

pub mod autoregressive;
pub mod optimization;
pub mod stats;

pub use autoregressive::{
    ArError, ArResult, ArdcaModel, DrawMode, EvalReport, FitOptions, FitReport, FitStatus, Init,
    ModelState, SampleOpts, SeqData, SiteOrder,
};
