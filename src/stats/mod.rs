//! stats — empirical frequency statistics and evaluation metrics.
//!
//! Purpose
//! -------
//! Pure statistical functions over one-hot sequence tensors: weighted
//! single-site and two-site frequencies with pseudocount correction
//! ([`frequencies`]), and the comparison metrics used to score a fitted
//! model against data — connected two-point Pearson correlation and
//! per-position agreement ([`correlation`]).
//!
//! These functions derive target statistics and evaluation reports; they
//! never mutate model state. The single-site table additionally feeds the
//! entropic order selector, which requires a strictly positive
//! pseudocount upstream.

pub mod correlation;
pub mod frequencies;

pub use correlation::{pearson, site_agreement, two_point_correlation};
pub use frequencies::{single_site_freq, two_site_freq};
