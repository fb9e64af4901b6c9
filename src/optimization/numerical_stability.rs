//! Numerical stability utilities.
//!
//! Provides guarded implementations of the normalized-exponential family
//! of transforms used throughout the likelihood and sampler. The naive
//! forms overflow for large scores; the functions here subtract the row
//! maximum before exponentiating, the standard strategy in major ML
//! libraries, keeping `f64` arithmetic in a well-conditioned regime for
//! arbitrary coupling magnitudes.

use ndarray::{Array1, ArrayView1, ArrayViewMut1};

/// Numerically stable softmax over a score vector.
///
/// Computes `p_a = exp(s_a − max) / Σ_b exp(s_b − max)`. The shift leaves
/// the distribution unchanged while guaranteeing at least one unit term in
/// the denominator, so the result is a valid distribution for any finite
/// scores, however large.
pub fn stable_softmax(scores: ArrayView1<f64>) -> Array1<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mut out = scores.mapv(|s| (s - max).exp());
    let norm = out.sum();
    out /= norm;
    out
}

/// In-place stable log-softmax over a score vector.
///
/// Replaces each score `s_a` with `s_a − max − ln Σ_b exp(s_b − max)`.
/// Used by the likelihood engine, where the log-probability of the true
/// state is accumulated directly without materializing the distribution.
pub fn stable_log_softmax_inplace(mut scores: ArrayViewMut1<f64>) {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let log_norm = scores.iter().map(|s| (s - max).exp()).sum::<f64>().ln();
    scores.mapv_inplace(|s| s - max - log_norm);
}
