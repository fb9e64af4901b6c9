//! Likelihood and regularization engine: weighted NLL with analytic gradient.
//!
//! Purpose
//! -------
//! Aggregate the per-position, per-sample conditional log-probabilities of
//! the observed states (teacher-forcing on the real one-hot data) into the
//! single scalar training loss
//!
//! `loss = −(1/W) Σₙ Σᵢ wₙ · log P(xₙᵢ | prefix) + reg_h‖h‖² + reg_J‖J‖²`
//!
//! with `W = Σ wₙ`, and produce the analytic gradient in the same pass:
//!
//! - `∂loss/∂h      = (1/W) Σₙ wₙ (pₙ − xₙ) + 2·reg_h·h`
//! - `∂loss/∂J      = (1/W) (w ∘ (p − x))ᵀ · X_flat ⊙ mask + 2·reg_J·J`
//!
//! where `p` are the teacher-forced conditional distributions. The L2
//! penalty runs over fields and *allowed* couplings only (masked entries
//! are exactly zero, so the padded norm equals the allowed norm).
//!
//! Conventions
//! -----------
//! - The likelihood consumes the raw one-hot data; the pseudocount belongs
//!   to the frequency statistics used for evaluation and order selection,
//!   never to the per-sample likelihood.
//! - Everything here is in order indexing; callers reindex via `SiteOrder`.
use crate::autoregressive::{
    core::{conditional::teacher_forced_log_distributions, params::ArParams},
    errors::{ArError, ArResult},
};
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayView3, Axis};

/// Scalar loss plus its analytic gradient, produced in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LossGrad {
    /// Total loss: weighted NLL + L2 penalties.
    pub loss: f64,
    /// Weighted negative log-likelihood component alone.
    pub nll: f64,
    /// Gradient with respect to the fields, shape (L, q).
    pub grad_fields: Array2<f64>,
    /// Masked gradient with respect to the couplings, shape (L·q, L·q).
    pub grad_couplings: Array2<f64>,
}

/// Check that data and weights agree with the parameter store's shape.
fn validate_shapes(
    params: &ArParams,
    x_ordered: ArrayView3<f64>,
    weights: ArrayView1<f64>,
) -> ArResult<()> {
    let (n, l, q) = x_ordered.dim();
    if (l, q) != (params.seq_len(), params.num_states()) {
        return Err(ArError::DataShapeMismatch {
            expected: (params.seq_len(), params.num_states()),
            actual: (l, q),
        });
    }
    if weights.len() != n {
        return Err(ArError::WeightsLengthMismatch { expected: n, actual: weights.len() });
    }
    if n == 0 {
        return Err(ArError::EmptyDataset);
    }
    if weights.sum() <= 0.0 {
        return Err(ArError::ZeroEffectiveSize);
    }
    Ok(())
}

/// Weighted negative log-likelihood of the data under the current
/// parameters (forward pass only, no regularization). Used for held-out
/// tracking during training.
pub fn weighted_nll(
    params: &ArParams,
    x_ordered: ArrayView3<f64>,
    x_flat: ArrayView2<f64>,
    weights: ArrayView1<f64>,
) -> ArResult<f64> {
    validate_shapes(params, x_ordered, weights)?;
    let total_weight = weights.sum();
    let logp = teacher_forced_log_distributions(params, x_flat);
    let mut nll = 0.0;
    for (sample, w) in weights.iter().enumerate() {
        let mut per_sample = 0.0;
        for rank in 0..params.seq_len() {
            for state in 0..params.num_states() {
                per_sample += x_ordered[[sample, rank, state]] * logp[[sample, rank, state]];
            }
        }
        nll -= w * per_sample;
    }
    Ok(nll / total_weight)
}

/// Total training loss with L2 penalties (forward pass only).
pub fn total_loss(
    params: &ArParams,
    x_ordered: ArrayView3<f64>,
    x_flat: ArrayView2<f64>,
    weights: ArrayView1<f64>,
    reg_fields: f64,
    reg_couplings: f64,
) -> ArResult<f64> {
    let nll = weighted_nll(params, x_ordered, x_flat, weights)?;
    Ok(nll + reg_fields * params.fields_sq_norm() + reg_couplings * params.couplings_sq_norm())
}

/// Loss and analytic gradient in a single teacher-forced pass.
///
/// The returned coupling gradient is already masked; the field gradient is
/// dense. Both include their L2 terms.
pub fn loss_and_grad(
    params: &ArParams,
    x_ordered: ArrayView3<f64>,
    x_flat: ArrayView2<f64>,
    weights: ArrayView1<f64>,
    reg_fields: f64,
    reg_couplings: f64,
) -> ArResult<LossGrad> {
    validate_shapes(params, x_ordered, weights)?;
    let (n, l, q) = x_ordered.dim();
    let total_weight = weights.sum();

    let logp = teacher_forced_log_distributions(params, x_flat);

    // NLL over the true states.
    let mut nll = 0.0;
    for (sample, w) in weights.iter().enumerate() {
        let mut per_sample = 0.0;
        for rank in 0..l {
            for state in 0..q {
                per_sample += x_ordered[[sample, rank, state]] * logp[[sample, rank, state]];
            }
        }
        nll -= w * per_sample;
    }
    nll /= total_weight;

    // Weighted residual (p − x) · wₙ / W, flattened to (N, L·q).
    let mut delta = Array2::zeros((n, l * q));
    for sample in 0..n {
        let scale = weights[sample] / total_weight;
        for rank in 0..l {
            for state in 0..q {
                let p = logp[[sample, rank, state]].exp();
                delta[[sample, rank * q + state]] =
                    scale * (p - x_ordered[[sample, rank, state]]);
            }
        }
    }

    // Field gradient: column sums of the residual, plus the L2 term.
    let mut grad_fields = delta
        .sum_axis(Axis(0))
        .into_shape((l, q))
        .expect("(L*q) residual sum reshape to (L, q) is infallible");
    grad_fields += &(&params.fields() * (2.0 * reg_fields));

    // Coupling gradient: residualᵀ · X, masked, plus the L2 term (the
    // parameters are already masked, so the penalty term is masked too).
    let mut grad_couplings = delta.t().dot(&x_flat);
    grad_couplings += &(&params.couplings() * (2.0 * reg_couplings));
    params.mask_gradient(&mut grad_couplings);

    let loss =
        nll + reg_fields * params.fields_sq_norm() + reg_couplings * params.couplings_sq_norm();
    Ok(LossGrad { loss, nll, grad_fields, grad_couplings })
}
