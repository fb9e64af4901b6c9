//! Conditional categorical distributions of the autoregressive model.
//!
//! Purpose
//! -------
//! Compute, for each position in the order, the categorical distribution
//! over the q states given the one-hot prefix of preceding positions and
//! the parameter store. Two call shapes cover the two consumers:
//!
//! - Teacher-forced batch pass (training): prefixes come from the real
//!   data, so all N samples and all L positions are handled in one padded
//!   matrix product `scores = X · Jᵀ + h`. The validity mask guarantees
//!   that blocks with rank j ≥ i contribute nothing, which is exactly the
//!   causal factorization: position i sees only its order predecessors,
//!   and rank 0 sees only its field.
//! - Single-step pass (sampling): one rank at a time against a partially
//!   filled prefix.
//!
//! Numerical requirement: all normalizations subtract the row maximum
//! before exponentiating (see `optimization::numerical_stability`), so
//! distributions stay valid for arbitrarily large coupling magnitudes.
use crate::{
    autoregressive::core::params::ArParams,
    optimization::numerical_stability::{stable_log_softmax_inplace, stable_softmax},
};
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis, s};

/// Flatten an order-indexed one-hot tensor (N, L, q) into the (N, L·q)
/// layout used by the padded matrix product.
pub fn flatten_one_hot(ordered: ArrayView3<f64>) -> Array2<f64> {
    let (n, l, q) = ordered.dim();
    let mut flat = Array2::zeros((n, l * q));
    for sample in 0..n {
        for rank in 0..l {
            for state in 0..q {
                flat[[sample, rank * q + state]] = ordered[[sample, rank, state]];
            }
        }
    }
    flat
}

/// Teacher-forced unnormalized scores for every (sample, rank, state):
/// `scores = X_flat · Jᵀ + h_flat`, shape (N, L·q).
pub fn teacher_forced_scores(params: &ArParams, x_flat: ArrayView2<f64>) -> Array2<f64> {
    let mut scores = x_flat.dot(&params.couplings().t());
    scores += &params.fields_flat();
    scores
}

/// Teacher-forced conditional distributions, shape (N, L, q). Each
/// (sample, rank) slice is a categorical distribution over the q states.
pub fn teacher_forced_distributions(params: &ArParams, x_flat: ArrayView2<f64>) -> Array3<f64> {
    let (n, lq) = x_flat.dim();
    let q = params.num_states();
    let l = params.seq_len();
    debug_assert_eq!(lq, l * q);
    let scores = teacher_forced_scores(params, x_flat);
    let mut probs = Array3::zeros((n, l, q));
    for sample in 0..n {
        for rank in 0..l {
            let row = scores.slice(s![sample, rank * q..(rank + 1) * q]);
            probs.slice_mut(s![sample, rank, ..]).assign(&stable_softmax(row));
        }
    }
    probs
}

/// Teacher-forced log-distributions, shape (N, L, q), computed in place
/// from the score tensor. Used by the likelihood engine.
pub fn teacher_forced_log_distributions(params: &ArParams, x_flat: ArrayView2<f64>) -> Array3<f64> {
    let n = x_flat.dim().0;
    let q = params.num_states();
    let l = params.seq_len();
    let mut scores = teacher_forced_scores(params, x_flat);
    for sample in 0..n {
        for rank in 0..l {
            stable_log_softmax_inplace(scores.slice_mut(s![sample, rank * q..(rank + 1) * q]));
        }
    }
    scores
        .into_shape((n, l, q))
        .expect("(N, L*q) scores reshape to (N, L, q) is infallible")
}

/// Conditional distribution over states at `rank`, given a flat one-hot
/// prefix of length L·q whose entries at ranks ≥ `rank` may be anything
/// (the validity mask ignores them). Shape (q).
pub fn next_state_distribution(
    params: &ArParams,
    prefix_flat: ArrayView1<f64>,
    rank: usize,
) -> Array1<f64> {
    let q = params.num_states();
    let fields = params.fields();
    let mut scores = Array1::zeros(q);
    for state in 0..q {
        let row = params.couplings().index_axis(Axis(0), rank * q + state).dot(&prefix_flat);
        scores[state] = fields[[rank, state]] + row;
    }
    stable_softmax(scores.view())
}
