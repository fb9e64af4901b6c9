//! Weighted empirical frequencies with pseudocount correction.
//!
//! Purpose
//! -------
//! Compute the single-site and two-site frequency tables used for order
//! selection and model evaluation. Both are pure functions of the data:
//! nothing here mutates model state.
//!
//! Conventions
//! -----------
//! - Frequencies are weighted: `f = Σₙ wₙ xₙ / Σₙ wₙ`. A `None` weight
//!   vector means uniform weights.
//! - Pseudocount blending follows the DCA convention:
//!   `f ← (1 − pc)·f + pc/q` for single sites and `pc/q²` for pairs.
//! - `pc = 0` is legal here and yields the raw empirical tables (possibly
//!   containing exact zeros); entropy-consuming stages must therefore be
//!   called with `pc > 0`.
//! - Tables are indexed in *original* position order.
//! - The i = j diagonal block of the pair table is the single-site table
//!   on the state diagonal (a consequence of one-hot encoding); consumers
//!   that need off-diagonal statistics skip it explicitly.
use crate::autoregressive::errors::{ArError, ArResult};
use ndarray::{Array1, Array2, Array4, ArrayView1, ArrayView3, Axis};

/// Validate a pseudocount for frequency blending: finite, in [0, 1).
fn validate_pseudocount(pc: f64) -> ArResult<()> {
    if !pc.is_finite() || pc < 0.0 || pc >= 1.0 {
        return Err(ArError::InvalidPseudocount { value: pc });
    }
    Ok(())
}

fn resolve_weights(n: usize, weights: Option<ArrayView1<f64>>) -> ArResult<Array1<f64>> {
    match weights {
        Some(w) => {
            if w.len() != n {
                return Err(ArError::WeightsLengthMismatch { expected: n, actual: w.len() });
            }
            if w.sum() <= 0.0 {
                return Err(ArError::ZeroEffectiveSize);
            }
            Ok(w.to_owned())
        }
        None => Ok(Array1::ones(n)),
    }
}

/// Weighted single-site frequencies, shape (L, q), pseudocount-blended.
///
/// Errors
/// ------
/// - [`ArError::EmptyDataset`] for N = 0.
/// - [`ArError::WeightsLengthMismatch`] / [`ArError::ZeroEffectiveSize`]
///   for inconsistent weights.
/// - [`ArError::InvalidPseudocount`] for a pseudocount outside [0, 1).
pub fn single_site_freq(
    data: ArrayView3<f64>,
    weights: Option<ArrayView1<f64>>,
    pseudocount: f64,
) -> ArResult<Array2<f64>> {
    validate_pseudocount(pseudocount)?;
    let (n, l, q) = data.dim();
    if n == 0 {
        return Err(ArError::EmptyDataset);
    }
    let w = resolve_weights(n, weights)?;
    let total = w.sum();

    let mut freq = Array2::zeros((l, q));
    for (sample, &wn) in w.iter().enumerate() {
        freq += &(&data.index_axis(Axis(0), sample) * (wn / total));
    }
    if pseudocount > 0.0 {
        let uniform = pseudocount / q as f64;
        freq.mapv_inplace(|f| (1.0 - pseudocount) * f + uniform);
    }
    Ok(freq)
}

/// Weighted two-site frequencies, shape (L, q, L, q), pseudocount-blended
/// with `pc/q²`. Entry `[i, a, j, b]` is the weighted fraction of
/// sequences with state `a` at position `i` and state `b` at position `j`.
pub fn two_site_freq(
    data: ArrayView3<f64>,
    weights: Option<ArrayView1<f64>>,
    pseudocount: f64,
) -> ArResult<Array4<f64>> {
    validate_pseudocount(pseudocount)?;
    let (n, l, q) = data.dim();
    if n == 0 {
        return Err(ArError::EmptyDataset);
    }
    let w = resolve_weights(n, weights)?;
    let total = w.sum();

    // Flatten to (N, L·q) and take the weighted Gram matrix.
    let mut flat = Array2::zeros((n, l * q));
    for sample in 0..n {
        for pos in 0..l {
            for state in 0..q {
                flat[[sample, pos * q + state]] = data[[sample, pos, state]];
            }
        }
    }
    let mut weighted = flat.clone();
    for (sample, &wn) in w.iter().enumerate() {
        weighted.row_mut(sample).mapv_inplace(|v| v * wn / total);
    }
    let mut pair = flat.t().dot(&weighted);
    if pseudocount > 0.0 {
        let uniform = pseudocount / (q * q) as f64;
        pair.mapv_inplace(|f| (1.0 - pseudocount) * f + uniform);
    }
    Ok(pair
        .into_shape((l, q, l, q))
        .expect("(L*q, L*q) pair table reshape to (L, q, L, q) is infallible"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn encode(seqs: &[Vec<usize>], q: usize) -> Array3<f64> {
        let n = seqs.len();
        let l = seqs[0].len();
        let mut data = Array3::zeros((n, l, q));
        for (s, seq) in seqs.iter().enumerate() {
            for (i, &a) in seq.iter().enumerate() {
                data[[s, i, a]] = 1.0;
            }
        }
        data
    }

    #[test]
    // Purpose
    // -------
    // Uniform weights: frequencies are plain counts over N; rows sum to 1.
    fn single_site_counts_without_pseudocount() {
        let data = encode(&[vec![0, 1], vec![0, 0], vec![1, 0], vec![0, 1]], 2);
        let fi = single_site_freq(data.view(), None, 0.0).unwrap();

        assert!((fi[[0, 0]] - 0.75).abs() < 1e-12);
        assert!((fi[[1, 1]] - 0.5).abs() < 1e-12);
        for pos in 0..2 {
            let row: f64 = (0..2).map(|a| fi[[pos, a]]).sum();
            assert!((row - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // A pseudocount of zero with an unobserved state yields an exact zero
    // frequency (no division error); blending pulls it strictly positive.
    fn pseudocount_blending_lifts_zero_frequencies() {
        let data = encode(&[vec![0], vec![0]], 3); // states 1, 2 never observed
        let raw = single_site_freq(data.view(), None, 0.0).unwrap();
        assert_eq!(raw[[0, 1]], 0.0);

        let pc = 0.3;
        let blended = single_site_freq(data.view(), None, pc).unwrap();
        assert!((blended[[0, 1]] - pc / 3.0).abs() < 1e-12);
        assert!((blended[[0, 0]] - ((1.0 - pc) + pc / 3.0)).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Sample weights reweight the counts: doubling one sequence's weight
    // shifts the frequency accordingly.
    fn weights_reweight_the_counts() {
        let data = encode(&[vec![0], vec![1]], 2);
        let w = Array1::from(vec![2.0, 1.0]);
        let fi = single_site_freq(data.view(), Some(w.view()), 0.0).unwrap();
        assert!((fi[[0, 0]] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Two-site frequencies: off-diagonal blocks carry joint counts, the
    // i = j diagonal block reduces to the single-site table, and every
    // (i, j) block sums to 1.
    fn two_site_counts_are_joint_frequencies() {
        let data = encode(&[vec![0, 1], vec![0, 0], vec![1, 1], vec![0, 1]], 2);
        let fij = two_site_freq(data.view(), None, 0.0).unwrap();
        let fi = single_site_freq(data.view(), None, 0.0).unwrap();

        // P(x0 = 0, x1 = 1) = 2/4.
        assert!((fij[[0, 0, 1, 1]] - 0.5).abs() < 1e-12);
        // Diagonal block: fij[i, a, i, b] = δ_ab · fi[i, a].
        for a in 0..2 {
            for b in 0..2 {
                let expected = if a == b { fi[[0, a]] } else { 0.0 };
                assert!((fij[[0, a, 0, b]] - expected).abs() < 1e-12);
            }
        }
        // Block normalization.
        let block: f64 = (0..2)
            .flat_map(|a| (0..2).map(move |b| (a, b)))
            .map(|(a, b)| fij[[0, a, 1, b]])
            .sum();
        assert!((block - 1.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Out-of-range pseudocounts and inconsistent weights are rejected.
    fn invalid_inputs_are_rejected() {
        let data = encode(&[vec![0]], 2);
        assert!(single_site_freq(data.view(), None, 1.0).is_err());
        assert!(single_site_freq(data.view(), None, -0.1).is_err());

        let w = Array1::from(vec![1.0, 1.0]);
        let err = single_site_freq(data.view(), Some(w.view()), 0.0).unwrap_err();
        assert_eq!(err, ArError::WeightsLengthMismatch { expected: 1, actual: 2 });

        let empty = Array3::<f64>::zeros((0, 1, 2));
        assert_eq!(single_site_freq(empty.view(), None, 0.0).unwrap_err(), ArError::EmptyDataset);
        assert_eq!(two_site_freq(empty.view(), None, 0.0).unwrap_err(), ArError::EmptyDataset);
    }
}
