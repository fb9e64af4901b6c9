//! Correlation and agreement metrics for model evaluation.
//!
//! Purpose
//! -------
//! Score a fitted model against empirical data: Pearson correlation of
//! connected two-point statistics between two frequency sets, and the
//! per-position agreement between predicted and observed sequences. Pure
//! functions; they never mutate model state.
//!
//! Conventions
//! -----------
//! - The two-point comparison uses connected correlations
//!   `C[i, a, j, b] = f_ij − f_i ⊗ f_j` and runs over i ≠ j position
//!   pairs only; the self-pair diagonal is excluded.
//! - Pearson correlation of a constant series is defined as 0 here (no
//!   linear association can be measured).
use crate::autoregressive::errors::{ArError, ArResult};
use ndarray::{Array1, ArrayView2, ArrayView3, ArrayView4};

/// Pearson correlation coefficient between two equally long slices.
///
/// Returns 0 when either side has zero variance. Errors with
/// [`ArError::FrequencyShapeMismatch`] on length disagreement.
pub fn pearson(xs: &[f64], ys: &[f64]) -> ArResult<f64> {
    if xs.len() != ys.len() {
        return Err(ArError::FrequencyShapeMismatch { context: "pearson inputs differ in length" });
    }
    let n = xs.len();
    if n == 0 {
        return Err(ArError::FrequencyShapeMismatch { context: "pearson inputs are empty" });
    }
    let nf = n as f64;
    let mean_x = xs.iter().sum::<f64>() / nf;
    let mean_y = ys.iter().sum::<f64>() / nf;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return Ok(0.0);
    }
    Ok(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Pearson correlation of connected two-point statistics between two
/// frequency sets (typically empirical vs. model samples).
///
/// For each set, builds `C[i, a, j, b] = fij[i, a, j, b] − fi[i, a] ·
/// fi[j, b]` over all i ≠ j position pairs, then correlates the two
/// flattened collections.
///
/// Errors
/// ------
/// - [`ArError::FrequencyShapeMismatch`] when the two sets disagree in
///   shape, or a pair table disagrees with its single-site table.
pub fn two_point_correlation(
    fi_a: ArrayView2<f64>,
    fij_a: ArrayView4<f64>,
    fi_b: ArrayView2<f64>,
    fij_b: ArrayView4<f64>,
) -> ArResult<f64> {
    let (l, q) = fi_a.dim();
    if fi_b.dim() != (l, q) {
        return Err(ArError::FrequencyShapeMismatch {
            context: "single-site tables differ in shape",
        });
    }
    if fij_a.dim() != (l, q, l, q) || fij_b.dim() != (l, q, l, q) {
        return Err(ArError::FrequencyShapeMismatch {
            context: "pair tables disagree with the single-site shape",
        });
    }

    let pairs = l * (l - 1) * q * q;
    let mut ca = Vec::with_capacity(pairs);
    let mut cb = Vec::with_capacity(pairs);
    for i in 0..l {
        for j in 0..l {
            if i == j {
                continue;
            }
            for a in 0..q {
                for b in 0..q {
                    ca.push(fij_a[[i, a, j, b]] - fi_a[[i, a]] * fi_a[[j, b]]);
                    cb.push(fij_b[[i, a, j, b]] - fi_b[[i, a]] * fi_b[[j, b]]);
                }
            }
        }
    }
    pearson(&ca, &cb)
}

/// Per-position agreement between two one-hot tensors: the weighted-free
/// fraction of samples whose argmax state matches at each position.
/// Shape (L).
pub fn site_agreement(x: ArrayView3<f64>, y: ArrayView3<f64>) -> ArResult<Array1<f64>> {
    if x.dim() != y.dim() {
        return Err(ArError::FrequencyShapeMismatch {
            context: "agreement inputs differ in shape",
        });
    }
    let (n, l, q) = x.dim();
    if n == 0 {
        return Err(ArError::EmptyDataset);
    }
    let mut agreement = Array1::zeros(l);
    for pos in 0..l {
        let mut matches = 0usize;
        for sample in 0..n {
            let ax = argmax_state(&x, sample, pos, q);
            let ay = argmax_state(&y, sample, pos, q);
            if ax == ay {
                matches += 1;
            }
        }
        agreement[pos] = matches as f64 / n as f64;
    }
    Ok(agreement)
}

fn argmax_state(t: &ArrayView3<f64>, sample: usize, pos: usize, q: usize) -> usize {
    let mut best = 0;
    for state in 1..q {
        if t[[sample, pos, state]] > t[[sample, pos, best]] {
            best = state;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::frequencies::{single_site_freq, two_site_freq};
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
    // Pearson basics: perfect positive and negative correlation, constant
    // series defined as zero, length mismatch rejected.
    fn pearson_behaves_on_reference_inputs() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&xs, &up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &down).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&xs, &[1.0; 4]).unwrap(), 0.0);
        assert!(pearson(&xs, &[1.0, 2.0]).is_err());
    }

    #[test]
    // Purpose
    // -------
    // A frequency set correlates perfectly with itself: identical
    // empirical and "model" statistics give Pearson 1.
    fn identical_statistics_give_unit_correlation() {
        let data = encode(
            &[vec![0, 1, 1], vec![1, 0, 1], vec![0, 0, 0], vec![1, 1, 0], vec![0, 1, 0]],
            2,
        );
        let fi = single_site_freq(data.view(), None, 0.01).unwrap();
        let fij = two_site_freq(data.view(), None, 0.01).unwrap();

        let r =
            two_point_correlation(fi.view(), fij.view(), fi.view(), fij.view()).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // Shape disagreements between the two frequency sets are rejected.
    fn mismatched_statistics_are_rejected() {
        let a = encode(&[vec![0, 1], vec![1, 0]], 2);
        let b = encode(&[vec![0, 1, 0], vec![1, 0, 1]], 2);
        let fi_a = single_site_freq(a.view(), None, 0.0).unwrap();
        let fij_a = two_site_freq(a.view(), None, 0.0).unwrap();
        let fi_b = single_site_freq(b.view(), None, 0.0).unwrap();
        let fij_b = two_site_freq(b.view(), None, 0.0).unwrap();

        assert!(
            two_point_correlation(fi_a.view(), fij_a.view(), fi_b.view(), fij_b.view()).is_err()
        );
    }

    #[test]
    // Purpose
    // -------
    // Agreement: identical tensors agree everywhere; a flipped position
    // shows up in exactly that coordinate.
    fn site_agreement_counts_argmax_matches() {
        let x = encode(&[vec![0, 1], vec![1, 0]], 2);
        let full = site_agreement(x.view(), x.view()).unwrap();
        assert!(full.iter().all(|&v| (v - 1.0).abs() < 1e-12));

        let mut y = x.clone();
        // Flip sample 0, position 1.
        y[[0, 1, 1]] = 0.0;
        y[[0, 1, 0]] = 1.0;
        let partial = site_agreement(x.view(), y.view()).unwrap();
        assert!((partial[0] - 1.0).abs() < 1e-12);
        assert!((partial[1] - 0.5).abs() < 1e-12);
    }
}
