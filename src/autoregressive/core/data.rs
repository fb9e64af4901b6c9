//! One-hot sequence data containers for arDCA models.
//!
//! Purpose
//! -------
//! Provide a small, validated container for aligned categorical sequence
//! data in one-hot encoding, together with per-sample reweighting. This
//! module centralizes input validation so downstream code (likelihood,
//! order selection, statistics) can assume clean tensors.
//!
//! Key behaviors
//! -------------
//! - [`SeqData`] enforces the one-hot invariant (exactly one 1 per
//!   (sample, position) slice, all entries 0 or 1) and weight invariants
//!   (finite, non-negative, positive sum).
//! - The effective sample size is the sum of weights; it doubles as the
//!   default pseudocount scale (`pc = 1 / effective_size`).
//!
//! Conventions
//! -----------
//! - Tensors are shaped (N, L, q): N sequences, L positions, q states.
//! - Positions are indexed in *original* alignment order; reindexing into
//!   the autoregressive order is the job of `core::order`.
//! - Encoding and tokenization happen upstream; this type validates, it
//!   never re-encodes.
use crate::autoregressive::errors::{ArError, ArResult};
use ndarray::{Array1, Array3};

/// Tolerance for the one-hot row-sum check. Encoders emit exact 0/1
/// values, so this only absorbs representation noise.
const ONE_HOT_TOL: f64 = 1e-9;

/// Validated one-hot sequence tensor plus per-sample weights.
///
/// Purpose
/// -------
/// Represent a weighted multiple-sequence alignment in one-hot encoding,
/// with all structural invariants checked at construction time.
///
/// Fields
/// ------
/// - `data`: `Array3<f64>` of shape (N, L, q); each (n, i) slice is
///   exactly one-hot.
/// - `weights`: `Array1<f64>` of length N; finite, non-negative, with a
///   strictly positive sum.
///
/// Invariants
/// ----------
/// - `N > 0`, `L > 0`, `q >= 2`.
/// - `weights.len() == N` and `weights.sum() > 0`.
/// - Every (sample, position) slice contains exactly one 1 and q − 1 zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct SeqData {
    /// One-hot encoded sequences, shape (N, L, q).
    pub data: Array3<f64>,
    /// Per-sample weights (redundancy reweighting), length N.
    pub weights: Array1<f64>,
}

impl SeqData {
    /// Construct a validated [`SeqData`] from a one-hot tensor and weights.
    ///
    /// Parameters
    /// ----------
    /// - `data`: one-hot tensor of shape (N, L, q).
    /// - `weights`: per-sample weights of length N.
    ///
    /// Errors
    /// ------
    /// - [`ArError::EmptyDataset`] when N = 0.
    /// - [`ArError::InvalidSequenceLength`] when L = 0.
    /// - [`ArError::InvalidAlphabetSize`] when q < 2.
    /// - [`ArError::WeightsLengthMismatch`] when `weights.len() != N`.
    /// - [`ArError::NonFiniteWeight`] / [`ArError::NegativeWeight`] on the
    ///   first offending weight.
    /// - [`ArError::ZeroEffectiveSize`] when all weights are zero.
    /// - [`ArError::NotOneHot`] on the first (sample, position) slice that
    ///   is not exactly one-hot.
    pub fn new(data: Array3<f64>, weights: Array1<f64>) -> ArResult<Self> {
        let (n, l, q) = data.dim();
        if n == 0 {
            return Err(ArError::EmptyDataset);
        }
        if l == 0 {
            return Err(ArError::InvalidSequenceLength { l });
        }
        if q < 2 {
            return Err(ArError::InvalidAlphabetSize { q });
        }
        if weights.len() != n {
            return Err(ArError::WeightsLengthMismatch { expected: n, actual: weights.len() });
        }

        for (index, &value) in weights.iter().enumerate() {
            if !value.is_finite() {
                return Err(ArError::NonFiniteWeight { index, value });
            }
            if value < 0.0 {
                return Err(ArError::NegativeWeight { index, value });
            }
        }
        if weights.sum() <= 0.0 {
            return Err(ArError::ZeroEffectiveSize);
        }

        for sample in 0..n {
            for position in 0..l {
                let mut sum = 0.0;
                let mut ones = 0usize;
                for state in 0..q {
                    let v = data[[sample, position, state]];
                    if v != 0.0 && (v - 1.0).abs() > ONE_HOT_TOL {
                        return Err(ArError::NotOneHot { sample, position });
                    }
                    if v != 0.0 {
                        ones += 1;
                    }
                    sum += v;
                }
                if ones != 1 || (sum - 1.0).abs() > ONE_HOT_TOL {
                    return Err(ArError::NotOneHot { sample, position });
                }
            }
        }

        Ok(SeqData { data, weights })
    }

    /// Construct a [`SeqData`] with unit weight on every sequence.
    pub fn with_uniform_weights(data: Array3<f64>) -> ArResult<Self> {
        let n = data.dim().0;
        SeqData::new(data, Array1::ones(n))
    }

    /// Number of sequences N.
    pub fn num_sequences(&self) -> usize {
        self.data.dim().0
    }

    /// Sequence length L.
    pub fn seq_len(&self) -> usize {
        self.data.dim().1
    }

    /// Alphabet size q.
    pub fn num_states(&self) -> usize {
        self.data.dim().2
    }

    /// Effective sample size: the sum of the per-sample weights.
    ///
    /// Strictly positive by construction; used as the normalizer in the
    /// weighted likelihood and as the default pseudocount scale.
    pub fn effective_size(&self) -> f64 {
        self.weights.sum()
    }
}
