//! Autoregressive position order: entropic and identity selection.
//!
//! Purpose
//! -------
//! Choose the permutation of positions used as the autoregressive
//! factorization order, and translate tensors between original alignment
//! indexing and order indexing.
//!
//! Key behaviors
//! -------------
//! - Entropic mode sorts positions by ascending marginal Shannon entropy:
//!   the most conserved (most predictable) positions anchor the chain.
//!   Ties break on the original position index so the order is
//!   deterministic for a given frequency table.
//! - Identity mode keeps the alignment order unchanged.
//! - [`SiteOrder`] caches the inverse permutation so sampled tensors can be
//!   returned in original indexing without a search.
//!
//! Invariants & assumptions
//! ------------------------
//! - The order is a bijection on {0, …, L−1}; constructors guarantee this.
//! - Entropy requires strictly positive frequencies: the caller must apply
//!   a pseudocount before selection, and [`SiteOrder::entropic`] rejects
//!   any non-positive entry rather than producing −inf terms.
use crate::autoregressive::errors::{ArError, ArResult};
use ndarray::{Array3, ArrayView2, ArrayView3};

/// A fixed autoregressive factorization order over L positions.
///
/// `order[rank]` is the original position emitted at step `rank`;
/// `inverse[pos]` is the rank at which original position `pos` is emitted.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOrder {
    order: Vec<usize>,
    inverse: Vec<usize>,
}

impl SiteOrder {
    /// The identity order: positions emitted in alignment order.
    pub fn identity(l: usize) -> ArResult<Self> {
        if l == 0 {
            return Err(ArError::InvalidSequenceLength { l });
        }
        let order: Vec<usize> = (0..l).collect();
        let inverse = order.clone();
        Ok(SiteOrder { order, inverse })
    }

    /// The entropic order from a pseudocount-corrected (L, q) frequency table.
    ///
    /// Positions are sorted by ascending marginal Shannon entropy
    /// `H_i = −Σ_a f_ia ln f_ia`, ties broken by position index.
    ///
    /// Errors
    /// ------
    /// - [`ArError::InvalidSequenceLength`] for an empty table.
    /// - [`ArError::NonPositiveFrequency`] if any entry is ≤ 0; the
    ///   pseudocount correction must guarantee strict positivity before
    ///   this stage.
    pub fn entropic(freq: ArrayView2<f64>) -> ArResult<Self> {
        let (l, q) = freq.dim();
        if l == 0 {
            return Err(ArError::InvalidSequenceLength { l });
        }
        let mut entropies = Vec::with_capacity(l);
        for position in 0..l {
            let mut h = 0.0;
            for state in 0..q {
                let value = freq[[position, state]];
                if value <= 0.0 {
                    return Err(ArError::NonPositiveFrequency { position, state, value });
                }
                h -= value * value.ln();
            }
            entropies.push(h);
        }
        let mut order: Vec<usize> = (0..l).collect();
        order.sort_by(|&a, &b| {
            entropies[a].total_cmp(&entropies[b]).then_with(|| a.cmp(&b))
        });
        Ok(SiteOrder::from_permutation_unchecked(order))
    }

    /// Rebuild a [`SiteOrder`] from a stored permutation, validating
    /// bijectivity. Used when loading a serialized model state.
    pub fn from_permutation(order: Vec<usize>) -> ArResult<Self> {
        let l = order.len();
        if l == 0 {
            return Err(ArError::InvalidSequenceLength { l });
        }
        let mut seen = vec![false; l];
        for &pos in &order {
            if pos >= l || seen[pos] {
                return Err(ArError::InvalidModelState {
                    reason: "stored order is not a permutation of 0..L",
                });
            }
            seen[pos] = true;
        }
        Ok(SiteOrder::from_permutation_unchecked(order))
    }

    fn from_permutation_unchecked(order: Vec<usize>) -> Self {
        let mut inverse = vec![0usize; order.len()];
        for (rank, &pos) in order.iter().enumerate() {
            inverse[pos] = rank;
        }
        SiteOrder { order, inverse }
    }

    /// Number of positions L.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the order covers no positions (never constructible).
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Original position emitted at `rank`.
    pub fn position_at(&self, rank: usize) -> usize {
        self.order[rank]
    }

    /// Rank at which original position `pos` is emitted.
    pub fn rank_of(&self, pos: usize) -> usize {
        self.inverse[pos]
    }

    /// The permutation as a slice (rank → original position).
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Reindex a one-hot tensor from original indexing into order indexing:
    /// output position `rank` holds the data of `position_at(rank)`.
    pub fn to_ordered(&self, data: ArrayView3<f64>) -> Array3<f64> {
        let (n, l, q) = data.dim();
        debug_assert_eq!(l, self.len());
        let mut out = Array3::zeros((n, l, q));
        for rank in 0..l {
            out.index_axis_mut(ndarray::Axis(1), rank)
                .assign(&data.index_axis(ndarray::Axis(1), self.order[rank]));
        }
        out
    }

    /// Reindex a one-hot tensor from order indexing back into original
    /// indexing (inverts [`SiteOrder::to_ordered`]).
    pub fn to_original(&self, ordered: ArrayView3<f64>) -> Array3<f64> {
        let (n, l, q) = ordered.dim();
        debug_assert_eq!(l, self.len());
        let mut out = Array3::zeros((n, l, q));
        for rank in 0..l {
            out.index_axis_mut(ndarray::Axis(1), self.order[rank])
                .assign(&ordered.index_axis(ndarray::Axis(1), rank));
        }
        out
    }
}
