//! Ancestral sampling from a fitted autoregressive model.
//!
//! Purpose
//! -------
//! Draw sequences position-by-position following the autoregressive
//! order: each position's state is drawn from the conditional distribution
//! given all previously determined positions, then fixed into the prefix
//! for the positions that follow. The loop is one reusable routine
//! parameterized by two orthogonal flags:
//!
//! - *Conditioning*: free sampling from rank 0, or a seeded prefix whose
//!   first k ordered positions are read from supplied data.
//! - *Draw mode*: categorical sampling ([`DrawMode::Stochastic`]) or the
//!   deterministic most-probable state ([`DrawMode::MostLikely`]),
//!   producing a point-estimate prediction instead of a stochastic sample.
//!
//! The position loop is inherently sequential (each rank conditions on
//! the previous ones); samples are independent of each other. Output is
//! returned in *original* position indexing via the inverse permutation.
//!
//! Determinism: `MostLikely` is deterministic given parameters and seed
//! data; `Stochastic` is reproducible under a fixed RNG seed.
use crate::autoregressive::{
    core::{conditional::next_state_distribution, options::SampleOpts, order::SiteOrder,
        params::ArParams},
    errors::{ArError, ArResult},
};
use ndarray::{Array2, Array3, ArrayView3};
use rand::{SeedableRng, distributions::{Distribution, WeightedIndex}, rngs::StdRng};

/// How a state is chosen from a conditional distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Draw from the categorical distribution (seeded RNG).
    Stochastic,
    /// Pick the most probable state; ties resolve to the lowest index.
    MostLikely,
}

/// Free ancestral sampling: draw `opts.num_samples` sequences starting
/// from rank 0. Returns a one-hot tensor (N, L, q) in original indexing.
pub fn ancestral_sample(
    params: &ArParams,
    order: &SiteOrder,
    opts: &SampleOpts,
) -> ArResult<Array3<f64>> {
    if opts.num_samples == 0 {
        return Err(ArError::InvalidSampleCount { value: opts.num_samples });
    }
    run_loop(params, order, opts, None)
}

/// Seeded ancestral sampling: the first `conditioned` positions in order
/// are copied from `seed` (one-hot, original indexing, shape (N, L, q));
/// the remaining ranks are drawn per `opts.draw`. The output has one
/// sequence per seed sequence.
pub fn ancestral_sample_conditioned(
    params: &ArParams,
    order: &SiteOrder,
    opts: &SampleOpts,
    seed: ArrayView3<f64>,
    conditioned: usize,
) -> ArResult<Array3<f64>> {
    let (_, l, q) = seed.dim();
    if (l, q) != (params.seq_len(), params.num_states()) {
        return Err(ArError::DataShapeMismatch {
            expected: (params.seq_len(), params.num_states()),
            actual: (l, q),
        });
    }
    if conditioned > l {
        return Err(ArError::ConditioningOutOfRange { conditioned, l });
    }
    run_loop(params, order, opts, Some((seed, conditioned)))
}

/// The shared ancestral loop. `conditioning` carries the seed tensor and
/// the number of leading ranks it fixes; `None` means free sampling.
fn run_loop(
    params: &ArParams,
    order: &SiteOrder,
    opts: &SampleOpts,
    conditioning: Option<(ArrayView3<f64>, usize)>,
) -> ArResult<Array3<f64>> {
    let l = params.seq_len();
    let q = params.num_states();
    let (n, first_free) = match conditioning {
        Some((seed, k)) => (seed.dim().0, k),
        None => (opts.num_samples, 0),
    };
    if n == 0 {
        return Err(ArError::EmptyDataset);
    }

    // Flat one-hot prefix per sample, order indexing. Conditioned ranks
    // are copied verbatim from the seed.
    let mut prefix = Array2::zeros((n, l * q));
    if let Some((seed, k)) = conditioning {
        for sample in 0..n {
            for rank in 0..k {
                let pos = order.position_at(rank);
                for state in 0..q {
                    prefix[[sample, rank * q + state]] = seed[[sample, pos, state]];
                }
            }
        }
    }

    let mut rng = StdRng::seed_from_u64(opts.seed);
    for rank in first_free..l {
        for sample in 0..n {
            let dist = next_state_distribution(params, prefix.row(sample), rank);
            let state = match opts.draw {
                DrawMode::Stochastic => {
                    let weighted = WeightedIndex::new(dist.iter().cloned())
                        .map_err(|_| ArError::DegenerateDistribution { rank })?;
                    weighted.sample(&mut rng)
                }
                DrawMode::MostLikely => argmax(dist.as_slice().unwrap_or(&[])),
            };
            prefix[[sample, rank * q + state]] = 1.0;
        }
    }

    // Back to (N, L, q) and into original position indexing.
    let ordered = prefix
        .into_shape((n, l, q))
        .expect("(N, L*q) prefix reshape to (N, L, q) is infallible");
    Ok(order.to_original(ordered.view()))
}

/// Index of the maximum entry; ties resolve to the lowest index.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (idx, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autoregressive::core::{
        options::SampleOpts,
        params::{ArParams, Init},
    };
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

    fn assert_one_hot(samples: &Array3<f64>) {
        let (n, l, q) = samples.dim();
        for s in 0..n {
            for i in 0..l {
                let sum: f64 = (0..q).map(|a| samples[[s, i, a]]).sum();
                assert_eq!(sum, 1.0, "exactly one state per (sample, position)");
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Free sampling returns valid one-hot output with the requested
    // number of sequences, and identical seeds reproduce identical draws.
    fn sampling_is_one_hot_and_seed_deterministic() {
        let order = SiteOrder::identity(4).unwrap();
        let params = ArParams::new(&order, 3, None, Init::Normal { std: 0.7 }, 21).unwrap();
        let opts = SampleOpts::new(8, DrawMode::Stochastic, 99).unwrap();

        let a = ancestral_sample(&params, &order, &opts).unwrap();
        let b = ancestral_sample(&params, &order, &opts).unwrap();
        assert_eq!(a.dim(), (8, 4, 3));
        assert_one_hot(&a);
        assert_eq!(a, b);

        // A different seed should (with these parameters) change something.
        let other = SampleOpts::new(8, DrawMode::Stochastic, 100).unwrap();
        let c = ancestral_sample(&params, &order, &other).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    // Purpose
    // -------
    // Under the uniform (all-zero) model, MostLikely resolves every tie
    // to state 0 at every position — the fully deterministic baseline.
    fn most_likely_mode_is_deterministic_argmax() {
        let order = SiteOrder::identity(3).unwrap();
        let params = ArParams::new(&order, 2, None, Init::Zeros, 0).unwrap();
        let opts = SampleOpts::new(4, DrawMode::MostLikely, 123).unwrap();

        let out = ancestral_sample(&params, &order, &opts).unwrap();
        for s in 0..4 {
            for i in 0..3 {
                assert_eq!(out[[s, i, 0]], 1.0);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Conditioned sampling preserves the seeded prefix positions exactly
    // (in original indexing) and fills the remainder.
    fn conditioned_sampling_preserves_the_prefix() {
        let order = SiteOrder::from_permutation(vec![2, 0, 1]).unwrap();
        let params = ArParams::new(&order, 2, None, Init::Normal { std: 0.4 }, 5).unwrap();
        let seed = encode(&[vec![1, 0, 1], vec![0, 1, 0]], 2);
        let opts = SampleOpts::new(2, DrawMode::Stochastic, 7).unwrap();

        // Condition on the first two ranks: original positions 2 and 0.
        let out =
            ancestral_sample_conditioned(&params, &order, &opts, seed.view(), 2).unwrap();
        assert_one_hot(&out);
        for sample in 0..2 {
            for &pos in &[2usize, 0] {
                for state in 0..2 {
                    assert_eq!(out[[sample, pos, state]], seed[[sample, pos, state]]);
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Conditioning beyond the sequence length and empty sample requests
    // are rejected.
    fn invalid_requests_are_rejected() {
        let order = SiteOrder::identity(3).unwrap();
        let params = ArParams::new(&order, 2, None, Init::Zeros, 0).unwrap();
        let seed = encode(&[vec![0, 1, 0]], 2);
        let opts = SampleOpts::new(1, DrawMode::Stochastic, 0).unwrap();

        let err = ancestral_sample_conditioned(&params, &order, &opts, seed.view(), 4)
            .unwrap_err();
        assert_eq!(err, ArError::ConditioningOutOfRange { conditioned: 4, l: 3 });

        let opts = SampleOpts { num_samples: 0, ..opts };
        assert_eq!(
            ancestral_sample(&params, &order, &opts).unwrap_err(),
            ArError::InvalidSampleCount { value: 0 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Sampling under the uniform model hits each state roughly half the
    // time per position over many draws.
    fn uniform_model_samples_converge_to_half() {
        let order = SiteOrder::identity(3).unwrap();
        let params = ArParams::new(&order, 2, None, Init::Zeros, 0).unwrap();
        let opts = SampleOpts::new(4000, DrawMode::Stochastic, 17).unwrap();

        let out = ancestral_sample(&params, &order, &opts).unwrap();
        for i in 0..3 {
            let freq0: f64 =
                (0..4000).map(|s| out[[s, i, 0]]).sum::<f64>() / 4000.0;
            assert!((freq0 - 0.5).abs() < 0.05, "position {i}: freq {freq0}");
        }
    }
}
