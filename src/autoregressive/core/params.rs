//! Parameter store for arDCA: fields, couplings, and the validity mask.
//!
//! Purpose
//! -------
//! Hold the trainable parameters of the autoregressive model in *order*
//! indexing: per-position fields `h` of shape (L, q) and couplings `J`
//! stored as a single padded (L·q, L·q) matrix together with an explicit
//! 0/1 validity mask. The mask is the intersection of the causal
//! constraint (rank j strictly precedes rank i) and the optional
//! restriction graph, so a plain matrix product over the full padded
//! tensor enforces the autoregressive factorization.
//!
//! Invariants & assumptions
//! ------------------------
//! - Masked coupling entries are exactly zero at all times. Gradients are
//!   multiplied by the mask and [`ArParams::apply_mask`] re-zeroes the
//!   parameters after every optimizer step, so the invariant survives any
//!   update rule.
//! - The set of trainable parameters is exactly {fields} ∪ {allowed
//!   couplings}; successors in order never receive a coupling.
//!
//! Conventions
//! -----------
//! - Flat index `rank * q + state` addresses the (rank, state) coordinate
//!   in the padded matrix; `couplings[[i*q + a, j*q + b]]` couples state
//!   `a` at rank `i` to state `b` at rank `j` (valid only for j < i).
use crate::autoregressive::{
    core::order::SiteOrder,
    errors::{ArError, ArResult},
};
use ndarray::{Array1, Array2, ArrayView2, s};
use ndarray_rand::{RandomExt, rand_distr::Normal};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

/// Parameter initialization policy.
///
/// `Zeros` starts from the uniform model (all conditionals flat);
/// `Normal` draws every trainable entry from N(0, std²) with a seeded RNG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    Zeros,
    Normal { std: f64 },
}

/// Fields and couplings of an arDCA model, in order indexing.
///
/// Fields
/// ------
/// - `fields`: (L, q) per-position biases, indexed by order rank.
/// - `couplings`: padded (L·q, L·q) coupling matrix.
/// - `mask`: (L·q, L·q) validity mask of exact 0.0/1.0 entries; the causal
///   lower block-triangle intersected with the restriction graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ArParams {
    l: usize,
    q: usize,
    fields: Array2<f64>,
    couplings: Array2<f64>,
    mask: Array2<f64>,
}

impl ArParams {
    /// Build a parameter store for the given order and optional restriction
    /// graph, initialized according to `init`.
    ///
    /// Parameters
    /// ----------
    /// - `order`: the autoregressive order; fixes L and the causal mask.
    /// - `q`: alphabet size.
    /// - `graph`: optional (L, L) restriction in *original* indexing;
    ///   `graph[a][b] == false` forbids couplings between positions a and b.
    /// - `init`: initialization policy.
    /// - `seed`: RNG seed for `Init::Normal` (ignored for `Init::Zeros`).
    ///
    /// Errors
    /// ------
    /// - [`ArError::GraphShapeMismatch`] when the graph is not (L, L).
    /// - [`ArError::InvalidInitStd`] for a non-finite or non-positive
    ///   Gaussian spread.
    pub fn new(
        order: &SiteOrder,
        q: usize,
        graph: Option<&Array2<bool>>,
        init: Init,
        seed: u64,
    ) -> ArResult<Self> {
        let l = order.len();
        if let Some(g) = graph {
            if g.dim() != (l, l) {
                return Err(ArError::GraphShapeMismatch { expected: (l, l), actual: g.dim() });
            }
        }
        let mask = build_mask(order, q, graph);
        let (fields, couplings) = match init {
            Init::Zeros => (Array2::zeros((l, q)), Array2::zeros((l * q, l * q))),
            Init::Normal { std } => {
                if !std.is_finite() || std <= 0.0 {
                    return Err(ArError::InvalidInitStd { value: std });
                }
                let dist =
                    Normal::new(0.0, std).map_err(|_| ArError::InvalidInitStd { value: std })?;
                let mut rng = StdRng::seed_from_u64(seed);
                let fields = Array2::random_using((l, q), dist, &mut rng);
                let couplings = Array2::random_using((l * q, l * q), dist, &mut rng);
                (fields, couplings)
            }
        };
        let mut params = ArParams { l, q, fields, couplings, mask };
        params.apply_mask();
        Ok(params)
    }

    /// Sequence length L.
    pub fn seq_len(&self) -> usize {
        self.l
    }

    /// Alphabet size q.
    pub fn num_states(&self) -> usize {
        self.q
    }

    /// Per-position fields, shape (L, q), order indexing.
    pub fn fields(&self) -> ArrayView2<f64> {
        self.fields.view()
    }

    /// Fields flattened to length L·q (row-major rank/state layout).
    pub fn fields_flat(&self) -> Array1<f64> {
        Array1::from_iter(self.fields.iter().cloned())
    }

    /// Padded coupling matrix, shape (L·q, L·q).
    pub fn couplings(&self) -> ArrayView2<f64> {
        self.couplings.view()
    }

    /// Validity mask, shape (L·q, L·q), exact 0.0/1.0 entries.
    pub fn mask(&self) -> ArrayView2<f64> {
        self.mask.view()
    }

    /// The (q, q) coupling block from rank `j` into rank `i` (j < i for a
    /// non-zero block).
    pub fn coupling_block(&self, i: usize, j: usize) -> ArrayView2<f64> {
        self.couplings.slice(s![i * self.q..(i + 1) * self.q, j * self.q..(j + 1) * self.q])
    }

    /// Apply a parameter update in place. The coupling update is masked and
    /// the mask is re-applied afterwards, so disallowed entries stay at
    /// exactly zero regardless of the update rule.
    pub fn update(&mut self, delta_fields: &Array2<f64>, delta_couplings: &Array2<f64>) {
        self.fields += delta_fields;
        self.couplings += delta_couplings;
        self.apply_mask();
    }

    /// Force every masked coupling entry back to exactly zero.
    pub fn apply_mask(&mut self) {
        self.couplings *= &self.mask;
    }

    /// Mask a gradient (or any coupling-shaped tensor) in place.
    pub fn mask_gradient(&self, grad_couplings: &mut Array2<f64>) {
        *grad_couplings *= &self.mask;
    }

    /// Squared L2 norm of the fields.
    pub fn fields_sq_norm(&self) -> f64 {
        self.fields.iter().map(|v| v * v).sum()
    }

    /// Squared L2 norm of the allowed couplings (masked entries are zero,
    /// so the padded sum equals the allowed sum).
    pub fn couplings_sq_norm(&self) -> f64 {
        self.couplings.iter().map(|v| v * v).sum()
    }

    /// Rebuild a parameter store from a serialized snapshot, revalidating
    /// shapes and reconstructing the mask for the stored order.
    pub fn from_state(
        state: &ModelState,
        order: &SiteOrder,
        graph: Option<&Array2<bool>>,
    ) -> ArResult<Self> {
        let (l, q) = (state.l, state.q);
        if state.fields.dim() != (l, q) {
            return Err(ArError::InvalidModelState { reason: "fields shape disagrees with (L, q)" });
        }
        if state.couplings.dim() != (l * q, l * q) {
            return Err(ArError::InvalidModelState {
                reason: "couplings shape disagrees with (L*q, L*q)",
            });
        }
        let mask = build_mask(order, q, graph);
        let mut params =
            ArParams { l, q, fields: state.fields.clone(), couplings: state.couplings.clone(), mask };
        params.apply_mask();
        Ok(params)
    }
}

/// Causal ∧ graph validity mask: block (i, j) is all-ones iff rank j
/// strictly precedes rank i and the restriction graph (original indexing)
/// allows the position pair.
fn build_mask(order: &SiteOrder, q: usize, graph: Option<&Array2<bool>>) -> Array2<f64> {
    let l = order.len();
    let mut mask = Array2::zeros((l * q, l * q));
    for i in 0..l {
        for j in 0..i {
            let allowed = graph
                .map(|g| g[[order.position_at(i), order.position_at(j)]])
                .unwrap_or(true);
            if allowed {
                mask.slice_mut(s![i * q..(i + 1) * q, j * q..(j + 1) * q]).fill(1.0);
            }
        }
    }
    mask
}

/// Serializable snapshot of a fitted model: order, parameters, and shape.
///
/// Round-trips through JSON via [`ModelState::to_json`] /
/// [`ModelState::from_json`]; deserialization revalidates the permutation
/// and tensor shapes before the model is reconstructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    /// Sequence length L.
    pub l: usize,
    /// Alphabet size q.
    pub q: usize,
    /// Autoregressive order (rank → original position).
    pub order: Vec<usize>,
    /// Fields (L, q), order indexing.
    pub fields: Array2<f64>,
    /// Padded couplings (L·q, L·q), order indexing.
    pub couplings: Array2<f64>,
}

impl ModelState {
    /// Capture a snapshot of the given order and parameters.
    pub fn capture(order: &SiteOrder, params: &ArParams) -> Self {
        ModelState {
            l: params.seq_len(),
            q: params.num_states(),
            order: order.as_slice().to_vec(),
            fields: params.fields().to_owned(),
            couplings: params.couplings().to_owned(),
        }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> ArResult<String> {
        serde_json::to_string(self)
            .map_err(|_| ArError::InvalidModelState { reason: "serialization failed" })
    }

    /// Deserialize from a JSON string produced by [`ModelState::to_json`].
    pub fn from_json(json: &str) -> ArResult<Self> {
        serde_json::from_str(json)
            .map_err(|_| ArError::InvalidModelState { reason: "malformed JSON payload" })
    }
}
