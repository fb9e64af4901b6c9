//! arDCA model: maximum-likelihood fitting, prediction, and sampling.
//!
//! Purpose
//! -------
//! Tie the core pieces together into the user-facing model type:
//! [`ArdcaModel`] owns the (L, q) shape, the optional restriction graph,
//! the training options, and — after fitting or loading — the chosen
//! order and parameter store. The training loop lives here as an explicit
//! state machine: each epoch runs one teacher-forced loss/gradient pass,
//! one Adam step, and a mask re-application, and terminates in exactly one
//! of the states of [`FitStatus`].
//!
//! Key behaviors
//! -------------
//! - `fit` selects the order (entropic by default), initializes the
//!   parameter store, and iterates to convergence or the epoch budget.
//!   Non-finite loss at any epoch surfaces as
//!   [`ArError::DivergedTraining`]; an exhausted budget is a normal
//!   terminal state carrying the last-updated parameters.
//! - `sample` / `sample_conditioned` delegate to the ancestral sampler.
//! - `predict_ml` reproduces the original prediction workflow: condition
//!   on the first ⌈fraction·L⌉ ordered positions of real data, fill the
//!   rest with maximum-likelihood draws. The split fraction is
//!   configurable (default 2/3).
//! - `evaluate` produces the post-training report: connected two-point
//!   Pearson correlation between data and model samples, plus the mean
//!   agreement of ML predictions over the non-conditioned positions.
//! - `state` / `from_state` persist and restore the full generative model
//!   (Order + Parameters + L + q).
//!
//! Invariants & assumptions
//! ------------------------
//! - The training loop is the sole mutator of the parameter store; every
//!   other operation takes it read-only.
//! - The order is computed once per fit and immutable afterward.
use crate::{
    autoregressive::{
        core::{
            conditional::flatten_one_hot,
            data::SeqData,
            likelihood::{loss_and_grad, weighted_nll},
            options::{FitOptions, SampleOpts, DEFAULT_CONDITIONED_FRACTION},
            order::SiteOrder,
            params::{ArParams, ModelState},
        },
        errors::{ArError, ArResult},
        sampler::{ancestral_sample, ancestral_sample_conditioned, DrawMode},
    },
    optimization::adam::Adam,
    stats::{single_site_freq, site_agreement, two_point_correlation, two_site_freq},
};
use ndarray::{Array2, Array3};

/// Terminal state of a completed training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStatus {
    /// Relative loss change dropped below `epsconv`.
    Converged,
    /// The epoch budget ran out first; parameters are the last update.
    MaxEpochsReached,
}

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    /// How the run terminated.
    pub status: FitStatus,
    /// Training loss at the last epoch (NLL + L2 penalties).
    pub final_loss: f64,
    /// Number of epochs actually run.
    pub epochs_run: usize,
    /// Per-epoch training loss trace.
    pub loss_history: Vec<f64>,
    /// Held-out NLL at the last epoch, when a held-out set was supplied.
    pub holdout_nll: Option<f64>,
}

/// Post-training evaluation report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalReport {
    /// Pearson correlation of connected two-point statistics between the
    /// data and free model samples.
    pub two_point_pearson: f64,
    /// Mean per-sample agreement between ML predictions and the data over
    /// the non-conditioned (evaluated) positions.
    pub mean_agreement: f64,
    /// Number of order-leading positions that were conditioned on.
    pub conditioned_positions: usize,
}

/// Autoregressive DCA model over (L, q) categorical sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct ArdcaModel {
    l: usize,
    q: usize,
    graph: Option<Array2<bool>>,
    options: FitOptions,
    order: Option<SiteOrder>,
    params: Option<ArParams>,
    report: Option<FitReport>,
}

impl ArdcaModel {
    /// Construct an unfitted model for sequences of length `l` over a
    /// `q`-state alphabet, with an optional (L, L) restriction graph in
    /// original indexing.
    pub fn new(
        l: usize,
        q: usize,
        graph: Option<Array2<bool>>,
        options: FitOptions,
    ) -> ArResult<Self> {
        if l == 0 {
            return Err(ArError::InvalidSequenceLength { l });
        }
        if q < 2 {
            return Err(ArError::InvalidAlphabetSize { q });
        }
        if let Some(g) = &graph {
            if g.dim() != (l, l) {
                return Err(ArError::GraphShapeMismatch { expected: (l, l), actual: g.dim() });
            }
        }
        Ok(ArdcaModel { l, q, graph, options, order: None, params: None, report: None })
    }

    /// Sequence length L.
    pub fn seq_len(&self) -> usize {
        self.l
    }

    /// Alphabet size q.
    pub fn num_states(&self) -> usize {
        self.q
    }

    /// The fitted autoregressive order, if any.
    pub fn order(&self) -> Option<&SiteOrder> {
        self.order.as_ref()
    }

    /// The fitted parameter store, if any.
    pub fn params(&self) -> Option<&ArParams> {
        self.params.as_ref()
    }

    /// The report of the last training run, if any.
    pub fn report(&self) -> Option<&FitReport> {
        self.report.as_ref()
    }

    /// Fit by weighted maximum likelihood with Adam.
    ///
    /// ## Steps
    /// 1. Resolve the pseudocount (`options.pseudocount` or
    ///    `1 / effective_size`).
    /// 2. Select the order from the pseudocount-corrected single-site
    ///    frequencies (entropic by default, identity otherwise) and
    ///    reindex the data once.
    /// 3. Initialize the parameter store under the causal/graph mask and
    ///    the Adam state.
    /// 4. Iterate: loss + analytic gradient (teacher forcing over the
    ///    full training set), divergence check, Adam step, mask
    ///    re-application, optional held-out NLL (forward only), and the
    ///    relative-loss convergence test against the previous epoch.
    /// 5. Record a [`FitReport`] and leave the last-updated parameters in
    ///    place for both terminal states.
    ///
    /// ## Returns
    /// The final training loss.
    ///
    /// ## Errors
    /// - [`ArError::DataShapeMismatch`] when `data` (or `holdout`) does
    ///   not match the model's (L, q).
    /// - [`ArError::InvalidPseudocount`] when the derived default
    ///   pseudocount falls outside (0, 1) (effective size ≤ 1).
    /// - [`ArError::NonPositiveFrequency`] from the order selector if the
    ///   pseudocount correction failed to lift a zero frequency.
    /// - [`ArError::DivergedTraining`] when the loss becomes non-finite.
    pub fn fit(&mut self, data: &SeqData, holdout: Option<&SeqData>) -> ArResult<f64> {
        self.check_data_shape(data)?;
        if let Some(h) = holdout {
            self.check_data_shape(h)?;
        }
        let opts = self.options;
        if opts.max_epochs == 0 {
            return Err(ArError::InvalidMaxEpochs { value: 0 });
        }
        let pseudocount = match opts.pseudocount {
            Some(pc) => pc,
            None => {
                let pc = 1.0 / data.effective_size();
                if !pc.is_finite() || pc <= 0.0 || pc >= 1.0 {
                    return Err(ArError::InvalidPseudocount { value: pc });
                }
                pc
            }
        };

        // Order selection from pseudocount-corrected marginals.
        let fi = single_site_freq(data.data.view(), Some(data.weights.view()), pseudocount)?;
        let order = if opts.use_entropic_order {
            SiteOrder::entropic(fi.view())?
        } else {
            SiteOrder::identity(self.l)?
        };

        // Reindex once; training works entirely in order space.
        let x_ordered = order.to_ordered(data.data.view());
        let x_flat = flatten_one_hot(x_ordered.view());
        let holdout_tensors = holdout.map(|h| {
            let ho = order.to_ordered(h.data.view());
            let hf = flatten_one_hot(ho.view());
            (ho, hf, h.weights.clone())
        });

        let mut params =
            ArParams::new(&order, self.q, self.graph.as_ref(), opts.init, opts.seed)?;
        let mut optimizer = Adam::new(opts.learning_rate, self.l, self.q);

        let mut history = Vec::new();
        let mut holdout_nll = None;
        let mut status = FitStatus::MaxEpochsReached;
        let mut prev_loss: Option<f64> = None;

        for epoch in 0..opts.max_epochs {
            let lg = loss_and_grad(
                &params,
                x_ordered.view(),
                x_flat.view(),
                data.weights.view(),
                opts.reg_fields,
                opts.reg_couplings,
            )?;
            if !lg.loss.is_finite() {
                return Err(ArError::DivergedTraining { epoch, loss: lg.loss });
            }
            history.push(lg.loss);

            let (delta_fields, delta_couplings) =
                optimizer.step(&lg.grad_fields, &lg.grad_couplings);
            params.update(&delta_fields, &delta_couplings);

            if let Some((ho, hf, hw)) = &holdout_tensors {
                holdout_nll = Some(weighted_nll(&params, ho.view(), hf.view(), hw.view())?);
            }

            if let Some(prev) = prev_loss {
                if (lg.loss - prev).abs() / prev.abs() < opts.epsconv {
                    status = FitStatus::Converged;
                    break;
                }
            }
            prev_loss = Some(lg.loss);
        }

        let final_loss = *history
            .last()
            .expect("max_epochs > 0 guarantees at least one recorded epoch");
        self.order = Some(order);
        self.params = Some(params);
        self.report = Some(FitReport {
            status,
            final_loss,
            epochs_run: history.len(),
            loss_history: history,
            holdout_nll,
        });
        Ok(final_loss)
    }

    /// Weighted NLL of a dataset under the fitted model (forward pass
    /// only; no regularization).
    pub fn nll(&self, data: &SeqData) -> ArResult<f64> {
        self.check_data_shape(data)?;
        let (order, params) = self.fitted()?;
        let x_ordered = order.to_ordered(data.data.view());
        let x_flat = flatten_one_hot(x_ordered.view());
        weighted_nll(params, x_ordered.view(), x_flat.view(), data.weights.view())
    }

    /// Free ancestral sampling from the fitted model. Returns a one-hot
    /// tensor (num_samples, L, q) in original indexing.
    pub fn sample(&self, opts: &SampleOpts) -> ArResult<Array3<f64>> {
        let (order, params) = self.fitted()?;
        ancestral_sample(params, order, opts)
    }

    /// Conditioned ancestral sampling: the first `conditioned` positions
    /// in order are read from `seed` (original indexing); the rest are
    /// drawn per `opts.draw`.
    pub fn sample_conditioned(
        &self,
        seed: &SeqData,
        conditioned: usize,
        opts: &SampleOpts,
    ) -> ArResult<Array3<f64>> {
        let (order, params) = self.fitted()?;
        ancestral_sample_conditioned(params, order, opts, seed.data.view(), conditioned)
    }

    /// Maximum-likelihood prediction: condition on the first
    /// ⌊fraction·L⌋ ordered positions of `data` and fill the remaining
    /// positions with the most probable states. Deterministic.
    ///
    /// Errors with [`ArError::InvalidConditionedFraction`] when the
    /// fraction is outside (0, 1).
    pub fn predict_ml(&self, data: &SeqData, fraction: f64) -> ArResult<Array3<f64>> {
        self.check_data_shape(data)?;
        let conditioned = self.conditioned_count(fraction)?;
        let opts = SampleOpts::new(data.num_sequences(), DrawMode::MostLikely, 0)?;
        self.sample_conditioned(data, conditioned, &opts)
    }

    /// Post-training evaluation against `data`: draw `num_samples` free
    /// samples, compare two-point statistics, and measure ML-prediction
    /// agreement over the non-conditioned positions.
    pub fn evaluate(
        &self,
        data: &SeqData,
        num_samples: usize,
        sample_seed: u64,
        fraction: f64,
    ) -> ArResult<EvalReport> {
        self.check_data_shape(data)?;
        let (order, _) = self.fitted()?;
        let conditioned = self.conditioned_count(fraction)?;
        let pseudocount = match self.options.pseudocount {
            Some(pc) => pc,
            None => 1.0 / data.effective_size(),
        };

        // Two-point statistics: pseudocount-corrected data tables vs. raw
        // sample tables, as in the original training report.
        let fi_data =
            single_site_freq(data.data.view(), Some(data.weights.view()), pseudocount)?;
        let fij_data = two_site_freq(data.data.view(), Some(data.weights.view()), pseudocount)?;
        let samples = self.sample(&SampleOpts::new(num_samples, DrawMode::Stochastic, sample_seed)?)?;
        let fi_model = single_site_freq(samples.view(), None, 0.0)?;
        let fij_model = two_site_freq(samples.view(), None, 0.0)?;
        let two_point_pearson =
            two_point_correlation(fi_data.view(), fij_data.view(), fi_model.view(), fij_model.view())?;

        // Agreement over the evaluated (non-conditioned) positions.
        let predictions = self.predict_ml(data, fraction)?;
        let per_site = site_agreement(predictions.view(), data.data.view())?;
        let evaluated: Vec<f64> = (conditioned..self.l)
            .map(|rank| per_site[order.position_at(rank)])
            .collect();
        let mean_agreement = evaluated.iter().sum::<f64>() / evaluated.len() as f64;

        Ok(EvalReport { two_point_pearson, mean_agreement, conditioned_positions: conditioned })
    }

    /// Serializable snapshot of the fitted model (Order + Parameters +
    /// L + q). Errors with [`ArError::ModelNotFitted`] before fitting.
    pub fn state(&self) -> ArResult<ModelState> {
        let (order, params) = self.fitted()?;
        Ok(ModelState::capture(order, params))
    }

    /// Rebuild a fitted model from a snapshot, revalidating the stored
    /// permutation and tensor shapes. The restriction graph, if supplied,
    /// is re-imposed on the restored parameters.
    pub fn from_state(
        state: &ModelState,
        graph: Option<Array2<bool>>,
        options: FitOptions,
    ) -> ArResult<Self> {
        let mut model = ArdcaModel::new(state.l, state.q, graph, options)?;
        let order = SiteOrder::from_permutation(state.order.clone())?;
        if order.len() != state.l {
            return Err(ArError::InvalidModelState { reason: "order length disagrees with L" });
        }
        let params = ArParams::from_state(state, &order, model.graph.as_ref())?;
        model.order = Some(order);
        model.params = Some(params);
        Ok(model)
    }

    fn fitted(&self) -> ArResult<(&SiteOrder, &ArParams)> {
        match (&self.order, &self.params) {
            (Some(order), Some(params)) => Ok((order, params)),
            _ => Err(ArError::ModelNotFitted),
        }
    }

    fn check_data_shape(&self, data: &SeqData) -> ArResult<()> {
        let actual = (data.seq_len(), data.num_states());
        if actual != (self.l, self.q) {
            return Err(ArError::DataShapeMismatch { expected: (self.l, self.q), actual });
        }
        Ok(())
    }

    fn conditioned_count(&self, fraction: f64) -> ArResult<usize> {
        if !fraction.is_finite() || fraction <= 0.0 || fraction >= 1.0 {
            return Err(ArError::InvalidConditionedFraction { value: fraction });
        }
        let conditioned = (fraction * self.l as f64).floor() as usize;
        Ok(conditioned.min(self.l - 1))
    }
}

/// Re-export of the default conditioning split so callers of
/// [`ArdcaModel::predict_ml`] don't need the options module.
pub const PREDICT_DEFAULT_FRACTION: f64 = DEFAULT_CONDITIONED_FRACTION;
