//! End-to-end pipeline tests for the public arDCA surface.
//!
//! Purpose
//! -------
//! Exercise the full workflow through the crate root re-exports only:
//! encode a synthetic correlated family, fit the model, inspect the
//! training report, generate free and conditioned samples, score the fit
//! with the evaluation report, and round-trip the model through its JSON
//! snapshot. Unit-level numerics are covered inside the library; these
//! tests pin the behavior a downstream caller sees.

use ardca::{
    ArError, ArdcaModel, DrawMode, FitOptions, FitStatus, ModelState, SampleOpts, SeqData,
};
use ndarray::Array3;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// One-hot encode integer sequences into an (N, L, q) tensor.
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

/// A synthetic five-position family over a 3-state alphabet with strong
/// structure: position 0 conserved, positions 1 and 3 coupled (3 copies 1
/// with probability 0.85), positions 2 and 4 independent and near-uniform.
fn synthetic_family(n: usize, seed: u64) -> SeqData {
    let mut rng = StdRng::seed_from_u64(seed);
    let seqs: Vec<Vec<usize>> = (0..n)
        .map(|_| {
            let b = rng.gen_range(0..3);
            let coupled = if rng.gen_bool(0.85) { b } else { (b + 1) % 3 };
            vec![0, b, rng.gen_range(0..3), coupled, rng.gen_range(0..3)]
        })
        .collect();
    SeqData::with_uniform_weights(encode(&seqs, 3)).expect("valid one-hot family")
}

/// Training options tuned for small, fast test fits.
fn test_options() -> FitOptions {
    FitOptions {
        learning_rate: 0.05,
        reg_fields: 1e-4,
        reg_couplings: 1e-3,
        max_epochs: 300,
        epsconv: 1e-6,
        pseudocount: Some(0.01),
        ..FitOptions::default()
    }
}

#[test]
// Purpose
// -------
// The full pipeline: fit on a correlated family with a held-out split,
// confirm the loss trace is finite and decreasing overall, and confirm
// the report agrees with the returned loss.
//
// Given
// -----
// 400 training and 100 held-out sequences from the same synthetic family.
//
// Expect
// ------
// A successful fit whose final loss is below the first epoch's loss, a
// finite held-out NLL, and a terminal state that is one of the two normal
// outcomes.
fn fit_pipeline_on_synthetic_family() {
    let train = synthetic_family(400, 11);
    let held = synthetic_family(100, 12);
    let mut model = ArdcaModel::new(5, 3, None, test_options()).expect("valid model config");

    let final_loss = model.fit(&train, Some(&held)).expect("fit should succeed");
    let report = model.report().expect("report recorded after fit");

    assert_eq!(report.final_loss, final_loss);
    assert!(report.loss_history.iter().all(|l| l.is_finite()));
    assert!(final_loss < report.loss_history[0]);
    assert!(matches!(report.status, FitStatus::Converged | FitStatus::MaxEpochsReached));
    assert!(report.holdout_nll.expect("holdout tracked").is_finite());
}

#[test]
// Purpose
// -------
// A fitted model generates valid samples that recover the family's
// dominant structure: the conserved position and the 1↔3 coupling.
//
// Given
// -----
// A model fitted on 500 sequences, then 1000 free stochastic samples.
//
// Expect
// ------
// One-hot output, near-total conservation at position 0, and an excess of
// matching states between positions 1 and 3 relative to independence.
fn samples_recover_family_structure() {
    let train = synthetic_family(500, 21);
    let mut model = ArdcaModel::new(5, 3, None, test_options()).expect("valid model config");
    model.fit(&train, None).expect("fit should succeed");

    let opts = SampleOpts::new(1000, DrawMode::Stochastic, 7).expect("valid sampling options");
    let samples = model.sample(&opts).expect("sampling after fit");
    assert_eq!(samples.dim(), (1000, 5, 3));
    for s in 0..1000 {
        for i in 0..5 {
            let row: f64 = (0..3).map(|a| samples[[s, i, a]]).sum();
            assert_eq!(row, 1.0);
        }
    }

    let conserved: f64 = (0..1000).map(|s| samples[[s, 0, 0]]).sum::<f64>() / 1000.0;
    assert!(conserved > 0.9, "position 0 conservation: {conserved}");

    let matched: f64 = (0..1000)
        .filter(|&s| (0..3).any(|a| samples[[s, 1, a]] == 1.0 && samples[[s, 3, a]] == 1.0))
        .count() as f64
        / 1000.0;
    // Independence would give ~1/3; the family couples at 0.85.
    assert!(matched > 0.55, "1↔3 match rate: {matched}");
}

#[test]
// Purpose
// -------
// Evaluation closes the loop: two-point statistics of model samples
// correlate positively with the data, and ML prediction agrees with the
// data well above chance on the evaluated positions.
fn evaluation_reports_meaningful_scores() {
    let train = synthetic_family(500, 31);
    let mut model = ArdcaModel::new(5, 3, None, test_options()).expect("valid model config");
    model.fit(&train, None).expect("fit should succeed");

    let report = model
        .evaluate(&train, 2000, 13, ardca::autoregressive::models::PREDICT_DEFAULT_FRACTION)
        .expect("evaluation after fit");

    assert!(report.two_point_pearson > 0.3, "two-point r: {}", report.two_point_pearson);
    // Chance agreement on a 3-state alphabet is 1/3.
    assert!(report.mean_agreement > 0.4, "agreement: {}", report.mean_agreement);
    assert_eq!(report.conditioned_positions, 3);
}

#[test]
// Purpose
// -------
// Conditioned sampling through the model preserves the seeded positions
// and ML prediction is deterministic across calls.
fn conditioned_generation_is_consistent() {
    let train = synthetic_family(300, 41);
    let mut model = ArdcaModel::new(5, 3, None, test_options()).expect("valid model config");
    model.fit(&train, None).expect("fit should succeed");

    let probe = synthetic_family(50, 42);
    let order = model.order().expect("order fixed after fit").clone();

    let opts = SampleOpts::new(50, DrawMode::Stochastic, 3).expect("valid sampling options");
    let out = model.sample_conditioned(&probe, 2, &opts).expect("conditioned sampling");
    for sample in 0..50 {
        for rank in 0..2 {
            let pos = order.position_at(rank);
            for state in 0..3 {
                assert_eq!(out[[sample, pos, state]], probe.data[[sample, pos, state]]);
            }
        }
    }

    let a = model.predict_ml(&probe, 0.6).expect("prediction");
    let b = model.predict_ml(&probe, 0.6).expect("prediction");
    assert_eq!(a, b);
}

#[test]
// Purpose
// -------
// Persistence: the JSON snapshot restores a model that is operationally
// identical — same NLL on the data and identical samples under the same
// seed.
fn snapshot_round_trip_preserves_behavior() {
    let train = synthetic_family(200, 51);
    let mut model = ArdcaModel::new(5, 3, None, test_options()).expect("valid model config");
    model.fit(&train, None).expect("fit should succeed");

    let json = model.state().expect("state after fit").to_json().expect("serialize");
    let state = ModelState::from_json(&json).expect("deserialize");
    let restored =
        ArdcaModel::from_state(&state, None, test_options()).expect("restore from snapshot");

    let nll_a = model.nll(&train).expect("nll");
    let nll_b = restored.nll(&train).expect("nll");
    assert!((nll_a - nll_b).abs() < 1e-12);

    let opts = SampleOpts::new(20, DrawMode::Stochastic, 77).expect("valid sampling options");
    assert_eq!(model.sample(&opts).unwrap(), restored.sample(&opts).unwrap());
}

#[test]
// Purpose
// -------
// The unfitted-model and divergence error paths surface as typed errors
// through the public API.
fn error_paths_are_typed() {
    let model = ArdcaModel::new(5, 3, None, test_options()).expect("valid model config");
    let opts = SampleOpts::default();
    assert_eq!(model.sample(&opts).unwrap_err(), ArError::ModelNotFitted);

    let train = synthetic_family(50, 61);
    let mut opts = test_options();
    opts.init = ardca::Init::Normal { std: 1e200 };
    let mut diverging = ArdcaModel::new(5, 3, None, opts).expect("valid model config");
    assert!(matches!(
        diverging.fit(&train, None).unwrap_err(),
        ArError::DivergedTraining { epoch: 0, .. }
    ));
}
