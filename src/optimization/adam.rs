//! Adam update rule for the arDCA parameter store.
//!
//! Purpose
//! -------
//! Provide the first-order update rule driven by the training loop: Adam
//! with bias-corrected moment estimates, with one moment buffer pair per
//! parameter tensor (fields and couplings). The optimizer is deliberately
//! dumb about model structure: it receives gradients that are already
//! masked, and the parameter store re-applies the mask after every step,
//! so masked entries never drift away from zero.
//!
//! Conventions
//! -----------
//! - `beta1 = 0.9`, `beta2 = 0.999`, `eps = 1e-8` (the standard defaults).
//! - The step counter starts at zero and is incremented before each
//!   update, so bias correction uses `t = 1` on the first step.

use ndarray::Array2;

/// Adam optimizer state for a (fields, couplings) parameter pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Adam {
    lr: f64,
    beta1: f64,
    beta2: f64,
    eps: f64,
    t: u64,
    m_fields: Array2<f64>,
    v_fields: Array2<f64>,
    m_couplings: Array2<f64>,
    v_couplings: Array2<f64>,
}

impl Adam {
    /// Build optimizer state with zeroed moments for parameters of shape
    /// `(l, q)` (fields) and `(l·q, l·q)` (couplings).
    pub fn new(lr: f64, l: usize, q: usize) -> Self {
        Adam {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            t: 0,
            m_fields: Array2::zeros((l, q)),
            v_fields: Array2::zeros((l, q)),
            m_couplings: Array2::zeros((l * q, l * q)),
            v_couplings: Array2::zeros((l * q, l * q)),
        }
    }

    /// Compute the parameter deltas for one step given the current
    /// gradients. Returns `(delta_fields, delta_couplings)` to be added to
    /// the parameters by the caller.
    pub fn step(
        &mut self,
        grad_fields: &Array2<f64>,
        grad_couplings: &Array2<f64>,
    ) -> (Array2<f64>, Array2<f64>) {
        self.t += 1;
        let t = self.t as f64;
        let bc1 = 1.0 - self.beta1.powf(t);
        let bc2 = 1.0 - self.beta2.powf(t);

        let delta_fields = step_tensor(
            &mut self.m_fields,
            &mut self.v_fields,
            grad_fields,
            self.lr,
            self.beta1,
            self.beta2,
            self.eps,
            bc1,
            bc2,
        );
        let delta_couplings = step_tensor(
            &mut self.m_couplings,
            &mut self.v_couplings,
            grad_couplings,
            self.lr,
            self.beta1,
            self.beta2,
            self.eps,
            bc1,
            bc2,
        );
        (delta_fields, delta_couplings)
    }
}

#[allow(clippy::too_many_arguments)]
fn step_tensor(
    m: &mut Array2<f64>,
    v: &mut Array2<f64>,
    grad: &Array2<f64>,
    lr: f64,
    beta1: f64,
    beta2: f64,
    eps: f64,
    bc1: f64,
    bc2: f64,
) -> Array2<f64> {
    let mut delta = Array2::zeros(grad.raw_dim());
    ndarray::Zip::from(&mut delta)
        .and(m)
        .and(v)
        .and(grad)
        .for_each(|d, m, v, &g| {
            *m = beta1 * *m + (1.0 - beta1) * g;
            *v = beta2 * *v + (1.0 - beta2) * g * g;
            let m_hat = *m / bc1;
            let v_hat = *v / bc2;
            *d = -lr * m_hat / (v_hat.sqrt() + eps);
        });
    delta
}
