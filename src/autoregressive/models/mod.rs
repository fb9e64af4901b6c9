//! Model types built on the autoregressive core.

pub mod ardca;

pub use ardca::{ArdcaModel, EvalReport, FitReport, FitStatus, PREDICT_DEFAULT_FRACTION};
