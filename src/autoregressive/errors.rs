//! Errors for the arDCA stack (data validation, configuration checks,
//! training failures, and sampling invariants).
//!
//! This module defines a single model error type, [`ArError`], used across
//! the crate. Variants are grouped by taxonomy: invalid input (shape and
//! encoding violations), configuration errors (out-of-range options),
//! training failures (divergence), and sampling/state errors.
//!
//! ## Conventions
//! - **Indices are 0-based** and reported in *original* position indexing
//!   unless the variant says otherwise.
//! - One-hot tensors must have exactly one 1 per (sample, position) slice.
//! - Training divergence (non-finite loss) is always surfaced, never
//!   silently downgraded; an exhausted epoch budget is *not* an error.

/// Crate-wide result alias for arDCA operations that may produce [`ArError`].
pub type ArResult<T> = Result<T, ArError>;

/// Unified error type for arDCA modeling.
///
/// Covers input/data validation, configuration checks, training failures,
/// and sampling/state invariants. Implements `Display`/`Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum ArError {
    // ---- Input/data validation ----
    /// Dataset has zero sequences.
    EmptyDataset,

    /// Alphabet must have at least two states.
    InvalidAlphabetSize { q: usize },

    /// Sequence length must be positive.
    InvalidSequenceLength { l: usize },

    /// Weight vector length does not match the number of sequences.
    WeightsLengthMismatch { expected: usize, actual: usize },

    /// A sample weight is NaN/±inf.
    NonFiniteWeight { index: usize, value: f64 },

    /// A sample weight is negative.
    NegativeWeight { index: usize, value: f64 },

    /// All sample weights are zero; the effective sample size vanishes.
    ZeroEffectiveSize,

    /// A (sample, position) slice is not a valid one-hot vector.
    NotOneHot { sample: usize, position: usize },

    /// Data tensor dimensions do not match the model's (L, q).
    DataShapeMismatch { expected: (usize, usize), actual: (usize, usize) },

    /// Restriction graph dimensions do not match (L, L).
    GraphShapeMismatch { expected: (usize, usize), actual: (usize, usize) },

    /// A marginal frequency is non-positive; entropy would be undefined.
    /// The pseudocount correction must run before order selection.
    NonPositiveFrequency { position: usize, state: usize, value: f64 },

    /// Frequency tables passed to a correlation have mismatched shapes.
    FrequencyShapeMismatch { context: &'static str },

    // ---- Configuration validation ----
    /// Learning rate must be finite and > 0.
    InvalidLearningRate { value: f64 },

    /// An L2 regularization coefficient must be finite and >= 0.
    InvalidRegularization { name: &'static str, value: f64 },

    /// Convergence threshold must be finite and > 0.
    InvalidConvergenceThreshold { value: f64 },

    /// Epoch budget must be > 0.
    InvalidMaxEpochs { value: usize },

    /// Pseudocount must lie strictly inside (0, 1).
    InvalidPseudocount { value: f64 },

    /// Gaussian initialization spread must be finite and > 0.
    InvalidInitStd { value: f64 },

    /// Conditioning fraction must lie strictly inside (0, 1).
    InvalidConditionedFraction { value: f64 },

    /// Number of sequences to sample must be > 0.
    InvalidSampleCount { value: usize },

    // ---- Training ----
    /// Loss became non-finite during fitting.
    DivergedTraining { epoch: usize, loss: f64 },

    // ---- Sampling / model state ----
    /// Model has not been fitted (or loaded) yet.
    ModelNotFitted,

    /// Conditioning prefix length exceeds the sequence length.
    ConditioningOutOfRange { conditioned: usize, l: usize },

    /// A conditional distribution degenerated (no positive mass).
    DegenerateDistribution { rank: usize },

    /// A serialized model state failed validation on load.
    InvalidModelState { reason: &'static str },
}

impl std::error::Error for ArError {}

impl std::fmt::Display for ArError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input/data validation ----
            ArError::EmptyDataset => {
                write!(f, "Dataset contains zero sequences.")
            }
            ArError::InvalidAlphabetSize { q } => {
                write!(f, "Alphabet size must be at least 2; got {q}.")
            }
            ArError::InvalidSequenceLength { l } => {
                write!(f, "Sequence length must be positive; got {l}.")
            }
            ArError::WeightsLengthMismatch { expected, actual } => {
                write!(f, "Weight vector length mismatch: expected {expected}, got {actual}.")
            }
            ArError::NonFiniteWeight { index, value } => {
                write!(f, "Sample weight at index {index} is non-finite: {value}")
            }
            ArError::NegativeWeight { index, value } => {
                write!(f, "Sample weight at index {index} is negative: {value}")
            }
            ArError::ZeroEffectiveSize => {
                write!(f, "All sample weights are zero; effective sample size vanishes.")
            }
            ArError::NotOneHot { sample, position } => {
                write!(
                    f,
                    "Encoding at (sample {sample}, position {position}) is not one-hot: \
                     entries must be 0/1 with exactly one 1."
                )
            }
            ArError::DataShapeMismatch { expected, actual } => {
                write!(
                    f,
                    "Data tensor shape mismatch: expected (L, q) = {expected:?}, got {actual:?}."
                )
            }
            ArError::GraphShapeMismatch { expected, actual } => {
                write!(
                    f,
                    "Restriction graph shape mismatch: expected {expected:?}, got {actual:?}."
                )
            }
            ArError::NonPositiveFrequency { position, state, value } => {
                write!(
                    f,
                    "Marginal frequency at (position {position}, state {state}) is \
                     non-positive ({value}); apply a pseudocount before order selection."
                )
            }
            ArError::FrequencyShapeMismatch { context } => {
                write!(f, "Frequency tables have mismatched shapes: {context}.")
            }
            // ---- Configuration validation ----
            ArError::InvalidLearningRate { value } => {
                write!(f, "Learning rate must be finite and > 0; got {value}.")
            }
            ArError::InvalidRegularization { name, value } => {
                write!(f, "Regularization coefficient {name} must be finite and >= 0; got {value}.")
            }
            ArError::InvalidConvergenceThreshold { value } => {
                write!(f, "Convergence threshold must be finite and > 0; got {value}.")
            }
            ArError::InvalidMaxEpochs { value } => {
                write!(f, "Epoch budget must be greater than zero; got {value}.")
            }
            ArError::InvalidPseudocount { value } => {
                write!(f, "Pseudocount must lie strictly inside (0, 1); got {value}.")
            }
            ArError::InvalidInitStd { value } => {
                write!(f, "Initialization spread must be finite and > 0; got {value}.")
            }
            ArError::InvalidConditionedFraction { value } => {
                write!(f, "Conditioned fraction must lie strictly inside (0, 1); got {value}.")
            }
            ArError::InvalidSampleCount { value } => {
                write!(f, "Number of sequences to sample must be > 0; got {value}.")
            }
            // ---- Training ----
            ArError::DivergedTraining { epoch, loss } => {
                write!(f, "Training diverged at epoch {epoch}: loss became non-finite ({loss}).")
            }
            // ---- Sampling / model state ----
            ArError::ModelNotFitted => {
                write!(f, "Model hasn't been fitted yet.")
            }
            ArError::ConditioningOutOfRange { conditioned, l } => {
                write!(
                    f,
                    "Conditioning prefix covers {conditioned} positions but sequences \
                     have length {l}."
                )
            }
            ArError::DegenerateDistribution { rank } => {
                write!(f, "Conditional distribution at order rank {rank} has no positive mass.")
            }
            ArError::InvalidModelState { reason } => {
                write!(f, "Serialized model state failed validation: {reason}.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Ensure Display output carries the offending values so callers can
    // report actionable messages.
    fn display_includes_offending_values() {
        let err = ArError::WeightsLengthMismatch { expected: 10, actual: 7 };
        let msg = err.to_string();
        assert!(msg.contains("10") && msg.contains("7"));

        let err = ArError::DivergedTraining { epoch: 42, loss: f64::NAN };
        assert!(err.to_string().contains("42"));

        let err = ArError::NonPositiveFrequency { position: 3, state: 1, value: 0.0 };
        assert!(err.to_string().contains("position 3"));
    }

    #[test]
    // Purpose
    // -------
    // ArError values compare by structure, which the test-suite relies on
    // when asserting exact error variants.
    fn errors_compare_structurally() {
        assert_eq!(
            ArError::InvalidPseudocount { value: 1.5 },
            ArError::InvalidPseudocount { value: 1.5 }
        );
        assert_ne!(ArError::EmptyDataset, ArError::ZeroEffectiveSize);
    }
}
