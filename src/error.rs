//! Error kinds surfaced by circuit construction and evaluation.

use thiserror::Error;

use crate::wire::WireId;

/// Every error this crate can raise. Construction and evaluation never swallow
/// a failure silently: they return one of these instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    /// A build-time invariant was violated: a mismatched constant assertion,
    /// packing a non-boolean constant, an output registered on an unknown
    /// wire, and the like.
    #[error("construction invariant violated: {0}")]
    ConstructionInvariant(String),

    /// An evaluation-time invariant was violated: reading an unassigned wire,
    /// writing an already-assigned one, a non-boolean value on a
    /// boolean-only input, an oversized `split` input, an unsatisfied
    /// `assert`.
    #[error("evaluation invariant violated: {0}")]
    EvaluationInvariant(String),

    /// The ambient-generator configuration could not be satisfied: no active
    /// generator in multi-generator mode, or a missing prover binary on
    /// `run`.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Writing the `.arith` or `.in` file failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl CircuitError {
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::ConstructionInvariant(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::EvaluationInvariant(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn unassigned_wire(id: WireId) -> Self {
        Self::EvaluationInvariant(format!("wire {id} read before being assigned"))
    }

    pub fn already_assigned(id: WireId) -> Self {
        Self::EvaluationInvariant(format!("wire {id} assigned twice"))
    }

    pub fn not_boolean(id: WireId) -> Self {
        Self::EvaluationInvariant(format!("wire {id} expected a boolean value"))
    }
}

impl From<std::io::Error> for CircuitError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CircuitError>;
