//! Error taxonomy.
//!
//! Validation errors (`IllegalAction`, `InsufficientEnergy`) are rejected
//! before any state mutation: the submitting action simply fails and the
//! game continues. `InfiniteLoopDetected` is the one mid-resolution abort;
//! zone moves already committed by the aborted chain remain committed, since
//! each had an independent valid cause. `NonDeterminismDetected` is a
//! diagnostic for simulation tooling, not a gameplay error.

use thiserror::Error;

/// Errors surfaced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The action violates zone, timing, or ownership rules.
    /// No state was mutated.
    #[error("illegal action: {0}")]
    IllegalAction(String),

    /// The paying player cannot afford the computed cost.
    /// No state was mutated.
    #[error("insufficient energy: need {required}, have {available}")]
    InsufficientEnergy { required: u32, available: u32 },

    /// A resolution chain exceeded the configured depth bound and was
    /// aborted. Zone moves already applied by the chain remain applied.
    #[error("trigger resolution exceeded depth bound {limit}")]
    InfiniteLoopDetected { limit: u32 },

    /// A card definition failed load-time validation. Raised before any
    /// game starts, never at play time.
    #[error("invalid card definition '{name}': {reason}")]
    InvalidCardDefinition { name: String, reason: String },

    /// Two replays of the same action log produced different states.
    #[error("replays diverged: digest {first} != {second}")]
    NonDeterminismDetected { first: u64, second: u64 },

    /// Internal serialization failure while computing a state digest.
    #[error("serialization failure: {0}")]
    Serialization(String),
}

impl EngineError {
    /// Shorthand for an `IllegalAction` error.
    pub fn illegal(reason: impl Into<String>) -> Self {
        Self::IllegalAction(reason.into())
    }
}

/// Result alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;
