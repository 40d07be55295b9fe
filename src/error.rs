//! The error taxonomy surfaced by the model-building pipeline.
//!
//! Every failure is rooted in one of these kinds so the command surface can map it to a distinct
//! exit code. Errors are propagated with `anyhow` and recovered by downcasting the chain root.
use thiserror::Error;

/// A structured failure from loading, formulating or solving a case.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The case document is malformed or internally inconsistent: missing required keys,
    /// dangling entity references or non-well-formed path sequences. Detected before
    /// formulation begins.
    #[error("validation error: {0}")]
    Validation(String),

    /// An index-set join yielded zero members where at least one was required, e.g. an odpair
    /// with no path. Formulation never proceeds with an empty constraint.
    #[error("formulation error: {0}")]
    Formulation(String),

    /// The assembled program has no feasible (bounded) solution. Not a defect in the builder;
    /// typically caused by conflicting share, shift-rate, emission or budget constraints.
    #[error("no solution ({status}); active constraint families that may conflict: {families}")]
    Infeasible {
        /// The engine-reported status
        status: String,
        /// The active constraint families known to cause infeasibility, comma-separated
        families: String,
    },

    /// The solving engine failed or stopped without a solution; surfaced verbatim, never
    /// retried.
    #[error("solver error: {status}")]
    Solver {
        /// The engine-reported status
        status: String,
    },
}

impl ModelError {
    /// The process exit code documented for this error kind.
    ///
    /// 0 is reserved for a found solution and 1 for unclassified failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            ModelError::Validation(_) => 2,
            ModelError::Formulation(_) => 3,
            ModelError::Infeasible { .. } => 4,
            ModelError::Solver { .. } => 5,
        }
    }
}

/// The exit code for an error chain: the root [`ModelError`]'s code, or 1 if the chain has none.
pub fn exit_code_for(error: &anyhow::Error) -> u8 {
    error
        .chain()
        .filter_map(|e| e.downcast_ref::<ModelError>())
        .map(ModelError::exit_code)
        .next()
        .unwrap_or(1)
}
