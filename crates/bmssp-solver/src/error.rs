//! Error types for the solver.

use thiserror::Error;

use crate::graph::NodeId;

/// Errors that abort a solve. No partial matrix is ever returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    /// An edge weight was negative, NaN or infinite. Reported for the
    /// offending edge the first time the search traverses it.
    #[error("Invalid weight {weight} on edge {from} -> {to}: weights must be non-negative and finite")]
    InvalidWeight {
        from: NodeId,
        to: NodeId,
        weight: f64,
    },

    /// The cap on total relaxations across all per-source searches tripped.
    #[error("Relaxation limit {limit} exceeded")]
    RelaxationLimit { limit: u64 },
}

/// Result type for solver operations
pub type SolveResult<T> = Result<T, SolveError>;
