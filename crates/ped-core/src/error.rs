//! Framework error type.
//!
//! Sub-crates define their own error enums (`LatticeError`, `GraphError`, …)
//! and wrap `PedError` where a core failure bubbles up through them.

use thiserror::Error;

use crate::AgentId;

/// The top-level error type for `ped-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum PedError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `ped-core`.
pub type PedResult<T> = Result<T, PedError>;
