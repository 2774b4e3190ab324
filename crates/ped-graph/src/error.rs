//! Graph-subsystem error type.

use thiserror::Error;

use ped_core::{EdgeId, VertexId};

/// Errors produced by `ped-graph`.
///
/// A search that finds no path is not an error; it returns `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("vertex {0} not found in graph")]
    VertexNotFound(VertexId),

    #[error("edge {0} not found in graph")]
    EdgeNotFound(EdgeId),
}

pub type GraphResult<T> = Result<T, GraphError>;
