//! Perception-subsystem error type.

use thiserror::Error;

use ped_core::LatticeId;
use ped_lattice::LatticeError;

/// Errors produced by `ped-perception`.
///
/// All of these surface during pre-processing.  Queries never fail: a
/// position outside the grid is simply not visible.
#[derive(Debug, Error)]
pub enum PerceptionError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("lattice {0} is not part of the scenario")]
    UnknownLattice(LatticeId),

    #[error("lattice error: {0}")]
    Lattice(#[from] LatticeError),
}

pub type PerceptionResult<T> = Result<T, PerceptionError>;
