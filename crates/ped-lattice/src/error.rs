//! Lattice error type.

use thiserror::Error;

use ped_core::Bounds;

use crate::CellIndex;

/// Errors produced by `ped-lattice`.
///
/// Out-of-bounds *queries* are not errors: they answer "not free".  Only
/// writes to a cell that does not exist are reported.
#[derive(Debug, Error)]
pub enum LatticeError {
    #[error("cell edge must be positive and finite, got {0}")]
    InvalidCellEdge(f64),

    #[error("degenerate lattice bounds {}..{}", .0.min, .0.max)]
    DegenerateBounds(Bounds),

    #[error("lattice of {rows} x {columns} cells is too large")]
    TooLarge { rows: usize, columns: usize },

    #[error("cell {0} is outside the lattice")]
    OutOfBounds(CellIndex),

    #[error("cell value {0} cannot be stored (NaN is reserved)")]
    InvalidValue(f64),
}

pub type LatticeResult<T> = Result<T, LatticeError>;
