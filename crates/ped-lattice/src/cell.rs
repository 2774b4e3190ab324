//! Cell addressing and the tri-state cell classification.

use std::fmt;

// ── CellIndex ─────────────────────────────────────────────────────────────────

/// `(row, column)` address of a cell.  Rows follow the y axis, columns the
/// x axis.
///
/// Signed so that indices computed from positions outside the grid are
/// representable; whether an index is valid is a property of a particular
/// lattice, see [`Lattice::in_bounds`](crate::Lattice::in_bounds).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellIndex {
    pub row:    i32,
    pub column: i32,
}

impl CellIndex {
    #[inline]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    #[inline]
    pub fn offset(self, d_row: i32, d_column: i32) -> Self {
        Self::new(self.row + d_row, self.column + d_column)
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}|{})", self.row, self.column)
    }
}

// ── Neighborhood ──────────────────────────────────────────────────────────────

/// Which cells count as adjacent.  Chosen once per lattice.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Neighborhood {
    /// 4-connected (von Neumann): cells sharing an edge.
    #[default]
    Edge,
    /// 8-connected (Moore): cells sharing an edge or a corner.
    Touching,
}

const EDGE_OFFSETS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

const TOUCHING_OFFSETS: [(i32, i32); 8] = [
    (1, 0), (1, 1), (0, 1), (-1, 1),
    (-1, 0), (-1, -1), (0, -1), (1, -1),
];

impl Neighborhood {
    /// `(d_row, d_column)` offsets in a fixed clockwise order starting north.
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Neighborhood::Edge     => &EDGE_OFFSETS,
            Neighborhood::Touching => &TOUCHING_OFFSETS,
        }
    }
}

// ── CellState ─────────────────────────────────────────────────────────────────

/// Bit pattern marking a `Fixed` cell.  A NaN, so never produced by a stored
/// `Empty` value (NaN payloads are rejected on write).
const FIXED_BITS: u64 = u64::MAX;
/// Bit pattern marking a `Dynamic` cell.  Also a NaN.
const DYNAMIC_BITS: u64 = u64::MAX - 1;

/// Classification of a single cell.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    /// Permanent obstacle (walls, flooded-out dead regions).
    Fixed,
    /// Transient occupant, e.g. a pedestrian claiming a cell.
    Dynamic,
    /// Free cell with an auxiliary scalar payload (0.0 unless a pass such as
    /// the distance map wrote something else).
    Empty(f64),
}

impl CellState {
    /// The canonical free cell.
    pub const FREE: CellState = CellState::Empty(0.0);

    #[inline]
    pub fn is_free(self) -> bool {
        matches!(self, CellState::Empty(_))
    }

    /// `Fixed` or `Dynamic`: the states `occupy` can write.
    #[inline]
    pub fn is_occupier(self) -> bool {
        !self.is_free()
    }

    /// Payload of an `Empty` cell.
    #[inline]
    pub fn value(self) -> Option<f64> {
        match self {
            CellState::Empty(v) => Some(v),
            _ => None,
        }
    }

    /// Storage encoding.  `None` for `Empty(NaN)`, which has no encoding.
    #[inline]
    pub(crate) fn encode(self) -> Option<u64> {
        match self {
            CellState::Fixed    => Some(FIXED_BITS),
            CellState::Dynamic  => Some(DYNAMIC_BITS),
            CellState::Empty(v) if v.is_nan() => None,
            CellState::Empty(v) => Some(v.to_bits()),
        }
    }

    #[inline]
    pub(crate) fn decode(bits: u64) -> CellState {
        match bits {
            FIXED_BITS   => CellState::Fixed,
            DYNAMIC_BITS => CellState::Dynamic,
            other        => CellState::Empty(f64::from_bits(other)),
        }
    }

    /// Single-character rendering used by the lattice's `Display` impl.
    pub(crate) fn glyph(self) -> char {
        match self {
            CellState::Fixed    => '#',
            CellState::Dynamic  => 'o',
            CellState::Empty(_) => '.',
        }
    }
}
