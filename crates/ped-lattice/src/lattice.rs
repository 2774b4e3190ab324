//! The `Lattice` type: geometry of the grid and per-cell state access.
//!
//! # Index mapping
//!
//! Cell `(0, 0)` is *centred* on the minimum corner of the bounding box the
//! lattice was built from.  A position maps to the cell whose centre is
//! nearest along each axis:
//!
//! ```text
//! column = floor((x − origin.x) / edge + 0.5)
//! row    = floor((y − origin.y) / edge + 0.5)
//! ```
//!
//! and `center_position` is the exact inverse on cell centres, so
//! `index(center(index(p))) == index(p)` for every position.
//!
//! # Storage
//!
//! Row-major `Vec<AtomicU64>`; slot = `row * columns + column`.  The encoding
//! of a [`CellState`] into the 64 bits is private to this crate.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use ped_core::{Bounds, LatticeId, Vec2};

use crate::{CellIndex, CellState, LatticeError, LatticeResult, Neighborhood};

/// Upper limit on cells per lattice; keeps every index representable as `i32`.
const MAX_CELLS: usize = i32::MAX as usize;

// ── Lattice ───────────────────────────────────────────────────────────────────

/// Rectangular grid of square cells over a scenario.
///
/// Construct with [`Lattice::new`].  Reads and the single-cell writes
/// (`occupy`, `free`, `set`) take `&self` and are safe to call from many
/// threads; grid-wide passes take `&mut self`.
pub struct Lattice {
    id:           LatticeId,
    neighborhood: Neighborhood,
    cell_edge:    f64,
    /// Centre of cell (0, 0).
    origin:       Vec2,
    rows:         usize,
    columns:      usize,
    cells:        Vec<AtomicU64>,
}

impl Lattice {
    /// Build a lattice covering `bounds` with square cells of side
    /// `cell_edge`.  All cells start free.
    pub fn new(
        id:           LatticeId,
        bounds:       Bounds,
        cell_edge:    f64,
        neighborhood: Neighborhood,
    ) -> LatticeResult<Self> {
        if !(cell_edge > 0.0) || !cell_edge.is_finite() {
            return Err(LatticeError::InvalidCellEdge(cell_edge));
        }
        if !bounds.min.is_finite()
            || !bounds.max.is_finite()
            || bounds.width() < 0.0
            || bounds.height() < 0.0
        {
            return Err(LatticeError::DegenerateBounds(bounds));
        }

        let rows    = axis_count(bounds.min.y, bounds.max.y, cell_edge);
        let columns = axis_count(bounds.min.x, bounds.max.x, cell_edge);
        let total = rows
            .checked_mul(columns)
            .filter(|&n| n <= MAX_CELLS)
            .ok_or(LatticeError::TooLarge { rows, columns })?;

        let free = CellState::FREE.encode().unwrap_or_default();
        let cells = (0..total).map(|_| AtomicU64::new(free)).collect();

        Ok(Self {
            id,
            neighborhood,
            cell_edge,
            origin: bounds.min,
            rows,
            columns,
            cells,
        })
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn id(&self) -> LatticeId {
        self.id
    }

    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    pub fn cell_edge(&self) -> f64 {
        self.cell_edge
    }

    pub fn cell_area(&self) -> f64 {
        self.cell_edge * self.cell_edge
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Centre of cell (0, 0).
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Outer extent of all cells (half a cell beyond the outermost centres).
    pub fn bounds(&self) -> Bounds {
        let half = self.cell_edge * 0.5;
        let far = self.origin
            + Vec2::new(
                (self.columns.saturating_sub(1)) as f64 * self.cell_edge,
                (self.rows.saturating_sub(1)) as f64 * self.cell_edge,
            );
        Bounds::new(self.origin, far).expand(half)
    }

    // ── Index mapping ─────────────────────────────────────────────────────

    /// Cell containing `position`.  Not clamped: check the result with
    /// [`in_bounds`](Self::in_bounds) before trusting it.  Non-finite
    /// positions map to an index outside every grid.
    #[inline]
    pub fn cell_index_from_position(&self, position: Vec2) -> CellIndex {
        let column = ((position.x - self.origin.x) / self.cell_edge + 0.5).floor();
        let row    = ((position.y - self.origin.y) / self.cell_edge + 0.5).floor();
        // `as i32` turns NaN into 0, which is a real cell.
        if !column.is_finite() || !row.is_finite() {
            return CellIndex::new(-1, -1);
        }
        CellIndex::new(row as i32, column as i32)
    }

    #[inline]
    pub fn center_position(&self, index: CellIndex) -> Vec2 {
        self.origin
            + Vec2::new(
                index.column as f64 * self.cell_edge,
                index.row as f64 * self.cell_edge,
            )
    }

    #[inline]
    pub fn in_bounds(&self, index: CellIndex) -> bool {
        index.row >= 0
            && index.column >= 0
            && (index.row as usize) < self.rows
            && (index.column as usize) < self.columns
    }

    #[inline]
    pub fn in_bounds_position(&self, position: Vec2) -> bool {
        self.in_bounds(self.cell_index_from_position(position))
    }

    /// Square covered by a cell.
    pub fn cell_bounds(&self, index: CellIndex) -> Bounds {
        let c = self.center_position(index);
        Bounds::new(c, c).expand(self.cell_edge * 0.5)
    }

    /// Corner points of a cell, counter-clockwise from the lower left.
    pub fn cell_corners(&self, index: CellIndex) -> [Vec2; 4] {
        let b = self.cell_bounds(index);
        [
            b.min,
            Vec2::new(b.max.x, b.min.y),
            b.max,
            Vec2::new(b.min.x, b.max.y),
        ]
    }

    /// Neighbours per the lattice's [`Neighborhood`], *including* indices
    /// outside the grid.
    pub fn neighbors(&self, index: CellIndex) -> Vec<CellIndex> {
        self.neighborhood
            .offsets()
            .iter()
            .map(|&(dr, dc)| index.offset(dr, dc))
            .collect()
    }

    /// Neighbours that lie inside the grid.
    pub fn neighbors_in_bounds(&self, index: CellIndex) -> impl Iterator<Item = CellIndex> + '_ {
        self.neighborhood
            .offsets()
            .iter()
            .map(move |&(dr, dc)| index.offset(dr, dc))
            .filter(move |&n| self.in_bounds(n))
    }

    #[inline]
    pub(crate) fn slot(&self, index: CellIndex) -> Option<usize> {
        self.in_bounds(index)
            .then(|| index.row as usize * self.columns + index.column as usize)
    }

    #[inline]
    pub(crate) fn index_of_slot(&self, slot: usize) -> CellIndex {
        CellIndex::new((slot / self.columns) as i32, (slot % self.columns) as i32)
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// State of a cell, or `None` outside the grid.
    #[inline]
    pub fn state(&self, index: CellIndex) -> Option<CellState> {
        self.slot(index)
            .map(|s| CellState::decode(self.cells[s].load(Ordering::Acquire)))
    }

    /// `false` outside the grid.
    #[inline]
    pub fn is_free(&self, index: CellIndex) -> bool {
        self.state(index).is_some_and(CellState::is_free)
    }

    /// Payload of an `Empty` cell; `None` for occupied or out-of-grid cells.
    #[inline]
    pub fn value(&self, index: CellIndex) -> Option<f64> {
        self.state(index).and_then(CellState::value)
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellIndex, CellState)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(s, c)| (self.index_of_slot(s), CellState::decode(c.load(Ordering::Acquire))))
    }

    /// All cells whose state satisfies `pred`, in row-major order.
    pub fn cells_where<F>(&self, pred: F) -> Vec<CellIndex>
    where
        F: Fn(CellState) -> bool,
    {
        self.cells().filter(|&(_, st)| pred(st)).map(|(i, _)| i).collect()
    }

    /// All `Empty` cells carrying exactly `value`.
    pub fn cells_with_value(&self, value: f64) -> Vec<CellIndex> {
        self.cells_where(|st| st.value() == Some(value))
    }

    /// Number of in-grid neighbours that are not free.
    pub fn occupied_neighbor_count(&self, index: CellIndex) -> usize {
        self.neighbors_in_bounds(index)
            .filter(|&n| !self.is_free(n))
            .count()
    }

    /// Minimum and maximum payload among the `Empty` cells of `indices`.
    pub fn min_max_values<'a, I>(&self, indices: I) -> Option<(f64, f64)>
    where
        I: IntoIterator<Item = &'a CellIndex>,
    {
        indices
            .into_iter()
            .filter_map(|&i| self.value(i))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    // ── Single-cell writes ────────────────────────────────────────────────

    /// Claim a free cell for `state` (`Fixed` or `Dynamic`).
    ///
    /// Atomic check-and-set: of several threads racing for the same free
    /// cell exactly one succeeds.  Returns `false`, leaving the cell
    /// untouched, if the cell is outside the grid, already occupied, or
    /// `state` is `Empty`.
    pub fn occupy(&self, index: CellIndex, state: CellState) -> bool {
        if !state.is_occupier() {
            return false;
        }
        let (Some(slot), Some(bits)) = (self.slot(index), state.encode()) else {
            return false;
        };
        let cell = &self.cells[slot];
        let mut current = cell.load(Ordering::Acquire);
        loop {
            if !CellState::decode(current).is_free() {
                return false;
            }
            match cell.compare_exchange_weak(current, bits, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Release an occupied cell back to `Empty(0.0)`.  Returns `false` if
    /// the cell is outside the grid or already free.
    pub fn free(&self, index: CellIndex) -> bool {
        let Some(slot) = self.slot(index) else {
            return false;
        };
        let free = CellState::FREE.encode().unwrap_or_default();
        let cell = &self.cells[slot];
        let mut current = cell.load(Ordering::Acquire);
        loop {
            if CellState::decode(current).is_free() {
                return false;
            }
            match cell.compare_exchange_weak(current, free, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Unconditional store; concurrent writers to the same cell are
    /// last-write-wins.
    pub fn set(&self, index: CellIndex, state: CellState) -> LatticeResult<()> {
        let slot = self.slot(index).ok_or(LatticeError::OutOfBounds(index))?;
        let bits = encode(state)?;
        self.cells[slot].store(bits, Ordering::Release);
        Ok(())
    }

    /// Store `Empty(value)`, overwriting whatever the cell held.
    #[inline]
    pub fn set_value(&self, index: CellIndex, value: f64) -> LatticeResult<()> {
        self.set(index, CellState::Empty(value))
    }

    /// Atomically add `delta` to an `Empty` cell's payload.  Returns
    /// `Ok(false)` for occupied cells, which are left alone.
    pub fn increase_value(&self, index: CellIndex, delta: f64) -> LatticeResult<bool> {
        let slot = self.slot(index).ok_or(LatticeError::OutOfBounds(index))?;
        let cell = &self.cells[slot];
        let mut current = cell.load(Ordering::Acquire);
        loop {
            let CellState::Empty(v) = CellState::decode(current) else {
                return Ok(false);
            };
            let next = encode(CellState::Empty(v + delta))?;
            match cell.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return Ok(true),
                Err(actual) => current = actual,
            }
        }
    }

    // ── Grid-wide writes (pre-processing) ─────────────────────────────────

    /// Overwrite every cell with `state`.
    pub fn set_all(&mut self, state: CellState) -> LatticeResult<()> {
        let bits = encode(state)?;
        for cell in &mut self.cells {
            *cell.get_mut() = bits;
        }
        Ok(())
    }

    /// Set the payload of every free cell to `value`; occupied cells are
    /// untouched.
    pub fn set_all_free_to(&mut self, value: f64) -> LatticeResult<()> {
        let bits = encode(CellState::Empty(value))?;
        for cell in &mut self.cells {
            let slot = cell.get_mut();
            if CellState::decode(*slot).is_free() {
                *slot = bits;
            }
        }
        Ok(())
    }

    /// Exclusive access to a cell's raw storage, for grid-wide passes.
    #[inline]
    pub(crate) fn state_mut(&mut self, slot: usize) -> CellState {
        CellState::decode(*self.cells[slot].get_mut())
    }

    #[inline]
    pub(crate) fn store_mut(&mut self, slot: usize, state: CellState) -> LatticeResult<()> {
        *self.cells[slot].get_mut() = encode(state)?;
        Ok(())
    }
}

/// Number of cell centres on one axis so that `max` falls into the last cell.
fn axis_count(min: f64, max: f64, edge: f64) -> usize {
    ((max - min) / edge + 0.5).floor() as usize + 1
}

#[inline]
fn encode(state: CellState) -> LatticeResult<u64> {
    state.encode().ok_or(match state {
        CellState::Empty(v) => LatticeError::InvalidValue(v),
        _ => LatticeError::InvalidValue(f64::NAN),
    })
}

impl Clone for Lattice {
    /// Snapshot copy.  Concurrent writers during the clone may or may not be
    /// reflected, cell by cell.
    fn clone(&self) -> Self {
        Self {
            id:           self.id,
            neighborhood: self.neighborhood,
            cell_edge:    self.cell_edge,
            origin:       self.origin,
            rows:         self.rows,
            columns:      self.columns,
            cells: self
                .cells
                .iter()
                .map(|c| AtomicU64::new(c.load(Ordering::Acquire)))
                .collect(),
        }
    }
}

impl fmt::Debug for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lattice")
            .field("id", &self.id)
            .field("rows", &self.rows)
            .field("columns", &self.columns)
            .field("cell_edge", &self.cell_edge)
            .field("neighborhood", &self.neighborhood)
            .finish()
    }
}

impl fmt::Display for Lattice {
    /// ASCII paint, top row first: `#` fixed, `o` dynamic, `.` empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.rows).rev() {
            let line: String = (0..self.columns)
                .map(|col| {
                    self.state(CellIndex::new(row as i32, col as i32))
                        .map_or(' ', CellState::glyph)
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
