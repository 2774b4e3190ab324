//! Bresenham line casts over the lattice.
//!
//! The traversal is the 4-connected variant: every step moves exactly one
//! cell along either the row or the column axis, so a line from `from` to
//! `to` visits `1 + |Δrow| + |Δcolumn|` cells and can never slip diagonally
//! between two blocked cells that only touch at a corner.

use crate::{CellIndex, CellState, Lattice};

/// Outcome of [`Lattice::line_cast`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum LineCast {
    /// Reached the target with every visited cell free.
    Hit,
    /// Stopped on a cell that is not free.
    Blocked { cell: CellIndex, state: CellState },
    /// Ran out of the step budget before reaching the target.
    Exhausted,
}

impl LineCast {
    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, LineCast::Hit)
    }
}

// ── Bresenham iterator ────────────────────────────────────────────────────────

/// Cells on the 4-connected Bresenham line from `from` to `to`, both
/// inclusive.
pub(crate) struct Bresenham {
    x:         i32,
    y:         i32,
    x_inc:     i32,
    y_inc:     i32,
    dx2:       i64,
    dy2:       i64,
    error:     i64,
    remaining: u64,
}

impl Bresenham {
    pub(crate) fn new(from: CellIndex, to: CellIndex) -> Self {
        let dx = (i64::from(to.column) - i64::from(from.column)).abs();
        let dy = (i64::from(to.row) - i64::from(from.row)).abs();
        Self {
            x:         from.column,
            y:         from.row,
            x_inc:     if to.column > from.column { 1 } else { -1 },
            y_inc:     if to.row > from.row { 1 } else { -1 },
            dx2:       dx * 2,
            dy2:       dy * 2,
            error:     dx - dy,
            remaining: (1 + dx + dy) as u64,
        }
    }
}

impl Iterator for Bresenham {
    type Item = CellIndex;

    fn next(&mut self) -> Option<CellIndex> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = CellIndex::new(self.y, self.x);
        if self.error > 0 {
            self.x += self.x_inc;
            self.error -= self.dy2;
        } else {
            self.y += self.y_inc;
            self.error += self.dx2;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

// ── Line casts ────────────────────────────────────────────────────────────────

impl Lattice {
    /// Walk from `from` towards `to`, taking at most `max_cells` steps.
    ///
    /// Each visited cell is first checked for being free, then compared with
    /// the target, so an occupied target cell reports `Blocked`.  Identical
    /// endpoints are a trivial `Hit` regardless of budget or occupancy.  An
    /// endpoint outside the grid reports `Blocked` on that endpoint.
    pub fn line_cast(&self, from: CellIndex, to: CellIndex, max_cells: usize) -> LineCast {
        if from == to {
            return LineCast::Hit;
        }
        for end in [from, to] {
            if !self.in_bounds(end) {
                return LineCast::Blocked { cell: end, state: CellState::Fixed };
            }
        }

        for (steps, cell) in Bresenham::new(from, to).enumerate() {
            // Both endpoints are in the grid, so is the whole line.
            let state = self.state(cell).unwrap_or(CellState::Fixed);
            if !state.is_free() {
                return LineCast::Blocked { cell, state };
            }
            if cell == to {
                return LineCast::Hit;
            }
            if steps >= max_cells {
                return LineCast::Exhausted;
            }
        }
        LineCast::Exhausted
    }

    /// Unbounded boolean line cast: can `to` be reached from `from` through
    /// free cells on the straight line?
    #[inline]
    pub fn is_reachable(&self, from: CellIndex, to: CellIndex) -> bool {
        self.line_cast(from, to, usize::MAX).is_hit()
    }

    /// Every `(state, cell)` on the line from `from` to `to`, stopping after
    /// the first cell for which `stop` returns `true` (that cell included).
    /// Cells outside the grid end the trace.
    pub fn line_cast_trace<F>(&self, from: CellIndex, to: CellIndex, stop: F) -> Vec<(CellState, CellIndex)>
    where
        F: Fn(CellState) -> bool,
    {
        let mut trace = Vec::new();
        for cell in Bresenham::new(from, to) {
            let Some(state) = self.state(cell) else {
                break;
            };
            trace.push((state, cell));
            if stop(state) {
                break;
            }
        }
        trace
    }
}
