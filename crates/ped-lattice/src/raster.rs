//! Rasterization of scenario shapes onto lattice cells.
//!
//! Two enumerations are combined:
//!
//! - **border** cells: cells whose square touches the shape's boundary.  For
//!   a segment that is the segment itself; for a polygon every edge.
//! - **inside** cells: cells whose *centre* lies inside the shape.
//!
//! Both scan only the cells of the shape's bounding box, clamped to the grid,
//! so every result is bounds-filtered by construction.

use ped_core::{Bounds, Circle, Polygon, Segment};

use crate::{CellIndex, CellState, Lattice};

/// A shape that can be rasterized.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Segment(Segment),
    Polygon(Polygon),
    Circle(Circle),
}

impl From<Segment> for Shape {
    fn from(s: Segment) -> Self {
        Shape::Segment(s)
    }
}

impl From<Polygon> for Shape {
    fn from(p: Polygon) -> Self {
        Shape::Polygon(p)
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Shape::Circle(c)
    }
}

impl Lattice {
    /// In-grid cells overlapping `bounds`, as an inclusive index rectangle.
    /// `None` when the box misses the grid entirely.
    fn cell_window(&self, bounds: &Bounds) -> Option<(CellIndex, CellIndex)> {
        let lo = self.cell_index_from_position(bounds.min);
        let hi = self.cell_index_from_position(bounds.max);
        let max_row = self.rows() as i32 - 1;
        let max_col = self.columns() as i32 - 1;
        if hi.row < 0 || hi.column < 0 || lo.row > max_row || lo.column > max_col {
            return None;
        }
        Some((
            CellIndex::new(lo.row.max(0), lo.column.max(0)),
            CellIndex::new(hi.row.min(max_row), hi.column.min(max_col)),
        ))
    }

    fn window_cells(&self, bounds: &Bounds) -> impl Iterator<Item = CellIndex> {
        let window = self.cell_window(bounds);
        window.into_iter().flat_map(|(lo, hi)| {
            (lo.row..=hi.row)
                .flat_map(move |r| (lo.column..=hi.column).map(move |c| CellIndex::new(r, c)))
        })
    }

    /// Cells whose square intersects `segment`.
    pub fn border_cells_segment(&self, segment: &Segment) -> Vec<CellIndex> {
        self.window_cells(&segment.bounds())
            .filter(|&c| segment.intersects_box(&self.cell_bounds(c)))
            .collect()
    }

    /// Cells whose square intersects any edge of `polygon`.
    pub fn border_cells_polygon(&self, polygon: &Polygon) -> Vec<CellIndex> {
        let mut cells: Vec<CellIndex> = polygon
            .edges()
            .flat_map(|e| self.border_cells_segment(&e))
            .collect();
        cells.sort_unstable();
        cells.dedup();
        cells
    }

    /// Cells whose centre lies inside `polygon`.
    pub fn inside_cells_polygon(&self, polygon: &Polygon) -> Vec<CellIndex> {
        let Some(bounds) = polygon.bounds() else {
            return Vec::new();
        };
        self.window_cells(&bounds)
            .filter(|&c| polygon.contains(self.center_position(c)))
            .collect()
    }

    /// Cells whose centre lies within `circle` (boundary inclusive).
    pub fn circle_cells(&self, circle: &Circle) -> Vec<CellIndex> {
        self.window_cells(&circle.bounds())
            .filter(|&c| circle.contains(self.center_position(c)))
            .collect()
    }

    /// All in-grid cells covered by `shape`, sorted and without duplicates.
    pub fn rasterize(&self, shape: &Shape) -> Vec<CellIndex> {
        let mut cells = match shape {
            Shape::Segment(s) => self.border_cells_segment(s),
            Shape::Polygon(p) => {
                let mut cells = self.inside_cells_polygon(p);
                cells.extend(self.border_cells_polygon(p));
                cells
            }
            Shape::Circle(c) => self.circle_cells(c),
        };
        cells.sort_unstable();
        cells.dedup();
        cells
    }

    /// Rasterize `shape` and [`occupy`](Lattice::occupy) each cell with
    /// `state`.  Returns the cells that were actually claimed; cells that
    /// were already occupied are skipped.
    pub fn occupy_shape(&self, shape: &Shape, state: CellState) -> Vec<CellIndex> {
        self.rasterize(shape)
            .into_iter()
            .filter(|&c| self.occupy(c, state))
            .collect()
    }

    /// Free every cell covered by `shape`.  Returns the cells released.
    pub fn free_shape(&self, shape: &Shape) -> Vec<CellIndex> {
        self.rasterize(shape)
            .into_iter()
            .filter(|&c| self.free(c))
            .collect()
    }
}
