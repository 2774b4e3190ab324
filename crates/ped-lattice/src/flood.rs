//! Breadth-first passes over free cells.
//!
//! [`Lattice::flood`] is the visibility-map pre-processing step: everything
//! that cannot be reached from where pedestrians appear is sealed as `Fixed`,
//! so a line cast can never "see" into a closed-off room through the grid.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::{CellIndex, CellState, Lattice, LatticeResult};

impl Lattice {
    /// Cells reachable from `seeds` through free, in-grid cells, using the
    /// lattice's neighbourhood.  Seeds that are occupied or outside the grid
    /// contribute nothing.  Does not modify the grid.
    pub fn flood_reachable(&self, seeds: &[CellIndex]) -> FxHashSet<CellIndex> {
        let mut reached = FxHashSet::default();
        let mut queue = VecDeque::new();

        for &seed in seeds {
            if self.is_free(seed) && reached.insert(seed) {
                queue.push_back(seed);
            }
        }

        while let Some(cell) = queue.pop_front() {
            for next in self.neighbors_in_bounds(cell) {
                if self.is_free(next) && reached.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        reached
    }

    /// Seal every free cell that is not reachable from `seeds` as `Fixed`.
    ///
    /// Reached cells and cells that were already occupied keep their state,
    /// so a second flood from the same seeds changes nothing.  Returns the
    /// number of cells sealed.
    pub fn flood(&mut self, seeds: &[CellIndex]) -> LatticeResult<usize> {
        let reached = self.flood_reachable(seeds);
        let mut sealed = 0;
        for slot in 0..self.cell_count() {
            let index = self.index_of_slot(slot);
            if self.state_mut(slot).is_free() && !reached.contains(&index) {
                self.store_mut(slot, CellState::Fixed)?;
                sealed += 1;
            }
        }
        Ok(sealed)
    }

    /// Write the breadth-first layer distance from `sources` (in world units,
    /// `layer × cell_edge`) into every reachable free cell as its `Empty`
    /// payload.  Sources keep their state.  Returns the deepest layer.
    pub fn compute_distance_map(&mut self, sources: &[CellIndex]) -> LatticeResult<usize> {
        let mut visited: FxHashSet<CellIndex> = sources
            .iter()
            .copied()
            .filter(|&c| self.in_bounds(c))
            .collect();
        let mut frontier: Vec<CellIndex> = visited.iter().copied().collect();
        let mut layer = 0;

        while !frontier.is_empty() {
            let mut next_frontier = Vec::new();
            for &cell in &frontier {
                for next in self.neighbors_in_bounds(cell) {
                    if self.is_free(next) && visited.insert(next) {
                        next_frontier.push(next);
                    }
                }
            }
            if next_frontier.is_empty() {
                break;
            }
            layer += 1;
            let distance = layer as f64 * self.cell_edge();
            for &cell in &next_frontier {
                self.set_value(cell, distance)?;
            }
            frontier = next_frontier;
        }
        Ok(layer)
    }
}
