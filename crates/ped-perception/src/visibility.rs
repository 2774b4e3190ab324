//! The visibility map: a pre-processed lattice plus a ray-cast range.
//!
//! # Pre-processing
//!
//! 1. Pick the grid: clone a scenario lattice, or build one over the
//!    scenario bounds padded by three cells.
//! 2. Rasterize every obstacle as `Fixed`.
//! 3. Flood from the origin-area centres, sealing every region pedestrians
//!    can never enter.
//! 4. Derive the ray-cast range in cells.
//!
//! After that the lattice is only read, so `&VisibilityMap` is shared freely
//! between worker threads.

use ped_core::{EdgeId, LatticeId, Vec2, VertexId};
use ped_graph::NavGraph;
use ped_lattice::{CellIndex, CellState, Lattice, Neighborhood};
use tracing::{debug, info, warn};

use crate::{AgentView, Area, PerceptionConfig, PerceptionError, PerceptionResult, Scenario};

/// Ray-cast range when neither a distance nor any graph edge is available.
pub const DEFAULT_PERCEPTION_CELLS: usize = 250;

/// Padding, in cells, around the scenario bounds of a freshly built grid.
const BORDER_CELLS: f64 = 3.0;

// ── PointOfInterest ───────────────────────────────────────────────────────────

/// Anything that resolves to a single representative point for a
/// visibility query.
pub trait PointOfInterest {
    fn point_of_interest(&self) -> Vec2;
}

impl PointOfInterest for Vec2 {
    #[inline]
    fn point_of_interest(&self) -> Vec2 {
        *self
    }
}

impl PointOfInterest for Area {
    #[inline]
    fn point_of_interest(&self) -> Vec2 {
        self.point_of_interest
    }
}

impl PointOfInterest for AgentView {
    #[inline]
    fn point_of_interest(&self) -> Vec2 {
        self.position
    }
}

/// A graph vertex, resolved to its position.
#[derive(Copy, Clone)]
pub struct VertexRef<'g> {
    pub graph:  &'g NavGraph,
    pub vertex: VertexId,
}

impl<'g> VertexRef<'g> {
    pub fn new(graph: &'g NavGraph, vertex: VertexId) -> Self {
        Self { graph, vertex }
    }
}

impl PointOfInterest for VertexRef<'_> {
    #[inline]
    fn point_of_interest(&self) -> Vec2 {
        self.graph.position(self.vertex)
    }
}

impl<T: PointOfInterest + ?Sized> PointOfInterest for &T {
    #[inline]
    fn point_of_interest(&self) -> Vec2 {
        (**self).point_of_interest()
    }
}

// ── VisibilityMap ─────────────────────────────────────────────────────────────

/// Pre-processed visibility lattice.
#[derive(Clone, Debug)]
pub struct VisibilityMap {
    lattice:          Lattice,
    accuracy:         f64,
    perception_cells: usize,
}

impl VisibilityMap {
    /// One-time grid set-up.  Must run before the first tick.
    pub fn preprocess(
        scenario: &Scenario,
        graph: &NavGraph,
        config: &PerceptionConfig,
    ) -> PerceptionResult<Self> {
        config.validate()?;

        let mut lattice = match config.lattice_id {
            Some(id) => scenario
                .lattice(id)
                .cloned()
                .ok_or(PerceptionError::UnknownLattice(id))?,
            None => {
                scenario.validate()?;
                let bounds = scenario.bounds.expand(config.accuracy * BORDER_CELLS);
                Lattice::new(LatticeId(0), bounds, config.accuracy, Neighborhood::Edge)?
            }
        };
        let accuracy = lattice.cell_edge();
        debug!("visibility lattice {}: {}x{} cells of {}", lattice.id(), lattice.rows(), lattice.columns(), accuracy);

        let mut obstacle_cells = 0;
        for obstacle in &scenario.obstacles {
            obstacle_cells += lattice.occupy_shape(obstacle, CellState::Fixed).len();
        }

        let seeds: Vec<CellIndex> = scenario
            .origins
            .iter()
            .map(|o| lattice.cell_index_from_position(o.center()))
            .filter(|&c| lattice.in_bounds(c))
            .collect();
        let sealed = if seeds.is_empty() {
            warn!("no origin area inside the visibility lattice, skipping reachability flood");
            0
        } else {
            lattice.flood(&seeds)?
        };

        let perception_cells = match config.perception_distance {
            Some(distance) => (distance / accuracy) as usize,
            None => match graph.longest_edge_length() {
                Some(longest) => ((longest / accuracy) * 2.0) as usize,
                None => DEFAULT_PERCEPTION_CELLS,
            },
        };
        debug!("perception_cells set to {}", perception_cells);

        info!(
            "visibility map ready: {} obstacle cells, {} sealed, range {} cells",
            obstacle_cells, sealed, perception_cells
        );

        Ok(Self::from_lattice(lattice, perception_cells))
    }

    /// Wrap an already prepared lattice.  Nothing is rasterized or flooded;
    /// the accuracy is the lattice's cell edge.
    pub fn from_lattice(lattice: Lattice, perception_cells: usize) -> Self {
        let accuracy = lattice.cell_edge();
        Self { lattice, accuracy, perception_cells }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn perception_cells(&self) -> usize {
        self.perception_cells
    }

    /// Range of a ray cast in world units.
    pub fn perception_distance(&self) -> f64 {
        self.perception_cells as f64 * self.accuracy
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Straight-line visibility between two positions.  `false` whenever
    /// either end lies outside the grid.
    pub fn is_visible(&self, from: Vec2, to: Vec2) -> bool {
        let a = self.lattice.cell_index_from_position(from);
        let b = self.lattice.cell_index_from_position(to);
        if !self.lattice.in_bounds(a) || !self.lattice.in_bounds(b) {
            return false;
        }
        self.lattice.line_cast(a, b, self.perception_cells).is_hit()
    }

    pub fn is_visible_to<T: PointOfInterest + ?Sized>(&self, from: Vec2, target: &T) -> bool {
        self.is_visible(from, target.point_of_interest())
    }

    pub fn is_vertex_visible(&self, from: Vec2, graph: &NavGraph, vertex: VertexId) -> bool {
        graph.contains(vertex) && self.is_visible(from, graph.position(vertex))
    }

    /// An edge is visible if either endpoint is.
    pub fn is_edge_visible(&self, from: Vec2, graph: &NavGraph, edge: EdgeId) -> bool {
        if edge.index() >= graph.edge_count() {
            return false;
        }
        let (a, b) = graph.edge_endpoints(edge);
        self.is_vertex_visible(from, graph, a) || self.is_vertex_visible(from, graph, b)
    }
}
