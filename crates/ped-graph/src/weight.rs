//! Pluggable edge-cost strategies and the per-search cost table.
//!
//! A* asks a [`WeightCalculator`] four questions while relaxing an edge
//! `current → successor`:
//!
//! 1. `calculate_weight`: tentative cost of reaching `successor` through
//!    `current`, plus the remaining estimate to the target;
//! 2. `compare_weight`: does that strictly improve on what the table holds?
//! 3. `update_weight`: record the new cost and predecessor;
//! 4. before the search, `initialize_weights` / `initialize_weights_for_start`.
//!
//! Implementors usually only provide [`WeightCalculator::position`]; the
//! default methods derive edge costs and the heuristic from it.

use ped_core::{EdgeId, Vec2, VertexId};

use crate::NavGraph;

// ── CostTable ─────────────────────────────────────────────────────────────────

/// Tentative costs and predecessors for one search consumer.
///
/// Every agent (or strategy instance) owns its own table, so concurrent
/// searches over a shared `&NavGraph` never collide.  Unset entries read as
/// `+∞` with no predecessor.
#[derive(Debug, Clone, Default)]
pub struct CostTable {
    cost:        Vec<f64>,
    predecessor: Vec<VertexId>,
}

impl CostTable {
    /// A table for a graph with `vertex_count` vertices, all at `+∞`.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            cost:        vec![f64::INFINITY; vertex_count],
            predecessor: vec![VertexId::INVALID; vertex_count],
        }
    }

    pub fn len(&self) -> usize {
        self.cost.len()
    }

    /// `true` once [`release`](Self::release)d or when built for an empty graph.
    pub fn is_empty(&self) -> bool {
        self.cost.is_empty()
    }

    #[inline]
    pub fn cost(&self, vertex: VertexId) -> f64 {
        self.cost.get(vertex.index()).copied().unwrap_or(f64::INFINITY)
    }

    #[inline]
    pub fn predecessor(&self, vertex: VertexId) -> Option<VertexId> {
        self.predecessor
            .get(vertex.index())
            .copied()
            .filter(|p| p.is_valid())
    }

    /// Store a cost without touching the predecessor.  Ignored for vertices
    /// outside the table.
    pub fn set_cost(&mut self, vertex: VertexId, cost: f64) {
        if let Some(slot) = self.cost.get_mut(vertex.index()) {
            *slot = cost;
        }
    }

    pub fn set(&mut self, vertex: VertexId, cost: f64, predecessor: VertexId) {
        let i = vertex.index();
        if i < self.cost.len() {
            self.cost[i] = cost;
            self.predecessor[i] = predecessor;
        }
    }

    /// Resize to `vertex_count` and set every entry back to `+∞`.
    pub fn reset(&mut self, vertex_count: usize) {
        self.cost.clear();
        self.cost.resize(vertex_count, f64::INFINITY);
        self.predecessor.clear();
        self.predecessor.resize(vertex_count, VertexId::INVALID);
    }

    /// Drop the storage.  The next search re-allocates.
    pub fn release(&mut self) {
        self.cost = Vec::new();
        self.predecessor = Vec::new();
    }

    /// Follow predecessors back from `target`.  Returns the vertices in
    /// start-to-target order, or `None` if `target` was never reached.
    pub fn path_to(&self, target: VertexId) -> Option<Vec<VertexId>> {
        if !self.cost(target).is_finite() {
            return None;
        }
        let mut vertices = vec![target];
        let mut cur = target;
        while let Some(prev) = self.predecessor(cur) {
            // A chain longer than the table is a predecessor cycle.
            if vertices.len() > self.len() {
                return None;
            }
            vertices.push(prev);
            cur = prev;
        }
        vertices.reverse();
        Some(vertices)
    }
}

// ── Estimate ──────────────────────────────────────────────────────────────────

/// Result of relaxing one edge: the cost so far and the A* priority.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Estimate {
    /// `g(current) + cost(current → successor)`.
    pub cost:     f64,
    /// `cost + h(successor, target)`.  Orders the open set.
    pub estimate: f64,
}

// ── WeightCalculator ──────────────────────────────────────────────────────────

/// Edge-cost strategy for [`ShortestPath`](crate::ShortestPath).
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one strategy can serve searches
/// on several Rayon workers.  All mutable search state goes through the
/// `&mut CostTable` argument.
pub trait WeightCalculator: Send + Sync {
    /// Where this strategy believes `vertex` is.
    fn position(&self, graph: &NavGraph, vertex: VertexId) -> Vec2;

    /// Cost of the hop `current → successor`.
    fn edge_cost(&self, graph: &NavGraph, current: VertexId, successor: VertexId) -> f64 {
        self.position(graph, current).distance(self.position(graph, successor))
    }

    /// Straight-line remainder from `vertex` to `target`.
    fn heuristic(&self, graph: &NavGraph, vertex: VertexId, target: VertexId) -> f64 {
        self.position(graph, vertex).distance(self.position(graph, target))
    }

    /// Size `costs` for `graph` and set every entry to `+∞`.
    fn initialize_weights(&self, graph: &NavGraph, costs: &mut CostTable) {
        costs.reset(graph.vertex_count());
    }

    fn initialize_weights_for_start(&self, costs: &mut CostTable, start: VertexId) {
        costs.set_cost(start, 0.0);
    }

    fn calculate_weight(
        &self,
        graph: &NavGraph,
        costs: &CostTable,
        target: VertexId,
        current: VertexId,
        successor: VertexId,
    ) -> Estimate {
        let cost = costs.cost(current) + self.edge_cost(graph, current, successor);
        Estimate { cost, estimate: cost + self.heuristic(graph, successor, target) }
    }

    /// `true` if `estimate` strictly improves on the recorded cost.
    fn compare_weight(&self, costs: &CostTable, successor: VertexId, estimate: &Estimate) -> bool {
        estimate.cost < costs.cost(successor)
    }

    fn update_weight(
        &self,
        costs: &mut CostTable,
        successor: VertexId,
        current: VertexId,
        estimate: &Estimate,
    ) {
        costs.set(successor, estimate.cost, current);
    }

    fn remove_weights(&self, costs: &mut CostTable) {
        costs.release();
    }
}

// ── Strategies ────────────────────────────────────────────────────────────────

/// True vertex positions for both the edge term and the heuristic.
#[derive(Copy, Clone, Debug, Default)]
pub struct EuclideanWeights;

impl WeightCalculator for EuclideanWeights {
    #[inline]
    fn position(&self, graph: &NavGraph, vertex: VertexId) -> Vec2 {
        graph.position(vertex)
    }
}

/// Edge costs read from a named edge annotation, falling back to the edge
/// length where the annotation is missing.
///
/// Annotated costs need not be geometric, so the heuristic is zero and the
/// search degrades to Dijkstra.
#[derive(Clone, Debug)]
pub struct NamedEdgeWeights {
    pub key: String,
}

impl NamedEdgeWeights {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn annotated(&self, graph: &NavGraph, edge: EdgeId) -> f64 {
        graph
            .edge_weight(edge, &self.key)
            .unwrap_or_else(|| graph.edge_length(edge))
    }
}

impl WeightCalculator for NamedEdgeWeights {
    fn position(&self, graph: &NavGraph, vertex: VertexId) -> Vec2 {
        graph.position(vertex)
    }

    fn edge_cost(&self, graph: &NavGraph, current: VertexId, successor: VertexId) -> f64 {
        graph
            .out_edges(current)
            .filter(|e| graph.edge_to[e.index()] == successor)
            .map(|e| self.annotated(graph, e))
            .reduce(f64::min)
            .unwrap_or(f64::INFINITY)
    }

    fn heuristic(&self, _graph: &NavGraph, _vertex: VertexId, _target: VertexId) -> f64 {
        0.0
    }
}
