//! A* shortest paths over a [`NavGraph`].
//!
//! # Pluggability
//!
//! Costs come from a [`WeightCalculator`], so the same search serves the
//! Euclidean planner, an agent's distorted mental map, or annotated edge
//! costs without any change here.
//!
//! # No path
//!
//! A disconnected target is not an error: [`ShortestPath::find`] returns
//! `Ok(None)` and callers decide how to stand still.  Only unknown vertex ids
//! are errors ([`GraphError::VertexNotFound`](crate::GraphError)).

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ped_core::VertexId;

use crate::weight::{CostTable, WeightCalculator};
use crate::{GraphResult, NavGraph};

// ── Path ──────────────────────────────────────────────────────────────────────

/// Vertices from start to target, inclusive, and the total cost under the
/// strategy that produced them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    pub vertices: Vec<VertexId>,
    pub cost:     f64,
}

impl Path {
    pub fn start(&self) -> Option<VertexId> {
        self.vertices.first().copied()
    }

    pub fn target(&self) -> Option<VertexId> {
        self.vertices.last().copied()
    }

    /// The hop following `vertex` on this path.
    pub fn next_after(&self, vertex: VertexId) -> Option<VertexId> {
        let i = self.vertices.iter().position(|&v| v == vertex)?;
        self.vertices.get(i + 1).copied()
    }

    pub fn get(&self, i: usize) -> Option<VertexId> {
        self.vertices.get(i).copied()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// `true` if start and target are the same vertex.
    pub fn is_trivial(&self) -> bool {
        self.vertices.len() <= 1
    }
}

// ── Open-set entry ────────────────────────────────────────────────────────────

/// Heap entry: ordered by estimate, ties broken by `VertexId` for
/// deterministic expansion order.  `cost` detects stale entries.
#[derive(Copy, Clone, Debug)]
struct Open {
    estimate: f64,
    vertex:   VertexId,
    cost:     f64,
}

impl PartialEq for Open {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Open {}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Open {
    fn cmp(&self, other: &Self) -> Ordering {
        self.estimate
            .total_cmp(&other.estimate)
            .then(self.vertex.cmp(&other.vertex))
    }
}

// ── ShortestPath ──────────────────────────────────────────────────────────────

/// A* search bound to one graph and one cost strategy.
///
/// ```
/// use ped_core::Vec2;
/// use ped_graph::{CostTable, EuclideanWeights, NavGraphBuilder, ShortestPath};
///
/// let mut b = NavGraphBuilder::new();
/// let a = b.add_vertex(Vec2::new(0.0, 0.0));
/// let c = b.add_vertex(Vec2::new(1.0, 0.0));
/// b.add_corridor(a, c);
/// let graph = b.build();
///
/// let mut costs = CostTable::new(graph.vertex_count());
/// let path = ShortestPath::new(&graph, &EuclideanWeights)
///     .find(a, c, &mut costs)
///     .unwrap()
///     .unwrap();
/// assert_eq!(path.vertices, vec![a, c]);
/// ```
pub struct ShortestPath<'g, W: ?Sized> {
    graph:      &'g NavGraph,
    calculator: &'g W,
}

impl<'g, W: WeightCalculator + ?Sized> ShortestPath<'g, W> {
    pub fn new(graph: &'g NavGraph, calculator: &'g W) -> Self {
        Self { graph, calculator }
    }

    /// Search from `start` to `target`, using `costs` as the tentative-cost
    /// table.  The table is re-initialized first; afterwards it holds the
    /// search's g-costs and predecessors.
    pub fn find(
        &self,
        start: VertexId,
        target: VertexId,
        costs: &mut CostTable,
    ) -> GraphResult<Option<Path>> {
        let graph = self.graph;
        let calc  = self.calculator;
        graph.check_vertex(start)?;
        graph.check_vertex(target)?;

        calc.initialize_weights(graph, costs);
        calc.initialize_weights_for_start(costs, start);

        let mut open: BinaryHeap<Reverse<Open>> = BinaryHeap::new();
        open.push(Reverse(Open {
            estimate: calc.heuristic(graph, start, target),
            vertex:   start,
            cost:     0.0,
        }));

        while let Some(Reverse(entry)) = open.pop() {
            let current = entry.vertex;

            // Skip stale heap entries.
            if entry.cost > costs.cost(current) {
                continue;
            }

            if current == target {
                return Ok(costs.path_to(target).map(|vertices| Path {
                    vertices,
                    cost: entry.cost,
                }));
            }

            for successor in graph.successors(current) {
                if successor == current {
                    continue;
                }
                let estimate = calc.calculate_weight(graph, costs, target, current, successor);
                if calc.compare_weight(costs, successor, &estimate) {
                    calc.update_weight(costs, successor, current, &estimate);
                    open.push(Reverse(Open {
                        estimate: estimate.estimate,
                        vertex:   successor,
                        cost:     estimate.cost,
                    }));
                }
            }
        }

        Ok(None)
    }
}

/// One-shot search with a freshly allocated [`CostTable`].
pub fn shortest_path<W: WeightCalculator + ?Sized>(
    graph: &NavGraph,
    start: VertexId,
    target: VertexId,
    calculator: &W,
) -> GraphResult<Option<Path>> {
    let mut costs = CostTable::new(graph.vertex_count());
    ShortestPath::new(graph, calculator).find(start, target, &mut costs)
}
