//! Navigation graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `VertexId v`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ vertex_out_start[v] .. vertex_out_start[v+1] ]
//! ```
//!
//! All edge arrays are sorted by source vertex and indexed by `EdgeId`, so a
//! vertex's successors are a contiguous scan in the inner loop of A*.
//!
//! # Named weights
//!
//! Vertices and edges can carry named scalar annotations ("length",
//! "congestion", …).  They are stored column-wise: one dense
//! `Vec<Option<f64>>` per name.  Annotations are written during
//! pre-processing through `&mut NavGraph`; path-search costs never live here
//! (see [`CostTable`](crate::CostTable)), so concurrent agents never write
//! into the shared graph.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps positions to the nearest `VertexId`.  Used to
//! find where a pedestrian should enter the graph.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use ped_core::{EdgeId, Vec2, VertexId};

use crate::{GraphError, GraphResult};

// ── R-tree vertex entry ───────────────────────────────────────────────────────

#[derive(Clone)]
struct VertexEntry {
    point: [f64; 2],
    id:    VertexId,
}

impl RTreeObject for VertexEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for VertexEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── NavGraph ──────────────────────────────────────────────────────────────────

/// Directed navigation graph in CSR format plus a spatial index.
///
/// The structural arrays are `pub` for direct indexed access on hot paths.
/// Do not construct directly; use [`NavGraphBuilder`].
pub struct NavGraph {
    // ── Vertex data ───────────────────────────────────────────────────────
    /// Position of each vertex.  Indexed by `VertexId`.
    pub vertex_pos: Vec<Vec2>,

    /// Optional human-readable label (e.g. "door-north").
    pub vertex_name: Vec<Option<String>>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `vertex_count + 1`.
    pub vertex_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    pub edge_from: Vec<VertexId>,
    pub edge_to:   Vec<VertexId>,

    /// Euclidean length of each edge.
    pub edge_length: Vec<f64>,

    // ── Annotations ───────────────────────────────────────────────────────
    vertex_weights: FxHashMap<String, Vec<Option<f64>>>,
    edge_weights:   FxHashMap<String, Vec<Option<f64>>>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<VertexEntry>,
}

impl NavGraph {
    /// A graph with no vertices.  Every search against it fails with
    /// [`GraphError::VertexNotFound`].
    pub fn empty() -> Self {
        NavGraphBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.vertex_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, vertex: VertexId) -> bool {
        vertex.index() < self.vertex_count()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + use<> {
        (0..self.vertex_count() as u32).map(VertexId)
    }

    pub fn check_vertex(&self, vertex: VertexId) -> GraphResult<()> {
        if self.contains(vertex) {
            Ok(())
        } else {
            Err(GraphError::VertexNotFound(vertex))
        }
    }

    // ── Vertex and edge attributes ────────────────────────────────────────

    #[inline]
    pub fn position(&self, vertex: VertexId) -> Vec2 {
        self.vertex_pos[vertex.index()]
    }

    pub fn name(&self, vertex: VertexId) -> Option<&str> {
        self.vertex_name.get(vertex.index())?.as_deref()
    }

    /// First vertex carrying `name`.
    pub fn vertex_by_name(&self, name: &str) -> Option<VertexId> {
        self.vertex_name
            .iter()
            .position(|n| n.as_deref() == Some(name))
            .map(|i| VertexId(i as u32))
    }

    #[inline]
    pub fn edge_length(&self, edge: EdgeId) -> f64 {
        self.edge_length[edge.index()]
    }

    #[inline]
    pub fn edge_endpoints(&self, edge: EdgeId) -> (VertexId, VertexId) {
        (self.edge_from[edge.index()], self.edge_to[edge.index()])
    }

    /// Length of the longest edge, `None` for an edgeless graph.
    pub fn longest_edge_length(&self) -> Option<f64> {
        self.edge_length.iter().copied().reduce(f64::max)
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `vertex`.
    #[inline]
    pub fn out_edges(&self, vertex: VertexId) -> impl Iterator<Item = EdgeId> + use<> {
        let start = self.vertex_out_start[vertex.index()];
        let end   = self.vertex_out_start[vertex.index() + 1];
        (start..end).map(EdgeId)
    }

    /// Vertices reachable over one outgoing edge.
    pub fn successors(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.out_edges(vertex).map(move |e| self.edge_to[e.index()])
    }

    #[inline]
    pub fn out_degree(&self, vertex: VertexId) -> usize {
        let start = self.vertex_out_start[vertex.index()] as usize;
        let end   = self.vertex_out_start[vertex.index() + 1] as usize;
        end - start
    }

    /// The edge `from → to`, if present.
    pub fn find_edge(&self, from: VertexId, to: VertexId) -> Option<EdgeId> {
        if !self.contains(from) {
            return None;
        }
        self.out_edges(from).find(|e| self.edge_to[e.index()] == to)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The vertex nearest to `pos`; `None` only for an empty graph.
    pub fn nearest_vertex(&self, pos: Vec2) -> Option<VertexId> {
        self.spatial_idx.nearest_neighbor(&[pos.x, pos.y]).map(|e| e.id)
    }

    /// All vertices in ascending distance from `pos`, lazily.
    pub fn nearest_vertices(&self, pos: Vec2) -> impl Iterator<Item = VertexId> + '_ {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.x, pos.y])
            .map(|e| e.id)
    }

    // ── Named weights ─────────────────────────────────────────────────────

    pub fn set_vertex_weight(&mut self, vertex: VertexId, name: &str, value: f64) -> GraphResult<()> {
        self.check_vertex(vertex)?;
        let n = self.vertex_count();
        self.vertex_weights
            .entry(name.to_owned())
            .or_insert_with(|| vec![None; n])[vertex.index()] = Some(value);
        Ok(())
    }

    pub fn vertex_weight(&self, vertex: VertexId, name: &str) -> Option<f64> {
        self.vertex_weights.get(name)?.get(vertex.index()).copied().flatten()
    }

    /// Remove one vertex's entry under `name`; returns the old value.
    pub fn remove_vertex_weight(&mut self, vertex: VertexId, name: &str) -> Option<f64> {
        self.vertex_weights.get_mut(name)?.get_mut(vertex.index())?.take()
    }

    pub fn set_edge_weight(&mut self, edge: EdgeId, name: &str, value: f64) -> GraphResult<()> {
        if edge.index() >= self.edge_count() {
            return Err(GraphError::EdgeNotFound(edge));
        }
        let n = self.edge_count();
        self.edge_weights
            .entry(name.to_owned())
            .or_insert_with(|| vec![None; n])[edge.index()] = Some(value);
        Ok(())
    }

    pub fn edge_weight(&self, edge: EdgeId, name: &str) -> Option<f64> {
        self.edge_weights.get(name)?.get(edge.index()).copied().flatten()
    }

    pub fn remove_edge_weight(&mut self, edge: EdgeId, name: &str) -> Option<f64> {
        self.edge_weights.get_mut(name)?.get_mut(edge.index())?.take()
    }

    /// Drop every annotation stored under `name`, on vertices and edges.
    pub fn remove_weights_named(&mut self, name: &str) {
        self.vertex_weights.remove(name);
        self.edge_weights.remove(name);
    }
}

// ── NavGraphBuilder ───────────────────────────────────────────────────────────

/// Construct a [`NavGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use ped_core::Vec2;
/// use ped_graph::NavGraphBuilder;
///
/// let mut b = NavGraphBuilder::new();
/// let a = b.add_vertex(Vec2::new(0.0, 0.0));
/// let c = b.add_vertex(Vec2::new(3.0, 4.0));
/// b.add_corridor(a, c);
/// let graph = b.build();
/// assert_eq!(graph.edge_count(), 2);
/// assert_eq!(graph.longest_edge_length(), Some(5.0));
/// ```
pub struct NavGraphBuilder {
    vertices:  Vec<Vec2>,
    names:     Vec<Option<String>>,
    raw_edges: Vec<(VertexId, VertexId)>,
}

impl NavGraphBuilder {
    pub fn new() -> Self {
        Self { vertices: Vec::new(), names: Vec::new(), raw_edges: Vec::new() }
    }

    /// Add a vertex and return its `VertexId` (sequential from 0).
    pub fn add_vertex(&mut self, pos: Vec2) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(pos);
        self.names.push(None);
        id
    }

    pub fn add_named_vertex(&mut self, pos: Vec2, name: impl Into<String>) -> VertexId {
        let id = self.add_vertex(pos);
        self.names[id.index()] = Some(name.into());
        id
    }

    /// Add a **directed** edge.  Its length is the Euclidean distance
    /// between the endpoints, computed at `build`.
    pub fn add_directed_edge(&mut self, from: VertexId, to: VertexId) {
        self.raw_edges.push((from, to));
    }

    /// Convenience: edges in both directions.
    pub fn add_corridor(&mut self, a: VertexId, b: VertexId) {
        self.add_directed_edge(a, b);
        self.add_directed_edge(b, a);
    }

    pub fn vertex_count(&self) -> usize { self.vertices.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`NavGraph`].
    ///
    /// Edges whose endpoints were never added are dropped.  Sorting is
    /// stable, so parallel edges keep their insertion order.
    pub fn build(self) -> NavGraph {
        let vertex_count = self.vertices.len();

        let mut raw: Vec<(VertexId, VertexId)> = self
            .raw_edges
            .into_iter()
            .filter(|(a, b)| a.index() < vertex_count && b.index() < vertex_count)
            .collect();
        raw.sort_by_key(|(from, _)| from.0);

        let edge_from: Vec<VertexId> = raw.iter().map(|e| e.0).collect();
        let edge_to:   Vec<VertexId> = raw.iter().map(|e| e.1).collect();
        let edge_length: Vec<f64> = raw
            .iter()
            .map(|(a, b)| self.vertices[a.index()].distance(self.vertices[b.index()]))
            .collect();

        let mut vertex_out_start = vec![0u32; vertex_count + 1];
        for (from, _) in &raw {
            vertex_out_start[from.index() + 1] += 1;
        }
        for i in 1..=vertex_count {
            vertex_out_start[i] += vertex_out_start[i - 1];
        }
        debug_assert_eq!(vertex_out_start[vertex_count] as usize, raw.len());

        let entries: Vec<VertexEntry> = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, p)| VertexEntry { point: [p.x, p.y], id: VertexId(i as u32) })
            .collect();

        NavGraph {
            vertex_pos: self.vertices,
            vertex_name: self.names,
            vertex_out_start,
            edge_from,
            edge_to,
            edge_length,
            vertex_weights: FxHashMap::default(),
            edge_weights:   FxHashMap::default(),
            spatial_idx:    RTree::bulk_load(entries),
        }
    }
}

impl Default for NavGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
