//! Per-agent mental map of the navigation graph.

use ped_core::{AgentRng, Vec2, VertexId};
use ped_graph::{CostTable, GraphResult, NavGraph, Path, ShortestPath, WeightCalculator};

use crate::VonMises;

/// Centre of the distance-factor range.
const DISTANCE_FACTOR_MEAN: f64 = 0.95;

/// Half-width of the distance-factor range for a complete stranger.
const DISTANCE_FACTOR_SPREAD: f64 = 0.2;

/// Share of a fresh sample when blending it into an existing map.
const BLEND_NEW: f64 = 0.2;

// ── distort ───────────────────────────────────────────────────────────────────

/// Where `vertex` appears to an observer at `observer`.
///
/// The offset is rotated by `angle` and its length `d` becomes `d^factor`.
/// A vertex on the observer stays put.
pub fn distort(vertex: Vec2, observer: Vec2, factor: f64, angle: f64) -> Vec2 {
    let real = observer.distance(vertex);
    if real == 0.0 {
        return vertex;
    }
    let cognitive = real.powf(factor);
    observer + (vertex - observer).rotate(angle) * (cognitive / real)
}

// ── CognitiveWeights ──────────────────────────────────────────────────────────

/// Edge costs and heuristic measured between distorted positions.
///
/// Vertices without a distorted position use their true one.
#[derive(Copy, Clone, Debug)]
pub struct CognitiveWeights<'a> {
    distorted: &'a [Option<Vec2>],
}

impl<'a> CognitiveWeights<'a> {
    pub fn new(distorted: &'a [Option<Vec2>]) -> Self {
        Self { distorted }
    }
}

impl WeightCalculator for CognitiveWeights<'_> {
    #[inline]
    fn position(&self, graph: &NavGraph, vertex: VertexId) -> Vec2 {
        self.distorted
            .get(vertex.index())
            .copied()
            .flatten()
            .unwrap_or_else(|| graph.position(vertex))
    }
}

// ── CognitiveExtension ────────────────────────────────────────────────────────

/// Everything one agent knows about the graph.
///
/// Owned by the agent record, so updating and searching need no locking.
#[derive(Clone, Debug)]
pub struct CognitiveExtension {
    /// In `[0, 1]`.  Higher values shrink the distance error.
    familiarity: f64,
    von_mises:   VonMises,
    /// Indexed by `VertexId`.  Empty until the first update.
    distorted:   Vec<Option<Vec2>>,
    costs:       CostTable,
}

impl CognitiveExtension {
    pub fn new(familiarity: f64, concentration: f64) -> Self {
        Self {
            familiarity,
            von_mises: VonMises::new(concentration),
            distorted: Vec::new(),
            costs:     CostTable::default(),
        }
    }

    pub fn familiarity(&self) -> f64 {
        self.familiarity
    }

    pub fn concentration(&self) -> f64 {
        self.von_mises.concentration()
    }

    /// Exponent applied to a distance.  Uniform around 0.95, narrower the
    /// more familiar the agent is.
    pub fn distance_factor(&self, rng: &mut AgentRng) -> f64 {
        let spread = DISTANCE_FACTOR_SPREAD * (1.0 - self.familiarity);
        if !(spread > 0.0) {
            return DISTANCE_FACTOR_MEAN;
        }
        rng.gen_range(DISTANCE_FACTOR_MEAN - spread..DISTANCE_FACTOR_MEAN + spread)
    }

    /// Direction error in radians.
    pub fn direction(&self, rng: &mut AgentRng) -> f64 {
        self.von_mises.sample(rng)
    }

    /// Re-sample the whole map as seen from `position`.
    ///
    /// Every vertex gets its own distance factor and angle.  An existing
    /// map is kept as 80 % of the result, so the picture drifts rather than
    /// jumps.
    pub fn update_distortion(&mut self, graph: &NavGraph, position: Vec2, rng: &mut AgentRng) {
        let blend = self.distorted.len() == graph.vertex_count();
        let mut next = Vec::with_capacity(graph.vertex_count());

        for v in graph.vertices() {
            let factor = self.distance_factor(rng);
            let angle = self.direction(rng);
            let fresh = distort(graph.position(v), position, factor, angle);

            let p = match self.distorted.get(v.index()).copied().flatten() {
                Some(old) if blend => fresh * BLEND_NEW + old * (1.0 - BLEND_NEW),
                _ => fresh,
            };
            next.push(Some(p));
        }
        self.distorted = next;
    }

    pub fn has_distortion(&self) -> bool {
        !self.distorted.is_empty()
    }

    pub fn distorted_position(&self, vertex: VertexId) -> Option<Vec2> {
        self.distorted.get(vertex.index()).copied().flatten()
    }

    pub fn distorted_positions(&self) -> &[Option<Vec2>] {
        &self.distorted
    }

    /// A* over the mental map.  The agent's cost table is reset first.
    pub fn route(&mut self, graph: &NavGraph, start: VertexId, target: VertexId) -> GraphResult<Option<Path>> {
        let Self { distorted, costs, .. } = self;
        let weights = CognitiveWeights::new(distorted);
        ShortestPath::new(graph, &weights).find(start, target, costs)
    }

    /// Search costs of the last [`route`](Self::route).
    pub fn costs(&self) -> &CostTable {
        &self.costs
    }

    /// Drop the map and the cost table.
    pub fn remove_weights(&mut self) {
        let Self { distorted, costs, .. } = self;
        CognitiveWeights::new(distorted).remove_weights(costs);
        *distorted = Vec::new();
    }
}
