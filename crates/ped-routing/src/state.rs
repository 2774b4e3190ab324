//! Per-agent route memory.

use std::collections::BTreeSet;

use ped_core::{Vec2, VertexId};
use ped_perception::PointOfInterest;

/// Where an agent is currently heading on the graph.
///
/// `next_visit == None` is the explicit "no route available" state; callers
/// must tolerate it (stand still, or walk straight at the goal).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutingState {
    /// Vertices already used as a route start.
    pub visited:               BTreeSet<VertexId>,
    pub next_to_last_visit:    Option<VertexId>,
    pub last_visit:            Option<VertexId>,
    /// The hop the agent walks towards.
    pub next_visit:            Option<VertexId>,
    /// Look-ahead hop beyond `next_visit`, set by deep node selection.
    pub next_to_current_visit: Option<VertexId>,
}

impl RoutingState {
    pub fn new(
        visited:            BTreeSet<VertexId>,
        next_to_last_visit: Option<VertexId>,
        last_visit:         Option<VertexId>,
        next_visit:         Option<VertexId>,
    ) -> Self {
        Self {
            visited,
            next_to_last_visit,
            last_visit,
            next_visit,
            next_to_current_visit: None,
        }
    }

    /// "No route available", keeping the visited history and last hop.
    pub fn no_route(previous: Option<&RoutingState>) -> Self {
        match previous {
            Some(p) => Self::new(p.visited.clone(), p.next_to_last_visit, p.last_visit, None),
            None => Self::default(),
        }
    }

    #[inline]
    pub fn has_route(&self) -> bool {
        self.next_visit.is_some()
    }
}

/// The goal an agent navigates to: a graph vertex plus the point that must
/// become visible for the agent to walk straight at it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavigationTarget {
    pub vertex:            VertexId,
    pub point_of_interest: Vec2,
}

impl NavigationTarget {
    pub fn new(vertex: VertexId, point_of_interest: Vec2) -> Self {
        Self { vertex, point_of_interest }
    }
}

impl PointOfInterest for NavigationTarget {
    #[inline]
    fn point_of_interest(&self) -> Vec2 {
        self.point_of_interest
    }
}
