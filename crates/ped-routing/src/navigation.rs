//! Routing rules shared by every [`RoutingModel`](crate::RoutingModel).

use ped_core::VertexId;
use ped_graph::Path;
use tracing::debug;

use crate::{RoutingAgent, RoutingContext, RoutingState};

/// Vertex a new route should start from.
///
/// Keeps the current hop while it is still in sight; otherwise takes the
/// closest visible vertex, and failing that the closest vertex at all.
/// `None` only for an empty graph.
pub fn find_navigation_start_point(ctx: &RoutingContext<'_>, agent: &RoutingAgent<'_>) -> Option<VertexId> {
    let graph = ctx.graph;
    let here = agent.position;

    if let Some(next) = agent.state.and_then(|s| s.next_visit) {
        if ctx.perception.is_vertex_visible(here, graph, next) {
            return Some(next);
        }
    }

    graph
        .nearest_vertices(here)
        .find(|&v| ctx.perception.is_visible(here, graph.position(v)))
        .or_else(|| graph.nearest_vertex(here))
}

/// Fold a search result into the agent's route memory.
///
/// The path start is recorded as visited and becomes `last_visit`.  The
/// next hop is the second path vertex if the agent can see it, else the
/// start itself.  `None` yields the "no route" state.
pub fn update_route_state(
    ctx:   &RoutingContext<'_>,
    agent: &RoutingAgent<'_>,
    path:  Option<&Path>,
) -> RoutingState {
    let previous = agent.state;
    let Some(start) = path.and_then(Path::start) else {
        debug!("{}: no path to {:?}", agent.id, agent.target.map(|t| t.vertex));
        return RoutingState::no_route(previous);
    };

    let mut visited = previous.map(|s| s.visited.clone()).unwrap_or_default();
    visited.insert(start);

    let next = path
        .and_then(|p| p.get(1))
        .filter(|&v| ctx.perception.is_vertex_visible(agent.position, ctx.graph, v))
        .unwrap_or(start);

    RoutingState::new(
        visited,
        previous.and_then(|s| s.last_visit),
        Some(start),
        Some(next),
    )
}

/// Walk straight at the goal if its point of interest is visible.
pub fn short_cut_route(ctx: &RoutingContext<'_>, agent: &RoutingAgent<'_>) -> Option<RoutingState> {
    let target = agent.target?;
    if !ctx.perception.is_visible_to(agent.position, &target) {
        return None;
    }
    let previous = agent.state;
    Some(RoutingState::new(
        previous.map(|s| s.visited.clone()).unwrap_or_default(),
        previous.and_then(|s| s.last_visit),
        previous.and_then(|s| s.next_visit),
        Some(target.vertex),
    ))
}

/// Does the agent need a new route?
///
/// Yes without a current hop, once the hop is reached, or once it drops
/// out of sight.  With `deep` set, also when the look-ahead hop is lost.
pub fn re_routing_necessary(ctx: &RoutingContext<'_>, agent: &RoutingAgent<'_>, deep: bool) -> bool {
    let Some(state) = agent.state else {
        return true;
    };
    let Some(next) = state.next_visit else {
        return true;
    };
    let graph = ctx.graph;
    if !graph.contains(next) {
        return true;
    }
    if agent.position.distance(graph.position(next)) < ctx.navigation_distance_radius {
        return true;
    }
    if !ctx.perception.is_vertex_visible(agent.position, graph, next) {
        return true;
    }
    if deep {
        if let Some(ahead) = state.next_to_current_visit {
            if !ctx.perception.is_vertex_visible(agent.position, graph, ahead) {
                return true;
            }
        }
    }
    false
}
