//! The `RoutingModel` trait: the pluggable graph-navigation sub-model.

use ped_core::{AgentId, AgentRng, Vec2};
use ped_graph::NavGraph;
use ped_perception::VisibilityMap;

use crate::navigation;
use crate::{NavigationTarget, RoutingState};

/// Read-only world state shared by every routing call in a tick.
#[derive(Copy, Clone)]
pub struct RoutingContext<'a> {
    pub graph:      &'a NavGraph,
    pub perception: &'a VisibilityMap,
    /// Distance at which a hop counts as reached.
    pub navigation_distance_radius: f64,
}

impl<'a> RoutingContext<'a> {
    pub fn new(graph: &'a NavGraph, perception: &'a VisibilityMap, navigation_distance_radius: f64) -> Self {
        Self { graph, perception, navigation_distance_radius }
    }
}

/// The parts of a pedestrian routing looks at.
#[derive(Copy, Clone, Debug)]
pub struct RoutingAgent<'a> {
    pub id:       AgentId,
    pub position: Vec2,
    pub target:   Option<NavigationTarget>,
    pub state:    Option<&'a RoutingState>,
}

/// Pluggable routing behavior.
///
/// Only [`on_agent_spawn`](Self::on_agent_spawn) and [`route`](Self::route)
/// are required.  The shortcut and re-routing checks default to the shared
/// rules in [`navigation`](crate::navigation).
///
/// # Thread safety
///
/// The tactical layer routes many agents in parallel, so implementations
/// must be `Send + Sync`.  Anything that varies per agent lives in
/// [`Extension`](Self::Extension), which each agent owns exclusively.
pub trait RoutingModel: Send + Sync {
    /// Per-agent state created at spawn and handed back at removal.
    type Extension: Send;

    fn on_agent_spawn(&self, agent: AgentId, graph: &NavGraph, rng: &mut AgentRng) -> Self::Extension;

    /// Release whatever the extension holds.  Default: drop it.
    fn on_agent_removed(&self, _agent: AgentId, _extension: Self::Extension) {}

    /// If the goal is already in sight, the state that walks straight at it.
    fn short_cut_route(&self, ctx: &RoutingContext<'_>, agent: &RoutingAgent<'_>) -> Option<RoutingState> {
        navigation::short_cut_route(ctx, agent)
    }

    fn re_routing_necessary(&self, ctx: &RoutingContext<'_>, agent: &RoutingAgent<'_>, deep: bool) -> bool {
        navigation::re_routing_necessary(ctx, agent, deep)
    }

    /// Plan from the agent's current situation and return the new state.
    fn route(
        &self,
        ctx:       &RoutingContext<'_>,
        agent:     &RoutingAgent<'_>,
        extension: &mut Self::Extension,
        rng:       &mut AgentRng,
    ) -> RoutingState;
}
