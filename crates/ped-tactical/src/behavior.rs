//! The `TacticalBehavior` capability trait and the per-tick context.

use ped_core::Tick;
use ped_graph::NavGraph;
use ped_perception::{AgentView, VisibilityCache, VisibilityMap};

use crate::PedestrianState;

/// Read-only world state for one tick.
///
/// Built by the scheduler before the tick and shared by every per-agent
/// call.  `peers` is the tick's mutual-visibility cache; it was created for
/// `tick` before any agent runs.
#[derive(Copy, Clone)]
pub struct TacticalContext<'a> {
    pub tick:       Tick,
    pub graph:      &'a NavGraph,
    pub perception: &'a VisibilityMap,
    pub peers:      &'a VisibilityCache,
}

impl<'a> TacticalContext<'a> {
    pub fn new(
        tick:       Tick,
        graph:      &'a NavGraph,
        perception: &'a VisibilityMap,
        peers:      &'a VisibilityCache,
    ) -> Self {
        Self { tick, graph, perception, peers }
    }

    /// Every agent alive this tick.
    pub fn agents(&self) -> &'a [AgentView] {
        self.peers.agents()
    }
}

/// A staying, queuing or searching sub-model.
///
/// The state machine calls [`pre_tick`](Self::pre_tick) once, then
/// [`per_agent_update`](Self::per_agent_update) for every agent whose
/// active behavior this model serves, then [`post_tick`](Self::post_tick).
///
/// # Thread safety
///
/// `per_agent_update` may run for many agents at once with the `parallel`
/// feature.  Per-agent data belongs in the agent's state slot, not in the
/// model.
pub trait TacticalBehavior: Send + Sync {
    fn pre_tick(&self, _ctx: &TacticalContext<'_>) {}

    fn per_agent_update(&self, agent: &mut PedestrianState, ctx: &TacticalContext<'_>);

    fn post_tick(&self, _ctx: &TacticalContext<'_>) {}
}

impl<T: TacticalBehavior + ?Sized> TacticalBehavior for Box<T> {
    fn pre_tick(&self, ctx: &TacticalContext<'_>) {
        (**self).pre_tick(ctx)
    }

    fn per_agent_update(&self, agent: &mut PedestrianState, ctx: &TacticalContext<'_>) {
        (**self).per_agent_update(agent, ctx)
    }

    fn post_tick(&self, ctx: &TacticalContext<'_>) {
        (**self).post_tick(ctx)
    }
}
