//! Per-agent tactical records.

use ped_core::{AgentId, AgentRng, Tick, Vec2};
use ped_graph::NavGraph;
use ped_perception::AgentView;
use ped_routing::{NavigationTarget, RoutingAgent, RoutingState};

// ── Behavior / Motoric ────────────────────────────────────────────────────────

/// Tactical behaviors.  Exactly one is active per agent per tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Behavior {
    #[default]
    None,
    Routing,
    Queuing,
    Staying,
    Searching,
}

/// What locomotion should do with the agent this tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Motoric {
    #[default]
    Walking,
    Standing,
}

/// Output of one tick's tactical pass.  Replaced wholesale every tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TacticalState {
    pub motoric:           Motoric,
    /// Set when the nominal command could not be executed and routing ran
    /// in its place.
    pub override_behavior: Option<Behavior>,
}

impl TacticalState {
    pub fn new(motoric: Motoric, override_behavior: Option<Behavior>) -> Self {
        Self { motoric, override_behavior }
    }
}

// ── Sub-behavior state ────────────────────────────────────────────────────────
//
// Written by the staying, queuing and searching sub-models.  The state
// machine only checks presence and clears them.

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StayingState {
    pub stay_position: Vec2,
    pub since:         Tick,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueuingState {
    pub queue_position: Vec2,
    /// 0 is the head of the queue.
    pub place:          usize,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchingState {
    pub search_position: Vec2,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandingState {
    pub stand_position: Vec2,
}

// ── PedestrianState ───────────────────────────────────────────────────────────

/// Everything the tactical layer reads and writes for one agent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PedestrianState {
    pub id:                     AgentId,
    pub position:               Vec2,
    /// Nominal command from the strategic layer.
    pub behavior_task:          Behavior,
    pub next_navigation_target: Option<NavigationTarget>,
    /// Point locomotion walks towards.
    pub next_walking_target:    Option<Vec2>,

    pub routing_state:   Option<RoutingState>,
    pub staying_state:   Option<StayingState>,
    pub queuing_state:   Option<QueuingState>,
    pub searching_state: Option<SearchingState>,
    pub standing_state:  Option<StandingState>,

    pub tactical_state: TacticalState,
}

impl PedestrianState {
    pub fn new(
        id:            AgentId,
        position:      Vec2,
        behavior_task: Behavior,
        target:        Option<NavigationTarget>,
    ) -> Self {
        Self {
            id,
            position,
            behavior_task,
            next_navigation_target: target,
            next_walking_target:    None,
            routing_state:          None,
            staying_state:          None,
            queuing_state:          None,
            searching_state:        None,
            standing_state:         None,
            tactical_state:         TacticalState::default(),
        }
    }

    pub fn view(&self) -> AgentView {
        AgentView::new(self.id, self.position)
    }

    /// The routing model's view of this agent.
    pub fn routing_agent(&self) -> RoutingAgent<'_> {
        self.routing_agent_with(self.routing_state.as_ref())
    }

    /// Same agent, but planning from `state` instead of its own.
    pub fn routing_agent_with<'a>(&self, state: Option<&'a RoutingState>) -> RoutingAgent<'a> {
        RoutingAgent {
            id:       self.id,
            position: self.position,
            target:   self.next_navigation_target,
            state,
        }
    }

    /// Install a new route and walk towards its next hop.
    pub fn set_route(&mut self, graph: &NavGraph, route: RoutingState) {
        self.next_walking_target = route
            .next_visit
            .filter(|&v| graph.contains(v))
            .map(|v| graph.position(v));
        self.routing_state = Some(route);
    }
}

// ── Pedestrian ────────────────────────────────────────────────────────────────

/// An agent record as the tactical layer owns it.
///
/// `E` is the routing model's per-agent extension.  Each record is handed
/// to exactly one worker per pass, so nothing inside needs locking.
#[derive(Debug)]
pub struct Pedestrian<E> {
    pub state:     PedestrianState,
    pub rng:       AgentRng,
    pub extension: E,
}

impl<E> Pedestrian<E> {
    pub fn new(state: PedestrianState, rng: AgentRng, extension: E) -> Self {
        Self { state, rng, extension }
    }

    #[inline]
    pub fn id(&self) -> AgentId {
        self.state.id
    }
}
