//! The `Sim` struct and its tick loop.

use std::collections::BTreeSet;

use ped_core::{AgentId, AgentRng, SimClock, SimConfig, Tick, Vec2, VertexId};
use ped_graph::{shortest_path, NavGraph, Path, WeightCalculator};
use ped_perception::{AgentView, PeerVisibility, PointOfInterest, Scenario, VisibilityMap};
use ped_routing::{NavigationTarget, RoutingModel};
use ped_tactical::{Behavior, Pedestrian, PedestrianState, TacticalContext, TacticalModel};
use tracing::debug;

use crate::{SimError, SimObserver, SimResult};

/// The simulation runner.
///
/// Each [`step`](Self::step):
///
/// 1. reports agents spawned and removed since the last step,
/// 2. builds (or reuses) the tick's mutual-visibility cache from the
///    positions agents hold *before* the tick,
/// 3. runs the tactical pass over every agent,
/// 4. hands the fresh states to the observer and advances the clock.
///
/// Locomotion is external: callers move agents through
/// [`agent_mut`](Self::agent_mut) between steps.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: RoutingModel> {
    /// Global configuration (total ticks, seed, time step, …).
    pub config: SimConfig,

    pub clock: SimClock,

    pub scenario: Scenario,

    pub graph: NavGraph,

    /// Pre-processed visibility grid.  Read-only after build.
    pub perception: VisibilityMap,

    /// Per-tick agent-to-agent visibility cache.
    pub peers: PeerVisibility,

    pub tactical: TacticalModel<R>,

    /// Live agents in ascending `AgentId` order.
    pub agents: Vec<Pedestrian<R::Extension>>,

    next_id: u32,
    spawned: Vec<AgentId>,
    removed: Vec<AgentId>,
}

impl<R: RoutingModel> Sim<R> {
    pub(crate) fn new(
        config:     SimConfig,
        scenario:   Scenario,
        graph:      NavGraph,
        perception: VisibilityMap,
        peers:      PeerVisibility,
        tactical:   TacticalModel<R>,
    ) -> Self {
        Self {
            clock: config.make_clock(),
            config,
            scenario,
            graph,
            perception,
            peers,
            tactical,
            agents: Vec::new(),
            next_id: 0,
            spawned: Vec::new(),
            removed: Vec::new(),
        }
    }

    // ── Agents ────────────────────────────────────────────────────────────

    /// Add an agent and let the routing model set up its extension.
    ///
    /// Ids are handed out in increasing order and never reused.
    pub fn spawn(
        &mut self,
        position:      Vec2,
        behavior_task: Behavior,
        target:        Option<NavigationTarget>,
    ) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;

        let mut rng = AgentRng::new(self.config.seed, id);
        let extension = self.tactical.routing().on_agent_spawn(id, &self.graph, &mut rng);
        let state = PedestrianState::new(id, position, behavior_task, target);
        self.agents.push(Pedestrian::new(state, rng, extension));
        self.spawned.push(id);
        self.peers.invalidate();

        debug!("{}: spawned at {:?} with task {:?}", id, position, behavior_task);
        id
    }

    /// Drop an agent and hand its extension back to the routing model.
    pub fn remove(&mut self, agent: AgentId) -> SimResult<()> {
        let index = self.index_of(agent).ok_or(SimError::AgentNotFound(agent))?;
        let removed = self.agents.remove(index);
        self.tactical.routing().on_agent_removed(agent, removed.extension);
        self.removed.push(agent);
        self.peers.invalidate();

        debug!("{}: removed", agent);
        Ok(())
    }

    pub fn agent(&self, agent: AgentId) -> Option<&Pedestrian<R::Extension>> {
        self.index_of(agent).map(|i| &self.agents[i])
    }

    pub fn agent_mut(&mut self, agent: AgentId) -> Option<&mut Pedestrian<R::Extension>> {
        let i = self.index_of(agent)?;
        Some(&mut self.agents[i])
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    fn index_of(&self, agent: AgentId) -> Option<usize> {
        self.agents.binary_search_by_key(&agent, |a| a.id()).ok()
    }

    fn views(&self) -> Vec<AgentView> {
        self.agents.iter().map(|a| a.state.view()).collect()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn is_visible<T: PointOfInterest + ?Sized>(&self, from: Vec2, target: &T) -> bool {
        self.perception.is_visible_to(from, target)
    }

    /// Agents `agent` can see at `tick`.
    ///
    /// Reuses the tick's cache when one exists; otherwise starts a fresh
    /// cache for `tick` from the current positions.
    pub fn perceived_peers(&self, agent: AgentId, tick: Tick) -> SimResult<BTreeSet<AgentId>> {
        let cache = self.peers.cache_for(tick, &self.views());
        if !cache.contains(agent) {
            return Err(SimError::AgentNotFound(agent));
        }
        Ok(cache.perceived_peers(&self.perception, agent))
    }

    pub fn shortest_path<W: WeightCalculator + ?Sized>(
        &self,
        start:      VertexId,
        target:     VertexId,
        calculator: &W,
    ) -> SimResult<Option<Path>> {
        Ok(shortest_path(&self.graph, start, target, calculator)?)
    }

    // ── Tick loop ─────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Advance one tick.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        for id in self.spawned.drain(..) {
            observer.on_agent_spawned(now, id);
        }
        for id in self.removed.drain(..) {
            observer.on_agent_removed(now, id);
        }

        let cache = self.peers.cache_for(now, &self.views());
        let ctx = TacticalContext::new(now, &self.graph, &self.perception, &cache);
        self.tactical.tick(&mut self.agents, &ctx);

        observer.on_tick_end(now, &self.agents);
        self.clock.advance();
        Ok(())
    }
}
