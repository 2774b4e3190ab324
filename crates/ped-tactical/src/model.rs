//! `TacticalModel`: the per-tick behavior dispatcher.

use ped_core::{AgentRng, VertexId};
use ped_routing::{RoutingContext, RoutingModel, RoutingState};
use tracing::{debug, trace};

use crate::{
    Behavior, Motoric, Pedestrian, PedestrianState, TacticalBehavior, TacticalConfig, TacticalContext,
    TacticalResult, TacticalState,
};

/// Selects and drives one behavior per agent per tick.
///
/// # Tick phases
///
/// ```text
/// ① Selection  nominal command, bottom-up override, clear stale slots
/// ② pre_tick   configured sub-models
/// ③ Dispatch   routing here; staying / queuing / searching delegated
/// ④ post_tick  configured sub-models
/// ⑤ Motoric    Walking or Standing
/// ```
///
/// ①, ③ and ⑤ run on Rayon's pool with the `parallel` feature.  Every
/// agent record is touched by exactly one worker per phase.
pub struct TacticalModel<R: RoutingModel> {
    config:    TacticalConfig,
    routing:   R,
    staying:   Option<Box<dyn TacticalBehavior>>,
    queuing:   Option<Box<dyn TacticalBehavior>>,
    searching: Option<Box<dyn TacticalBehavior>>,
}

impl<R: RoutingModel> TacticalModel<R> {
    pub fn new(config: TacticalConfig, routing: R) -> TacticalResult<Self> {
        config.validate()?;
        debug!(
            "tactical model: control {}, deep node selection {}, route memory {}",
            config.tactical_control, config.deep_node_selection, config.route_memory
        );
        Ok(Self { config, routing, staying: None, queuing: None, searching: None })
    }

    pub fn with_staying(mut self, model: impl TacticalBehavior + 'static) -> Self {
        self.staying = Some(Box::new(model));
        self
    }

    pub fn with_queuing(mut self, model: impl TacticalBehavior + 'static) -> Self {
        self.queuing = Some(Box::new(model));
        self
    }

    pub fn with_searching(mut self, model: impl TacticalBehavior + 'static) -> Self {
        self.searching = Some(Box::new(model));
        self
    }

    pub fn config(&self) -> &TacticalConfig {
        &self.config
    }

    pub fn routing(&self) -> &R {
        &self.routing
    }

    /// The behavior an agent is told to perform, before any override.
    pub fn command(&self, agent: &PedestrianState) -> Behavior {
        self.config.strategic_command.unwrap_or(agent.behavior_task)
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    pub fn tick(&self, agents: &mut [Pedestrian<R::Extension>], ctx: &TacticalContext<'_>) {
        for_each_agent(agents, |a| self.select(&mut a.state, ctx));

        for model in self.sub_models() {
            model.pre_tick(ctx);
        }

        for_each_agent(agents, |a| self.dispatch(a, ctx));

        for model in self.sub_models() {
            model.post_tick(ctx);
        }

        for_each_agent(agents, |a| self.update_motoric(&mut a.state));
    }

    fn sub_models(&self) -> impl Iterator<Item = &Box<dyn TacticalBehavior>> {
        [&self.staying, &self.queuing, &self.searching].into_iter().flatten()
    }

    // ── ① Selection ───────────────────────────────────────────────────────

    /// Decide the override and clear every slot the active behavior does
    /// not own.
    fn select(&self, agent: &mut PedestrianState, ctx: &TacticalContext<'_>) {
        let command = self.command(agent);
        let overriding = self.config.tactical_control && self.command_blocked(agent, command, ctx);
        agent.tactical_state.override_behavior = overriding.then_some(Behavior::Routing);

        if overriding || command != Behavior::Staying {
            agent.staying_state = None;
        }
        if overriding || command != Behavior::Queuing {
            agent.queuing_state = None;
        }
        if overriding || command != Behavior::Searching {
            agent.searching_state = None;
        }
        if !overriding && command != Behavior::Routing {
            agent.routing_state = None;
        }
    }

    /// The command needs the goal in sight, and it is not.
    fn command_blocked(&self, agent: &PedestrianState, command: Behavior, ctx: &TacticalContext<'_>) -> bool {
        if matches!(command, Behavior::None | Behavior::Routing) {
            return false;
        }
        if agent.queuing_state.is_some() || agent.staying_state.is_some() {
            return false;
        }
        match agent.next_navigation_target {
            Some(target) => !ctx.perception.is_visible_to(agent.position, &target),
            None => false,
        }
    }

    // ── ③ Dispatch ────────────────────────────────────────────────────────

    fn dispatch(&self, agent: &mut Pedestrian<R::Extension>, ctx: &TacticalContext<'_>) {
        let command = self.command(&agent.state);
        let active = match agent.state.tactical_state.override_behavior {
            Some(forced) if self.config.tactical_control => forced,
            _ => command,
        };
        trace!("{}: {:?}", agent.state.id, active);

        match active {
            Behavior::Routing => self.route(agent, ctx),
            Behavior::Staying => delegate(self.staying.as_deref(), &mut agent.state, ctx, "staying"),
            Behavior::Queuing => delegate(self.queuing.as_deref(), &mut agent.state, ctx, "queuing"),
            Behavior::Searching => delegate(self.searching.as_deref(), &mut agent.state, ctx, "searching"),
            Behavior::None => {}
        }
    }

    fn route(&self, agent: &mut Pedestrian<R::Extension>, ctx: &TacticalContext<'_>) {
        let rctx = RoutingContext::new(ctx.graph, ctx.perception, self.config.navigation_distance_radius);
        let Pedestrian { state, rng, extension } = agent;

        if self.config.tactical_control {
            if let Some(shortcut) = self.routing.short_cut_route(&rctx, &state.routing_agent()) {
                state.next_walking_target = state.next_navigation_target.map(|t| t.point_of_interest);
                state.routing_state = Some(shortcut);
            } else {
                let deep = self.config.deep_node_selection > 0;
                if self.routing.re_routing_necessary(&rctx, &state.routing_agent(), deep) {
                    let mut routed = self.routing.route(&rctx, &state.routing_agent(), extension, rng);
                    if deep {
                        routed = self.look_ahead(&rctx, state, routed, extension, rng);
                    }
                    self.install(ctx, state, routed);
                }
            }
        } else if self.hop_reached(ctx, state) {
            let routed = self.routing.route(&rctx, &state.routing_agent(), extension, rng);
            self.install(ctx, state, routed);
        }

        if !self.config.route_memory {
            if let Some(route) = state.routing_state.as_mut() {
                route.visited.clear();
            }
        }
    }

    fn install(&self, ctx: &TacticalContext<'_>, state: &mut PedestrianState, route: RoutingState) {
        if !route.has_route() {
            debug!("{}: no route available", state.id);
        }
        state.set_route(ctx.graph, route);
    }

    /// Re-route trigger without tactical control: no hop yet, or the hop
    /// has been reached.
    fn hop_reached(&self, ctx: &TacticalContext<'_>, state: &PedestrianState) -> bool {
        let Some(next) = state.routing_state.as_ref().and_then(|r| r.next_visit) else {
            return true;
        };
        !ctx.graph.contains(next)
            || state.position.distance(ctx.graph.position(next)) < self.config.navigation_distance_radius
    }

    /// Advance the route up to `deep_node_selection` further hops from the
    /// agent's current position.
    ///
    /// Each step plans again from the previous step's state.  The walk
    /// stops when the proposed hop is out of sight, is the goal vertex, or
    /// the first hop already sits on the goal.  The hop proposed by the
    /// final step becomes `next_to_current_visit`.
    fn look_ahead(
        &self,
        rctx:      &RoutingContext<'_>,
        state:     &PedestrianState,
        first:     RoutingState,
        extension: &mut R::Extension,
        rng:       &mut AgentRng,
    ) -> RoutingState {
        if !first.has_route() {
            return first;
        }

        let end: Option<VertexId> = state.next_navigation_target.map(|t| t.vertex);
        let start = first.last_visit;

        let mut next_to_last = first.last_visit;
        let mut last = first.last_visit;
        let mut next = first.next_visit;
        let mut ahead = first.next_to_current_visit;
        let mut visited = first.visited.clone();

        let mut current = first;
        let mut depth = self.config.deep_node_selection;

        while depth > 0 {
            let stepped = self.routing.route(rctx, &state.routing_agent_with(Some(&current)), extension, rng);
            let proposed = stepped.next_visit;

            let out_of_sight = match proposed {
                Some(v) => !rctx.perception.is_vertex_visible(state.position, rctx.graph, v),
                None => true,
            };
            let at_goal = end.is_some() && proposed == end;
            let started_at_goal = start.is_some() && start == end;
            if out_of_sight || at_goal || started_at_goal {
                ahead = proposed;
                break;
            }

            depth -= 1;
            if depth == 0 {
                ahead = proposed;
                break;
            }
            next_to_last = last;

            if let Some(v) = next {
                visited.insert(v);
            }
            last = stepped.last_visit;
            next = stepped.next_visit;
            current = stepped;
        }

        let mut result = RoutingState::new(visited, next_to_last, last, next);
        result.next_to_current_visit = ahead;
        result
    }

    // ── ⑤ Motoric ─────────────────────────────────────────────────────────

    fn update_motoric(&self, agent: &mut PedestrianState) {
        let small_scale = if agent.staying_state.is_some() || agent.queuing_state.is_some() {
            true
        } else {
            // No routing or searching either means no target at all.
            agent.routing_state.is_none() && agent.searching_state.is_none()
        };

        let goal_reached = agent
            .next_walking_target
            .is_some_and(|t| t.distance(agent.position) <= self.config.goal_distance_radius);

        let motoric = if small_scale && (agent.standing_state.is_some() || goal_reached) {
            Motoric::Standing
        } else {
            Motoric::Walking
        };
        agent.tactical_state = TacticalState::new(motoric, agent.tactical_state.override_behavior);
    }
}

fn delegate(
    model: Option<&dyn TacticalBehavior>,
    agent: &mut PedestrianState,
    ctx:   &TacticalContext<'_>,
    name:  &str,
) {
    match model {
        Some(m) => m.per_agent_update(agent, ctx),
        None => trace!("{}: no {} model configured", agent.id, name),
    }
}

/// Run `f` on every agent, in parallel with the `parallel` feature.
fn for_each_agent<E, F>(agents: &mut [Pedestrian<E>], f: F)
where
    E: Send,
    F: Fn(&mut Pedestrian<E>) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        agents.par_iter_mut().for_each(f);
    }

    #[cfg(not(feature = "parallel"))]
    {
        agents.iter_mut().for_each(f);
    }
}
