//! Unit tests for ped-routing.

#[cfg(test)]
mod helpers {
    use ped_core::{AgentId, AreaId, Bounds, Polygon, Segment, Vec2, VertexId};
    use ped_graph::{NavGraph, NavGraphBuilder};
    use ped_perception::{Area, PerceptionConfig, Scenario, VisibilityMap};
    use crate::{NavigationTarget, RoutingAgent, RoutingState};

    /// U-turn around a wall.
    ///
    /// ```text
    ///  y=10  B ─────── C
    ///        │    |    │
    ///        │    |    │      wall x = 5, y ∈ [0, 8]
    ///  y=2   A    |    D
    ///        x=2       x=8
    /// ```
    pub struct World {
        pub graph: NavGraph,
        pub map:   VisibilityMap,
        pub v:     [VertexId; 4],
    }

    pub fn world() -> World {
        let scenario = Scenario::new(Bounds::new(Vec2::ZERO, Vec2::new(10.0, 10.0)))
            .with_obstacle(Segment::new(Vec2::new(5.0, 0.0), Vec2::new(5.0, 8.0)))
            .with_origin(Area::new(
                AreaId(0),
                Polygon::rectangle(Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)),
            ));

        let mut b = NavGraphBuilder::new();
        let a = b.add_vertex(Vec2::new(2.0, 2.0));
        let bb = b.add_vertex(Vec2::new(2.0, 10.0));
        let c = b.add_vertex(Vec2::new(8.0, 10.0));
        let d = b.add_vertex(Vec2::new(8.0, 2.0));
        b.add_corridor(a, bb);
        b.add_corridor(bb, c);
        b.add_corridor(c, d);
        let graph = b.build();

        let config = PerceptionConfig {
            perception_distance: Some(100.0),
            accuracy: 1.0,
            ..PerceptionConfig::default()
        };
        let map = VisibilityMap::preprocess(&scenario, &graph, &config).unwrap();
        World { graph, map, v: [a, bb, c, d] }
    }

    pub fn goal(w: &World) -> NavigationTarget {
        NavigationTarget::new(w.v[3], Vec2::new(8.0, 2.0))
    }

    pub fn agent<'a>(
        position: Vec2,
        target: Option<NavigationTarget>,
        state: Option<&'a RoutingState>,
    ) -> RoutingAgent<'a> {
        RoutingAgent { id: AgentId(0), position, target, state }
    }
}

// ── Start point ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod start_point {
    use std::collections::BTreeSet;

    use ped_core::Vec2;
    use crate::{find_navigation_start_point, RoutingContext, RoutingState};
    use super::helpers::{agent, goal, world};

    #[test]
    fn nearest_visible_without_state() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let a = agent(Vec2::new(2.0, 1.0), Some(goal(&w)), None);
        assert_eq!(find_navigation_start_point(&ctx, &a), Some(w.v[0]));

        let behind = agent(Vec2::new(8.0, 1.0), Some(goal(&w)), None);
        assert_eq!(find_navigation_start_point(&ctx, &behind), Some(w.v[3]));
    }

    #[test]
    fn keeps_visible_next_hop() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let state = RoutingState::new(BTreeSet::new(), None, Some(w.v[0]), Some(w.v[1]));
        let a = agent(Vec2::new(2.0, 1.0), Some(goal(&w)), Some(&state));
        assert_eq!(find_navigation_start_point(&ctx, &a), Some(w.v[1]));
    }

    #[test]
    fn hidden_next_hop_is_replaced() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let state = RoutingState::new(BTreeSet::new(), None, None, Some(w.v[2]));
        let a = agent(Vec2::new(2.0, 1.0), Some(goal(&w)), Some(&state));
        assert_eq!(find_navigation_start_point(&ctx, &a), Some(w.v[0]));
    }

    #[test]
    fn falls_back_to_nearest_when_nothing_visible() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let outside = agent(Vec2::new(100.0, 100.0), Some(goal(&w)), None);
        assert_eq!(find_navigation_start_point(&ctx, &outside), Some(w.v[2]));
    }
}

// ── Route-state update ────────────────────────────────────────────────────────

#[cfg(test)]
mod route_state {
    use std::collections::BTreeSet;

    use ped_core::Vec2;
    use ped_graph::Path;
    use crate::{update_route_state, RoutingContext, RoutingState};
    use super::helpers::{agent, goal, world};

    #[test]
    fn visible_second_hop_becomes_next() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let path = Path { vertices: w.v.to_vec(), cost: 20.0 };
        let a = agent(Vec2::new(2.0, 1.0), Some(goal(&w)), None);
        let state = update_route_state(&ctx, &a, Some(&path));
        assert_eq!(state.last_visit, Some(w.v[0]));
        assert_eq!(state.next_visit, Some(w.v[1]));
        assert_eq!(state.visited, BTreeSet::from([w.v[0]]));
    }

    #[test]
    fn hidden_second_hop_keeps_start() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let path = Path { vertices: vec![w.v[0], w.v[2]], cost: 1.0 };
        let a = agent(Vec2::new(2.0, 1.0), Some(goal(&w)), None);
        let state = update_route_state(&ctx, &a, Some(&path));
        assert_eq!(state.next_visit, Some(w.v[0]));
    }

    #[test]
    fn single_vertex_path() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let path = Path { vertices: vec![w.v[3]], cost: 0.0 };
        let a = agent(Vec2::new(8.0, 1.0), Some(goal(&w)), None);
        let state = update_route_state(&ctx, &a, Some(&path));
        assert_eq!(state.last_visit, Some(w.v[3]));
        assert_eq!(state.next_visit, Some(w.v[3]));
    }

    #[test]
    fn history_carries_over() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let previous = RoutingState::new(BTreeSet::from([w.v[0]]), None, Some(w.v[0]), Some(w.v[1]));
        let path = Path { vertices: vec![w.v[1], w.v[2], w.v[3]], cost: 14.0 };
        let a = agent(Vec2::new(2.0, 9.0), Some(goal(&w)), Some(&previous));
        let state = update_route_state(&ctx, &a, Some(&path));
        assert_eq!(state.visited, BTreeSet::from([w.v[0], w.v[1]]));
        assert_eq!(state.next_to_last_visit, Some(w.v[0]));
        assert_eq!(state.last_visit, Some(w.v[1]));
        assert_eq!(state.next_visit, Some(w.v[2]));
    }

    #[test]
    fn no_path_clears_next_hop() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let previous = RoutingState::new(BTreeSet::from([w.v[0]]), None, Some(w.v[0]), Some(w.v[1]));
        let a = agent(Vec2::new(2.0, 1.0), Some(goal(&w)), Some(&previous));
        let state = update_route_state(&ctx, &a, None);
        assert!(!state.has_route());
        assert_eq!(state.visited, previous.visited);
        assert_eq!(state.last_visit, Some(w.v[0]));
    }
}

// ── Shortcut & re-route checks ────────────────────────────────────────────────

#[cfg(test)]
mod checks {
    use std::collections::BTreeSet;

    use ped_core::Vec2;
    use crate::{re_routing_necessary, short_cut_route, RoutingContext, RoutingState};
    use super::helpers::{agent, goal, world};

    #[test]
    fn shortcut_only_when_goal_visible() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let hidden = agent(Vec2::new(2.0, 1.0), Some(goal(&w)), None);
        assert!(short_cut_route(&ctx, &hidden).is_none());

        let previous = RoutingState::new(BTreeSet::new(), None, Some(w.v[1]), Some(w.v[2]));
        let seen = agent(Vec2::new(8.0, 9.0), Some(goal(&w)), Some(&previous));
        let state = short_cut_route(&ctx, &seen).unwrap();
        assert_eq!(state.next_visit, Some(w.v[3]));
        assert_eq!(state.last_visit, Some(w.v[2]));
        assert_eq!(state.next_to_last_visit, Some(w.v[1]));
    }

    #[test]
    fn no_target_no_shortcut() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        assert!(short_cut_route(&ctx, &agent(Vec2::new(8.0, 3.0), None, None)).is_none());
    }

    #[test]
    fn reroute_without_route() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        assert!(re_routing_necessary(&ctx, &agent(Vec2::new(2.0, 1.0), None, None), false));
        let empty = RoutingState::default();
        assert!(re_routing_necessary(&ctx, &agent(Vec2::new(2.0, 1.0), None, Some(&empty)), false));
    }

    #[test]
    fn keep_visible_distant_hop() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let state = RoutingState::new(BTreeSet::new(), None, Some(w.v[0]), Some(w.v[1]));
        assert!(!re_routing_necessary(&ctx, &agent(Vec2::new(2.0, 1.0), None, Some(&state)), false));
    }

    #[test]
    fn reroute_when_hop_reached() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let state = RoutingState::new(BTreeSet::new(), None, Some(w.v[0]), Some(w.v[1]));
        assert!(re_routing_necessary(&ctx, &agent(Vec2::new(2.0, 9.9), None, Some(&state)), false));
    }

    #[test]
    fn reroute_when_hop_hidden() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let state = RoutingState::new(BTreeSet::new(), None, None, Some(w.v[3]));
        assert!(re_routing_necessary(&ctx, &agent(Vec2::new(2.0, 1.0), None, Some(&state)), false));
    }

    #[test]
    fn deep_check_watches_lookahead() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let mut state = RoutingState::new(BTreeSet::new(), None, Some(w.v[0]), Some(w.v[1]));
        state.next_to_current_visit = Some(w.v[2]);
        let a = agent(Vec2::new(2.0, 1.0), None, Some(&state));
        assert!(!re_routing_necessary(&ctx, &a, false));
        assert!(re_routing_necessary(&ctx, &a, true));
    }
}

// ── ShortestPathRouting ───────────────────────────────────────────────────────

#[cfg(test)]
mod shortest {
    use ped_core::{AgentId, AgentRng, AreaId, Bounds, Polygon, Vec2};
    use ped_graph::NavGraphBuilder;
    use ped_perception::{Area, PerceptionConfig, Scenario, VisibilityMap};
    use crate::{NavigationTarget, RoutingContext, RoutingModel, ShortestPathRouting};
    use super::helpers::{agent, goal, world};

    #[test]
    fn routes_around_the_wall() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let model = ShortestPathRouting;
        let mut rng = AgentRng::new(1, AgentId(0));
        let mut costs = model.on_agent_spawn(AgentId(0), &w.graph, &mut rng);
        assert_eq!(costs.len(), 4);

        let a = agent(Vec2::new(2.0, 1.0), Some(goal(&w)), None);
        let state = model.route(&ctx, &a, &mut costs, &mut rng);
        assert_eq!(state.last_visit, Some(w.v[0]));
        assert_eq!(state.next_visit, Some(w.v[1]));

        // Walked up to B: the next route starts there and C comes into view.
        let up = agent(Vec2::new(2.0, 9.5), Some(goal(&w)), Some(&state));
        let next = model.route(&ctx, &up, &mut costs, &mut rng);
        assert_eq!(next.last_visit, Some(w.v[1]));
        assert_eq!(next.next_visit, Some(w.v[2]));
        assert_eq!(next.next_to_last_visit, Some(w.v[0]));
        assert!(next.visited.contains(&w.v[0]) && next.visited.contains(&w.v[1]));

        model.on_agent_removed(AgentId(0), costs);
    }

    #[test]
    fn missing_target_is_no_route() {
        let w = world();
        let ctx = RoutingContext::new(&w.graph, &w.map, 0.15);
        let model = ShortestPathRouting;
        let mut rng = AgentRng::new(1, AgentId(0));
        let mut costs = model.on_agent_spawn(AgentId(0), &w.graph, &mut rng);
        let state = model.route(&ctx, &agent(Vec2::new(2.0, 1.0), None, None), &mut costs, &mut rng);
        assert!(!state.has_route());
    }

    #[test]
    fn disconnected_target_is_no_route() {
        let mut b = NavGraphBuilder::new();
        let a = b.add_vertex(Vec2::new(1.0, 1.0));
        let c = b.add_vertex(Vec2::new(3.0, 1.0));
        let island = b.add_vertex(Vec2::new(3.0, 3.0));
        b.add_corridor(a, c);
        let graph = b.build();
        let scenario = Scenario::new(Bounds::new(Vec2::ZERO, Vec2::new(4.0, 4.0))).with_origin(
            Area::new(AreaId(0), Polygon::rectangle(Vec2::ZERO, Vec2::new(1.0, 1.0))),
        );
        let config = PerceptionConfig { accuracy: 0.5, ..PerceptionConfig::default() };
        let map = VisibilityMap::preprocess(&scenario, &graph, &config).unwrap();
        let ctx = RoutingContext::new(&graph, &map, 0.15);

        let model = ShortestPathRouting;
        let mut rng = AgentRng::new(1, AgentId(0));
        let mut costs = model.on_agent_spawn(AgentId(0), &graph, &mut rng);
        let target = NavigationTarget::new(island, Vec2::new(3.0, 3.0));
        let state = model.route(&ctx, &agent(Vec2::new(1.0, 1.2), Some(target), None), &mut costs, &mut rng);
        assert_eq!(state.next_visit, None);
    }
}
