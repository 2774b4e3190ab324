//! Unit tests for ped-perception.

#[cfg(test)]
mod helpers {
    use ped_core::{AreaId, Bounds, Polygon, Segment, Vec2};
    use ped_graph::{NavGraph, NavGraphBuilder};
    use crate::{Area, PerceptionConfig, Scenario, VisibilityMap};

    /// 10 × 10 hall with unit cells, padded by three cells on every side.
    ///
    /// ```text
    ///  y=10 ................
    ///       ........|.......
    ///       ...O....|..###..     O  origin area around (1.5, 1.5)
    ///       ........|..#.#..     |  wall x = 5, y ∈ [0, 8]
    ///       ........|..###..     #  closed room x ∈ [7, 9], y ∈ [3, 6]
    ///  y=0  ........|.......
    /// ```
    ///
    /// Integer positions are cell centres.
    pub fn hall() -> Scenario {
        let room = [
            Segment::new(Vec2::new(7.0, 3.0), Vec2::new(9.0, 3.0)),
            Segment::new(Vec2::new(9.0, 3.0), Vec2::new(9.0, 6.0)),
            Segment::new(Vec2::new(9.0, 6.0), Vec2::new(7.0, 6.0)),
            Segment::new(Vec2::new(7.0, 6.0), Vec2::new(7.0, 3.0)),
        ];
        let mut scenario = Scenario::new(Bounds::new(Vec2::ZERO, Vec2::new(10.0, 10.0)))
            .with_obstacle(Segment::new(Vec2::new(5.0, 0.0), Vec2::new(5.0, 8.0)))
            .with_origin(Area::new(
                AreaId(0),
                Polygon::rectangle(Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)),
            ))
            .with_area(
                Area::new(AreaId(1), Polygon::rectangle(Vec2::new(8.0, 8.0), Vec2::new(9.0, 9.0)))
                    .with_point_of_interest(Vec2::new(8.0, 9.0)),
            );
        for s in room {
            scenario = scenario.with_obstacle(s);
        }
        scenario
    }

    /// Two vertices three units apart: longest edge 3.
    pub fn short_graph() -> NavGraph {
        let mut b = NavGraphBuilder::new();
        let a = b.add_vertex(Vec2::new(1.0, 9.0));
        let c = b.add_vertex(Vec2::new(4.0, 9.0));
        b.add_corridor(a, c);
        b.build()
    }

    pub fn unit_config() -> PerceptionConfig {
        PerceptionConfig { accuracy: 1.0, ..PerceptionConfig::default() }
    }

    /// Hall map with an effectively unlimited range.
    pub fn hall_map() -> VisibilityMap {
        let config = PerceptionConfig { perception_distance: Some(1_000.0), ..unit_config() };
        VisibilityMap::preprocess(&hall(), &NavGraph::empty(), &config).unwrap()
    }
}

// ── Pre-processing ────────────────────────────────────────────────────────────

#[cfg(test)]
mod preprocess {
    use ped_core::{Bounds, LatticeId, Vec2};
    use ped_graph::NavGraph;
    use ped_lattice::{CellIndex, CellState, Lattice, Neighborhood};
    use crate::{
        PerceptionConfig, PerceptionError, Scenario, VisibilityMap, DEFAULT_PERCEPTION_CELLS,
    };
    use super::helpers::{hall, hall_map, short_graph, unit_config};

    #[test]
    fn lattice_padded_by_three_cells() {
        let map = hall_map();
        // 10 units + 2 × 3 padding, inclusive of both ends.
        assert_eq!(map.lattice().rows(), 17);
        assert_eq!(map.lattice().columns(), 17);
        assert_eq!(map.accuracy(), 1.0);
    }

    #[test]
    fn obstacles_are_fixed() {
        let map = hall_map();
        let lattice = map.lattice();
        for y in 0..=8 {
            let cell = lattice.cell_index_from_position(Vec2::new(5.0, y as f64));
            assert_eq!(lattice.state(cell), Some(CellState::Fixed), "wall at y={y}");
        }
        let gap = lattice.cell_index_from_position(Vec2::new(5.0, 10.0));
        assert!(lattice.is_free(gap));
    }

    #[test]
    fn closed_room_is_sealed() {
        let map = hall_map();
        let lattice = map.lattice();
        for y in [4.0, 5.0] {
            let inside = lattice.cell_index_from_position(Vec2::new(8.0, y));
            assert_eq!(lattice.state(inside), Some(CellState::Fixed));
        }
        // Behind the wall but reachable around it.
        let behind = lattice.cell_index_from_position(Vec2::new(8.0, 1.0));
        assert!(lattice.is_free(behind));
    }

    #[test]
    fn no_origins_skips_flood() {
        let mut scenario = hall();
        scenario.origins.clear();
        let map = VisibilityMap::preprocess(&scenario, &NavGraph::empty(), &unit_config()).unwrap();
        let inside = map.lattice().cell_index_from_position(Vec2::new(8.0, 4.0));
        assert!(map.lattice().is_free(inside));
    }

    #[test]
    fn range_from_longest_edge() {
        let map = VisibilityMap::preprocess(&hall(), &short_graph(), &unit_config()).unwrap();
        assert_eq!(map.perception_cells(), 6);
        assert_eq!(map.perception_distance(), 6.0);
    }

    #[test]
    fn range_from_distance() {
        let config = PerceptionConfig { perception_distance: Some(4.0), ..unit_config() };
        let map = VisibilityMap::preprocess(&hall(), &short_graph(), &config).unwrap();
        assert_eq!(map.perception_cells(), 4);
    }

    #[test]
    fn range_default_without_edges() {
        let map = VisibilityMap::preprocess(&hall(), &NavGraph::empty(), &unit_config()).unwrap();
        assert_eq!(map.perception_cells(), DEFAULT_PERCEPTION_CELLS);
    }

    #[test]
    fn reuses_scenario_lattice() {
        let bounds = Bounds::new(Vec2::new(-1.0, -1.0), Vec2::new(11.0, 11.0));
        let lattice = Lattice::new(LatticeId(7), bounds, 0.5, Neighborhood::Touching).unwrap();
        let scenario = hall().with_lattice(lattice);
        let config = PerceptionConfig { lattice_id: Some(LatticeId(7)), ..unit_config() };
        let map = VisibilityMap::preprocess(&scenario, &short_graph(), &config).unwrap();
        assert_eq!(map.lattice().id(), LatticeId(7));
        assert_eq!(map.accuracy(), 0.5);
        // Longest edge 3 at half-unit cells, doubled.
        assert_eq!(map.perception_cells(), 12);
        // The scenario's own copy is untouched.
        let original = scenario.lattice(LatticeId(7)).unwrap();
        let wall = original.cell_index_from_position(Vec2::new(5.0, 4.0));
        assert!(original.is_free(wall));
    }

    #[test]
    fn wraps_prepared_lattice() {
        let bounds = Bounds::new(Vec2::ZERO, Vec2::new(4.0, 4.0));
        let lattice = Lattice::new(LatticeId(2), bounds, 1.0, Neighborhood::Edge).unwrap();
        for row in 0..4 {
            assert!(lattice.occupy(CellIndex::new(row, 2), CellState::Fixed));
        }
        let map = VisibilityMap::from_lattice(lattice, 10);
        assert_eq!(map.accuracy(), 1.0);
        assert_eq!(map.perception_cells(), 10);
        assert!(map.is_visible(Vec2::new(0.0, 0.0), Vec2::new(1.0, 4.0)));
        assert!(!map.is_visible(Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0)));
        // Around the top of the wall.
        assert!(map.is_visible(Vec2::new(0.0, 4.0), Vec2::new(4.0, 4.0)));
    }

    #[test]
    fn unknown_lattice_rejected() {
        let config = PerceptionConfig { lattice_id: Some(LatticeId(9)), ..unit_config() };
        let err = VisibilityMap::preprocess(&hall(), &NavGraph::empty(), &config).unwrap_err();
        assert!(matches!(err, PerceptionError::UnknownLattice(LatticeId(9))));
    }

    #[test]
    fn invalid_accuracy_rejected() {
        let config = PerceptionConfig { accuracy: 0.0, ..PerceptionConfig::default() };
        let err = VisibilityMap::preprocess(&hall(), &NavGraph::empty(), &config).unwrap_err();
        assert!(matches!(err, PerceptionError::Config(_)));
    }

    #[test]
    fn empty_bounds_rejected() {
        let scenario = Scenario::new(Bounds::new(Vec2::ZERO, Vec2::new(0.0, 5.0)));
        let err = VisibilityMap::preprocess(&scenario, &NavGraph::empty(), &unit_config()).unwrap_err();
        assert!(matches!(err, PerceptionError::Config(_)));
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod queries {
    use ped_core::{AgentId, AreaId, Vec2};
    use ped_graph::NavGraphBuilder;
    use crate::{AgentView, VertexRef, VisibilityMap};
    use super::helpers::{hall, hall_map, short_graph, unit_config};

    #[test]
    fn same_side_visible() {
        let map = hall_map();
        assert!(map.is_visible(Vec2::new(2.0, 2.0), Vec2::new(2.0, 7.0)));
        assert!(map.is_visible(Vec2::new(2.0, 10.0), Vec2::new(12.0, 10.0)));
    }

    #[test]
    fn wall_blocks() {
        let map = hall_map();
        assert!(!map.is_visible(Vec2::new(2.0, 2.0), Vec2::new(8.0, 2.0)));
        assert!(!map.is_visible(Vec2::new(8.0, 2.0), Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn outside_grid_is_not_visible() {
        let map = hall_map();
        assert!(!map.is_visible(Vec2::new(2.0, 2.0), Vec2::new(100.0, 2.0)));
        assert!(!map.is_visible(Vec2::new(-50.0, 2.0), Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn non_finite_positions_see_nothing() {
        let map = hall_map();
        let nan = Vec2::new(f64::NAN, f64::NAN);
        assert!(!map.is_visible(nan, Vec2::new(2.0, 2.0)));
        assert!(!map.is_visible(Vec2::new(2.0, 2.0), nan));
        assert!(!map.is_visible(nan, nan));
        assert!(!map.is_visible(Vec2::new(f64::INFINITY, 2.0), Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn range_limits_visibility() {
        let map = VisibilityMap::preprocess(&hall(), &short_graph(), &unit_config()).unwrap();
        assert!(map.is_visible(Vec2::new(0.0, 10.0), Vec2::new(6.0, 10.0)));
        assert!(!map.is_visible(Vec2::new(0.0, 10.0), Vec2::new(7.0, 10.0)));
    }

    #[test]
    fn same_position_is_visible() {
        let map = hall_map();
        assert!(map.is_visible(Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0)));
    }

    #[test]
    fn points_of_interest() {
        let scenario = hall();
        let map = hall_map();
        let goal = scenario.area(AreaId(1)).unwrap();
        assert!(map.is_visible_to(Vec2::new(8.0, 10.0), goal));
        assert!(!map.is_visible_to(Vec2::new(2.0, 2.0), goal));

        let peer = AgentView::new(AgentId(3), Vec2::new(2.0, 6.0));
        assert!(map.is_visible_to(Vec2::new(2.0, 2.0), &peer));

        let graph = short_graph();
        let v = graph.nearest_vertex(Vec2::new(1.0, 9.0)).unwrap();
        assert!(map.is_visible_to(Vec2::new(1.0, 2.0), &VertexRef::new(&graph, v)));
        assert!(map.is_vertex_visible(Vec2::new(1.0, 2.0), &graph, v));
    }

    #[test]
    fn edge_visible_through_either_end() {
        let mut b = NavGraphBuilder::new();
        let hidden = b.add_vertex(Vec2::new(8.0, 2.0));
        let open = b.add_vertex(Vec2::new(3.0, 2.0));
        b.add_directed_edge(hidden, open);
        let graph = b.build();
        let map = hall_map();
        let e = graph.find_edge(hidden, open).unwrap();
        assert!(!map.is_vertex_visible(Vec2::new(1.0, 2.0), &graph, hidden));
        assert!(map.is_edge_visible(Vec2::new(1.0, 2.0), &graph, e));
    }
}

// ── Peer cache ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod peers {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use ped_core::{AgentId, Tick, Vec2};
    use crate::{AgentView, PeerVisibility, VisibilityCache};
    use super::helpers::hall_map;

    fn crowd() -> Vec<AgentView> {
        vec![
            AgentView::new(AgentId(0), Vec2::new(2.0, 2.0)),
            AgentView::new(AgentId(1), Vec2::new(2.0, 6.0)),
            AgentView::new(AgentId(2), Vec2::new(8.0, 2.0)),
        ]
    }

    #[test]
    fn sees_same_side_only() {
        let map = hall_map();
        let cache = VisibilityCache::new(Tick(1), &crowd());
        let peers = cache.perceived_peers(&map, AgentId(0));
        assert_eq!(peers, BTreeSet::from([AgentId(1)]));
        assert!(cache.perceived_peers(&map, AgentId(2)).is_empty());
    }

    #[test]
    fn reciprocal_and_self_excluded() {
        let map = hall_map();
        let cache = VisibilityCache::new(Tick(1), &crowd());
        let _ = cache.perceived_peers(&map, AgentId(0));
        let back = cache.perceived_peers(&map, AgentId(1));
        assert!(back.contains(&AgentId(0)));
        assert!(!back.contains(&AgentId(1)));
    }

    #[test]
    fn repeated_query_is_stable() {
        let map = hall_map();
        let cache = VisibilityCache::new(Tick(4), &crowd());
        let first = cache.perceived_peers(&map, AgentId(1));
        let second = cache.perceived_peers(&map, AgentId(1));
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_agent_sees_nobody() {
        let map = hall_map();
        let cache = VisibilityCache::new(Tick(1), &crowd());
        assert!(cache.perceived_peers(&map, AgentId(99)).is_empty());
        assert!(!cache.contains(AgentId(99)));
    }

    #[test]
    fn concurrent_queries_agree() {
        let map = hall_map();
        let cache = VisibilityCache::new(Tick(1), &crowd());
        let results: Vec<BTreeSet<AgentId>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..3)
                .map(|i| {
                    let (cache, map) = (&cache, &map);
                    s.spawn(move || cache.perceived_peers(map, AgentId(i)))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(results[0], BTreeSet::from([AgentId(1)]));
        assert_eq!(results[1], BTreeSet::from([AgentId(0)]));
        assert!(results[2].is_empty());
    }

    #[test]
    fn gate_rebuilds_on_tick_change() {
        let gate = PeerVisibility::new();
        assert_eq!(gate.current_tick(), None);
        let a = gate.cache_for(Tick(1), &crowd());
        let b = gate.cache_for(Tick(1), &[]);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.len(), 3);

        let c = gate.cache_for(Tick(2), &crowd()[..1]);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.len(), 1);
        assert_eq!(gate.current_tick(), Some(Tick(2)));
    }

    #[test]
    fn invalidate_forces_rebuild_within_tick() {
        let gate = PeerVisibility::new();
        let a = gate.cache_for(Tick(1), &crowd()[..1]);
        gate.invalidate();
        assert_eq!(gate.current_tick(), None);

        let b = gate.cache_for(Tick(1), &crowd());
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.len(), 3);
        assert!(b.contains(AgentId(2)));
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use ped_core::{Bounds, Vec2};
    use ped_graph::NavGraph;
    use crate::{PerceptionConfig, Scenario, VisibilityMap};

    fn open_map(range: f64) -> VisibilityMap {
        let scenario = Scenario::new(Bounds::new(Vec2::ZERO, Vec2::new(20.0, 20.0)));
        let config = PerceptionConfig {
            perception_distance: Some(range),
            accuracy: 0.5,
            ..PerceptionConfig::default()
        };
        VisibilityMap::preprocess(&scenario, &NavGraph::empty(), &config).unwrap()
    }

    proptest! {
        #[test]
        fn visibility_is_symmetric(
            ax in 0.0f64..20.0, ay in 0.0f64..20.0,
            bx in 0.0f64..20.0, by in 0.0f64..20.0,
            range in 0.0f64..30.0,
        ) {
            let map = open_map(range);
            let (a, b) = (Vec2::new(ax, ay), Vec2::new(bx, by));
            prop_assert_eq!(map.is_visible(a, b), map.is_visible(b, a));
        }

        #[test]
        fn everything_visible_without_obstacles(
            ax in 0.0f64..20.0, ay in 0.0f64..20.0,
            bx in 0.0f64..20.0, by in 0.0f64..20.0,
        ) {
            let map = open_map(100.0);
            prop_assert!(map.is_visible(Vec2::new(ax, ay), Vec2::new(bx, by)));
        }
    }
}
