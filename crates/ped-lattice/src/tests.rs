//! Unit tests for ped-lattice.

#[cfg(test)]
mod helpers {
    use ped_core::{Bounds, LatticeId, Vec2};

    use crate::{Lattice, Neighborhood};

    /// `rows × columns` lattice of unit cells, cell (0,0) centred at the origin.
    pub fn unit_grid(rows: usize, columns: usize, neighborhood: Neighborhood) -> Lattice {
        let bounds = Bounds::new(
            Vec2::ZERO,
            Vec2::new(columns as f64 - 1.0, rows as f64 - 1.0),
        );
        Lattice::new(LatticeId(0), bounds, 1.0, neighborhood).unwrap()
    }
}

#[cfg(test)]
mod construction {
    use ped_core::{Bounds, LatticeId, Vec2};

    use super::helpers::unit_grid;
    use crate::{CellIndex, Lattice, LatticeError, Neighborhood};

    #[test]
    fn dimensions_from_bounds() {
        let l = unit_grid(3, 3, Neighborhood::Edge);
        assert_eq!(l.rows(), 3);
        assert_eq!(l.columns(), 3);
        assert_eq!(l.cell_count(), 9);

        let wide = Lattice::new(
            LatticeId(1),
            Bounds::new(Vec2::ZERO, Vec2::new(10.0, 2.0)),
            0.5,
            Neighborhood::Touching,
        )
        .unwrap();
        assert_eq!(wide.columns(), 21);
        assert_eq!(wide.rows(), 5);
    }

    #[test]
    fn invalid_cell_edge_rejected() {
        let b = Bounds::new(Vec2::ZERO, Vec2::new(1.0, 1.0));
        for edge in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Lattice::new(LatticeId(0), b, edge, Neighborhood::Edge).unwrap_err();
            assert!(matches!(err, LatticeError::InvalidCellEdge(_)));
        }
    }

    #[test]
    fn non_finite_bounds_rejected() {
        let b = Bounds { min: Vec2::ZERO, max: Vec2::new(f64::NAN, 1.0) };
        assert!(matches!(
            Lattice::new(LatticeId(0), b, 1.0, Neighborhood::Edge),
            Err(LatticeError::DegenerateBounds(_))
        ));
    }

    #[test]
    fn position_mapping_rounds_to_nearest_centre() {
        let l = unit_grid(3, 3, Neighborhood::Edge);
        assert_eq!(l.cell_index_from_position(Vec2::new(0.4, 0.4)), CellIndex::new(0, 0));
        assert_eq!(l.cell_index_from_position(Vec2::new(0.6, 1.6)), CellIndex::new(2, 1));
        assert_eq!(l.center_position(CellIndex::new(2, 1)), Vec2::new(1.0, 2.0));
        assert!(!l.in_bounds(l.cell_index_from_position(Vec2::new(-0.6, 0.0))));
        assert!(!l.in_bounds_position(Vec2::new(0.0, 2.6)));
    }

    #[test]
    fn non_finite_positions_are_out_of_bounds() {
        let l = unit_grid(5, 5, Neighborhood::Edge);
        for p in [
            Vec2::new(f64::NAN, f64::NAN),
            Vec2::new(f64::NAN, 2.0),
            Vec2::new(2.0, f64::NAN),
            Vec2::new(f64::INFINITY, 2.0),
            Vec2::new(2.0, f64::NEG_INFINITY),
        ] {
            assert!(!l.in_bounds(l.cell_index_from_position(p)), "{p:?}");
            assert!(!l.in_bounds_position(p), "{p:?}");
        }
    }

    #[test]
    fn neighborhoods() {
        let edge = unit_grid(3, 3, Neighborhood::Edge);
        let corner = CellIndex::new(0, 0);
        assert_eq!(edge.neighbors(corner).len(), 4);
        assert_eq!(edge.neighbors_in_bounds(corner).count(), 2);

        let touching = unit_grid(3, 3, Neighborhood::Touching);
        assert_eq!(touching.neighbors(corner).len(), 8);
        assert_eq!(touching.neighbors_in_bounds(corner).count(), 3);
        assert_eq!(touching.neighbors_in_bounds(CellIndex::new(1, 1)).count(), 8);
    }

    #[test]
    fn cell_geometry() {
        let l = unit_grid(2, 2, Neighborhood::Edge);
        let b = l.cell_bounds(CellIndex::new(1, 1));
        assert_eq!(b.min, Vec2::new(0.5, 0.5));
        assert_eq!(b.max, Vec2::new(1.5, 1.5));
        assert_eq!(l.cell_corners(CellIndex::new(0, 0))[2], Vec2::new(0.5, 0.5));
        let outer = l.bounds();
        assert_eq!(outer.min, Vec2::new(-0.5, -0.5));
        assert_eq!(outer.max, Vec2::new(1.5, 1.5));
    }
}

#[cfg(test)]
mod cells {
    use super::helpers::unit_grid;
    use crate::{CellIndex, CellState, LatticeError, Neighborhood};

    #[test]
    fn occupy_then_free_restores_free() {
        let l = unit_grid(3, 3, Neighborhood::Edge);
        let c = CellIndex::new(1, 2);
        assert!(l.occupy(c, CellState::Fixed));
        assert_eq!(l.state(c), Some(CellState::Fixed));
        assert!(l.free(c));
        assert_eq!(l.state(c), Some(CellState::FREE));
    }

    #[test]
    fn occupy_on_occupied_cell_is_rejected() {
        let l = unit_grid(3, 3, Neighborhood::Edge);
        let c = CellIndex::new(0, 1);
        assert!(l.occupy(c, CellState::Dynamic));
        assert!(!l.occupy(c, CellState::Fixed));
        assert_eq!(l.state(c), Some(CellState::Dynamic));
    }

    #[test]
    fn empty_is_not_an_occupier() {
        let l = unit_grid(3, 3, Neighborhood::Edge);
        let c = CellIndex::new(0, 0);
        assert!(!l.occupy(c, CellState::Empty(4.0)));
        assert_eq!(l.state(c), Some(CellState::FREE));
    }

    #[test]
    fn free_on_free_cell_is_rejected() {
        let l = unit_grid(3, 3, Neighborhood::Edge);
        assert!(!l.free(CellIndex::new(2, 2)));
    }

    #[test]
    fn out_of_bounds_queries_are_not_free() {
        let l = unit_grid(3, 3, Neighborhood::Edge);
        let outside = CellIndex::new(-1, 0);
        assert!(!l.is_free(outside));
        assert!(l.state(outside).is_none());
        assert!(!l.occupy(outside, CellState::Fixed));
        assert!(!l.free(outside));
        assert!(matches!(l.set(outside, CellState::Fixed), Err(LatticeError::OutOfBounds(_))));
    }

    #[test]
    fn nan_payload_rejected() {
        let l = unit_grid(1, 1, Neighborhood::Edge);
        let c = CellIndex::new(0, 0);
        assert!(matches!(l.set_value(c, f64::NAN), Err(LatticeError::InvalidValue(_))));
        assert_eq!(l.state(c), Some(CellState::FREE));
    }

    #[test]
    fn extreme_payloads_do_not_alias_occupiers() {
        let l = unit_grid(1, 3, Neighborhood::Edge);
        l.set_value(CellIndex::new(0, 0), f64::MAX).unwrap();
        l.set_value(CellIndex::new(0, 1), f64::INFINITY).unwrap();
        l.set_value(CellIndex::new(0, 2), f64::NEG_INFINITY).unwrap();
        for col in 0..3 {
            assert!(l.is_free(CellIndex::new(0, col)));
        }
    }

    #[test]
    fn increase_value_skips_occupied() {
        let l = unit_grid(1, 2, Neighborhood::Edge);
        let a = CellIndex::new(0, 0);
        let b = CellIndex::new(0, 1);
        l.occupy(b, CellState::Fixed);
        assert!(l.increase_value(a, 1.5).unwrap());
        assert!(l.increase_value(a, 1.0).unwrap());
        assert_eq!(l.value(a), Some(2.5));
        assert!(!l.increase_value(b, 1.0).unwrap());
        assert_eq!(l.state(b), Some(CellState::Fixed));
    }

    #[test]
    fn concurrent_occupy_has_single_winner() {
        let l = unit_grid(2, 2, Neighborhood::Edge);
        let c = CellIndex::new(1, 1);
        let winners: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| l.occupy(c, CellState::Dynamic) as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(winners, 1);
    }

    #[test]
    fn bulk_setters() {
        let mut l = unit_grid(2, 2, Neighborhood::Edge);
        l.occupy(CellIndex::new(0, 0), CellState::Fixed);
        l.set_all_free_to(7.0).unwrap();
        assert_eq!(l.cells_with_value(7.0).len(), 3);
        assert_eq!(l.state(CellIndex::new(0, 0)), Some(CellState::Fixed));
        assert_eq!(l.occupied_neighbor_count(CellIndex::new(0, 1)), 1);

        l.set_all(CellState::Dynamic).unwrap();
        assert_eq!(l.cells_where(|s| s == CellState::Dynamic).len(), 4);
    }

    #[test]
    fn min_max_over_free_cells() {
        let l = unit_grid(1, 3, Neighborhood::Edge);
        l.set_value(CellIndex::new(0, 0), 3.0).unwrap();
        l.set_value(CellIndex::new(0, 1), -1.0).unwrap();
        l.occupy(CellIndex::new(0, 2), CellState::Fixed);
        let all: Vec<CellIndex> = (0..3).map(|c| CellIndex::new(0, c)).collect();
        assert_eq!(l.min_max_values(&all), Some((-1.0, 3.0)));
        assert_eq!(l.min_max_values(&all[2..]), None);
    }

    #[test]
    fn clone_is_a_snapshot() {
        let l = unit_grid(2, 2, Neighborhood::Edge);
        let c = CellIndex::new(0, 0);
        let copy = l.clone();
        l.occupy(c, CellState::Fixed);
        assert!(copy.is_free(c));
        assert!(!l.is_free(c));
    }

    #[test]
    fn display_paints_top_row_first() {
        let l = unit_grid(2, 3, Neighborhood::Edge);
        l.occupy(CellIndex::new(0, 0), CellState::Fixed);
        l.occupy(CellIndex::new(1, 2), CellState::Dynamic);
        assert_eq!(l.to_string(), "..o\n#..\n");
    }
}

#[cfg(test)]
mod raster {
    use ped_core::{Circle, Polygon, Segment, Vec2};

    use super::helpers::unit_grid;
    use crate::{CellIndex, CellState, Neighborhood, Shape};

    #[test]
    fn horizontal_segment_covers_one_row() {
        let l = unit_grid(3, 3, Neighborhood::Edge);
        let s = Segment::new(Vec2::new(0.0, 1.0), Vec2::new(2.0, 1.0));
        assert_eq!(
            l.rasterize(&s.into()),
            vec![CellIndex::new(1, 0), CellIndex::new(1, 1), CellIndex::new(1, 2)]
        );
    }

    #[test]
    fn diagonal_segment_touches_corner_cells() {
        let l = unit_grid(3, 3, Neighborhood::Edge);
        let s = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
        let cells = l.border_cells_segment(&s);
        assert!(cells.contains(&CellIndex::new(0, 0)));
        assert!(cells.contains(&CellIndex::new(1, 1)));
        assert!(cells.contains(&CellIndex::new(2, 2)));
        assert!(!cells.contains(&CellIndex::new(2, 0)));
    }

    #[test]
    fn segment_outside_grid_is_filtered() {
        let l = unit_grid(3, 3, Neighborhood::Edge);
        let s = Segment::new(Vec2::new(10.0, 10.0), Vec2::new(12.0, 10.0));
        assert!(l.rasterize(&s.into()).is_empty());
        let partial = Segment::new(Vec2::new(-5.0, 0.0), Vec2::new(0.0, 0.0));
        assert_eq!(l.rasterize(&partial.into()), vec![CellIndex::new(0, 0)]);
    }

    #[test]
    fn small_polygon_inside_one_cell() {
        let l = unit_grid(3, 3, Neighborhood::Edge);
        let p = Polygon::rectangle(Vec2::new(0.6, 0.6), Vec2::new(1.4, 1.4));
        assert_eq!(l.inside_cells_polygon(&p), vec![CellIndex::new(1, 1)]);
        assert_eq!(l.rasterize(&p.into()), vec![CellIndex::new(1, 1)]);
    }

    #[test]
    fn polygon_combines_inside_and_border() {
        let l = unit_grid(5, 5, Neighborhood::Edge);
        let p = Polygon::rectangle(Vec2::new(0.8, 0.8), Vec2::new(3.2, 3.2));
        let cells = l.rasterize(&p.into());
        // Inside: the 3×3 block of centres 1..=3; border cells coincide.
        assert_eq!(cells.len(), 9);
        assert!(cells.iter().all(|c| (1..=3).contains(&c.row) && (1..=3).contains(&c.column)));
    }

    #[test]
    fn circle_cells_by_centre_distance() {
        let l = unit_grid(3, 3, Neighborhood::Edge);
        let cells = l.circle_cells(&Circle::new(Vec2::new(1.0, 1.0), 1.0));
        assert_eq!(cells.len(), 5);
        assert!(!cells.contains(&CellIndex::new(0, 0)));
    }

    #[test]
    fn occupy_shape_reports_claimed_cells() {
        let l = unit_grid(3, 3, Neighborhood::Edge);
        let shape = Shape::Segment(Segment::new(Vec2::new(0.0, 2.0), Vec2::new(2.0, 2.0)));
        l.occupy(CellIndex::new(2, 1), CellState::Dynamic);
        let claimed = l.occupy_shape(&shape, CellState::Fixed);
        assert_eq!(claimed, vec![CellIndex::new(2, 0), CellIndex::new(2, 2)]);
        assert!(l.occupy_shape(&shape, CellState::Fixed).is_empty());
        assert_eq!(l.free_shape(&shape).len(), 3);
    }
}

#[cfg(test)]
mod cast {
    use super::helpers::unit_grid;
    use crate::{CellIndex, CellState, LineCast, Neighborhood};

    #[test]
    fn identical_endpoints_hit_trivially() {
        let l = unit_grid(2, 2, Neighborhood::Edge);
        let c = CellIndex::new(1, 1);
        l.occupy(c, CellState::Fixed);
        assert_eq!(l.line_cast(c, c, 0), LineCast::Hit);
        assert!(l.is_reachable(c, c));
    }

    #[test]
    fn budget_limits_steps() {
        let l = unit_grid(1, 5, Neighborhood::Edge);
        let from = CellIndex::new(0, 0);
        let to = CellIndex::new(0, 4);
        assert_eq!(l.line_cast(from, to, 3), LineCast::Exhausted);
        assert_eq!(l.line_cast(from, to, 4), LineCast::Hit);
        assert_eq!(l.line_cast(from, to, 0), LineCast::Exhausted);
    }

    #[test]
    fn occupied_target_is_blocked() {
        let l = unit_grid(1, 3, Neighborhood::Edge);
        let to = CellIndex::new(0, 2);
        l.occupy(to, CellState::Dynamic);
        assert_eq!(
            l.line_cast(CellIndex::new(0, 0), to, 10),
            LineCast::Blocked { cell: to, state: CellState::Dynamic }
        );
    }

    #[test]
    fn out_of_grid_endpoint_is_blocked() {
        let l = unit_grid(2, 2, Neighborhood::Edge);
        let cast = l.line_cast(CellIndex::new(0, 0), CellIndex::new(0, 5), 10);
        assert!(matches!(cast, LineCast::Blocked { state: CellState::Fixed, .. }));
    }

    #[test]
    fn no_diagonal_slip_between_corner_obstacles() {
        let l = unit_grid(2, 2, Neighborhood::Edge);
        l.occupy(CellIndex::new(0, 1), CellState::Fixed);
        l.occupy(CellIndex::new(1, 0), CellState::Fixed);
        assert!(!l.is_reachable(CellIndex::new(0, 0), CellIndex::new(1, 1)));
    }

    #[test]
    fn trace_stops_at_first_match() {
        let l = unit_grid(1, 5, Neighborhood::Edge);
        l.occupy(CellIndex::new(0, 3), CellState::Fixed);
        let trace = l.line_cast_trace(CellIndex::new(0, 0), CellIndex::new(0, 4), |s| !s.is_free());
        assert_eq!(trace.len(), 4);
        assert_eq!(trace.last(), Some(&(CellState::Fixed, CellIndex::new(0, 3))));
    }
}

#[cfg(test)]
mod flood {
    use super::helpers::unit_grid;
    use crate::{CellIndex, CellState, LineCast, Neighborhood};

    #[test]
    fn three_by_three_end_to_end() {
        let mut l = unit_grid(3, 3, Neighborhood::Edge);
        let obstacle = CellIndex::new(1, 1);
        assert!(l.occupy(obstacle, CellState::Fixed));

        let sealed = l.flood(&[CellIndex::new(0, 0)]).unwrap();
        assert_eq!(sealed, 0);
        assert_eq!(l.state(CellIndex::new(2, 2)), Some(CellState::FREE));
        assert_eq!(l.state(obstacle), Some(CellState::Fixed));

        let origin = CellIndex::new(0, 0);
        assert!(matches!(
            l.line_cast(origin, CellIndex::new(2, 2), 10),
            LineCast::Blocked { cell, state: CellState::Fixed } if cell == obstacle
        ));
        assert_eq!(l.line_cast(origin, CellIndex::new(0, 2), 10), LineCast::Hit);
    }

    #[test]
    fn enclosed_room_is_sealed_and_flood_is_idempotent() {
        let mut l = unit_grid(5, 5, Neighborhood::Edge);
        let centre = CellIndex::new(2, 2);
        for c in l.neighbors(centre) {
            l.occupy(c, CellState::Fixed);
        }
        let seeds = [CellIndex::new(0, 0)];
        assert_eq!(l.flood(&seeds).unwrap(), 1);
        assert_eq!(l.state(centre), Some(CellState::Fixed));

        let before = l.to_string();
        assert_eq!(l.flood(&seeds).unwrap(), 0);
        assert_eq!(l.to_string(), before);
    }

    #[test]
    fn touching_neighbourhood_leaks_through_corners() {
        let mut l = unit_grid(3, 3, Neighborhood::Touching);
        l.occupy(CellIndex::new(0, 1), CellState::Fixed);
        l.occupy(CellIndex::new(1, 0), CellState::Fixed);
        l.occupy(CellIndex::new(1, 2), CellState::Fixed);
        l.occupy(CellIndex::new(2, 1), CellState::Fixed);
        let reached = l.flood_reachable(&[CellIndex::new(0, 0)]);
        assert!(reached.contains(&CellIndex::new(1, 1)));
        assert!(reached.contains(&CellIndex::new(2, 2)));
    }

    #[test]
    fn flood_keeps_dynamic_occupants() {
        let mut l = unit_grid(1, 3, Neighborhood::Edge);
        let pedestrian = CellIndex::new(0, 1);
        l.occupy(pedestrian, CellState::Dynamic);
        // The occupant splits the corridor: the far cell is unreachable.
        assert_eq!(l.flood(&[CellIndex::new(0, 0)]).unwrap(), 1);
        assert_eq!(l.state(pedestrian), Some(CellState::Dynamic));
        assert_eq!(l.state(CellIndex::new(0, 2)), Some(CellState::Fixed));
    }

    #[test]
    fn occupied_seeds_reach_nothing() {
        let l = unit_grid(2, 2, Neighborhood::Edge);
        let seed = CellIndex::new(0, 0);
        l.occupy(seed, CellState::Fixed);
        assert!(l.flood_reachable(&[seed, CellIndex::new(9, 9)]).is_empty());
    }

    #[test]
    fn distance_map_layers() {
        let mut l = unit_grid(1, 5, Neighborhood::Edge);
        let source = CellIndex::new(0, 0);
        l.occupy(source, CellState::Fixed);
        let deepest = l.compute_distance_map(&[source]).unwrap();
        assert_eq!(deepest, 4);
        assert_eq!(l.value(CellIndex::new(0, 1)), Some(1.0));
        assert_eq!(l.value(CellIndex::new(0, 4)), Some(4.0));
        assert_eq!(l.state(source), Some(CellState::Fixed));
    }
}

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use ped_core::{Bounds, LatticeId, Vec2};

    use crate::{CellIndex, Lattice, Neighborhood};

    fn grid() -> Lattice {
        Lattice::new(
            LatticeId(0),
            Bounds::new(Vec2::new(-3.0, 2.0), Vec2::new(7.0, 9.0)),
            0.25,
            Neighborhood::Edge,
        )
        .unwrap()
    }

    proptest! {
        #[test]
        fn index_centre_index_roundtrip(x in -3.0f64..7.0, y in 2.0f64..9.0) {
            let l = grid();
            let idx = l.cell_index_from_position(Vec2::new(x, y));
            prop_assert!(l.in_bounds(idx));
            prop_assert_eq!(l.cell_index_from_position(l.center_position(idx)), idx);
        }

        #[test]
        fn line_cast_reflexive(row in 0i32..28, column in 0i32..40, budget in 0usize..50) {
            let l = grid();
            let c = CellIndex::new(row, column);
            prop_assert!(l.line_cast(c, c, budget).is_hit());
        }

        #[test]
        fn open_grid_line_cast_symmetric(
            r1 in 0i32..28, c1 in 0i32..40,
            r2 in 0i32..28, c2 in 0i32..40,
        ) {
            let l = grid();
            let a = CellIndex::new(r1, c1);
            let b = CellIndex::new(r2, c2);
            prop_assert_eq!(l.is_reachable(a, b), l.is_reachable(b, a));
        }
    }
}
