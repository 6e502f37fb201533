//! Randomized checks over grids with holes

use crate::test_mesh_helpers::{build, corridor_cost, grid_mesh, longest_wall, reference_route_cost};
use crate::{NavMesh, NavMeshPath, NavMeshQuery, PathStatus};
use glam::{Vec2, Vec3};
use navmesh_common::to_xz;
use proptest::prelude::*;
use proptest::sample::Index;

const MAX_GRID: usize = 6;

fn holed_grid() -> impl Strategy<Value = NavMesh> {
    (
        1..=MAX_GRID,
        1..=MAX_GRID,
        0.5f32..3.0,
        prop::collection::vec(prop::bool::weighted(0.25), MAX_GRID * MAX_GRID),
    )
        .prop_map(|(cols, rows, size, holes)| {
            build(&grid_mesh(cols, rows, size, |i, j| holes[j * MAX_GRID + i]))
        })
}

fn same_edge(a: (Vec3, Vec3), b: (Vec3, Vec3)) -> bool {
    (a.0 == b.0 && a.1 == b.1) || (a.0 == b.1 && a.1 == b.0)
}

proptest! {
    #[test]
    fn test_shared_edges_are_linked_both_ways(nav_mesh in holed_grid()) {
        let cells = nav_mesh.cells();

        for (i, cell) in cells.iter().enumerate() {
            for side in 0..3 {
                let sharing: Vec<usize> = cells
                    .iter()
                    .enumerate()
                    .filter(|(j, other)| {
                        *j != i && (0..3).any(|s| same_edge(cell.edge(side), other.edge(s)))
                    })
                    .map(|(j, _)| j)
                    .collect();

                match cell.link(side) {
                    Some(other) => {
                        prop_assert_eq!(sharing, vec![other.index()]);
                        prop_assert!(cells[other.index()].link_side(i.into()).is_some());
                    }
                    None => prop_assert!(sharing.is_empty()),
                }
            }
        }
    }

    #[test]
    fn test_cells_contain_their_center(nav_mesh in holed_grid()) {
        for cell in nav_mesh.cells() {
            let center = to_xz(cell.center());
            prop_assert!(cell.contains(center));
            prop_assert!(!cell.contains(center + Vec2::new(1000.0, 0.0)));
            prop_assert!((cell.height_at(center) - cell.center().y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_complete_paths_start_at_the_start(
        nav_mesh in holed_grid(),
        from in any::<Index>(),
        to in any::<Index>(),
        radius in 0.0f32..1.0,
    ) {
        prop_assume!(nav_mesh.cell_count() > 0);
        let start = nav_mesh.cells()[from.index(nav_mesh.cell_count())].center();
        let goal = nav_mesh.cells()[to.index(nav_mesh.cell_count())].center();

        let mut query = NavMeshQuery::new(&nav_mesh);
        query.set_entity_radius(radius);
        let mut path = NavMeshPath::new();

        if query.calculate_path(start, goal, &mut path) == PathStatus::Complete {
            prop_assert!(path.len() >= 2);
            prop_assert_eq!(path.first().map(|w| w.position), Some(start));
            prop_assert!((path.last().unwrap().position - goal).length() < 1e-4);
        } else {
            prop_assert!(path.is_empty());
            prop_assert!(path.failure().is_some());
        }
    }

    #[test]
    fn test_straightening_is_idempotent(
        nav_mesh in holed_grid(),
        from in any::<Index>(),
        to in any::<Index>(),
    ) {
        prop_assume!(nav_mesh.cell_count() > 0);
        let start = nav_mesh.cells()[from.index(nav_mesh.cell_count())].center();
        let goal = nav_mesh.cells()[to.index(nav_mesh.cell_count())].center();

        let mut query = NavMeshQuery::new(&nav_mesh);
        query.set_entity_radius(0.1);
        let mut path = NavMeshPath::new();
        prop_assume!(query.calculate_path(start, goal, &mut path) == PathStatus::Complete);

        let once = path.waypoints().to_vec();
        query.straighten(&mut path);
        prop_assert_eq!(path.waypoints(), once.as_slice());
    }

    #[test]
    fn test_search_cost_is_close_to_cheapest_route(
        nav_mesh in holed_grid(),
        from in any::<Index>(),
        to in any::<Index>(),
    ) {
        prop_assume!(nav_mesh.cell_count() > 0);
        let start = nav_mesh.cells()[from.index(nav_mesh.cell_count())].center();
        let goal = nav_mesh.cells()[to.index(nav_mesh.cell_count())].center();
        let start_cell = nav_mesh.find_closest_cell(start, f32::MAX).unwrap();
        let goal_cell = nav_mesh.find_closest_cell(goal, f32::MAX).unwrap();

        let cheapest = reference_route_cost(&nav_mesh, start_cell, goal_cell, goal);
        let corridor = NavMeshQuery::new(&nav_mesh).find_corridor(start, goal);
        prop_assert_eq!(corridor.is_some(), cheapest.is_some());

        if let (Some(corridor), Some(cheapest)) = (corridor, cheapest) {
            let tolerance = 1e-4 * (1.0 + cheapest);
            prop_assert!((corridor_cost(&nav_mesh, &corridor, goal) - corridor.cost).abs() < tolerance);
            // the search never undercuts the cheapest route and overshoots by less than one wall
            prop_assert!(corridor.cost >= cheapest - tolerance);
            prop_assert!(corridor.cost <= cheapest + longest_wall(&nav_mesh));
        }
    }
}
