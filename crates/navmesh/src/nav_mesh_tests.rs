//! Build and cell lookup behavior over whole meshes

use crate::test_mesh_helpers::{build, grid_mesh, rectangle_mesh, ring_mesh, stacked_rectangle_mesh};
use crate::{find_path, CellId, NavMesh, NavMeshConfig, PathStatus, TriangleRejection};
use glam::Vec3;
use navmesh_common::TriMesh;

fn assert_links_symmetric(nav_mesh: &NavMesh) {
    for id in nav_mesh.cell_ids() {
        let cell = nav_mesh.cell(id).unwrap();
        for side in 0..3 {
            if let Some(other) = cell.link(side) {
                let back = nav_mesh.cell(other).unwrap();
                assert!(
                    back.link_side(id).is_some(),
                    "{} links {} on side {} but not the other way",
                    id,
                    other,
                    side
                );
            }
        }
    }
}

#[test]
fn test_grid_links_are_symmetric() {
    let nav_mesh = build(&grid_mesh(4, 3, 1.0, |_, _| false));
    assert_eq!(nav_mesh.cell_count(), 24);
    assert_links_symmetric(&nav_mesh);

    // 12 diagonals, 9 vertical and 8 horizontal quad walls
    assert_eq!(nav_mesh.link_count(), 2 * (12 + 9 + 8));
}

#[test]
fn test_linked_walls_share_vertices() {
    let nav_mesh = build(&ring_mesh());

    for id in nav_mesh.cell_ids() {
        let cell = nav_mesh.cell(id).unwrap();
        for side in 0..3 {
            let Some(other) = cell.link(side) else {
                continue;
            };
            let neighbor = nav_mesh.cell(other).unwrap();
            let back = neighbor.link_side(id).unwrap();

            let (a0, a1) = cell.edge(side);
            let (b0, b1) = neighbor.edge(back);
            assert!((a0 == b0 && a1 == b1) || (a0 == b1 && a1 == b0));
        }
    }
}

#[test]
fn test_link_epsilon_bridges_small_gaps() {
    let mesh = TriMesh::from_triangles(
        &[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.1),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.1, 0.0, 0.0),
        ],
        &[[0, 1, 2], [3, 4, 5]],
    );

    let strict = NavMesh::build(&mesh).unwrap();
    assert_eq!(strict.link_count(), 0);

    let loose = NavMesh::build_with_config(&mesh, NavMeshConfig { link_epsilon: 0.02 }).unwrap();
    assert_eq!(loose.link_count(), 2);
    assert_links_symmetric(&loose);
}

#[test]
fn test_non_manifold_edge_keeps_first_link() {
    // three triangles sharing the edge (0,0,0)-(1,0,0)
    let mesh = TriMesh::from_triangles(
        &[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 1.0),
            Vec3::new(0.5, 0.0, -1.0),
            Vec3::new(0.5, 0.5, 1.0),
        ],
        &[[0, 2, 1], [0, 1, 3], [0, 4, 1]],
    );
    let nav_mesh = build(&mesh);

    assert_eq!(nav_mesh.cell_count(), 3);
    assert_links_symmetric(&nav_mesh);
    assert_eq!(nav_mesh.link_count(), 2);
}

#[test]
fn test_stacked_floors_resolve_by_height() {
    let nav_mesh = build(&stacked_rectangle_mesh(&[0.0, 3.0, 6.0]));
    assert_eq!(nav_mesh.cell_count(), 6);

    let point = |y: f32| Vec3::new(0.3, y, 0.2);
    assert_eq!(nav_mesh.find_closest_cell(point(0.4), f32::MAX), Some(CellId::new(0)));
    assert_eq!(nav_mesh.find_closest_cell(point(2.0), f32::MAX), Some(CellId::new(2)));
    assert_eq!(nav_mesh.find_closest_cell(point(9.0), f32::MAX), Some(CellId::new(4)));

    // only the floor within reach counts
    assert_eq!(nav_mesh.find_closest_cell(point(5.5), 1.0), Some(CellId::new(4)));
    assert_eq!(nav_mesh.find_closest_cell(point(1.5), 1.0), None);
}

#[test]
fn test_sloped_mesh_heights() {
    let mesh = TriMesh::from_triangles(
        &[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 2.0, 0.0),
            Vec3::new(4.0, 2.0, 2.0),
            Vec3::new(0.0, 0.0, 2.0),
        ],
        &[[0, 3, 1], [1, 3, 2]],
    );
    let nav_mesh = build(&mesh);
    assert_eq!(nav_mesh.link_count(), 2);

    let snapped = nav_mesh.snap_point_to_mesh(Vec3::new(2.0, 10.0, 1.5)).unwrap();
    assert!((snapped - Vec3::new(2.0, 1.0, 1.5)).length() < 1e-5);

    let path = find_path(&nav_mesh, Vec3::new(0.2, 0.1, 0.2), Vec3::new(3.8, 1.9, 1.8), 0.0, false);
    assert_eq!(path.status(), PathStatus::Complete);
    for waypoint in path.waypoints() {
        let expected = waypoint.position.x * 0.5;
        assert!((waypoint.position.y - expected).abs() < 1e-4);
    }
}

#[test]
fn test_obj_source_builds_like_buffers() {
    let source = "\
# rectangle
v 0 0 0
v 2 0 0
v 2 0 1
v 0 0 1
f 1 4 2
f 2 4 3
";
    let from_obj = build(&TriMesh::from_obj_str(source).unwrap());
    let from_buffers = build(&rectangle_mesh());

    assert_eq!(from_obj.cell_count(), from_buffers.cell_count());
    assert_eq!(from_obj.link_count(), from_buffers.link_count());
    assert_eq!(from_obj.triangulation(), from_buffers.triangulation());
}

#[test]
fn test_mixed_mesh_report() {
    let mesh = TriMesh::from_triangles(
        &[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        // walkable, upside down, vertical wall, walkable
        &[[0, 1, 2], [0, 2, 1], [0, 2, 4], [2, 1, 3]],
    );
    let (nav_mesh, report) = NavMesh::build_with_report(&mesh, NavMeshConfig::default()).unwrap();

    assert_eq!(report.accepted, 2);
    assert_eq!(report.links, 2);
    let reasons: Vec<_> = report.rejected.iter().map(|r| (r.triangle, r.reason)).collect();
    assert_eq!(
        reasons,
        vec![
            (1, TriangleRejection::BackFacingTriangle),
            (2, TriangleRejection::BackFacingTriangle),
        ]
    );

    // cells keep the order of the accepted triangles
    assert!(nav_mesh.cell(CellId::new(1)).unwrap().contains(glam::Vec2::new(0.8, 0.8)));
}
