//! Canonical meshes shared by the test modules

use crate::{CellCorridor, CellId, NavMesh};
use navmesh_common::{TriMesh, Vec3};

/// A 2x1 rectangle on the XZ plane split along the diagonal (0,1)-(2,0)
pub fn rectangle_mesh() -> TriMesh {
    stacked_rectangle_mesh(&[0.0])
}

/// Copies of the 2x1 rectangle at each of the given heights, unconnected
pub fn stacked_rectangle_mesh(heights: &[f32]) -> TriMesh {
    let mut positions = Vec::new();
    let mut triangles = Vec::new();

    for &y in heights {
        let base = positions.len() as u32;
        positions.extend_from_slice(&[
            Vec3::new(0.0, y, 0.0),
            Vec3::new(2.0, y, 0.0),
            Vec3::new(2.0, y, 1.0),
            Vec3::new(0.0, y, 1.0),
        ]);
        triangles.push([base, base + 3, base + 1]);
        triangles.push([base + 1, base + 3, base + 2]);
    }

    TriMesh::from_triangles(&positions, &triangles)
}

/// Two triangles without a shared edge
pub fn disconnected_pair_mesh() -> TriMesh {
    TriMesh::from_triangles(
        &[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 1.0),
            Vec3::new(6.0, 0.0, 0.0),
        ],
        &[[0, 1, 2], [3, 4, 5]],
    )
}

/// A grid of `cols` x `rows` square quads of side `size`, two triangles each
///
/// Quads for which `is_hole(col, row)` returns true are left out. Each quad is
/// split along its (col, row + 1) - (col + 1, row) diagonal; the first
/// triangle holds the (col, row) corner.
pub fn grid_mesh(cols: usize, rows: usize, size: f32, is_hole: impl Fn(usize, usize) -> bool) -> TriMesh {
    let mut positions = Vec::with_capacity((cols + 1) * (rows + 1));
    for j in 0..=rows {
        for i in 0..=cols {
            positions.push(Vec3::new(i as f32 * size, 0.0, j as f32 * size));
        }
    }

    let vertex = |i: usize, j: usize| (j * (cols + 1) + i) as u32;
    let mut triangles = Vec::new();
    for j in 0..rows {
        for i in 0..cols {
            if is_hole(i, j) {
                continue;
            }
            let v00 = vertex(i, j);
            let v10 = vertex(i + 1, j);
            let v01 = vertex(i, j + 1);
            let v11 = vertex(i + 1, j + 1);
            triangles.push([v00, v01, v10]);
            triangles.push([v10, v01, v11]);
        }
    }

    TriMesh::from_triangles(&positions, &triangles)
}

/// A 5x5 square ring of unit quads around a 3x3 hole
///
/// The cell graph is a single loop, so any two cells are joined by exactly
/// two routes.
pub fn ring_mesh() -> TriMesh {
    grid_mesh(5, 5, 1.0, |i, j| (1..4).contains(&i) && (1..4).contains(&j))
}

/// Cheapest route cost from cell `start` to cell `goal`, priced like the query
///
/// A forward Dijkstra over (cell, entry wall) states. Crossing a cell costs
/// the distance between its entry and exit wall midpoints, the start cell is
/// free and the goal cell costs the distance from its entry wall midpoint to
/// `goal_pos`.
pub fn reference_route_cost(nav_mesh: &NavMesh, start: CellId, goal: CellId, goal_pos: Vec3) -> Option<f32> {
    const ROOT: usize = 3;
    let state = |cell: CellId, entry: Option<usize>| cell.index() * 4 + entry.unwrap_or(ROOT);

    let count = nav_mesh.cell_count() * 4;
    let mut cost = vec![f32::INFINITY; count];
    let mut done = vec![false; count];
    cost[state(start, None)] = 0.0;
    let mut best = f32::INFINITY;

    while let Some(current) = (0..count)
        .filter(|&i| !done[i] && cost[i].is_finite())
        .min_by(|&a, &b| cost[a].total_cmp(&cost[b]))
    {
        if cost[current] >= best {
            break;
        }
        done[current] = true;

        let id = CellId::from(current / 4);
        let entry = match current % 4 {
            ROOT => None,
            side => Some(side),
        };
        let cell = nav_mesh.cell(id)?;

        if id == goal {
            let exit = entry.map_or(0.0, |wall| cell.wall_midpoint(wall).distance(goal_pos));
            best = best.min(cost[current] + exit);
        }

        for side in 0..3 {
            let Some(next) = cell.link(side) else {
                continue;
            };
            let step = match entry {
                Some(wall) => cell.wall_distance(side, Some(wall), goal_pos),
                None => 0.0,
            };
            let target = state(next, nav_mesh.cell(next)?.link_side(id));
            if cost[current] + step < cost[target] {
                cost[target] = cost[current] + step;
            }
        }
    }

    best.is_finite().then_some(best)
}

/// Recomputes the search cost of a corridor from its cells and walls
pub fn corridor_cost(nav_mesh: &NavMesh, corridor: &CellCorridor, goal_pos: Vec3) -> f32 {
    let cells = &corridor.cells;
    let mut total = 0.0;

    for k in 1..cells.len() {
        let Some(cell) = nav_mesh.cell(cells[k]) else {
            continue;
        };
        let Some(exit) = cell.link_side(cells[k - 1]) else {
            continue;
        };
        let entry = corridor.walls.get(k).copied();
        total += cell.wall_distance(exit, entry, goal_pos);
    }

    total
}

/// Longest wall of any cell, measured on the XZ plane
pub fn longest_wall(nav_mesh: &NavMesh) -> f32 {
    nav_mesh
        .cells()
        .iter()
        .flat_map(|cell| (0..3).map(move |side| cell.wall(side).length()))
        .fold(0.0, f32::max)
}

/// Builds a navmesh, panicking on failure
pub fn build(mesh: &TriMesh) -> NavMesh {
    NavMesh::build(mesh).expect("test mesh should build")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meshes_build_without_rejections() {
        for mesh in [
            rectangle_mesh(),
            stacked_rectangle_mesh(&[0.0, 3.0]),
            disconnected_pair_mesh(),
            grid_mesh(3, 2, 0.5, |_, _| false),
            ring_mesh(),
        ] {
            let (_, report) = NavMesh::build_with_report(&mesh, Default::default()).unwrap();
            assert!(report.rejected.is_empty());
            assert_eq!(report.accepted, mesh.tri_count());
        }
    }

    #[test]
    fn test_ring_is_a_loop() {
        let nav_mesh = build(&ring_mesh());
        assert_eq!(nav_mesh.cell_count(), 32);

        // 16 diagonals plus 16 quad-to-quad walls, each linked both ways
        assert_eq!(nav_mesh.link_count(), 64);
    }
}
