//! Triangle cells of a navigation mesh
//!
//! A cell stores its vertices clockwise as seen from above (+Y). With that
//! winding, every point inside the cell lies on the right-hand side of each of
//! its three walls.

use crate::node_pool::SearchContext;
use crate::CellId;
use navmesh_common::{centroid, left, to_xz, Line2D, LineIntersect, Plane, PointSide, Vec2, Vec3};

/// Wall from vertex A to vertex B
pub const SIDE_AB: usize = 0;
/// Wall from vertex B to vertex C
pub const SIDE_BC: usize = 1;
/// Wall from vertex C to vertex A
pub const SIDE_CA: usize = 2;

/// Distance outside a wall up to which a point still counts as contained
const CONTAINS_EPSILON: f32 = 1e-5;

/// Minimal distance a point is pushed inside a wall
const WALL_INTERIOR_EPSILON: f32 = 0.001;

/// Fraction of the way from the center to a wall crossing used when pulling
/// an outside point into the cell
const CELL_COLUMN_PULL: f32 = 0.9;

/// Relationship between a 2D segment and a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathClassification {
    /// The segment leaves the cell through `side`, at `point`
    Exiting {
        /// Cell linked on the crossed wall, `None` for a solid wall
        neighbor: Option<CellId>,
        /// Index of the crossed wall
        side: usize,
        /// Where the segment crosses the wall
        point: Vec2,
    },
    /// The segment ends inside the cell
    Ending,
    /// The segment neither ends in nor leaves the cell
    NoRelationship,
}

/// A convex triangular cell with up to three linked neighbors
#[derive(Debug, Clone)]
pub struct Cell {
    vertices: [Vec3; 3],
    center: Vec3,
    plane: Plane,
    sides: [Line2D; 3],
    wall_midpoints: [Vec3; 3],
    /// Distances between wall midpoints: AB to BC, BC to CA and CA to AB
    wall_distances: [f32; 3],
    links: [Option<CellId>; 3],
}

impl Cell {
    /// Creates a cell from three vertices, reordering them clockwise if needed
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let (b, c) = if left(&a, &b, &c) { (c, b) } else { (b, c) };
        let vertices = [a, b, c];

        let sides = [
            Line2D::new(to_xz(a), to_xz(b)),
            Line2D::new(to_xz(b), to_xz(c)),
            Line2D::new(to_xz(c), to_xz(a)),
        ];

        let wall_midpoints = [(a + b) * 0.5, (b + c) * 0.5, (c + a) * 0.5];

        let wall_distances = [
            wall_midpoints[0].distance(wall_midpoints[1]),
            wall_midpoints[1].distance(wall_midpoints[2]),
            wall_midpoints[2].distance(wall_midpoints[0]),
        ];

        Self {
            vertices,
            center: centroid(&a, &b, &c),
            plane: Plane::from_points(a, b, c),
            sides,
            wall_midpoints,
            wall_distances,
            links: [None; 3],
        }
    }

    /// Gets the vertices in clockwise order
    pub fn vertices(&self) -> &[Vec3; 3] {
        &self.vertices
    }

    /// Gets vertex `i` (0, 1 or 2)
    pub fn vertex(&self, i: usize) -> Vec3 {
        self.vertices[i]
    }

    /// Centroid of the cell
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Supporting plane of the cell
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Unit normal of the cell's surface
    pub fn normal(&self) -> Vec3 {
        self.plane.normal()
    }

    /// Gets a wall as a 2D segment on the XZ plane
    pub fn wall(&self, side: usize) -> &Line2D {
        &self.sides[side]
    }

    /// Gets the 3D endpoints of a wall
    pub fn edge(&self, side: usize) -> (Vec3, Vec3) {
        (self.vertices[side], self.vertices[(side + 1) % 3])
    }

    /// Midpoint of a wall
    pub fn wall_midpoint(&self, side: usize) -> Vec3 {
        self.wall_midpoints[side]
    }

    /// Distances between wall midpoints, in the order AB-BC, BC-CA, CA-AB
    pub fn wall_distances(&self) -> &[f32; 3] {
        &self.wall_distances
    }

    /// Gets the cell linked on a wall
    pub fn link(&self, side: usize) -> Option<CellId> {
        self.links[side]
    }

    /// Gets all three links
    pub fn links(&self) -> &[Option<CellId>; 3] {
        &self.links
    }

    /// Finds the wall on which `other` is linked
    pub fn link_side(&self, other: CellId) -> Option<usize> {
        self.links.iter().position(|link| *link == Some(other))
    }

    pub(crate) fn set_link(&mut self, side: usize, link: Option<CellId>) {
        self.links[side] = link;
    }

    /// Checks if a 2D point lies within the cell's footprint
    ///
    /// Points on a wall, or within a fixed distance outside it, count as
    /// inside. The tolerance does not depend on the size of the cell.
    pub fn contains(&self, point: Vec2) -> bool {
        self.sides
            .iter()
            .all(|side| side.signed_distance(point) >= -CONTAINS_EPSILON)
    }

    /// Height of the cell's surface at the XZ position of `point`
    ///
    /// Falls back to the centroid height when the plane has no unique
    /// solution.
    pub fn height_at(&self, point: Vec2) -> f32 {
        self.plane
            .solve_for_height(point.x, point.y)
            .unwrap_or(self.center.y)
    }

    /// Replaces the Y of `point` with the cell's surface height
    pub fn project_on_surface(&self, point: Vec3) -> Vec3 {
        Vec3::new(point.x, self.height_at(to_xz(point)), point.z)
    }

    /// Classifies a segment against the cell's walls
    ///
    /// Walls are tested in order, the first one the segment leaves through
    /// wins.
    pub fn classify_path(&self, path: &Line2D) -> PathClassification {
        let mut interior_count = 0;

        for (i, side) in self.sides.iter().enumerate() {
            if side.side(path.point_b(), 0.0) != PointSide::Left {
                interior_count += 1;
                continue;
            }

            if side.side(path.point_a(), 0.0) == PointSide::Left {
                continue;
            }

            match path.intersect(side) {
                LineIntersect::SegmentsIntersect(point) | LineIntersect::ABisectsB(point) => {
                    return PathClassification::Exiting {
                        neighbor: self.links[i],
                        side: i,
                        point,
                    };
                }
                _ => {}
            }
        }

        if interior_count == 3 {
            PathClassification::Ending
        } else {
            PathClassification::NoRelationship
        }
    }

    /// Links `caller` on the wall matching `point_a`-`point_b`
    ///
    /// Vertices match when their squared distance is at most `epsilon`, in
    /// either order. A wall already linked to another cell is never
    /// overwritten.
    pub(crate) fn request_link(
        &mut self,
        point_a: Vec3,
        point_b: Vec3,
        caller: CellId,
        epsilon: f32,
    ) -> bool {
        let close = |u: Vec3, v: Vec3| u.distance_squared(v) <= epsilon;

        for side in [SIDE_AB, SIDE_BC, SIDE_CA] {
            let (v0, v1) = self.edge(side);
            let matches = (close(v0, point_a) && close(v1, point_b))
                || (close(v0, point_b) && close(v1, point_a));
            if !matches {
                continue;
            }

            return match self.links[side] {
                None => {
                    self.links[side] = Some(caller);
                    true
                }
                Some(existing) => existing == caller,
            };
        }

        false
    }

    /// Pushes a 2D point to the interior side of a wall
    ///
    /// Points closer than a small epsilon to the wall, or beyond it, are moved
    /// along the wall normal. Returns whether the point was moved.
    pub fn force_point_to_wall_interior(&self, side: usize, point: &mut Vec2) -> bool {
        let wall = &self.sides[side];
        let mut distance = wall.signed_distance(*point);

        if distance > WALL_INTERIOR_EPSILON {
            return false;
        }

        if distance <= 0.0 {
            distance -= WALL_INTERIOR_EPSILON;
        }
        let distance = distance.abs().max(WALL_INTERIOR_EPSILON);

        *point += wall.normal() * distance;
        true
    }

    /// Pulls a 2D point into the cell's footprint
    ///
    /// A point outside the cell is moved onto the segment from the center to
    /// where that segment leaves the cell, slightly inside the wall. Returns
    /// whether the point was moved.
    pub fn force_point_to_cell_column(&self, point: &mut Vec2) -> bool {
        let center = to_xz(self.center);
        let test_path = Line2D::new(center, *point);

        match self.classify_path(&test_path) {
            PathClassification::Exiting { point: hit, .. } => {
                *point = center + (hit - center) * CELL_COLUMN_PULL;
                true
            }
            PathClassification::NoRelationship => {
                *point = center;
                true
            }
            PathClassification::Ending => false,
        }
    }

    /// Turns a motion path colliding with a wall into motion along that wall
    ///
    /// `path` must start at the collision point on wall `side` and end
    /// outside the cell. On return it runs parallel to the wall, starts inside
    /// the cell and ends on the interior side of the wall.
    pub fn project_path_on_wall(&self, side: usize, path: &mut Line2D) {
        let wall_dir = self.sides[side].direction();
        let motion = path.point_b() - path.point_a();
        let along = wall_dir * motion.dot(wall_dir);
        path.set_point_b(path.point_a() + along);

        let mut start = path.point_a();
        self.force_point_to_cell_column(&mut start);
        path.set_point_a(start);

        let mut end = path.point_b();
        self.force_point_to_wall_interior(side, &mut end);
        path.set_point_b(end);
    }

    /// Cost of crossing this cell to leave through `exit_side`
    ///
    /// Cells entered through a wall pay the distance between the two wall
    /// midpoints. The search root pays the distance from `origin` to the exit
    /// wall's midpoint.
    pub fn wall_distance(&self, exit_side: usize, arrival_wall: Option<usize>, origin: Vec3) -> f32 {
        match arrival_wall {
            None => self.wall_midpoints[exit_side].distance(origin),
            Some(wall) if wall == exit_side => 0.0,
            Some(wall) => match (wall.min(exit_side), wall.max(exit_side)) {
                (0, 1) => self.wall_distances[0],
                (1, 2) => self.wall_distances[1],
                _ => self.wall_distances[2],
            },
        }
    }

    /// Expands this cell during a search
    ///
    /// Closes the cell and offers every linked neighbor the cost of reaching
    /// it through this cell. Returns `false` if the cell was not touched in
    /// the current session.
    pub(crate) fn process_cell(&self, id: CellId, cells: &[Cell], ctx: &mut SearchContext) -> bool {
        let Some(node) = ctx.pool.node_mut(id) else {
            return false;
        };
        node.open = false;
        let (arrival_cost, arrival_wall) = (node.arrival_cost, node.arrival_wall);

        for (side, link) in self.links.iter().enumerate() {
            let Some(next) = *link else {
                continue;
            };
            let Some(neighbor) = cells.get(next.index()) else {
                continue;
            };

            let cost = arrival_cost + self.wall_distance(side, arrival_wall, ctx.origin);
            neighbor.query_for_path(next, Some(id), cost, ctx);
        }

        true
    }

    /// Offers this cell to the search, reached from `caller` at `incoming_cost`
    ///
    /// A cell without a caller is the search root. Returns whether the cell
    /// was queued or its cost improved.
    pub(crate) fn query_for_path(
        &self,
        id: CellId,
        caller: Option<CellId>,
        incoming_cost: f32,
        ctx: &mut SearchContext,
    ) -> bool {
        if let Some(node) = ctx.pool.node_mut(id) {
            if !node.open || incoming_cost >= node.arrival_cost {
                return false;
            }

            node.arrival_cost = incoming_cost;
            node.arrival_wall = caller.and_then(|c| self.link_side(c));
            let total = node.total();
            ctx.queue.modify(id, total);
            return true;
        }

        let heuristic = match caller {
            Some(_) => self.center.distance(ctx.target),
            None => 0.0,
        };
        let arrival_wall = caller.and_then(|c| self.link_side(c));

        let Some(node) = ctx.pool.touch(id) else {
            return false;
        };
        node.open = caller.is_some();
        node.heuristic = heuristic;
        node.arrival_cost = if caller.is_some() { incoming_cost } else { 0.0 };
        node.arrival_wall = arrival_wall;

        let total = node.total();
        ctx.queue.push(id, total);
        true
    }
}
