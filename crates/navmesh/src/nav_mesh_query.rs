//! Navigation mesh query implementation
//!
//! This module contains the NavMeshQuery structure, which finds paths over a
//! [`NavMesh`]. A query runs in three steps:
//!
//! 1. A reversed A* search grows from the goal cell until it reaches the
//!    start cell. Every reached cell remembers the wall it was entered
//!    through, which points one step closer to the goal.
//! 2. The corridor is walked from the start cell and one waypoint is placed
//!    on every crossed wall, as close to the straight line towards the goal
//!    as the entity radius allows.
//! 3. Optionally, waypoints that can be skipped without the sight line
//!    leaving the mesh are removed.

use crate::cell::{Cell, PathClassification};
use crate::config::{QueryConfig, StraightPathOptions};
use crate::debug_info::{DebugInfo, VisibilityTest};
use crate::nav_mesh::NavMesh;
use crate::node_pool::{NodePool, NodeQueue, SearchContext};
use crate::path::NavMeshPath;
use crate::status::{PathFailure, PathStatus};
use crate::CellId;
use glam::Vec3;
use navmesh_common::{from_xz, to_xz, Line2D, LineIntersect, Result};

/// Largest fraction of a wall a waypoint may be offset from its reference
/// endpoint, keeping it strictly inside the wall
const MAX_WALL_BLEND: f32 = 0.95;

/// Chain of cells linking a start cell to a goal cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellCorridor {
    /// Cells from the start cell to the goal cell
    pub cells: Vec<CellId>,
    /// Wall through which each cell but the last is left
    pub walls: Vec<usize>,
    /// Search cost of the corridor
    pub cost: f32,
}

/// Finds paths over a navigation mesh
///
/// The query owns all search state, so any number of queries can share one
/// mesh.
#[derive(Debug)]
pub struct NavMeshQuery<'a> {
    nav_mesh: &'a NavMesh,
    config: QueryConfig,
    pool: NodePool,
    queue: NodeQueue,
}

impl<'a> NavMeshQuery<'a> {
    /// Creates a new query with the default configuration
    pub fn new(nav_mesh: &'a NavMesh) -> Self {
        Self {
            nav_mesh,
            config: QueryConfig::default(),
            pool: NodePool::new(nav_mesh.cell_count()),
            queue: NodeQueue::new(),
        }
    }

    /// Creates a new query with a custom configuration
    pub fn with_config(nav_mesh: &'a NavMesh, config: QueryConfig) -> Result<Self> {
        config.validate()?;

        let mut query = Self::new(nav_mesh);
        query.config = config;
        Ok(query)
    }

    /// Gets the navigation mesh this query runs on
    pub fn nav_mesh(&self) -> &'a NavMesh {
        self.nav_mesh
    }

    /// Gets the query configuration
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Gets the entity radius
    pub fn entity_radius(&self) -> f32 {
        self.config.entity_radius
    }

    /// Sets the entity radius
    pub fn set_entity_radius(&mut self, entity_radius: f32) {
        self.config.entity_radius = entity_radius;
    }

    /// Gets the path post-processing mode
    pub fn straight_path_options(&self) -> StraightPathOptions {
        self.config.straight_path
    }

    /// Sets the path post-processing mode
    pub fn set_straight_path_options(&mut self, options: StraightPathOptions) {
        self.config.straight_path = options;
    }

    /// Gets the maximum distance between query positions and the mesh
    pub fn max_search_distance(&self) -> f32 {
        self.config.max_search_distance
    }

    /// Sets the maximum distance between query positions and the mesh
    pub fn set_max_search_distance(&mut self, distance: f32) {
        self.config.max_search_distance = distance;
    }

    /// Computes a path from `start` to `goal` into `path`
    ///
    /// `path` is cleared first. On failure it stays empty, its status is
    /// [`PathStatus::Invalid`] and [`NavMeshPath::failure`] tells why.
    pub fn calculate_path(&mut self, start: Vec3, goal: Vec3, path: &mut NavMeshPath) -> PathStatus {
        self.build_navigation_path(start, goal, path, None)
    }

    /// Computes a path like [`calculate_path`](Self::calculate_path) and
    /// records a trace of the work done
    pub fn calculate_path_with_debug(
        &mut self,
        start: Vec3,
        goal: Vec3,
        path: &mut NavMeshPath,
        debug_info: &mut DebugInfo,
    ) -> PathStatus {
        debug_info.reset();
        self.build_navigation_path(start, goal, path, Some(debug_info))
    }

    /// Finds the cell chain between two positions without placing waypoints
    pub fn find_corridor(&mut self, start: Vec3, goal: Vec3) -> Option<CellCorridor> {
        let max_distance = self.config.max_search_distance;
        let start_cell = self.nav_mesh.find_closest_cell(start, max_distance)?;
        let end_cell = self.nav_mesh.find_closest_cell(goal, max_distance)?;
        let end_pos = self.nav_mesh.snap_point_to_cell(end_cell, goal);

        self.search(start_cell, start, end_cell, end_pos)?;
        self.corridor(start_cell, end_cell)
    }

    fn build_navigation_path(
        &mut self,
        start: Vec3,
        goal: Vec3,
        path: &mut NavMeshPath,
        mut debug_info: Option<&mut DebugInfo>,
    ) -> PathStatus {
        path.clear();

        let max_distance = self.config.max_search_distance;
        let Some(start_cell) = self.nav_mesh.find_closest_cell(start, max_distance) else {
            return Self::fail(path, PathFailure::UnresolvableStart);
        };
        let Some(end_cell) = self.nav_mesh.find_closest_cell(goal, max_distance) else {
            return Self::fail(path, PathFailure::UnresolvableGoal);
        };
        let end_pos = self.nav_mesh.snap_point_to_cell(end_cell, goal);

        if let Some(debug) = debug_info.as_deref_mut() {
            debug.start_pos = Some(start);
            debug.start_cell = Some(start_cell);
            debug.end_pos = Some(end_pos);
            debug.end_cell = Some(end_cell);
        }

        let Some(expanded) = self.search(start_cell, start, end_cell, end_pos) else {
            return Self::fail(path, PathFailure::NoPathExists);
        };
        if let Some(debug) = debug_info.as_deref_mut() {
            debug.expanded_cells = expanded;
        }

        let Some(corridor) = self.corridor(start_cell, end_cell) else {
            return Self::fail(path, PathFailure::NoPathExists);
        };

        self.compute_path(&corridor, start, end_pos, path, debug_info.as_deref_mut());

        if self.config.straight_path == StraightPathOptions::Straighten {
            self.straighten_path(path, debug_info);
        }

        path.set_status(PathStatus::Complete, None);
        PathStatus::Complete
    }

    fn fail(path: &mut NavMeshPath, failure: PathFailure) -> PathStatus {
        log::debug!("Path query failed: {}", failure);
        path.clear();
        path.set_status(PathStatus::Invalid, Some(failure));
        PathStatus::Invalid
    }

    /// Runs the reversed A* search from the goal cell towards the start cell
    ///
    /// Returns the number of expanded cells if the start cell was reached.
    fn search(&mut self, start_cell: CellId, start_pos: Vec3, end_cell: CellId, end_pos: Vec3) -> Option<usize> {
        let nav_mesh = self.nav_mesh;
        let cells = nav_mesh.cells();
        let root = cells.get(end_cell.index())?;

        self.pool.begin_session(cells.len());
        self.queue.clear();

        let mut ctx = SearchContext {
            pool: &mut self.pool,
            queue: &mut self.queue,
            target: start_pos,
            origin: end_pos,
        };
        root.query_for_path(end_cell, None, 0.0, &mut ctx);

        let mut expanded = 0;
        while let Some(id) = ctx.queue.pop() {
            if id == start_cell {
                log::debug!("Path search reached {} after expanding {} cells", start_cell, expanded);
                return Some(expanded);
            }

            if let Some(cell) = cells.get(id.index()) {
                if cell.process_cell(id, cells, &mut ctx) {
                    expanded += 1;
                }
            }
        }

        log::debug!(
            "Path search from {} to {} exhausted after expanding {} cells",
            end_cell,
            start_cell,
            expanded
        );
        None
    }

    /// Walks the arrival walls recorded by the last search from the start cell
    fn corridor(&self, start_cell: CellId, end_cell: CellId) -> Option<CellCorridor> {
        let cost = self.pool.node(start_cell)?.arrival_cost;
        let mut cells = vec![start_cell];
        let mut walls = Vec::new();

        let mut current = start_cell;
        while current != end_cell {
            if cells.len() > self.nav_mesh.cell_count() {
                return None;
            }

            let wall = self.pool.node(current)?.arrival_wall?;
            let next = self.nav_mesh.cell(current)?.link(wall)?;
            walls.push(wall);
            cells.push(next);
            current = next;
        }

        Some(CellCorridor { cells, walls, cost })
    }

    /// Places one waypoint on every wall crossed by the corridor
    fn compute_path(
        &self,
        corridor: &CellCorridor,
        start_pos: Vec3,
        end_pos: Vec3,
        path: &mut NavMeshPath,
        mut debug_info: Option<&mut DebugInfo>,
    ) {
        let (Some(&start_cell), Some(&end_cell)) = (corridor.cells.first(), corridor.cells.last()) else {
            return;
        };

        path.start_path(start_pos, start_cell);

        let mut last_waypoint = start_pos;
        for (&cell_id, &wall) in corridor.cells.iter().zip(&corridor.walls) {
            let Some(cell) = self.nav_mesh.cell(cell_id) else {
                continue;
            };

            let waypoint = self.wall_crossing(cell, wall, last_waypoint, end_pos);
            if let Some(debug) = debug_info.as_deref_mut() {
                debug.planned_cells.push(cell_id);
                debug.pre_straighten_waypoints.push(waypoint);
            }

            path.add_waypoint(waypoint, cell_id);
            last_waypoint = waypoint;
        }

        path.end_path(end_pos, end_cell);
    }

    /// Picks where to cross `wall` of `cell` when heading from `from` to `goal`
    fn wall_crossing(&self, cell: &Cell, wall: usize, from: Vec3, goal: Vec3) -> Vec3 {
        let radius = self.config.entity_radius;
        let segment = cell.wall(wall);
        let (a, b) = (segment.point_a(), segment.point_b());

        let length = segment.length();
        let blend = if length > 0.0 {
            (radius / length).clamp(0.0, MAX_WALL_BLEND)
        } else {
            0.0
        };

        let from_2d = to_xz(from);
        let goal_2d = to_xz(goal);
        let line_to_goal = Line2D::new(from_2d, goal_2d);

        let crossing = match line_to_goal.intersect(segment) {
            LineIntersect::SegmentsIntersect(point) => {
                let d1 = a.distance(point);
                let d2 = b.distance(point);
                if d1 > radius && d2 > radius {
                    point
                } else if d1 < d2 {
                    a.lerp(b, blend)
                } else {
                    b.lerp(a, blend)
                }
            }
            LineIntersect::LinesIntersect(_)
            | LineIntersect::ABisectsB(_)
            | LineIntersect::BBisectsA(_) => {
                let to_goal = (goal_2d - from_2d).normalize_or_zero();
                let to_a = (a - from_2d).normalize_or_zero();
                let to_b = (b - from_2d).normalize_or_zero();
                if to_a.dot(to_goal) < to_b.dot(to_goal) {
                    b.lerp(a, blend)
                } else {
                    a.lerp(b, blend)
                }
            }
            LineIntersect::CoLinear | LineIntersect::Parallel => return cell.wall_midpoint(wall),
        };

        from_xz(crossing, cell.height_at(crossing))
    }

    /// Removes waypoints that can be skipped without leaving the mesh
    ///
    /// The first and last waypoints are kept. Running it on an already
    /// straightened path changes nothing.
    pub fn straighten(&self, path: &mut NavMeshPath) {
        self.straighten_path(path, None);
    }

    fn straighten_path(&self, path: &mut NavMeshPath, mut debug_info: Option<&mut DebugInfo>) {
        if path.len() < 3 {
            return;
        }

        let last = path.len() - 1;
        let mut kept = vec![path.waypoints()[0]];
        let mut current = 0;

        while current < last {
            let next = self.farthest_visible(path, current, debug_info.as_deref_mut());
            kept.push(path.waypoints()[next]);
            current = next;
        }

        log::debug!("Straightened path from {} to {} waypoints", path.len(), kept.len());
        path.replace_waypoints(kept);
    }

    /// Finds the farthest waypoint after `from` that is visible from it
    ///
    /// The waypoint directly after `from` is assumed visible. An index that
    /// is not on the path, or is the goal, is returned unchanged.
    pub fn farthest_visible_waypoint(&self, path: &NavMeshPath, from: usize) -> usize {
        self.farthest_visible(path, from, None)
    }

    fn farthest_visible(&self, path: &NavMeshPath, from: usize, mut debug_info: Option<&mut DebugInfo>) -> usize {
        let waypoints = path.waypoints();
        if from + 1 >= waypoints.len() {
            return from;
        }

        let vantage = waypoints[from];
        for to in (from + 2..waypoints.len()).rev() {
            let mut test = debug_info.is_some().then(|| VisibilityTest {
                from,
                to,
                visible: false,
                passed_cells: Vec::new(),
                blocked_at: None,
            });

            let visible = self.line_of_sight(vantage.cell, vantage.position, waypoints[to].position, test.as_mut());

            if let (Some(debug), Some(mut test)) = (debug_info.as_deref_mut(), test) {
                test.visible = visible;
                debug.visibility_tests.push(test);
            }

            if visible {
                return to;
            }
        }

        from + 1
    }

    /// Checks if the straight line from `from` to `to` stays on the mesh
    ///
    /// The line is walked cell by cell starting in `start_cell`. It is
    /// blocked as soon as it leaves a cell through a wall without a link.
    pub fn is_in_line_of_sight(&self, start_cell: CellId, from: Vec3, to: Vec3) -> bool {
        self.line_of_sight(start_cell, from, to, None)
    }

    fn line_of_sight(&self, start_cell: CellId, from: Vec3, to: Vec3, mut trace: Option<&mut VisibilityTest>) -> bool {
        let motion = Line2D::new(to_xz(from), to_xz(to));
        let mut current = start_cell;

        // a sight line never enters the same cell twice
        for _ in 0..=self.nav_mesh.cell_count() {
            let Some(cell) = self.nav_mesh.cell(current) else {
                return false;
            };

            match cell.classify_path(&motion) {
                PathClassification::Ending => return true,
                PathClassification::Exiting {
                    neighbor: Some(next),
                    ..
                } => {
                    if let Some(trace) = trace.as_deref_mut() {
                        trace.passed_cells.push(current);
                    }
                    current = next;
                }
                PathClassification::Exiting { neighbor: None, .. } => {
                    if let Some(trace) = trace.as_deref_mut() {
                        trace.blocked_at = Some(current);
                    }
                    return false;
                }
                PathClassification::NoRelationship => return false,
            }
        }

        false
    }
}

/// Computes a path over `nav_mesh` in one call
///
/// `straighten` selects between [`StraightPathOptions::Straighten`] and
/// [`StraightPathOptions::AllCrossings`].
pub fn find_path(nav_mesh: &NavMesh, start: Vec3, goal: Vec3, entity_radius: f32, straighten: bool) -> NavMeshPath {
    let mut query = NavMeshQuery::new(nav_mesh);
    query.set_entity_radius(entity_radius);
    query.set_straight_path_options(if straighten {
        StraightPathOptions::Straighten
    } else {
        StraightPathOptions::AllCrossings
    });

    let mut path = NavMeshPath::new();
    query.calculate_path(start, goal, &mut path);
    path
}

/// Finds the on-mesh point nearest to `point` within `max_distance`
pub fn closest_point(nav_mesh: &NavMesh, point: Vec3, max_distance: f32) -> Option<Vec3> {
    nav_mesh.sample_position(point, max_distance)
}
