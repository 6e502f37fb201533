//! Waypoint lists produced by path queries

use crate::status::{PathFailure, PathStatus};
use crate::CellId;
use glam::Vec3;

/// A point on a path and the cell it belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Waypoint {
    /// World position of the waypoint
    pub position: Vec3,
    /// Cell owning the waypoint
    pub cell: CellId,
}

impl Waypoint {
    /// Creates a new waypoint
    pub fn new(position: Vec3, cell: CellId) -> Self {
        Self { position, cell }
    }
}

/// An ordered list of waypoints with a cursor on the next one to steer to
///
/// The cursor starts on the first waypoint and only moves forward.
#[derive(Debug, Clone, Default)]
pub struct NavMeshPath {
    waypoints: Vec<Waypoint>,
    next: Option<usize>,
    status: PathStatus,
    failure: Option<PathFailure>,
}

impl NavMeshPath {
    /// Creates an empty, invalid path
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all waypoints and marks the path invalid
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.next = None;
        self.status = PathStatus::Invalid;
        self.failure = None;
    }

    pub(crate) fn start_path(&mut self, position: Vec3, cell: CellId) {
        self.waypoints.clear();
        self.waypoints.push(Waypoint::new(position, cell));
        self.next = None;
    }

    pub(crate) fn add_waypoint(&mut self, position: Vec3, cell: CellId) {
        self.waypoints.push(Waypoint::new(position, cell));
    }

    pub(crate) fn end_path(&mut self, position: Vec3, cell: CellId) {
        self.waypoints.push(Waypoint::new(position, cell));
        self.next = Some(0);
    }

    /// Swaps in a rebuilt waypoint list and rewinds the cursor
    pub(crate) fn replace_waypoints(&mut self, waypoints: Vec<Waypoint>) {
        self.waypoints = waypoints;
        self.next = if self.waypoints.is_empty() { None } else { Some(0) };
    }

    pub(crate) fn set_status(&mut self, status: PathStatus, failure: Option<PathFailure>) {
        self.status = status;
        self.failure = failure;
    }

    /// Gets the waypoints in travel order
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Number of waypoints
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Checks if the path has no waypoints
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Gets the start waypoint
    pub fn first(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }

    /// Gets the goal waypoint
    pub fn last(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    /// Gets the overall status of the path
    pub fn status(&self) -> PathStatus {
        self.status
    }

    /// Gets why the path is invalid, if known
    pub fn failure(&self) -> Option<PathFailure> {
        self.failure
    }

    /// Checks if the path reaches the goal
    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    /// Gets the waypoint the cursor points at
    pub fn next_waypoint(&self) -> Option<&Waypoint> {
        self.next.and_then(|i| self.waypoints.get(i))
    }

    /// Gets the cursor position
    pub fn next_index(&self) -> Option<usize> {
        self.next
    }

    /// Checks if the cursor is on the goal waypoint
    pub fn is_at_goal_waypoint(&self) -> bool {
        match self.next {
            Some(i) => i + 1 == self.waypoints.len(),
            None => false,
        }
    }

    /// Moves the cursor to the following waypoint
    ///
    /// # Panics
    ///
    /// Panics if the path is empty or the cursor is already on the goal.
    pub fn go_to_next_waypoint(&mut self) {
        let current = match self.next {
            Some(i) => i,
            None => panic!("go_to_next_waypoint called on an empty path"),
        };
        assert!(
            current + 1 < self.waypoints.len(),
            "go_to_next_waypoint called on the goal waypoint"
        );
        self.next = Some(current + 1);
    }

    /// Total length of the polyline through all waypoints
    pub fn length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].position.distance(pair[1].position))
            .sum()
    }
}
