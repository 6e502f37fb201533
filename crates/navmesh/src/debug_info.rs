//! Trace of a single path query

use crate::CellId;
use glam::Vec3;

/// Outcome of one line-of-sight test made while straightening
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityTest {
    /// Index of the vantage waypoint
    pub from: usize,
    /// Index of the tested waypoint
    pub to: usize,
    /// Whether the tested waypoint was visible
    pub visible: bool,
    /// Cells the sight line crossed
    pub passed_cells: Vec<CellId>,
    /// Cell whose solid wall blocked the sight line
    pub blocked_at: Option<CellId>,
}

/// Records what a query did, for inspection by tools and tests
#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    /// Start position used by the search
    pub start_pos: Option<Vec3>,
    /// Goal position after snapping
    pub end_pos: Option<Vec3>,
    /// Cell resolved for the start position
    pub start_cell: Option<CellId>,
    /// Cell resolved for the goal position
    pub end_cell: Option<CellId>,
    /// Number of cells expanded by the search
    pub expanded_cells: usize,
    /// Cells walked while placing waypoints, start cell first
    pub planned_cells: Vec<CellId>,
    /// Wall crossing positions before straightening
    pub pre_straighten_waypoints: Vec<Vec3>,
    /// Line-of-sight tests made while straightening
    pub visibility_tests: Vec<VisibilityTest>,
}

impl DebugInfo {
    /// Creates an empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the trace
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of failed line-of-sight tests
    pub fn failed_visibility_tests(&self) -> usize {
        self.visibility_tests.iter().filter(|t| !t.visible).count()
    }
}
