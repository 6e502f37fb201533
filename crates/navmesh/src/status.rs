//! Outcome of path queries

/// Overall state of a [`NavMeshPath`](crate::NavMeshPath)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum PathStatus {
    /// The path reaches the goal
    Complete,
    /// No path is available; the waypoint list is empty
    #[default]
    Invalid,
}

impl PathStatus {
    /// Checks if the status is a success
    pub fn is_complete(&self) -> bool {
        *self == PathStatus::Complete
    }
}

impl std::fmt::Display for PathStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathStatus::Complete => write!(f, "Complete"),
            PathStatus::Invalid => write!(f, "Invalid"),
        }
    }
}

/// Reason a path query produced an invalid path
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum PathFailure {
    /// The start position is not within reach of any cell
    #[error("Start position is off the mesh")]
    UnresolvableStart,
    /// The goal position is not within reach of any cell
    #[error("Goal position is off the mesh")]
    UnresolvableGoal,
    /// The search ran out of cells before reaching the start
    #[error("No path exists")]
    NoPathExists,
}
