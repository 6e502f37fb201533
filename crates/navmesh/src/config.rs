//! Configuration for navmesh building and path queries

use navmesh_common::{Error, Result};

/// How the waypoints of a computed path are post-processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StraightPathOptions {
    /// Removes every waypoint that can be skipped without leaving the mesh
    #[default]
    Straighten,
    /// Keeps one waypoint for each wall crossed by the corridor
    AllCrossings,
}

/// Parameters used while building a [`NavMesh`](crate::NavMesh)
#[derive(Debug, Clone)]
pub struct NavMeshConfig {
    /// Maximum squared distance between two vertices for them to be
    /// considered the same when linking cells
    pub link_epsilon: f32,
}

impl Default for NavMeshConfig {
    fn default() -> Self {
        Self {
            link_epsilon: 0.001,
        }
    }
}

impl NavMeshConfig {
    /// Creates a new NavMeshConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.link_epsilon.is_finite() || self.link_epsilon < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "link epsilon must be a finite, non-negative value (got {})",
                self.link_epsilon
            )));
        }

        Ok(())
    }
}

/// Parameters used by [`NavMeshQuery`](crate::NavMeshQuery)
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Clearance kept between waypoints and the ends of crossed walls
    pub entity_radius: f32,
    /// Post-processing applied to computed paths
    pub straight_path: StraightPathOptions,
    /// Maximum distance between a start or goal position and the mesh
    pub max_search_distance: f32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            entity_radius: 1.0,
            straight_path: StraightPathOptions::Straighten,
            max_search_distance: f32::MAX,
        }
    }
}

impl QueryConfig {
    /// Creates a new QueryConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.entity_radius.is_finite() || self.entity_radius < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "entity radius must be a finite, non-negative value (got {})",
                self.entity_radius
            )));
        }

        if self.max_search_distance.is_nan() || self.max_search_distance <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max search distance must be positive (got {})",
                self.max_search_distance
            )));
        }

        Ok(())
    }
}
