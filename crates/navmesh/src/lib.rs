//! Pathfinding over triangle navigation meshes
//!
//! A [`NavMesh`] is built from a raw indexed triangle list. Every accepted
//! triangle becomes a [`Cell`] linked to the cells it shares edges with.
//! [`NavMeshQuery`] runs a reversed A* search over that cell graph, turns the
//! resulting corridor into waypoints that keep an entity's radius clear of the
//! corridor walls, and optionally straightens the result with visibility
//! tests.
//!
//! ```
//! use navmesh::{NavMesh, PathStatus};
//! use navmesh_common::{TriMesh, Vec3};
//!
//! let mesh = TriMesh::from_triangles(
//!     &[
//!         Vec3::new(0.0, 0.0, 0.0),
//!         Vec3::new(2.0, 0.0, 0.0),
//!         Vec3::new(2.0, 0.0, 1.0),
//!         Vec3::new(0.0, 0.0, 1.0),
//!     ],
//!     &[[0, 3, 1], [1, 3, 2]],
//! );
//! let nav_mesh = NavMesh::build(&mesh).unwrap();
//!
//! let path = navmesh::find_path(
//!     &nav_mesh,
//!     Vec3::new(0.2, 0.0, 0.2),
//!     Vec3::new(1.8, 0.0, 0.8),
//!     0.0,
//!     true,
//! );
//! assert_eq!(path.status(), PathStatus::Complete);
//! ```

mod cell;
mod config;
mod debug_info;
mod nav_mesh;
mod nav_mesh_query;
mod node_pool;
mod path;
mod status;

#[cfg(test)]
mod nav_mesh_tests;
#[cfg(test)]
mod property_tests;
#[cfg(test)]
pub(crate) mod test_mesh_helpers;

pub use cell::{Cell, PathClassification, SIDE_AB, SIDE_BC, SIDE_CA};
pub use config::{NavMeshConfig, QueryConfig, StraightPathOptions};
pub use debug_info::{DebugInfo, VisibilityTest};
pub use nav_mesh::{BuildReport, NavMesh, NavMeshTriangulation, RejectedTriangle, TriangleRejection};
pub use nav_mesh_query::{closest_point, find_path, CellCorridor, NavMeshQuery};
pub use node_pool::{CellNode, NodePool, NodeQueue};
pub use path::{NavMeshPath, Waypoint};
pub use status::{PathFailure, PathStatus};

/// Index of a cell inside its [`NavMesh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct CellId(u32);

impl CellId {
    /// Creates a new cell id
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Gets the raw id value
    pub fn id(&self) -> u32 {
        self.0
    }

    /// Position of the cell in the mesh's cell list
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for CellId {
    /// Builds the id of the cell at `index`
    ///
    /// Mesh building refuses more cells than `u32` can index, so every cell
    /// position converts without loss.
    fn from(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "cell index {} out of range", index);
        Self(index as u32)
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cell#{}", self.0)
    }
}
