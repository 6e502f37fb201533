//! Common geometry and mesh input shared by the navmesh crates
//!
//! Everything here works in a Y-up coordinate system. 2D operations run on the
//! XZ plane, where a 3D position `(x, y, z)` maps to the 2D point `(x, z)`.

mod geometry;
mod line2d;
mod mesh;
mod plane;

pub use geometry::*;
pub use line2d::{Line2D, LineIntersect, PointSide};
pub use mesh::TriMesh;
pub use plane::Plane;

/// Represents a 3D position
pub type Vec3 = glam::Vec3;

/// Represents a position on the XZ plane
pub type Vec2 = glam::Vec2;

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input mesh: {0}")]
    InvalidMesh(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for navmesh operations
pub type Result<T> = std::result::Result<T, Error>;
