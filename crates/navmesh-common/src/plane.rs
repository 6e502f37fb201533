//! Supporting plane of a triangle

use glam::Vec3;

/// A plane `normal . p = constant`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Plane {
    normal: Vec3,
    constant: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vec3::Y,
            constant: 0.0,
        }
    }
}

impl Plane {
    /// Creates a plane from a normal and a constant
    pub fn new(normal: Vec3, constant: f32) -> Self {
        Self { normal, constant }
    }

    /// Fits a plane through three points
    ///
    /// The normal is `(b - a) x (c - a)`, normalized. Colinear points leave a
    /// zero normal.
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self {
            normal,
            constant: normal.dot(a),
        }
    }

    /// Unit normal of the plane
    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Plane constant
    #[inline]
    pub fn constant(&self) -> f32 {
        self.constant
    }

    /// Signed distance from a point to the plane
    #[inline]
    pub fn pseudo_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.constant
    }

    /// Solves the plane equation for Y given X and Z
    ///
    /// Returns `None` for vertical planes, which have no unique height.
    pub fn solve_for_height(&self, x: f32, z: f32) -> Option<f32> {
        if self.normal.y.abs() <= f32::EPSILON {
            return None;
        }
        Some((self.constant - self.normal.x * x - self.normal.z * z) / self.normal.y)
    }
}
