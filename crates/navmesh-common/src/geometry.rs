//! XZ-plane helpers
//!
//! Navigation cells are classified in 2D by dropping the Y (up) axis. These
//! helpers convert between the two spaces and provide the orientation tests
//! used to enforce winding.

use glam::{Vec2, Vec3};

/// Projects a 3D position onto the XZ plane.
#[inline]
pub fn to_xz(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Lifts a point on the XZ plane back to 3D at the given height.
#[inline]
pub fn from_xz(p: Vec2, y: f32) -> Vec3 {
    Vec3::new(p.x, y, p.y)
}

/// Calculate twice the signed area of a 2D triangle on the XZ plane.
///
/// The sign indicates the winding order:
/// - Positive: clockwise (when looking down the Y axis)
/// - Negative: counter-clockwise
/// - Zero: degenerate (collinear points)
#[inline]
pub fn tri_area_2d(a: &Vec3, b: &Vec3, c: &Vec3) -> f32 {
    let abx = b.x - a.x;
    let abz = b.z - a.z;
    let acx = c.x - a.x;
    let acz = c.z - a.z;
    acx * abz - abx * acz
}

/// Check if point c is left of the line from a to b (on XZ plane).
#[inline]
pub fn left(a: &Vec3, b: &Vec3, c: &Vec3) -> bool {
    tri_area_2d(a, b, c) < 0.0
}

/// Check if point c is right of or on the line from a to b (on XZ plane).
#[inline]
pub fn right_on(a: &Vec3, b: &Vec3, c: &Vec3) -> bool {
    tri_area_2d(a, b, c) >= 0.0
}

/// Unnormalized face normal of a triangle, `(b - a) x (c - a)`.
#[inline]
pub fn triangle_normal(a: &Vec3, b: &Vec3, c: &Vec3) -> Vec3 {
    (*b - *a).cross(*c - *a)
}

/// Calculates the area of a triangle in 3D.
#[inline]
pub fn triangle_area(a: &Vec3, b: &Vec3, c: &Vec3) -> f32 {
    triangle_normal(a, b, c).length() * 0.5
}

/// Calculate distance between two Vec3 points on the XZ plane.
#[inline]
pub fn dist_2d(a: &Vec3, b: &Vec3) -> f32 {
    to_xz(*a).distance(to_xz(*b))
}

/// Calculates the centroid of a triangle.
#[inline]
pub fn centroid(a: &Vec3, b: &Vec3, c: &Vec3) -> Vec3 {
    (*a + *b + *c) / 3.0
}
