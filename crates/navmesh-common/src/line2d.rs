//! 2D line segments on the XZ plane
//!
//! A [`Line2D`] is a segment from `point_a` to `point_b`. It doubles as a
//! vertical plane through the segment: points are classified against it as
//! left, right or on the line when standing on `point_a` looking at `point_b`.

use glam::Vec2;

/// Where a point lies relative to a line, looking from A towards B
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSide {
    /// The point is on, or within epsilon of, the line
    OnLine,
    /// The point is on the left-hand side
    Left,
    /// The point is on the right-hand side
    Right,
}

/// Classification of the intersection between two lines
///
/// `self` is line A and the argument of [`Line2D::intersect`] is line B.
/// Variants that have a well-defined crossing carry the crossing point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineIntersect {
    /// Both lines are parallel and overlap each other
    CoLinear,
    /// The lines are parallel and distinct
    Parallel,
    /// Both segments cross each other
    SegmentsIntersect(Vec2),
    /// Segment B is crossed by the infinite line A
    ABisectsB(Vec2),
    /// Segment A is crossed by the infinite line B
    BBisectsA(Vec2),
    /// The infinite lines cross, but neither segment contains the crossing
    LinesIntersect(Vec2),
}

impl LineIntersect {
    /// Returns the crossing point, if the lines are not parallel
    pub fn point(&self) -> Option<Vec2> {
        match *self {
            LineIntersect::CoLinear | LineIntersect::Parallel => None,
            LineIntersect::SegmentsIntersect(p)
            | LineIntersect::ABisectsB(p)
            | LineIntersect::BBisectsA(p)
            | LineIntersect::LinesIntersect(p) => Some(p),
        }
    }
}

/// A line segment on the XZ plane
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Line2D {
    point_a: Vec2,
    point_b: Vec2,
}

impl Line2D {
    /// Creates a new line from A to B
    pub fn new(point_a: Vec2, point_b: Vec2) -> Self {
        Self { point_a, point_b }
    }

    /// Start point of the segment
    #[inline]
    pub fn point_a(&self) -> Vec2 {
        self.point_a
    }

    /// End point of the segment
    #[inline]
    pub fn point_b(&self) -> Vec2 {
        self.point_b
    }

    /// Moves the start point
    pub fn set_point_a(&mut self, point: Vec2) {
        self.point_a = point;
    }

    /// Moves the end point
    pub fn set_point_b(&mut self, point: Vec2) {
        self.point_b = point;
    }

    /// Length of the segment
    pub fn length(&self) -> f32 {
        self.point_a.distance(self.point_b)
    }

    /// Normalized direction from A to B
    ///
    /// Zero for a degenerate segment.
    pub fn direction(&self) -> Vec2 {
        (self.point_b - self.point_a).normalize_or_zero()
    }

    /// Unit normal pointing to the right-hand side of the line
    pub fn normal(&self) -> Vec2 {
        // rotate the direction by -90 degrees
        let d = self.direction();
        Vec2::new(d.y, -d.x)
    }

    /// Signed distance from a point to the infinite line
    ///
    /// Positive distances are on the right-hand side, negative on the left.
    pub fn signed_distance(&self, point: Vec2) -> f32 {
        (point - self.point_a).dot(self.normal())
    }

    /// Classifies a point against the line using the sign of `(B - A) x (P - A)`
    ///
    /// Cross products whose magnitude does not exceed `epsilon` are treated as
    /// on the line.
    pub fn side(&self, point: Vec2, epsilon: f32) -> PointSide {
        let ab = self.point_b - self.point_a;
        let ap = point - self.point_a;
        let cross = ab.perp_dot(ap);

        if cross > epsilon {
            PointSide::Left
        } else if cross < -epsilon {
            PointSide::Right
        } else {
            PointSide::OnLine
        }
    }

    /// Determines the type of intersection between this line and `other`
    ///
    /// Solves the parametric system `A0 + u0 (A1 - A0) = B0 + u1 (B1 - B0)`.
    /// A zero denominator means the lines are parallel (or colinear when both
    /// numerators vanish as well). Otherwise the crossing point is classified
    /// by which of `u0` and `u1` fall inside `[0, 1]`.
    pub fn intersect(&self, other: &Line2D) -> LineIntersect {
        let da = self.point_b - self.point_a;
        let db = other.point_b - other.point_a;

        let denom = db.y * da.x - db.x * da.y;
        let num0 = db.x * (self.point_a.y - other.point_a.y)
            - db.y * (self.point_a.x - other.point_a.x);
        let num1 = (other.point_a.x - self.point_a.x) * da.y
            - (other.point_a.y - self.point_a.y) * da.x;

        if denom == 0.0 {
            if num0 == 0.0 && num1 == 0.0 {
                return LineIntersect::CoLinear;
            }
            return LineIntersect::Parallel;
        }

        let u0 = num0 / denom;
        let u1 = num1 / denom;
        let point = self.point_a + da * u0;

        let on_a = (0.0..=1.0).contains(&u0);
        let on_b = (0.0..=1.0).contains(&u1);

        match (on_a, on_b) {
            (true, true) => LineIntersect::SegmentsIntersect(point),
            (_, true) => LineIntersect::ABisectsB(point),
            (true, false) => LineIntersect::BBisectsA(point),
            (false, false) => LineIntersect::LinesIntersect(point),
        }
    }
}
