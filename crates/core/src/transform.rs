//! Rigid pivot transforms and 3D bounding boxes.

use nalgebra::{Isometry3, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rotation about a fixed pivot point.
///
/// Every point maps as `p' = P + R·(p − P)`, so the pivot is a fixed point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoseTransform {
    pivot: Point3<f64>,
    rotation: Rotation3<f64>,
}

impl PoseTransform {
    /// Creates a transform rotating by `rotation` about `pivot`.
    pub fn new(pivot: Point3<f64>, rotation: Rotation3<f64>) -> Self {
        Self { pivot, rotation }
    }

    /// Identity transform anchored at `pivot`.
    pub fn identity_at(pivot: Point3<f64>) -> Self {
        Self::new(pivot, Rotation3::identity())
    }

    /// Returns the pivot point.
    pub fn pivot(&self) -> &Point3<f64> {
        &self.pivot
    }

    /// Returns the combined rotation.
    pub fn rotation(&self) -> &Rotation3<f64> {
        &self.rotation
    }

    /// Translation part of the equivalent isometry, `P − R·P`.
    pub fn translation(&self) -> Vector3<f64> {
        self.pivot.coords - self.rotation * self.pivot.coords
    }

    /// Converts to a nalgebra Isometry3.
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::from(self.translation()),
            UnitQuaternion::from_rotation_matrix(&self.rotation),
        )
    }

    /// Transforms a point.
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        // `P + (p - P)` need not round back to `p`.
        if self.is_identity() {
            return *point;
        }
        self.pivot + self.rotation * (point - self.pivot)
    }

    /// Transforms a set of points.
    pub fn transform_points(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        points.iter().map(|p| self.transform_point(p)).collect()
    }

    /// True if the rotation is exactly the identity.
    pub fn is_identity(&self) -> bool {
        self.rotation == Rotation3::identity()
    }
}

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb3 {
    /// Creates an AABB from its corners.
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Box spanning `origin` to `origin + extents`.
    pub fn from_origin(origin: Point3<f64>, extents: &Vector3<f64>) -> Self {
        Self::new(origin, origin + extents)
    }

    /// Creates an AABB from a set of points.
    pub fn from_points(points: &[Point3<f64>]) -> Option<Self> {
        let first = points.first()?;
        let (min, max) = points
            .iter()
            .skip(1)
            .fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)));
        Some(Self { min, max })
    }

    /// Returns the eight corners.
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// Returns the extents.
    pub fn extents(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Returns the center point.
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Bounding box of this box after `transform`.
    pub fn transformed(&self, transform: &PoseTransform) -> Self {
        let corners = transform.transform_points(&self.corners());
        // Eight corners always produce a box.
        Self::from_points(&corners).unwrap_or(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_keeps_points() {
        let t = PoseTransform::identity_at(Point3::new(1.0, 2.0, 3.0));
        let p = Point3::new(10.0, -4.0, 7.5);
        assert_eq!(t.transform_point(&p), p);
        assert!(t.is_identity());
        assert_eq!(t.translation(), Vector3::zeros());
    }

    #[test]
    fn test_pivot_rotation() {
        let pivot = Point3::new(10.0, 0.0, 0.0);
        let t = PoseTransform::new(pivot, Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2));
        let p = t.transform_point(&Point3::new(11.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(10.0, 1.0, 0.0), epsilon = 1e-12);
        assert_eq!(t.transform_point(&pivot), pivot);
    }

    #[test]
    fn test_isometry_agrees() {
        let pivot = Point3::new(500.0, 600.0, 745.0);
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), 0.7)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), 0.4);
        let t = PoseTransform::new(pivot, rotation);
        let iso = t.to_isometry();

        let p = Point3::new(13.0, 1200.0, 800.0);
        assert_relative_eq!(iso.transform_point(&p), t.transform_point(&p), epsilon = 1e-9);
    }

    #[test]
    fn test_aabb_from_points() {
        let points = [
            Point3::new(1.0, 5.0, -2.0),
            Point3::new(-3.0, 2.0, 4.0),
            Point3::new(0.0, 8.0, 1.0),
        ];
        let aabb = Aabb3::from_points(&points).unwrap();
        assert_eq!(aabb.min, Point3::new(-3.0, 2.0, -2.0));
        assert_eq!(aabb.max, Point3::new(1.0, 8.0, 4.0));
        assert!(Aabb3::from_points(&[]).is_none());
    }

    #[test]
    fn test_aabb_transformed_quarter_turn() {
        let aabb = Aabb3::from_origin(Point3::origin(), &Vector3::new(4.0, 2.0, 1.0));
        let t = PoseTransform::new(
            aabb.center(),
            Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let turned = aabb.transformed(&t);
        assert_relative_eq!(turned.extents(), Vector3::new(2.0, 4.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(turned.center(), aabb.center(), epsilon = 1e-12);
    }
}
