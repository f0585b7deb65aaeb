//! Composition of a pose into one rigid pivot transform.
//!
//! Spin is applied first about the vertical axis, tilt second about the
//! transverse axis through the pivot: `R = R_tilt · R_spin`. The two factors
//! do not commute and must not be merged into a single axis-angle rotation.

use crate::geometry::PivotSpec;
use crate::pose::Pose;
use crate::transform::PoseTransform;
use crate::{Error, Result};
use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Builds pose transforms about one pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseTransformBuilder {
    pivot: Point3<f64>,
    tilt_axis: Unit<Vector3<f64>>,
}

impl PoseTransformBuilder {
    /// Builder for the world pivot `pivot` with the tilt axis of `spec`.
    pub fn new(pivot: Point3<f64>, spec: &PivotSpec) -> Result<Self> {
        if !pivot.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidPivot(format!(
                "pivot point {:?} is not finite",
                pivot.coords.as_slice()
            )));
        }
        Ok(Self {
            pivot,
            tilt_axis: spec.unit_axis()?,
        })
    }

    /// Returns the world pivot point.
    pub fn pivot(&self) -> &Point3<f64> {
        &self.pivot
    }

    /// Spin factor about the vertical axis.
    pub fn spin_rotation(pose: &Pose) -> Rotation3<f64> {
        let spin = pose.normalized_spin();
        if spin == 0.0 {
            Rotation3::identity()
        } else {
            Rotation3::from_axis_angle(&Vector3::z_axis(), spin.to_radians())
        }
    }

    /// Tilt factor about the pivot axis.
    pub fn tilt_rotation(&self, pose: &Pose) -> Rotation3<f64> {
        if pose.tilt_deg == 0.0 {
            Rotation3::identity()
        } else {
            Rotation3::from_axis_angle(&self.tilt_axis, pose.tilt_rad())
        }
    }

    /// Composes `pose` into a transform about the pivot.
    pub fn build(&self, pose: &Pose) -> Result<PoseTransform> {
        pose.validate()?;
        let rotation = self.tilt_rotation(pose) * Self::spin_rotation(pose);
        Ok(PoseTransform::new(self.pivot, rotation))
    }

    /// Builds the transform and applies it to the module's rest origin.
    pub fn build_with_origin(
        &self,
        pose: &Pose,
        rest_origin: &Point3<f64>,
    ) -> Result<(PoseTransform, Point3<f64>)> {
        let transform = self.build(pose)?;
        let posed_origin = transform.transform_point(rest_origin);
        Ok((transform, posed_origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn builder() -> PoseTransformBuilder {
        PoseTransformBuilder::new(Point3::new(1483.5, 620.0, 765.0), &PivotSpec::new(0.0, -923.0))
            .unwrap()
    }

    #[test]
    fn test_transport_is_identity() {
        let t = builder().build(&Pose::transport()).unwrap();
        assert!(t.is_identity());
        let p = Point3::new(998.5, 140.0, 765.0);
        assert_eq!(t.transform_point(&p), p);
    }

    #[test]
    fn test_pivot_is_fixed_point() {
        let b = builder();
        for pose in [
            Pose::transport(),
            Pose::load(),
            Pose::operating(),
            Pose::new("odd", 217.3, -61.0),
        ] {
            let t = b.build(&pose).unwrap();
            assert_eq!(t.transform_point(b.pivot()), *b.pivot());
        }
    }

    #[test]
    fn test_spin_then_tilt_order() {
        let b = builder();
        let pose = Pose::operating();
        let t = b.build(&pose).unwrap();

        let spun_then_tilted = b.tilt_rotation(&pose) * PoseTransformBuilder::spin_rotation(&pose);
        let tilted_then_spun = PoseTransformBuilder::spin_rotation(&pose) * b.tilt_rotation(&pose);
        assert_relative_eq!(*t.rotation(), spun_then_tilted, epsilon = 1e-12);
        assert!((t.rotation().matrix() - tilted_then_spun.matrix()).norm() > 1e-3);
    }

    #[test]
    fn test_pivot_formula_for_every_point() {
        let b = builder();
        let t = b.build(&Pose::operating()).unwrap();
        let r = *t.rotation();
        for p in [
            Point3::new(998.5, 140.0, 765.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2000.0, 2000.0, 2000.0),
        ] {
            let pivot = *b.pivot();
            let expected = pivot + r * (p - pivot);
            assert_eq!(t.transform_point(&p), expected);
        }
    }

    #[test]
    fn test_load_quarter_turn_about_centerline() {
        let b = builder();
        let (t, origin) = b
            .build_with_origin(&Pose::load(), &Point3::new(998.5, 140.0, 765.0))
            .unwrap();
        // (-485, -480) from the centerline turns to (480, -485).
        assert_relative_eq!(origin, Point3::new(1963.5, 135.0, 765.0), epsilon = 1e-9);
        assert_relative_eq!(t.rotation().angle(), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_pivot_axis() {
        let spec = PivotSpec::default().with_axis(Vector3::zeros());
        assert!(matches!(
            PoseTransformBuilder::new(Point3::origin(), &spec),
            Err(Error::InvalidPivot(_))
        ));

        let spec = PivotSpec {
            axis: None,
            ..PivotSpec::default()
        };
        assert!(matches!(
            PoseTransformBuilder::new(Point3::origin(), &spec),
            Err(Error::InvalidPivot(_))
        ));
    }
}
