//! Containment clamping of modules into the platform envelope.

use crate::footprint::{Footprint, FootprintProjector};
use crate::geometry::{Axis, ModuleSpec, PivotSpec, Platform};
use crate::pose::Pose;
use crate::{Error, Result};
use nalgebra::{Point2, Point3, Rotation3, Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shift below which a clamp is not reported as having moved the module.
const CLAMP_EPSILON: f64 = 1e-9;

/// Result of clamping one footprint into the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClampedPlacement {
    /// Min corner of the clamped footprint box.
    pub origin: Point2<f64>,
    /// Footprint that was clamped.
    pub footprint: Footprint,
    /// Center of the clamped footprint box.
    pub center: Point2<f64>,
    /// Clamped center minus nominal center.
    pub shift: Vector2<f64>,
}

impl ClampedPlacement {
    /// True when clamping moved the module away from its nominal center.
    pub fn is_clamped(&self) -> bool {
        self.shift.x.abs() > CLAMP_EPSILON || self.shift.y.abs() > CLAMP_EPSILON
    }

    /// Max corner of the clamped footprint box.
    pub fn max(&self) -> Point2<f64> {
        self.origin + self.footprint.size()
    }

    /// Rest-frame min corner of a module with fixed rest `dims` whose
    /// underside sits at `base_z`.
    ///
    /// The rest center is the one that spinning by `spin` about the pivot
    /// carries onto the clamped center. Derived from the rest dimensions,
    /// never from the footprint extents.
    pub fn rest_origin(
        &self,
        dims: &Vector3<f64>,
        base_z: f64,
        pivot: &PivotSpec,
        spin: &Rotation3<f64>,
    ) -> Point3<f64> {
        let rest_center = pivot.rest_center(&self.center, spin);
        Point3::new(
            rest_center.x - dims.x / 2.0,
            rest_center.y - dims.y / 2.0,
            base_z,
        )
    }
}

/// Clamps modules into a platform.
#[derive(Debug, Clone)]
pub struct PlacementSolver<'a> {
    platform: &'a Platform,
}

impl<'a> PlacementSolver<'a> {
    /// Creates a solver for `platform`.
    pub fn new(platform: &'a Platform) -> Self {
        Self { platform }
    }

    /// Clamps `center` so that a `footprint` box centered on it stays inside
    /// the platform.
    ///
    /// `origin = (clamp(cx - fx/2, 0, X - fx), clamp(cy - fy/2, 0, Y - fy))`.
    pub fn clamp(
        &self,
        tag: &str,
        center: &Point2<f64>,
        footprint: &Footprint,
    ) -> Result<ClampedPlacement> {
        let ox = clamp_axis(tag, Axis::X, center.x, footprint.x, self.platform.width())?;
        let oy = clamp_axis(tag, Axis::Y, center.y, footprint.y, self.platform.depth())?;

        let origin = Point2::new(ox, oy);
        let clamped_center = Point2::new(ox + footprint.x / 2.0, oy + footprint.y / 2.0);
        Ok(ClampedPlacement {
            origin,
            footprint: *footprint,
            center: clamped_center,
            shift: clamped_center - center,
        })
    }

    /// Projects and clamps `module` under `pose`.
    ///
    /// The module must also fit in its rest orientation, so an overlong module
    /// reports the same axis for every pose.
    pub fn solve(&self, module: &ModuleSpec, pose: &Pose) -> Result<ClampedPlacement> {
        let dims = module.dimensions();
        self.check_fits(module.tag(), &Footprint::new(dims.x, dims.y))?;

        let footprint = FootprintProjector::project(dims, pose)?;
        let placement = self.clamp(module.tag(), module.nominal_center(), &footprint)?;

        if placement.is_clamped() {
            log::warn!(
                "Module '{}' clamped by ({:.3}, {:.3}) in pose '{}'",
                module.tag(),
                placement.shift.x,
                placement.shift.y,
                pose.name
            );
        }

        Ok(placement)
    }

    fn check_fits(&self, tag: &str, footprint: &Footprint) -> Result<()> {
        for (axis, size) in [(Axis::X, footprint.x), (Axis::Y, footprint.y)] {
            let extent = self.platform.extent(axis);
            if size > extent {
                return Err(oversize(tag, axis, size, extent));
            }
        }
        Ok(())
    }
}

fn clamp_axis(tag: &str, axis: Axis, center: f64, size: f64, extent: f64) -> Result<f64> {
    if size > extent {
        return Err(oversize(tag, axis, size, extent));
    }
    Ok((center - size / 2.0).clamp(0.0, extent - size))
}

fn oversize(tag: &str, axis: Axis, footprint: f64, extent: f64) -> Error {
    Error::Oversize {
        module: tag.to_string(),
        axis,
        footprint,
        extent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn platform() -> Platform {
        Platform::new(2967.0, 2483.0)
    }

    #[test]
    fn test_clamp_inside_is_identity() {
        let platform = platform();
        let solver = PlacementSolver::new(&platform);
        let p = solver
            .clamp("m", &Point2::new(1000.0, 1000.0), &Footprint::new(970.0, 960.0))
            .unwrap();

        assert_relative_eq!(p.origin, Point2::new(515.0, 520.0));
        assert!(!p.is_clamped());
    }

    #[test]
    fn test_clamp_pushes_into_envelope() {
        let platform = platform();
        let solver = PlacementSolver::new(&platform);

        let low = solver
            .clamp("m", &Point2::new(100.0, -50.0), &Footprint::new(970.0, 960.0))
            .unwrap();
        assert_eq!(low.origin, Point2::new(0.0, 0.0));
        assert!(low.is_clamped());

        let high = solver
            .clamp("m", &Point2::new(2900.0, 2480.0), &Footprint::new(970.0, 960.0))
            .unwrap();
        assert_relative_eq!(high.origin, Point2::new(1997.0, 1523.0));
        assert_relative_eq!(high.max(), Point2::new(2967.0, 2483.0));
    }

    #[test]
    fn test_exact_fit() {
        let platform = Platform::new(970.0, 960.0);
        let solver = PlacementSolver::new(&platform);
        let p = solver
            .clamp("m", &Point2::new(5000.0, 5000.0), &Footprint::new(970.0, 960.0))
            .unwrap();
        assert_eq!(p.origin, Point2::origin());
    }

    #[test]
    fn test_oversize_axis() {
        let platform = platform();
        let solver = PlacementSolver::new(&platform);
        let err = solver
            .clamp("m", &Point2::new(0.0, 0.0), &Footprint::new(100.0, 3000.0))
            .unwrap_err();
        match err {
            Error::Oversize { axis, footprint, extent, .. } => {
                assert_eq!(axis, Axis::Y);
                assert_eq!(footprint, 3000.0);
                assert_eq!(extent, 2483.0);
            }
            other => panic!("expected Oversize, got {:?}", other),
        }
    }

    #[test]
    fn test_rest_origin_uses_rest_dims() {
        let platform = platform();
        let solver = PlacementSolver::new(&platform);
        let module = ModuleSpec::new("m", 970.0, 960.0, 923.0, 2900.0, 600.0);
        let p = solver.solve(&module, &Pose::load()).unwrap();

        // Footprint is swapped, the rest box is not.
        assert_eq!(p.footprint, Footprint::new(960.0, 970.0));
        let origin = p.rest_origin(module.dimensions(), 745.0, module.pivot(), &Rotation3::identity());
        assert_relative_eq!(origin.x, p.center.x - 485.0);
        assert_relative_eq!(origin.y, p.center.y - 480.0);
        assert_relative_eq!(origin.z, 745.0);
    }

    #[test]
    fn test_rest_origin_with_offset_pivot() {
        let platform = platform();
        let solver = PlacementSolver::new(&platform);
        let module = ModuleSpec::new("m", 800.0, 600.0, 500.0, 2567.0, 900.0)
            .with_pivot(PivotSpec::new(300.0, -500.0));
        let p = solver.solve(&module, &Pose::load()).unwrap();
        assert_eq!(p.origin, Point2::new(2267.0, 500.0));

        let quarter = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        let origin = p.rest_origin(module.dimensions(), 765.0, module.pivot(), &quarter);
        // Rest center (2267, 1200) spins about the pivot (2567, 1200) onto (2567, 900).
        assert_relative_eq!(origin.x, 2267.0 - 400.0, epsilon = 1e-9);
        assert_relative_eq!(origin.y, 1200.0 - 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let platform = platform();
        let solver = PlacementSolver::new(&platform);
        let fp = Footprint::new(970.0, 960.0);
        let first = solver.clamp("m", &Point2::new(-300.0, 2600.0), &fp).unwrap();
        let second = solver.clamp("m", &first.center, &fp).unwrap();
        assert_eq!(first.origin, second.origin);
        assert!(!second.is_clamped());
    }
}
