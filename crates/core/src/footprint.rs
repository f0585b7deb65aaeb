//! Conservative 2D containment footprints.
//!
//! The footprint is only used to clamp a module into the platform. It is not
//! an exact oriented bounding box: the generic rule is a heuristic that
//! projects part of the tilt into the x extent and ignores spin on y.

use crate::pose::{Pose, PoseCatalog};
use crate::{Error, Result};
use nalgebra::{Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned footprint extents on the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Footprint {
    /// Extent along the platform x axis.
    pub x: f64,
    /// Extent along the platform y axis.
    pub y: f64,
}

impl Footprint {
    /// Creates a footprint.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the extents as a vector.
    pub fn size(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Returns the covered area.
    pub fn area(&self) -> f64 {
        self.x * self.y
    }
}

/// Projects rest dimensions under a pose onto the platform plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct FootprintProjector;

impl FootprintProjector {
    /// Footprint of a module with rest `dims` under `pose`.
    pub fn project(dims: &Vector3<f64>, pose: &Pose) -> Result<Footprint> {
        pose.validate()?;
        let (lx, ly, lz) = (dims.x, dims.y, dims.z);
        let spin = pose.normalized_spin();

        if pose.tilt_deg == 0.0 {
            // Quarter turns are exact axis swaps.
            if spin == 0.0 || spin == 180.0 {
                return Ok(Footprint::new(lx, ly));
            }
            if spin == 90.0 || spin == 270.0 {
                return Ok(Footprint::new(ly, lx));
            }
        }

        let fx = lx * pose.spin_rad().cos() + lz * pose.tilt_rad().sin();
        if !fx.is_finite() || fx <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "Pose '{}' projects to a degenerate footprint (fx = {})",
                pose.name, fx
            )));
        }
        Ok(Footprint::new(fx, ly))
    }

    /// Resolves `pose_name` in `catalog` and projects.
    pub fn project_named(
        dims: &Vector3<f64>,
        catalog: &PoseCatalog,
        pose_name: &str,
    ) -> Result<Footprint> {
        let pose = catalog.resolve(pose_name)?;
        Self::project(dims, pose)
    }
}
