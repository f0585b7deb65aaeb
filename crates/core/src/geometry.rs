//! Platform, module and pivot descriptions.

use crate::{Error, Result};
use nalgebra::{Point2, Point3, Rotation3, Unit, Vector2, Vector3};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Module identifier type.
pub type ModuleTag = String;

/// Norm below which a pivot axis counts as zero-length.
pub const AXIS_EPSILON: f64 = 1e-12;

/// Horizontal platform axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// Platform width direction.
    X,
    /// Platform depth direction.
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// The platform envelope modules are clamped into.
///
/// The usable area is `[0, width] × [0, depth]`; `top_z` is the reference
/// height the level stack starts from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Platform {
    width: f64,
    depth: f64,
    top_z: f64,
}

impl Platform {
    /// Creates a platform with its top surface at z = 0.
    pub fn new(width: f64, depth: f64) -> Self {
        Self {
            width,
            depth,
            top_z: 0.0,
        }
    }

    /// Sets the reference top height.
    pub fn with_top_z(mut self, top_z: f64) -> Self {
        self.top_z = top_z;
        self
    }

    /// Returns the width (x extent).
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the depth (y extent).
    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// Returns the reference top height.
    pub fn top_z(&self) -> f64 {
        self.top_z
    }

    /// Returns the extent along `axis`.
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.depth,
        }
    }

    /// Returns the platform area.
    pub fn area(&self) -> f64 {
        self.width * self.depth
    }

    /// Checks that the box `[min, min + size]` lies inside the envelope.
    pub fn contains_rect(&self, min: &Point2<f64>, size: &Vector2<f64>, tolerance: f64) -> bool {
        min.x >= -tolerance
            && min.y >= -tolerance
            && min.x + size.x <= self.width + tolerance
            && min.y + size.y <= self.depth + tolerance
    }

    /// Validates the platform.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.depth.is_finite()) {
            return Err(Error::InvalidBoundary(
                "Platform extents must be finite".into(),
            ));
        }
        if self.width <= 0.0 || self.depth <= 0.0 {
            return Err(Error::InvalidBoundary(
                "Platform extents must be positive".into(),
            ));
        }
        if !self.top_z.is_finite() {
            return Err(Error::InvalidBoundary(
                "Platform top height must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Where a module's tilt pivot sits relative to the module at rest.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PivotSpec {
    /// Offset from the module center along the rest +x axis.
    pub forward_offset: f64,
    /// Offset above the module's rest top face (negative values go below it).
    pub height_offset: f64,
    /// Tilt axis direction. `None` means unspecified.
    pub axis: Option<Vector3<f64>>,
}

impl PivotSpec {
    /// Pivot on the module centerline with a transverse (y) tilt axis.
    pub fn new(forward_offset: f64, height_offset: f64) -> Self {
        Self {
            forward_offset,
            height_offset,
            axis: Some(Vector3::y()),
        }
    }

    /// Sets the tilt axis direction.
    pub fn with_axis(mut self, axis: Vector3<f64>) -> Self {
        self.axis = Some(axis);
        self
    }

    /// Returns the normalized tilt axis.
    pub fn unit_axis(&self) -> Result<Unit<Vector3<f64>>> {
        let axis = self
            .axis
            .ok_or_else(|| Error::InvalidPivot("tilt axis is unspecified".into()))?;
        if !axis.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidPivot(format!(
                "tilt axis {:?} is not finite",
                axis.as_slice()
            )));
        }
        Unit::try_new(axis, AXIS_EPSILON)
            .ok_or_else(|| Error::InvalidPivot("tilt axis has zero length".into()))
    }

    /// Horizontal pivot offset from the module center after `spin`.
    pub fn forward_vector(&self, spin: &Rotation3<f64>) -> Vector2<f64> {
        let v = spin * Vector3::new(self.forward_offset, 0.0, 0.0);
        Vector2::new(v.x, v.y)
    }

    /// World pivot point for a module spun by `spin` whose center lands on
    /// `center` and whose rest underside sits at `base_z`.
    pub fn world_point(
        &self,
        center: &Point2<f64>,
        base_z: f64,
        dims: &Vector3<f64>,
        spin: &Rotation3<f64>,
    ) -> Point3<f64> {
        let forward = self.forward_vector(spin);
        Point3::new(
            center.x + forward.x,
            center.y + forward.y,
            base_z + dims.z + self.height_offset,
        )
    }

    /// Rest center that a turn by `spin` about the pivot carries onto
    /// `center`.
    ///
    /// Equals `center` when the spin is the identity or the pivot sits on
    /// the centerline.
    pub fn rest_center(&self, center: &Point2<f64>, spin: &Rotation3<f64>) -> Point2<f64> {
        let shift = self.forward_vector(spin) - Vector2::new(self.forward_offset, 0.0);
        center + shift
    }

    fn validate(&self) -> Result<()> {
        if !(self.forward_offset.is_finite() && self.height_offset.is_finite()) {
            return Err(Error::InvalidPivot("pivot offsets must be finite".into()));
        }
        self.unit_axis().map(|_| ())
    }
}

impl Default for PivotSpec {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A rigid rectangular swivel unit in its rest (transport) orientation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModuleSpec {
    tag: ModuleTag,
    dimensions: Vector3<f64>,
    nominal_center: Point2<f64>,
    pivot: PivotSpec,
}

impl ModuleSpec {
    /// Creates a module with rest dimensions `(lx, ly, lz)` targeted at
    /// `(cx, cy)`.
    pub fn new(tag: impl Into<ModuleTag>, lx: f64, ly: f64, lz: f64, cx: f64, cy: f64) -> Self {
        Self {
            tag: tag.into(),
            dimensions: Vector3::new(lx, ly, lz),
            nominal_center: Point2::new(cx, cy),
            pivot: PivotSpec::default(),
        }
    }

    /// Sets the pivot spec.
    pub fn with_pivot(mut self, pivot: PivotSpec) -> Self {
        self.pivot = pivot;
        self
    }

    /// Returns the tag.
    pub fn tag(&self) -> &ModuleTag {
        &self.tag
    }

    /// Returns the rest dimensions `(Lx, Ly, Lz)`.
    pub fn dimensions(&self) -> &Vector3<f64> {
        &self.dimensions
    }

    /// Returns the nominal (pre-clamp) center.
    pub fn nominal_center(&self) -> &Point2<f64> {
        &self.nominal_center
    }

    /// Returns the pivot spec.
    pub fn pivot(&self) -> &PivotSpec {
        &self.pivot
    }

    /// Validates dimensions, center and pivot.
    pub fn validate(&self) -> Result<()> {
        if self.tag.trim().is_empty() {
            return Err(Error::InvalidGeometry("Module tag must not be empty".into()));
        }
        if !self.dimensions.iter().all(|d| d.is_finite() && *d > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "All dimensions for '{}' must be positive",
                self.tag
            )));
        }
        if !(self.nominal_center.x.is_finite() && self.nominal_center.y.is_finite()) {
            return Err(Error::InvalidGeometry(format!(
                "Nominal center for '{}' must be finite",
                self.tag
            )));
        }
        self.pivot.validate()
    }
}
