//! Non-rotating support geometry: mounting plates and pivot brackets.
//!
//! Supports are derived in the rest configuration from the clamped center
//! and the pivot spec. They never take part in the pose rotation: the plate
//! sits under the clamped center and the bracket holds the pin on the world
//! pivot, which follows the spin when the pivot is off the centerline.

use crate::geometry::ModuleSpec;
use crate::{Error, Result};
use nalgebra::{Point2, Point3, Rotation3, Unit, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mounting plate parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlateSpec {
    /// Plate thickness.
    pub thickness: f64,
    /// Inset from the module edge along x, per side.
    pub margin_x: f64,
    /// Inset from the module edge along y, per side.
    pub margin_y: f64,
}

impl PlateSpec {
    /// Creates a plate spec.
    pub fn new(thickness: f64, margin_x: f64, margin_y: f64) -> Self {
        Self {
            thickness,
            margin_x,
            margin_y,
        }
    }

    /// Plate extents under a module with rest `dims`.
    pub fn extents_for(&self, dims: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            dims.x - 2.0 * self.margin_x,
            dims.y - 2.0 * self.margin_y,
            self.thickness,
        )
    }

    /// Validates thickness and margins.
    pub fn validate(&self) -> Result<()> {
        if !(self.thickness.is_finite() && self.thickness > 0.0) {
            return Err(Error::InvalidGeometry(
                "Plate thickness must be positive".into(),
            ));
        }
        if !(self.margin_x >= 0.0 && self.margin_y >= 0.0) {
            return Err(Error::InvalidGeometry(
                "Plate margins must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PlateSpec {
    fn default() -> Self {
        Self::new(20.0, 40.0, 40.0)
    }
}

/// Pivot bracket parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BracketSpec {
    /// Radius of the pivot pin.
    pub pin_radius: f64,
    /// How far the pin reaches past the module on each side.
    pub overhang: f64,
    /// Cheek thickness along the pin axis.
    pub cheek_thickness: f64,
    /// Cheek edge length across the pin axis.
    pub cheek_size: f64,
    /// Radial play between pin and cheek bore.
    pub bore_clearance: f64,
}

impl BracketSpec {
    /// Validates bracket dimensions.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("pin radius", self.pin_radius),
            ("cheek thickness", self.cheek_thickness),
            ("cheek size", self.cheek_size),
        ];
        for (label, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidGeometry(format!(
                    "Bracket {} must be positive",
                    label
                )));
            }
        }
        if !(self.overhang >= 0.0 && self.bore_clearance >= 0.0) {
            return Err(Error::InvalidGeometry(
                "Bracket overhang and bore clearance must be non-negative".into(),
            ));
        }
        if self.cheek_size <= 2.0 * self.bore_radius() {
            return Err(Error::InvalidGeometry(
                "Bracket cheek is too small for its bore".into(),
            ));
        }
        if self.cheek_thickness > self.overhang {
            return Err(Error::InvalidGeometry(
                "Bracket cheek must fit within the pin overhang".into(),
            ));
        }
        Ok(())
    }

    /// Radius of the cheek bore.
    pub fn bore_radius(&self) -> f64 {
        self.pin_radius + self.bore_clearance
    }
}

impl Default for BracketSpec {
    fn default() -> Self {
        Self {
            pin_radius: 25.0,
            overhang: 60.0,
            cheek_thickness: 30.0,
            cheek_size: 120.0,
            bore_clearance: 0.5,
        }
    }
}

/// A mounting plate in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MountingPlate {
    /// Min corner.
    pub origin: Point3<f64>,
    /// Box extents.
    pub extents: Vector3<f64>,
}

impl MountingPlate {
    /// Height of the plate's top face.
    pub fn top_z(&self) -> f64 {
        self.origin.z + self.extents.z
    }

    /// Center of the plate box.
    pub fn center(&self) -> Point3<f64> {
        self.origin + self.extents / 2.0
    }
}

/// One bored cheek holding an end of the pivot pin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BracketCheek {
    /// Center of the cheek box.
    pub center: Point3<f64>,
    /// Local extents; local y runs along the pin axis.
    pub extents: Vector3<f64>,
    /// Rotation taking local axes to world axes.
    pub frame: Rotation3<f64>,
    /// Bore radius.
    pub bore_radius: f64,
}

/// The pivot pin and its two cheeks.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PivotBracket {
    /// Midpoint of the pin axis; coincides with the pose pivot.
    pub axis_midpoint: Point3<f64>,
    /// Pin axis direction.
    pub axis: Unit<Vector3<f64>>,
    /// Pin radius.
    pub pin_radius: f64,
    /// Pin length.
    pub pin_length: f64,
    /// Cheeks at the negative and positive pin ends.
    pub cheeks: [BracketCheek; 2],
}

impl PivotBracket {
    /// Start of the pin (negative end).
    pub fn pin_start(&self) -> Point3<f64> {
        self.axis_midpoint - self.axis.into_inner() * (self.pin_length / 2.0)
    }

    /// End of the pin (positive end).
    pub fn pin_end(&self) -> Point3<f64> {
        self.axis_midpoint + self.axis.into_inner() * (self.pin_length / 2.0)
    }
}

/// Support geometry derived for one module.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SupportGeometry {
    /// Mounting plate under the module.
    pub plate: MountingPlate,
    /// Pivot bracket.
    pub bracket: PivotBracket,
    /// Height of the module's rest underside (plate top).
    pub module_base_z: f64,
    /// World pivot point shared with the pose transform.
    pub pivot: Point3<f64>,
}

/// Derives plates and brackets for modules.
#[derive(Debug, Clone, Copy)]
pub struct DependentGeometryGenerator<'a> {
    plate: &'a PlateSpec,
    bracket: &'a BracketSpec,
}

impl<'a> DependentGeometryGenerator<'a> {
    /// Creates a generator.
    pub fn new(plate: &'a PlateSpec, bracket: &'a BracketSpec) -> Self {
        Self { plate, bracket }
    }

    /// Builds the supports for `module` centered at `center`, with the plate
    /// resting on `mount_z` and the pivot placed for `spin`.
    pub fn generate(
        &self,
        module: &ModuleSpec,
        center: &Point2<f64>,
        mount_z: f64,
        spin: &Rotation3<f64>,
    ) -> Result<SupportGeometry> {
        let dims = module.dimensions();
        let plate = self.plate_for(module, center, mount_z)?;
        let module_base_z = plate.top_z();
        let pivot = module.pivot().world_point(center, module_base_z, dims, spin);
        let axis = module.pivot().unit_axis()?;
        let bracket = self.bracket_for(dims, pivot, axis)?;

        log::debug!(
            "Supports for '{}': plate top {:.3}, pivot ({:.3}, {:.3}, {:.3})",
            module.tag(),
            module_base_z,
            pivot.x,
            pivot.y,
            pivot.z
        );

        Ok(SupportGeometry {
            plate,
            bracket,
            module_base_z,
            pivot,
        })
    }

    fn plate_for(
        &self,
        module: &ModuleSpec,
        center: &Point2<f64>,
        mount_z: f64,
    ) -> Result<MountingPlate> {
        self.plate.validate()?;
        let extents = self.plate.extents_for(module.dimensions());
        if extents.x <= 0.0 || extents.y <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "Plate margins consume the footprint of '{}'",
                module.tag()
            )));
        }
        let origin = Point3::new(
            center.x - extents.x / 2.0,
            center.y - extents.y / 2.0,
            mount_z,
        );
        Ok(MountingPlate { origin, extents })
    }

    fn bracket_for(
        &self,
        dims: &Vector3<f64>,
        pivot: Point3<f64>,
        axis: Unit<Vector3<f64>>,
    ) -> Result<PivotBracket> {
        self.bracket.validate()?;
        let spec = self.bracket;

        // Half extent of the rest box along the pin axis.
        let half_span = (axis.x.abs() * dims.x + axis.y.abs() * dims.y + axis.z.abs() * dims.z) / 2.0;
        let half_length = half_span + spec.overhang;

        let frame = Rotation3::rotation_between(&Vector3::y(), &axis.into_inner())
            .unwrap_or_else(|| Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::PI));
        let inset = half_length - spec.cheek_thickness / 2.0;
        let extents = Vector3::new(spec.cheek_size, spec.cheek_thickness, spec.cheek_size);
        let cheek = |sign: f64| BracketCheek {
            center: pivot + axis.into_inner() * (sign * inset),
            extents,
            frame,
            bore_radius: spec.bore_radius(),
        };

        Ok(PivotBracket {
            axis_midpoint: pivot,
            axis,
            pin_radius: spec.pin_radius,
            pin_length: 2.0 * half_length,
            cheeks: [cheek(-1.0), cheek(1.0)],
        })
    }
}
