//! Declarative interface to the solid-modelling kernel.
//!
//! Shapes are created in a local frame (boxes span `[0, extents]`, cylinders
//! start at the origin and run along their axis) and positioned by
//! `create_feature`. Emission only starts from a finished [`LayoutScene`], so
//! a failed layout never reaches the kernel.

use crate::layout::LayoutEngine;
use crate::result::{LayoutScene, ModuleLayout};
use crate::support::{BracketCheek, PivotBracket};
use crate::{Error, Result};
use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Operations the layout needs from a geometry kernel.
pub trait GeometryKernel {
    /// Opaque shape handle.
    type Shape: Clone;

    /// Box spanning `[0, extents]`.
    fn create_box(&mut self, extents: &Vector3<f64>) -> Result<Self::Shape>;

    /// Cylinder of `radius` from the origin along `axis` for `height`.
    fn create_cylinder(
        &mut self,
        radius: f64,
        height: f64,
        axis: &Unit<Vector3<f64>>,
    ) -> Result<Self::Shape>;

    /// `base` minus `tool`.
    fn boolean_cut(&mut self, base: &Self::Shape, tool: &Self::Shape) -> Result<Self::Shape>;

    /// Union of `a` and `b`.
    fn boolean_fuse(&mut self, a: &Self::Shape, b: &Self::Shape) -> Result<Self::Shape>;

    /// Named feature placing `shape` by `placement`.
    fn create_feature(
        &mut self,
        name: &str,
        shape: &Self::Shape,
        placement: &Isometry3<f64>,
    ) -> Result<Self::Shape>;
}

/// Kernel handles emitted for one module.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedModule<S> {
    /// Module tag.
    pub tag: String,
    /// Posed module body.
    pub body: S,
    /// Mounting plate.
    pub plate: S,
    /// Pivot bracket (pin fused with both cheeks).
    pub bracket: S,
}

/// Emits every module of `scene` into `kernel`.
pub fn emit_scene<K: GeometryKernel>(
    kernel: &mut K,
    scene: &LayoutScene,
) -> Result<Vec<EmittedModule<K::Shape>>> {
    scene
        .modules
        .iter()
        .map(|module| emit_module(kernel, scene, module))
        .collect()
}

/// Computes the pose named `pose_name` and emits it.
///
/// Nothing is sent to the kernel unless the whole layout succeeds.
pub fn build_pose<K: GeometryKernel>(
    engine: &LayoutEngine,
    pose_name: &str,
    kernel: &mut K,
) -> Result<(LayoutScene, Vec<EmittedModule<K::Shape>>)> {
    let scene = engine.compute(pose_name)?;
    let emitted = emit_scene(kernel, &scene)?;
    Ok((scene, emitted))
}

fn emit_module<K: GeometryKernel>(
    kernel: &mut K,
    scene: &LayoutScene,
    module: &ModuleLayout,
) -> Result<EmittedModule<K::Shape>> {
    let body_shape = kernel.create_box(&module.dimensions)?;
    let body_placement =
        module.transform.to_isometry() * Translation3::from(module.rest_origin.coords);
    let body = kernel.create_feature(&module.body_name(&scene.pose), &body_shape, &body_placement)?;

    let mounting = &module.support.plate;
    let plate_shape = kernel.create_box(&mounting.extents)?;
    let plate = kernel.create_feature(
        &module.plate_name(),
        &plate_shape,
        &Isometry3::from(Translation3::from(mounting.origin.coords)),
    )?;

    let bracket = emit_bracket(kernel, &module.tag, &module.support.bracket)?;
    let bracket = kernel.create_feature(&module.bracket_name(), &bracket, &Isometry3::identity())?;

    Ok(EmittedModule {
        tag: module.tag.clone(),
        body,
        plate,
        bracket,
    })
}

fn emit_bracket<K: GeometryKernel>(
    kernel: &mut K,
    tag: &str,
    bracket: &PivotBracket,
) -> Result<K::Shape> {
    let pin_shape = kernel.create_cylinder(bracket.pin_radius, bracket.pin_length, &bracket.axis)?;
    let mut fused = kernel.create_feature(
        &format!("{}_pin", tag),
        &pin_shape,
        &Isometry3::from(Translation3::from(bracket.pin_start().coords)),
    )?;

    for (i, cheek) in bracket.cheeks.iter().enumerate() {
        let cheek = emit_cheek(kernel, &format!("{}_cheek_{}", tag, i), cheek)?;
        fused = kernel.boolean_fuse(&fused, &cheek)?;
    }
    Ok(fused)
}

fn emit_cheek<K: GeometryKernel>(
    kernel: &mut K,
    name: &str,
    cheek: &BracketCheek,
) -> Result<K::Shape> {
    let half = cheek.extents / 2.0;
    let block = kernel.create_box(&cheek.extents)?;
    // Bore through the block along its local y axis.
    let bore = kernel.create_cylinder(cheek.bore_radius, cheek.extents.y, &Vector3::y_axis())?;
    let bore = kernel.create_feature(
        &format!("{}_bore", name),
        &bore,
        &Isometry3::translation(half.x, 0.0, half.z),
    )?;
    let bored = kernel.boolean_cut(&block, &bore)?;

    let placement = Isometry3::from_parts(
        Translation3::from(cheek.center.coords),
        UnitQuaternion::from_rotation_matrix(&cheek.frame),
    ) * Translation3::from(-half);
    kernel.create_feature(name, &bored, &placement)
}

/// A recorded kernel request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShapeRequest {
    /// Box creation.
    Box {
        /// Handle produced.
        id: usize,
        /// Box extents.
        extents: Vector3<f64>,
    },
    /// Cylinder creation.
    Cylinder {
        /// Handle produced.
        id: usize,
        /// Radius.
        radius: f64,
        /// Height along the axis.
        height: f64,
        /// Axis direction.
        axis: Vector3<f64>,
    },
    /// Boolean difference.
    Cut {
        /// Handle produced.
        id: usize,
        /// Shape cut from.
        base: usize,
        /// Cutting tool.
        tool: usize,
    },
    /// Boolean union.
    Fuse {
        /// Handle produced.
        id: usize,
        /// First operand.
        a: usize,
        /// Second operand.
        b: usize,
    },
    /// Named placed feature.
    Feature {
        /// Handle produced.
        id: usize,
        /// Feature name.
        name: String,
        /// Placed shape.
        shape: usize,
        /// World placement.
        placement: Isometry3<f64>,
    },
}

/// Kernel that records requests instead of building solids.
#[derive(Debug, Clone, Default)]
pub struct RecordingKernel {
    requests: Vec<ShapeRequest>,
}

impl RecordingKernel {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded requests in issue order.
    pub fn requests(&self) -> &[ShapeRequest] {
        &self.requests
    }

    /// Returns the names of all features.
    pub fn feature_names(&self) -> Vec<&str> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                ShapeRequest::Feature { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns the placement of the feature called `name`.
    pub fn feature_placement(&self, name: &str) -> Option<&Isometry3<f64>> {
        self.requests.iter().find_map(|r| match r {
            ShapeRequest::Feature {
                name: n, placement, ..
            } if n == name => Some(placement),
            _ => None,
        })
    }

    fn push(&mut self, request: impl FnOnce(usize) -> ShapeRequest) -> usize {
        let id = self.requests.len();
        self.requests.push(request(id));
        id
    }

    fn check_handle(&self, handle: usize) -> Result<()> {
        if handle < self.requests.len() {
            Ok(())
        } else {
            Err(Error::Kernel(format!("unknown shape handle {}", handle)))
        }
    }
}

impl GeometryKernel for RecordingKernel {
    type Shape = usize;

    fn create_box(&mut self, extents: &Vector3<f64>) -> Result<usize> {
        if !extents.iter().all(|e| e.is_finite() && *e > 0.0) {
            return Err(Error::Kernel(format!(
                "box extents {:?} must be positive",
                extents.as_slice()
            )));
        }
        let extents = *extents;
        Ok(self.push(|id| ShapeRequest::Box { id, extents }))
    }

    fn create_cylinder(
        &mut self,
        radius: f64,
        height: f64,
        axis: &Unit<Vector3<f64>>,
    ) -> Result<usize> {
        if !(radius > 0.0 && height > 0.0) {
            return Err(Error::Kernel(format!(
                "cylinder radius {} and height {} must be positive",
                radius, height
            )));
        }
        let axis = axis.into_inner();
        Ok(self.push(|id| ShapeRequest::Cylinder {
            id,
            radius,
            height,
            axis,
        }))
    }

    fn boolean_cut(&mut self, base: &usize, tool: &usize) -> Result<usize> {
        self.check_handle(*base)?;
        self.check_handle(*tool)?;
        let (base, tool) = (*base, *tool);
        Ok(self.push(|id| ShapeRequest::Cut { id, base, tool }))
    }

    fn boolean_fuse(&mut self, a: &usize, b: &usize) -> Result<usize> {
        self.check_handle(*a)?;
        self.check_handle(*b)?;
        let (a, b) = (*a, *b);
        Ok(self.push(|id| ShapeRequest::Fuse { id, a, b }))
    }

    fn create_feature(
        &mut self,
        name: &str,
        shape: &usize,
        placement: &Isometry3<f64>,
    ) -> Result<usize> {
        self.check_handle(*shape)?;
        let (name, shape, placement) = (name.to_string(), *shape, *placement);
        Ok(self.push(|id| ShapeRequest::Feature {
            id,
            name,
            shape,
            placement,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigRevision, LayoutConfig};
    use crate::pose::{TRANSPORT, USE};
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn engine() -> LayoutEngine {
        LayoutEngine::new(LayoutConfig::reference(ConfigRevision::V0_4)).unwrap()
    }

    #[test]
    fn test_emit_feature_names() {
        let mut kernel = RecordingKernel::new();
        let (_, emitted) = build_pose(&engine(), USE, &mut kernel).unwrap();
        assert_eq!(emitted.len(), 6);

        let names = kernel.feature_names();
        assert!(names.contains(&"L_1_33_49"));
        assert!(names.contains(&"L_1_plate"));
        assert!(names.contains(&"L_1_bracket"));
        assert!(names.contains(&"R_3_cheek_1"));
    }

    #[test]
    fn test_body_placement_matches_transform() {
        let mut kernel = RecordingKernel::new();
        let (scene, _) = build_pose(&engine(), USE, &mut kernel).unwrap();
        let module = scene.module("R_2").unwrap();

        let placement = kernel.feature_placement("R_2_33_49").unwrap();
        let far = module.rest_origin + module.dimensions;
        assert_relative_eq!(
            placement.transform_point(&Point3::origin()),
            module.posed_origin,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            placement.transform_point(&Point3::from(module.dimensions)),
            module.transform.transform_point(&far),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_transport_body_is_translation_only() {
        let mut kernel = RecordingKernel::new();
        let (scene, _) = build_pose(&engine(), TRANSPORT, &mut kernel).unwrap();
        let module = scene.module("L_2").unwrap();
        let placement = kernel.feature_placement("L_2_0_0").unwrap();
        assert_eq!(placement.rotation, UnitQuaternion::identity());
        assert_relative_eq!(placement.translation.vector, module.rest_origin.coords);
    }

    #[test]
    fn test_failed_layout_requests_nothing() {
        let mut kernel = RecordingKernel::new();
        assert!(matches!(
            build_pose(&engine(), "spin", &mut kernel),
            Err(Error::UnknownPose(_))
        ));
        assert!(kernel.requests().is_empty());
    }

    #[test]
    fn test_unknown_handle_rejected() {
        let mut kernel = RecordingKernel::new();
        assert!(matches!(kernel.boolean_fuse(&3, &4), Err(Error::Kernel(_))));
        assert!(kernel.create_box(&Vector3::new(1.0, 0.0, 1.0)).is_err());
    }
}
