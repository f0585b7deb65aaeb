//! Layout result representation.

use crate::config::ConfigRevision;
use crate::geometry::{ModuleTag, Platform};
use crate::level::LevelStack;
use crate::placement::ClampedPlacement;
use crate::pose::Pose;
use crate::support::SupportGeometry;
use crate::transform::{Aabb3, PoseTransform};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placement of one module in one pose.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModuleLayout {
    /// Module tag.
    pub tag: ModuleTag,

    /// Rest dimensions.
    pub dimensions: Vector3<f64>,

    /// Clamped footprint box and center.
    pub placement: ClampedPlacement,

    /// Rest-frame min corner of the module box.
    pub rest_origin: Point3<f64>,

    /// Rest origin carried into the pose.
    pub posed_origin: Point3<f64>,

    /// Rigid transform from rest into the pose.
    pub transform: PoseTransform,

    /// Plate and bracket; identical for every pose.
    pub support: SupportGeometry,
}

impl ModuleLayout {
    /// World pivot point of the pose transform.
    pub fn pivot(&self) -> &Point3<f64> {
        self.transform.pivot()
    }

    /// True when clamping moved the module.
    pub fn is_clamped(&self) -> bool {
        self.placement.is_clamped()
    }

    /// Bounding box of the module at rest.
    pub fn rest_bounds(&self) -> Aabb3 {
        Aabb3::from_origin(self.rest_origin, &self.dimensions)
    }

    /// Bounding box of the module in the pose.
    pub fn posed_bounds(&self) -> Aabb3 {
        self.rest_bounds().transformed(&self.transform)
    }

    /// Feature name of the posed body, e.g. `L_1_33_49`.
    pub fn body_name(&self, pose: &Pose) -> String {
        format!("{}_{}", self.tag, pose.label())
    }

    /// Feature name of the mounting plate.
    pub fn plate_name(&self) -> String {
        format!("{}_plate", self.tag)
    }

    /// Feature name of the pivot bracket.
    pub fn bracket_name(&self) -> String {
        format!("{}_bracket", self.tag)
    }
}

/// A complete layout for one pose.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutScene {
    /// Configuration revision the scene was computed from.
    pub revision: ConfigRevision,

    /// Active pose.
    pub pose: Pose,

    /// Platform envelope.
    pub platform: Platform,

    /// Resolved tiers.
    pub levels: LevelStack,

    /// Per-module layouts in configuration order.
    pub modules: Vec<ModuleLayout>,
}

impl LayoutScene {
    /// Looks up a module by tag.
    pub fn module(&self, tag: &str) -> Option<&ModuleLayout> {
        self.modules.iter().find(|m| m.tag == tag)
    }

    /// Number of modules moved by clamping.
    pub fn clamped_count(&self) -> usize {
        self.modules.iter().filter(|m| m.is_clamped()).count()
    }

    /// Sum of the clamped footprint areas.
    pub fn footprint_area(&self) -> f64 {
        self.modules
            .iter()
            .fold(0.0, |area, m| area + m.placement.footprint.area())
    }

    /// Highest point of any posed module.
    pub fn max_posed_height(&self) -> Option<f64> {
        self.modules
            .iter()
            .map(|m| m.posed_bounds().max.z)
            .fold(None, |acc, z| Some(acc.map_or(z, |a: f64| a.max(z))))
    }

    /// Computes summary statistics.
    pub fn summary(&self) -> SceneSummary {
        SceneSummary::from(self)
    }

    /// Writes the scene as pretty JSON.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::Error::SerializationError(e.to_string()))
    }
}

/// Summary statistics for a layout scene.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SceneSummary {
    /// Revision label.
    pub revision: String,
    /// Pose name.
    pub pose: String,
    /// Number of modules.
    pub module_count: usize,
    /// Number of modules moved by clamping.
    pub clamped_count: usize,
    /// Footprint area over platform area. Overlapping footprints are counted
    /// twice.
    pub footprint_utilization: f64,
    /// Highest point of any posed module.
    pub max_posed_height: Option<f64>,
}

impl SceneSummary {
    /// Returns the footprint utilization as a percentage string.
    pub fn utilization_percent(&self) -> String {
        format!("{:.1}%", self.footprint_utilization * 100.0)
    }
}

impl From<&LayoutScene> for SceneSummary {
    fn from(scene: &LayoutScene) -> Self {
        let area = scene.platform.area();
        Self {
            revision: scene.revision.label().to_string(),
            pose: scene.pose.name.clone(),
            module_count: scene.modules.len(),
            clamped_count: scene.clamped_count(),
            footprint_utilization: if area > 0.0 {
                scene.footprint_area() / area
            } else {
                0.0
            },
            max_posed_height: scene.max_posed_height(),
        }
    }
}
