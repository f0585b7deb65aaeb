//! Versioned layout configuration.

use crate::geometry::{ModuleSpec, PivotSpec, Platform};
use crate::level::{LevelSpec, LevelStack};
use crate::pose::PoseCatalog;
use crate::support::{BracketSpec, PlateSpec};
use crate::{Error, Result};
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rest dimensions of the reference swivel unit.
pub const REFERENCE_MODULE_DIMS: (f64, f64, f64) = (970.0, 960.0, 923.0);
/// Reference platform width and depth.
pub const REFERENCE_PLATFORM: (f64, f64) = (2967.0, 2483.0);

const REFERENCE_TOP_Z: f64 = 120.0;
const REFERENCE_ROW_L: f64 = 620.0;
const REFERENCE_ROW_R: f64 = 1863.0;
const REFERENCE_COLUMNS: [f64; 3] = [494.5, 1483.5, 2472.5];

/// Configuration revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConfigRevision {
    /// Fixed transport layout, no pose catalog.
    V0_3,
    /// Transport, load and use poses.
    #[default]
    V0_4,
}

impl ConfigRevision {
    /// Short label, e.g. `v0.4`.
    pub fn label(&self) -> &'static str {
        match self {
            ConfigRevision::V0_3 => "v0.3",
            ConfigRevision::V0_4 => "v0.4",
        }
    }

    /// Pose catalog the revision ships with.
    pub fn pose_catalog(&self) -> PoseCatalog {
        match self {
            ConfigRevision::V0_3 => PoseCatalog::transport_only(),
            ConfigRevision::V0_4 => PoseCatalog::reference(),
        }
    }

    /// Parses a label such as `v0.4` or `0.4`.
    pub fn parse(label: &str) -> Result<Self> {
        match label.trim_start_matches('v') {
            "0.3" => Ok(ConfigRevision::V0_3),
            "0.4" => Ok(ConfigRevision::V0_4),
            other => Err(Error::ConfigError(format!(
                "Unknown configuration revision '{}'",
                other
            ))),
        }
    }
}

/// Everything a layout computation depends on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutConfig {
    /// Configuration revision.
    pub revision: ConfigRevision,

    /// Platform envelope.
    pub platform: Platform,

    /// Tiers stacked on the platform top, bottom-up.
    pub levels: Vec<LevelSpec>,

    /// Index of the tier the mounting plates rest on.
    pub mount_level: usize,

    /// Modules to place.
    pub modules: Vec<ModuleSpec>,

    /// Supported poses.
    pub poses: PoseCatalog,

    /// Mounting plate parameters.
    pub plate: PlateSpec,

    /// Pivot bracket parameters.
    pub bracket: BracketSpec,
}

impl LayoutConfig {
    /// Creates an empty configuration on `platform`.
    pub fn new(platform: Platform) -> Self {
        Self {
            revision: ConfigRevision::default(),
            platform,
            levels: Vec::new(),
            mount_level: 0,
            modules: Vec::new(),
            poses: PoseCatalog::reference(),
            plate: PlateSpec::default(),
            bracket: BracketSpec::default(),
        }
    }

    /// Built-in configuration for `revision`: two rows of three units on the
    /// second tier.
    pub fn reference(revision: ConfigRevision) -> Self {
        let (width, depth) = REFERENCE_PLATFORM;
        let (lx, ly, lz) = REFERENCE_MODULE_DIMS;
        // Trunnion on the unit's underside.
        let pivot = PivotSpec::new(0.0, -lz);

        Self::new(Platform::new(width, depth).with_top_z(REFERENCE_TOP_Z))
            .with_revision(revision)
            .with_level(LevelSpec::new(25.0, 575.0))
            .with_level(LevelSpec::new(25.0, 1100.0))
            .with_mount_level(1)
            .with_row("L", REFERENCE_ROW_L, &REFERENCE_COLUMNS, (lx, ly, lz), &pivot)
            .with_row("R", REFERENCE_ROW_R, &REFERENCE_COLUMNS, (lx, ly, lz), &pivot)
            .with_plate(PlateSpec::new(20.0, 40.0, 40.0))
    }

    /// Sets the revision and its pose catalog.
    pub fn with_revision(mut self, revision: ConfigRevision) -> Self {
        self.revision = revision;
        self.poses = revision.pose_catalog();
        self
    }

    /// Appends a tier.
    pub fn with_level(mut self, level: LevelSpec) -> Self {
        self.levels.push(level);
        self
    }

    /// Sets the mounting tier.
    pub fn with_mount_level(mut self, index: usize) -> Self {
        self.mount_level = index;
        self
    }

    /// Appends a module.
    pub fn with_module(mut self, module: ModuleSpec) -> Self {
        self.modules.push(module);
        self
    }

    /// Appends a row of identical modules tagged `<side>_<n>`, n from 1.
    pub fn with_row(
        mut self,
        side: &str,
        row_center_y: f64,
        column_centers_x: &[f64],
        dims: (f64, f64, f64),
        pivot: &PivotSpec,
    ) -> Self {
        let (lx, ly, lz) = dims;
        for (j, cx) in column_centers_x.iter().enumerate() {
            let module = ModuleSpec::new(format!("{}_{}", side, j + 1), lx, ly, lz, *cx, row_center_y)
                .with_pivot(pivot.clone());
            self.modules.push(module);
        }
        self
    }

    /// Replaces the pose catalog.
    pub fn with_poses(mut self, poses: PoseCatalog) -> Self {
        self.poses = poses;
        self
    }

    /// Sets the plate spec.
    pub fn with_plate(mut self, plate: PlateSpec) -> Self {
        self.plate = plate;
        self
    }

    /// Resolves the tier stack.
    pub fn level_stack(&self) -> Result<LevelStack> {
        LevelStack::build(self.platform.top_z(), &self.levels)
    }

    /// Validates every part of the configuration.
    pub fn validate(&self) -> Result<()> {
        self.platform.validate()?;
        self.level_stack()?.level(self.mount_level)?;
        self.poses.validate()?;
        self.plate.validate()?;
        self.bracket.validate()?;

        let mut seen = HashSet::new();
        for module in &self.modules {
            module.validate()?;
            if !seen.insert(module.tag().as_str()) {
                return Err(Error::ConfigError(format!(
                    "Duplicate module tag '{}'",
                    module.tag()
                )));
            }
        }
        Ok(())
    }

    /// Reads a configuration from JSON.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::SerializationError(e.to_string()))
    }

    /// Writes the configuration as pretty JSON.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::SerializationError(e.to_string()))
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::reference(ConfigRevision::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{LOAD, TRANSPORT};

    #[test]
    fn test_reference_is_valid() {
        let config = LayoutConfig::reference(ConfigRevision::V0_4);
        assert!(config.validate().is_ok());
        assert_eq!(config.modules.len(), 6);
        assert_eq!(config.modules[0].tag(), "L_1");
        assert_eq!(config.modules[5].tag(), "R_3");
        assert_eq!(config.poses.len(), 3);
    }

    #[test]
    fn test_v0_3_is_transport_only() {
        let config = LayoutConfig::reference(ConfigRevision::V0_3);
        assert!(config.poses.resolve(TRANSPORT).is_ok());
        assert!(matches!(config.poses.resolve(LOAD), Err(Error::UnknownPose(_))));
    }

    #[test]
    fn test_revision_parse() {
        assert_eq!(ConfigRevision::parse("v0.4").unwrap(), ConfigRevision::V0_4);
        assert_eq!(ConfigRevision::parse("0.3").unwrap(), ConfigRevision::V0_3);
        assert!(ConfigRevision::parse("v9").is_err());
    }

    #[test]
    fn test_duplicate_tags_rejected() {
        let config = LayoutConfig::reference(ConfigRevision::V0_4)
            .with_module(ModuleSpec::new("L_1", 100.0, 100.0, 100.0, 500.0, 500.0));
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_mount_level_out_of_range() {
        let config = LayoutConfig::reference(ConfigRevision::V0_4).with_mount_level(7);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidLevel { index: 7, .. })
        ));
    }

    #[test]
    fn test_negative_clearance_rejected() {
        let config = LayoutConfig::reference(ConfigRevision::V0_4)
            .with_level(LevelSpec::new(10.0, -5.0));
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidLevel { index: 2, .. })
        ));
    }
}
