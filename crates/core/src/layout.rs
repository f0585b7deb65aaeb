//! The layout engine: level stack, clamping, supports and pose transforms
//! threaded into one scene.

use crate::config::LayoutConfig;
use crate::geometry::ModuleSpec;
use crate::level::LevelStack;
use crate::placement::PlacementSolver;
use crate::pose::Pose;
use crate::pose_transform::PoseTransformBuilder;
use crate::result::{LayoutScene, ModuleLayout};
use crate::support::DependentGeometryGenerator;
use crate::Result;
use rayon::prelude::*;

/// Computes layouts from a validated configuration.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Validates `config` and creates an engine for it.
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out every module in the pose named `pose_name`.
    ///
    /// Any failing module aborts the whole layout.
    pub fn compute(&self, pose_name: &str) -> Result<LayoutScene> {
        let pose = self.config.poses.resolve(pose_name)?;
        self.compute_pose(pose)
    }

    /// Lays out every module in the catalog's default (transport) pose.
    pub fn compute_default(&self) -> Result<LayoutScene> {
        let pose = self.config.poses.default_pose()?;
        self.compute_pose(pose)
    }

    /// Lays out every module in an arbitrary pose.
    ///
    /// Any finite angle pair is accepted, but the tilted footprint rule
    /// `Lx·cos(spin) + Lz·sin(tilt)` goes non-positive for spins between 90°
    /// and 270° with little tilt (e.g. 135°/0°). Such poses fail with
    /// [`Error::InvalidGeometry`](crate::Error::InvalidGeometry) instead of
    /// clamping a degenerate footprint.
    pub fn compute_pose(&self, pose: &Pose) -> Result<LayoutScene> {
        pose.validate()?;
        let levels = self.config.level_stack()?;
        let mount_z = levels.top(self.config.mount_level)?;

        log::debug!(
            "Layout {} pose '{}' ({}°/{}°), mount tier {} at z={:.3}",
            self.config.revision.label(),
            pose.name,
            pose.spin_deg,
            pose.tilt_deg,
            self.config.mount_level,
            mount_z
        );

        let modules = self
            .config
            .modules
            .iter()
            .map(|module| self.layout_module(module, pose, mount_z))
            .collect::<Result<Vec<_>>>()?;

        Ok(LayoutScene {
            revision: self.config.revision,
            pose: pose.clone(),
            platform: self.config.platform.clone(),
            levels,
            modules,
        })
    }

    /// Lays out every pose of the catalog, in catalog order.
    ///
    /// Poses are independent and are computed in parallel.
    pub fn compute_catalog(&self) -> Result<Vec<LayoutScene>> {
        self.config
            .poses
            .poses()
            .par_iter()
            .map(|pose| self.compute_pose(pose))
            .collect()
    }

    /// Lays out one module with its plate resting on `mount_z`.
    pub fn layout_module(
        &self,
        module: &ModuleSpec,
        pose: &Pose,
        mount_z: f64,
    ) -> Result<ModuleLayout> {
        let placement = PlacementSolver::new(&self.config.platform).solve(module, pose)?;

        let spin = PoseTransformBuilder::spin_rotation(pose);
        let support = DependentGeometryGenerator::new(&self.config.plate, &self.config.bracket)
            .generate(module, &placement.center, mount_z, &spin)?;

        // Spinning about the pivot lands the module center on the clamped center.
        let rest_origin = placement.rest_origin(
            module.dimensions(),
            support.module_base_z,
            module.pivot(),
            &spin,
        );
        let (transform, posed_origin) = PoseTransformBuilder::new(support.pivot, module.pivot())?
            .build_with_origin(pose, &rest_origin)?;

        log::debug!(
            "Module '{}': footprint {:.3}x{:.3} at ({:.3}, {:.3})",
            module.tag(),
            placement.footprint.x,
            placement.footprint.y,
            placement.origin.x,
            placement.origin.y
        );

        Ok(ModuleLayout {
            tag: module.tag().clone(),
            dimensions: *module.dimensions(),
            placement,
            rest_origin,
            posed_origin,
            transform,
            support,
        })
    }

    /// Resolves the level stack of the configuration.
    pub fn level_stack(&self) -> Result<LevelStack> {
        self.config.level_stack()
    }
}
