//! # Swivel Core
//!
//! Layout and pose transforms for rigid swivel units mounted on a multi-tier
//! support platform.
//!
//! Every result is a pure function of the configuration: nothing is cached or
//! mutated between calls, and each (module, pose) pair is computed
//! independently.
//!
//! ## Core Components
//!
//! - **LevelStack**: tier origins from stacked thickness/clearance values
//! - **FootprintProjector**: conservative containment footprint per pose
//! - **PlacementSolver**: clamps module centers into the platform envelope
//! - **PoseTransformBuilder**: spin-then-tilt rigid transform about a pivot
//! - **DependentGeometryGenerator**: mounting plates and pivot brackets
//! - **LayoutEngine**: threads the components into a [`LayoutScene`]
//! - **GeometryKernel**: declarative interface to a solid-modelling kernel
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod config;
pub mod error;
pub mod footprint;
pub mod geometry;
pub mod kernel;
pub mod layout;
pub mod level;
pub mod placement;
pub mod pose;
pub mod pose_transform;
pub mod result;
pub mod support;
pub mod transform;

// Re-exports
pub use config::{ConfigRevision, LayoutConfig};
pub use error::{Error, Result};
pub use footprint::{Footprint, FootprintProjector};
pub use geometry::{Axis, ModuleSpec, ModuleTag, PivotSpec, Platform};
pub use kernel::{build_pose, emit_scene, EmittedModule, GeometryKernel, RecordingKernel, ShapeRequest};
pub use layout::LayoutEngine;
pub use level::{Level, LevelSpec, LevelStack};
pub use placement::{ClampedPlacement, PlacementSolver};
pub use pose::{Pose, PoseCatalog};
pub use pose_transform::PoseTransformBuilder;
pub use result::{LayoutScene, ModuleLayout, SceneSummary};
pub use support::{
    BracketCheek, BracketSpec, DependentGeometryGenerator, MountingPlate, PivotBracket, PlateSpec,
    SupportGeometry,
};
pub use transform::{Aabb3, PoseTransform};
