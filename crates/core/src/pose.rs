//! Operating poses and the pose catalog.
//!
//! A pose is a `(spin, tilt)` angle pair in degrees. Spin turns a module about
//! its own vertical centerline, tilt turns it about the transverse pivot axis.
//! Spin is always applied first.

use crate::{Error, Result};
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name of the rest pose every catalog falls back to when no pose is chosen.
pub const TRANSPORT: &str = "transport";
/// Name of the loading pose (spun a quarter turn).
pub const LOAD: &str = "load";
/// Name of the operating pose (spun and tilted).
pub const USE: &str = "use";

/// A named spin/tilt attitude.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// Pose name.
    pub name: String,
    /// Rotation about the vertical centerline in degrees.
    pub spin_deg: f64,
    /// Rotation about the tilt axis in degrees.
    pub tilt_deg: f64,
}

impl Pose {
    /// Creates a pose from an arbitrary angle pair.
    pub fn new(name: impl Into<String>, spin_deg: f64, tilt_deg: f64) -> Self {
        Self {
            name: name.into(),
            spin_deg,
            tilt_deg,
        }
    }

    /// The rest pose, 0°/0°.
    pub fn transport() -> Self {
        Self::new(TRANSPORT, 0.0, 0.0)
    }

    /// The loading pose, 90°/0°.
    pub fn load() -> Self {
        Self::new(LOAD, 90.0, 0.0)
    }

    /// The operating pose, 33°/49°.
    pub fn operating() -> Self {
        Self::new(USE, 33.0, 49.0)
    }

    /// Spin normalized into `[0, 360)`.
    pub fn normalized_spin(&self) -> f64 {
        let spin = self.spin_deg.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if spin >= 360.0 {
            0.0
        } else {
            spin
        }
    }

    /// Spin in radians.
    pub fn spin_rad(&self) -> f64 {
        self.spin_deg.to_radians()
    }

    /// Tilt in radians.
    pub fn tilt_rad(&self) -> f64 {
        self.tilt_deg.to_radians()
    }

    /// True when the pose leaves a module in its rest orientation.
    pub fn is_rest(&self) -> bool {
        self.normalized_spin() == 0.0 && self.tilt_deg == 0.0
    }

    /// Label used in feature names, e.g. `33_49`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.spin_deg, self.tilt_deg)
    }

    /// Validates name and angles.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::ConfigError("Pose name must not be empty".into()));
        }
        if !(self.spin_deg.is_finite() && self.tilt_deg.is_finite()) {
            return Err(Error::ConfigError(format!(
                "Angles for pose '{}' must be finite",
                self.name
            )));
        }
        Ok(())
    }
}

/// The finite set of poses a configuration supports.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoseCatalog {
    poses: Vec<Pose>,
}

impl PoseCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self { poses: Vec::new() }
    }

    /// Catalog holding only the transport pose.
    pub fn transport_only() -> Self {
        Self::new().with_pose(Pose::transport())
    }

    /// Transport, load and use.
    pub fn reference() -> Self {
        Self::new()
            .with_pose(Pose::transport())
            .with_pose(Pose::load())
            .with_pose(Pose::operating())
    }

    /// Adds a pose, replacing any existing pose of the same name.
    pub fn with_pose(mut self, pose: Pose) -> Self {
        match self.poses.iter_mut().find(|p| p.name == pose.name) {
            Some(existing) => *existing = pose,
            None => self.poses.push(pose),
        }
        self
    }

    /// Looks up a pose by name.
    ///
    /// Unknown names are an error; there is no silent fallback.
    pub fn resolve(&self, name: &str) -> Result<&Pose> {
        self.poses
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::UnknownPose(name.to_string()))
    }

    /// Returns the pose used when no selector is given.
    pub fn default_pose(&self) -> Result<&Pose> {
        self.resolve(TRANSPORT)
    }

    /// Returns all poses in insertion order.
    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    /// Returns all pose names.
    pub fn names(&self) -> Vec<&str> {
        self.poses.iter().map(|p| p.name.as_str()).collect()
    }

    /// Returns the number of poses.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Returns true if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Validates every pose, rejects duplicate names and requires a
    /// transport entry.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for pose in &self.poses {
            pose.validate()?;
            if !seen.insert(pose.name.as_str()) {
                return Err(Error::ConfigError(format!(
                    "Duplicate pose name '{}'",
                    pose.name
                )));
            }
        }
        self.default_pose()
            .map(|_| ())
            .map_err(|_| Error::ConfigError("Pose catalog must contain 'transport'".into()))
    }
}

impl Default for PoseCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_catalog() {
        let catalog = PoseCatalog::reference();
        assert_eq!(catalog.names(), vec![TRANSPORT, LOAD, USE]);
        assert_eq!(catalog.resolve(USE).unwrap().tilt_deg, 49.0);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_unknown_pose_does_not_fall_back() {
        let catalog = PoseCatalog::reference();
        match catalog.resolve("spin") {
            Err(Error::UnknownPose(name)) => assert_eq!(name, "spin"),
            other => panic!("expected UnknownPose, got {:?}", other),
        }
        // Lookup is exact; no case folding.
        assert!(catalog.resolve("Transport").is_err());
    }

    #[test]
    fn test_with_pose_replaces() {
        let catalog = PoseCatalog::reference().with_pose(Pose::new(USE, 30.0, 45.0));
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.resolve(USE).unwrap().spin_deg, 30.0);
    }

    #[test]
    fn test_normalized_spin() {
        assert_eq!(Pose::new("a", 450.0, 0.0).normalized_spin(), 90.0);
        assert_eq!(Pose::new("b", -90.0, 0.0).normalized_spin(), 270.0);
        assert!(Pose::new("c", 360.0, 0.0).is_rest());
        assert!(!Pose::load().is_rest());
    }

    #[test]
    fn test_catalog_requires_transport() {
        let catalog = PoseCatalog::new().with_pose(Pose::load());
        assert!(matches!(catalog.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_duplicate_pose_names_rejected() {
        let catalog = PoseCatalog {
            poses: vec![Pose::transport(), Pose::load(), Pose::new(LOAD, 45.0, 0.0)],
        };
        match catalog.validate() {
            Err(Error::ConfigError(msg)) => assert!(msg.contains("load")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_label() {
        assert_eq!(Pose::operating().label(), "33_49");
    }
}
