//! Vertical tier stacking.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One horizontal layer of the support stack.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LevelSpec {
    /// Plate thickness of the tier.
    pub thickness: f64,
    /// Free height above the tier up to the next one.
    pub clearance: f64,
}

impl LevelSpec {
    /// Creates a tier spec.
    pub fn new(thickness: f64, clearance: f64) -> Self {
        Self {
            thickness,
            clearance,
        }
    }

    fn validate(&self, index: usize) -> Result<()> {
        for (label, value) in [("thickness", self.thickness), ("clearance", self.clearance)] {
            if !value.is_finite() {
                return Err(Error::InvalidLevel {
                    index,
                    reason: format!("{} must be finite", label),
                });
            }
            if value < 0.0 {
                return Err(Error::InvalidLevel {
                    index,
                    reason: format!("{} {} is negative", label, value),
                });
            }
        }
        Ok(())
    }
}

/// A resolved tier with its base height.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Level {
    /// Tier index (0-based).
    pub index: usize,
    /// Height of the tier's underside.
    pub base_z: f64,
    /// Plate thickness.
    pub thickness: f64,
    /// Free height above the plate.
    pub clearance: f64,
}

impl Level {
    /// Height of the tier's top surface.
    pub fn top_z(&self) -> f64 {
        self.base_z + self.thickness
    }

    /// Height where the next tier starts.
    pub fn next_base_z(&self) -> f64 {
        self.top_z() + self.clearance
    }
}

/// Tier origins accumulated from a reference height.
///
/// `base(0) = reference` and `base(k+1) = base(k) + thickness(k) + clearance(k)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LevelStack {
    reference_z: f64,
    levels: Vec<Level>,
}

impl LevelStack {
    /// Builds the stack, failing on the first negative or non-finite value.
    pub fn build(reference_z: f64, specs: &[LevelSpec]) -> Result<Self> {
        if !reference_z.is_finite() {
            return Err(Error::InvalidLevel {
                index: 0,
                reason: "reference height must be finite".into(),
            });
        }

        let mut levels = Vec::with_capacity(specs.len());
        let mut base_z = reference_z;
        for (index, spec) in specs.iter().enumerate() {
            spec.validate(index)?;
            let level = Level {
                index,
                base_z,
                thickness: spec.thickness,
                clearance: spec.clearance,
            };
            base_z = level.next_base_z();
            levels.push(level);
        }

        Ok(Self {
            reference_z,
            levels,
        })
    }

    /// Returns the reference height.
    pub fn reference_z(&self) -> f64 {
        self.reference_z
    }

    /// Returns all tiers bottom-up.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Returns the number of tiers.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns true if the stack has no tiers.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Returns a tier by index.
    pub fn level(&self, index: usize) -> Result<&Level> {
        self.levels.get(index).ok_or_else(|| Error::InvalidLevel {
            index,
            reason: format!("stack has only {} tiers", self.levels.len()),
        })
    }

    /// Base height of tier `index`.
    pub fn base(&self, index: usize) -> Result<f64> {
        self.level(index).map(|l| l.base_z)
    }

    /// Top surface height of tier `index`.
    pub fn top(&self, index: usize) -> Result<f64> {
        self.level(index).map(Level::top_z)
    }

    /// Height above the last tier's clearance.
    pub fn ceiling(&self) -> f64 {
        self.levels
            .last()
            .map(Level::next_base_z)
            .unwrap_or(self.reference_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stack_accumulates() {
        let specs = [
            LevelSpec::new(25.0, 575.0),
            LevelSpec::new(25.0, 1100.0),
            LevelSpec::new(0.0, 0.0),
        ];
        let stack = LevelStack::build(120.0, &specs).unwrap();

        assert_eq!(stack.len(), 3);
        assert_relative_eq!(stack.base(0).unwrap(), 120.0);
        assert_relative_eq!(stack.base(1).unwrap(), 720.0);
        assert_relative_eq!(stack.top(1).unwrap(), 745.0);
        assert_relative_eq!(stack.base(2).unwrap(), 1845.0);
        assert_relative_eq!(stack.ceiling(), 1845.0);
    }

    #[test]
    fn test_differences_exact() {
        let specs: Vec<LevelSpec> = (0..20)
            .map(|i| LevelSpec::new(0.1 * i as f64, 1.0 / (i as f64 + 3.0)))
            .collect();
        let stack = LevelStack::build(-7.25, &specs).unwrap();

        for (k, spec) in specs.iter().enumerate().take(specs.len() - 1) {
            let diff = stack.base(k + 1).unwrap() - stack.base(k).unwrap();
            assert!((diff - (spec.thickness + spec.clearance)).abs() <= 1e-9);
            assert!(diff >= 0.0);
        }
    }

    #[test]
    fn test_negative_values_rejected() {
        let specs = [LevelSpec::new(25.0, 10.0), LevelSpec::new(25.0, -1.0)];
        match LevelStack::build(0.0, &specs) {
            Err(Error::InvalidLevel { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidLevel, got {:?}", other),
        }

        let specs = [LevelSpec::new(-0.5, 10.0)];
        assert!(matches!(
            LevelStack::build(0.0, &specs),
            Err(Error::InvalidLevel { index: 0, .. })
        ));
    }

    #[test]
    fn test_out_of_range_tier() {
        let stack = LevelStack::build(0.0, &[LevelSpec::new(10.0, 0.0)]).unwrap();
        assert!(matches!(stack.top(3), Err(Error::InvalidLevel { index: 3, .. })));
    }

    #[test]
    fn test_empty_stack() {
        let stack = LevelStack::build(42.0, &[]).unwrap();
        assert!(stack.is_empty());
        assert_relative_eq!(stack.ceiling(), 42.0);
    }
}
