//! World-plane geometry.
//!
//! Positions are [`Vec3`] in world coordinates. Navigation happens in the
//! `(x, z)` plane; `y` is the out-of-plane coordinate, which spawning keeps
//! fixed.
use crate::error::{finite, NavError};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Projects a world position or velocity onto the `(x, z)` plane.
#[inline]
pub fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Euclidean distance of two positions in the `(x, z)` plane.
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance(planar(b))
}

/// Axis-aligned rectangle of the arena in the `(x, z)` plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    /// Minimum of `x`.
    pub min_x: f32,

    /// Maximum of `x`.
    pub max_x: f32,

    /// Minimum of `z`.
    pub min_z: f32,

    /// Maximum of `z`.
    pub max_z: f32,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            min_x: -20.0,
            max_x: 20.0,
            min_z: -20.0,
            max_z: 20.0,
        }
    }
}

impl ArenaBounds {
    /// Constructs bounds from the ranges of both axes.
    pub fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    /// The center of the arena at height `y`.
    pub fn center(&self, y: f32) -> Vec3 {
        Vec3::new(
            0.5 * (self.min_x + self.max_x),
            y,
            0.5 * (self.min_z + self.max_z),
        )
    }

    /// Returns `true` if the planar part of `p` is inside the bounds, edges included.
    pub fn contains(&self, p: Vec3) -> bool {
        (self.min_x..=self.max_x).contains(&p.x) && (self.min_z..=self.max_z).contains(&p.z)
    }

    /// Returns `true` if the planar part of `p` is inside the bounds shrunk by `margin`.
    pub fn contains_with_margin(&self, p: Vec3, margin: f32) -> bool {
        (self.min_x + margin..=self.max_x - margin).contains(&p.x)
            && (self.min_z + margin..=self.max_z - margin).contains(&p.z)
    }

    /// Checks that both ranges are finite and non-empty.
    pub fn validate(&self) -> Result<(), NavError> {
        finite("bounds.min_x", self.min_x)?;
        finite("bounds.max_x", self.max_x)?;
        finite("bounds.min_z", self.min_z)?;
        finite("bounds.max_z", self.max_z)?;
        if self.min_x >= self.max_x {
            return Err(NavError::invalid("bounds", "min_x must be less than max_x"));
        }
        if self.min_z >= self.max_z {
            return Err(NavError::invalid("bounds", "min_z must be less than max_z"));
        }
        Ok(())
    }

    /// Checks that shrinking the bounds by `margin` on every side leaves a
    /// non-empty sampling window.
    pub fn validate_margin(&self, margin: f32) -> Result<(), NavError> {
        if 2.0 * margin > self.max_x - self.min_x || 2.0 * margin > self.max_z - self.min_z {
            return Err(NavError::invalid(
                "spawn_margin",
                format!("{} leaves no room to spawn inside {:?}", margin, self),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_distance_ignores_height() {
        let a = Vec3::new(0.0, 3.0, 0.0);
        let b = Vec3::new(3.0, -7.0, 4.0);
        assert_eq!(planar_distance(a, b), 5.0);
    }

    #[test]
    fn test_bounds_validation() {
        assert!(ArenaBounds::default().validate().is_ok());
        assert!(ArenaBounds::new(1.0, 1.0, 0.0, 2.0).validate().is_err());
        assert!(ArenaBounds::new(0.0, 1.0, f32::NAN, 2.0).validate().is_err());
        let bounds = ArenaBounds::new(0.0, 4.0, 0.0, 10.0);
        assert!(bounds.validate_margin(2.0).is_ok());
        assert!(bounds.validate_margin(2.5).is_err());
        assert_eq!(bounds.center(1.5), Vec3::new(2.0, 1.5, 5.0));
    }
}
