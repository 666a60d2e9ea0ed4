//! Action of the navigation environment and its mapping to a motion command.
use glam::{Vec2, Vec3};
use waypoint_core::Act;

/// Raw action of the policy, `(a0, a1)`.
///
/// Components are meant to lie in `[-1, 1]`, but nothing guarantees it;
/// [`map_action`] clamps them.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct NavAct([f32; 2]);

impl NavAct {
    /// Constructs an action.
    pub fn new(a0: f32, a1: f32) -> Self {
        Self([a0, a1])
    }

    /// The action vector.
    pub fn as_array(&self) -> [f32; 2] {
        self.0
    }
}

impl Act for NavAct {
    fn len(&self) -> usize {
        2
    }
}

impl From<[f32; 2]> for NavAct {
    fn from(a: [f32; 2]) -> Self {
        Self(a)
    }
}

/// A planar direction of motion with length 1, or zero.
///
/// The physics collaborator scales it by its speed.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct MotionCommand(Vec2);

impl MotionCommand {
    /// No motion.
    pub const STOP: Self = Self(Vec2::ZERO);

    /// Direction in the `(x, z)` plane.
    pub fn direction(&self) -> Vec2 {
        self.0
    }

    /// Direction as a world vector with no out-of-plane component.
    pub fn to_world(self) -> Vec3 {
        Vec3::new(self.0.x, 0.0, self.0.y)
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-1.0, 1.0)
    }
}

/// Clamps each component to `[-1, 1]`, then normalizes the pair to unit length.
///
/// Clamping comes first so that out-of-range input never yields a longer
/// command. A zero vector stays zero. `NaN` components count as zero.
pub fn map_action(raw: &NavAct) -> MotionCommand {
    let [a0, a1] = raw.0;
    let v = Vec2::new(clamp_unit(a0), clamp_unit(a1));
    MotionCommand(v.normalize_or_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(map_action(&NavAct::new(2.0, 0.0)).direction(), Vec2::new(1.0, 0.0));
        assert_eq!(map_action(&NavAct::new(0.0, -7.5)).direction(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_zero_stays_zero() {
        assert_eq!(map_action(&NavAct::new(0.0, 0.0)), MotionCommand::STOP);
        assert_eq!(map_action(&NavAct::new(f32::NAN, 0.0)), MotionCommand::STOP);
    }

    #[test]
    fn test_diagonal_is_unit_with_equal_components() {
        let d = map_action(&NavAct::new(1.0, 1.0)).direction();
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert_eq!(d.x, d.y);

        // (3, 0.5) clamps to (1, 0.5) before normalizing, not (3, 0.5).
        let d = map_action(&NavAct::new(3.0, 0.5)).direction();
        let expected = Vec2::new(1.0, 0.5).normalize();
        assert!((d - expected).length() < 1e-6);
    }

    #[test]
    fn test_world_direction() {
        let cmd = map_action(&NavAct::new(0.0, 0.3));
        assert_eq!(cmd.to_world(), Vec3::new(0.0, 0.0, 1.0));
    }
}
