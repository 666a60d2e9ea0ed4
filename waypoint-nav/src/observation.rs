//! Observation of the navigation environment.
use crate::state::AgentState;
use waypoint_core::Obs;

/// The observation handed to the policy: the planar velocity `(vx, vz)`.
///
/// It carries neither the target nor the obstacles. The agent has to learn
/// to navigate from its own motion and the distance shaping of the reward;
/// adding target-relative features would change the learning problem.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct NavObs([f32; 2]);

impl NavObs {
    /// Constructs an observation from velocity components.
    pub fn new(vx: f32, vz: f32) -> Self {
        Self([vx, vz])
    }

    /// Velocity along `x`.
    pub fn vx(&self) -> f32 {
        self.0[0]
    }

    /// Velocity along `z`.
    pub fn vz(&self) -> f32 {
        self.0[1]
    }

    /// The observation vector.
    pub fn as_array(&self) -> [f32; 2] {
        self.0
    }
}

impl Obs for NavObs {
    fn len(&self) -> usize {
        2
    }
}

impl From<NavObs> for Vec<f32> {
    fn from(obs: NavObs) -> Self {
        obs.0.to_vec()
    }
}

/// Builds the observation from the agent state.
///
/// A missing velocity is encoded as `(0, 0)`.
pub fn encode(state: &AgentState) -> NavObs {
    let v = state.planar_velocity();
    NavObs::new(v.x, v.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_encode_planar_velocity() {
        let state = AgentState {
            position: Vec3::new(4.0, 1.0, -2.0),
            velocity: Some(Vec3::new(0.5, 9.0, -1.5)),
        };
        assert_eq!(encode(&state), NavObs::new(0.5, -1.5));
    }

    #[test]
    fn test_missing_velocity_is_zero() {
        let state = AgentState {
            position: Vec3::ZERO,
            velocity: None,
        };
        assert_eq!(encode(&state).as_array(), [0.0, 0.0]);
    }
}
