//! Kinematic state of the agent and the target.
use crate::geometry::planar;
use glam::{Vec2, Vec3};

/// Kinematic state of the agent, as reported by the physics collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentState {
    /// World position.
    pub position: Vec3,

    /// World velocity, `None` if the physics collaborator has no velocity source.
    pub velocity: Option<Vec3>,
}

impl AgentState {
    /// An agent at rest at `position`.
    pub fn at_rest(position: Vec3) -> Self {
        Self {
            position,
            velocity: Some(Vec3::ZERO),
        }
    }

    /// Velocity in the `(x, z)` plane; zero when unavailable.
    pub fn planar_velocity(&self) -> Vec2 {
        self.velocity.map(planar).unwrap_or(Vec2::ZERO)
    }
}

/// The target of the current episode. Static during the episode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetState {
    /// World position.
    pub position: Vec3,
}
