//! Physics collaborator.
//!
//! The environment never moves the agent itself. It hands a
//! [`MotionCommand`] to a [`Physics`] implementation, lets it advance one
//! fixed time step, and reads back the kinematic state and the collisions
//! of that step. A game engine binding implements [`Physics`] on top of its
//! own rigid bodies; [`KinematicBody`] is a standalone implementation used
//! for training without an engine and in tests.
use crate::{
    action::MotionCommand,
    arena::Arena,
    episode::CollisionEvent,
    error::{non_negative, NavError},
    geometry::planar_distance,
    state::AgentState,
};
use anyhow::Result;
use glam::Vec3;
use log::trace;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Debug;

/// The rigid-body side of the environment.
pub trait Physics {
    /// Configuration.
    type Config: Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned;

    /// Builds the physics of the agent in `arena`.
    fn build(config: &Self::Config, arena: &Arena) -> Result<Self>
    where
        Self: Sized;

    /// Sets the command applied during the following [`Physics::advance`] calls.
    fn set_motion_command(&mut self, command: MotionCommand);

    /// Advances one fixed time step and returns the collisions that occurred.
    fn advance(&mut self) -> Vec<CollisionEvent>;

    /// Current position and velocity of the agent.
    fn kinematic_state(&self) -> AgentState;

    /// Teleports the agent and zeroes its velocity.
    fn place_agent(&mut self, position: Vec3);

    /// Moves the target.
    fn place_target(&mut self, position: Vec3);
}

/// Configuration of [`KinematicBody`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicConfig {
    /// Planar speed for a command of length 1.
    pub speed: f32,

    /// Length of a time step in seconds.
    pub dt: f32,

    /// Radius of the agent.
    pub agent_radius: f32,

    /// Radius of the target.
    pub target_radius: f32,
}

impl Default for KinematicConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            dt: 0.02,
            agent_radius: 0.5,
            target_radius: 0.5,
        }
    }
}

impl KinematicConfig {
    /// Checks the ranges of the values.
    pub fn validate(&self) -> Result<(), NavError> {
        non_negative("physics.speed", self.speed)?;
        non_negative("physics.dt", self.dt)?;
        if self.dt == 0.0 {
            return Err(NavError::invalid("physics.dt", "must be positive"));
        }
        non_negative("physics.agent_radius", self.agent_radius)?;
        non_negative("physics.target_radius", self.target_radius)
    }
}

/// A massless disc that moves at constant speed in the commanded direction.
///
/// Collisions are reported with the tags `"target"`, `"obstacle"` and
/// `"wall"`; the body is not stopped by them.
#[derive(Clone, Debug)]
pub struct KinematicBody {
    config: KinematicConfig,
    arena: Arena,
    position: Vec3,
    velocity: Vec3,
    command: MotionCommand,
    target: Vec3,
}

impl Physics for KinematicBody {
    type Config = KinematicConfig;

    fn build(config: &Self::Config, arena: &Arena) -> Result<Self> {
        config.validate()?;
        let center = arena.bounds().center(0.0);
        Ok(Self {
            config: config.clone(),
            arena: arena.clone(),
            position: center,
            velocity: Vec3::ZERO,
            command: MotionCommand::STOP,
            target: center,
        })
    }

    fn set_motion_command(&mut self, command: MotionCommand) {
        self.command = command;
    }

    fn advance(&mut self) -> Vec<CollisionEvent> {
        self.velocity = self.command.to_world() * self.config.speed;
        self.position += self.velocity * self.config.dt;

        let r = self.config.agent_radius;
        let mut events = vec![];
        if planar_distance(self.position, self.target) < r + self.config.target_radius {
            events.push(CollisionEvent::new("target"));
        }
        if self.arena.is_occupied(self.position, r) {
            events.push(CollisionEvent::new("obstacle"));
        }
        if !self.arena.bounds().contains_with_margin(self.position, r) {
            events.push(CollisionEvent::new("wall"));
        }
        if !events.is_empty() {
            trace!("Collisions at {:?}: {:?}", self.position, events);
        }
        events
    }

    fn kinematic_state(&self) -> AgentState {
        AgentState {
            position: self.position,
            velocity: Some(self.velocity),
        }
    }

    fn place_agent(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
    }

    fn place_target(&mut self, position: Vec3) {
        self.target = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        action::{map_action, NavAct},
        arena::{Obstacle, ObstacleMap},
        geometry::ArenaBounds,
    };
    use std::sync::Arc;

    fn body(obstacles: Vec<Obstacle>) -> KinematicBody {
        let arena = Arena::new(
            ArenaBounds::new(-5.0, 5.0, -5.0, 5.0),
            Arc::new(ObstacleMap::new(obstacles).unwrap()),
        )
        .unwrap();
        let mut body = KinematicBody::build(&KinematicConfig::default(), &arena).unwrap();
        body.place_target(Vec3::new(4.0, 0.0, 4.0));
        body
    }

    #[test]
    fn test_moves_at_configured_speed() {
        let mut body = body(vec![]);
        body.place_agent(Vec3::new(0.0, 0.5, 0.0));
        body.set_motion_command(map_action(&NavAct::new(1.0, 0.0)));
        assert!(body.advance().is_empty());

        let state = body.kinematic_state();
        assert!((state.position.x - 0.1).abs() < 1e-6);
        assert_eq!(state.position.y, 0.5);
        assert_eq!(state.velocity, Some(Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_place_agent_zeroes_velocity() {
        let mut body = body(vec![]);
        body.set_motion_command(map_action(&NavAct::new(0.0, 1.0)));
        body.advance();
        body.place_agent(Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(body.kinematic_state(), AgentState::at_rest(Vec3::new(1.0, 0.0, 1.0)));
    }

    #[test]
    fn test_reports_collisions() {
        let mut body = body(vec![Obstacle::Circle {
            x: -3.0,
            z: 0.0,
            radius: 1.0,
        }]);

        body.place_agent(Vec3::new(3.6, 0.0, 4.0));
        let tags: Vec<_> = body.advance().iter().map(|e| e.tag().to_string()).collect();
        assert_eq!(tags, vec!["target"]);

        body.place_agent(Vec3::new(-1.6, 0.0, 0.0));
        let tags: Vec<_> = body.advance().iter().map(|e| e.tag().to_string()).collect();
        assert_eq!(tags, vec!["obstacle"]);

        body.place_agent(Vec3::new(0.0, 0.0, -4.8));
        let tags: Vec<_> = body.advance().iter().map(|e| e.tag().to_string()).collect();
        assert_eq!(tags, vec!["wall"]);
    }

    #[test]
    fn test_invalid_config() {
        let config = KinematicConfig {
            dt: 0.0,
            ..KinematicConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
