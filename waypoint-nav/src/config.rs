//! Configuration of [`NavEnv`](crate::NavEnv).
//!
//! Every section has defaults, so a YAML file only needs the values it
//! changes. [`NavEnvConfig::validate`] is called when an environment is
//! built and rejects values that would silently change the learning problem.
use crate::{
    arena::Obstacle,
    error::{finite, non_negative, NavError},
    geometry::ArenaBounds,
    physics::KinematicConfig,
};
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Static scene description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Bounds of the arena.
    pub bounds: ArenaBounds,

    /// Obstacles inside the arena.
    pub obstacles: Vec<Obstacle>,

    /// Out-of-plane coordinate of the agent when the environment is built.
    pub agent_height: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            bounds: ArenaBounds::default(),
            obstacles: vec![],
            agent_height: 0.5,
        }
    }
}

/// Parameters of the spawn sampler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Distance kept from the arena bounds when sampling.
    pub spawn_margin: f32,

    /// Radius of the disc that must be free of obstacles.
    pub check_radius: f32,

    /// Number of candidates drawn before falling back.
    pub max_spawn_tries: usize,

    /// Minimum planar distance between the agent and the target.
    pub min_target_separation: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            spawn_margin: 1.0,
            check_radius: 1.0,
            max_spawn_tries: 30,
            min_target_separation: 5.0,
        }
    }
}

impl SpawnConfig {
    /// Checks the ranges of the values.
    pub fn validate(&self) -> Result<(), NavError> {
        non_negative("spawn_margin", self.spawn_margin)?;
        non_negative("check_radius", self.check_radius)?;
        non_negative("min_target_separation", self.min_target_separation)?;
        if self.max_spawn_tries == 0 {
            return Err(NavError::invalid("max_spawn_tries", "must be positive"));
        }
        Ok(())
    }
}

/// Weights of the per-step shaping terms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Reward added at every step, typically a small negative constant.
    pub step_penalty: f32,

    /// Scale of the decrease of the distance to the target.
    pub distance_reward_scale: f32,

    /// Planar speed below which the agent is considered idle.
    pub idle_velocity_threshold: f32,

    /// Reward added at a step where the agent is idle.
    pub idle_penalty: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            step_penalty: -0.001,
            distance_reward_scale: 0.01,
            idle_velocity_threshold: 0.1,
            idle_penalty: -0.01,
        }
    }
}

impl RewardConfig {
    /// Checks the ranges of the values.
    pub fn validate(&self) -> Result<(), NavError> {
        finite("step_penalty", self.step_penalty)?;
        finite("distance_reward_scale", self.distance_reward_scale)?;
        non_negative("idle_velocity_threshold", self.idle_velocity_threshold)?;
        finite("idle_penalty", self.idle_penalty)
    }
}

/// Episode length and terminal rewards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    /// Number of steps after which an episode times out; `0` disables the timeout.
    pub max_steps: usize,

    /// Terminal reward when the agent reaches the target.
    pub goal_bonus: f32,

    /// Terminal reward when the agent hits an obstacle or a wall.
    pub obstacle_penalty: f32,

    /// Terminal reward when the episode times out.
    pub time_out_penalty: f32,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            goal_bonus: 10.0,
            obstacle_penalty: -10.0,
            time_out_penalty: -1.0,
        }
    }
}

impl EpisodeConfig {
    /// Checks the ranges of the values.
    pub fn validate(&self) -> Result<(), NavError> {
        finite("goal_bonus", self.goal_bonus)?;
        finite("obstacle_penalty", self.obstacle_penalty)?;
        finite("time_out_penalty", self.time_out_penalty)
    }
}

/// Configuration of [`NavEnv`](crate::NavEnv).
///
/// `C` is the configuration of the physics collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "C: Deserialize<'de> + Default"))]
pub struct NavEnvConfig<C = KinematicConfig> {
    /// Scene.
    pub arena: ArenaConfig,

    /// Spawn sampler.
    pub spawn: SpawnConfig,

    /// Shaping terms.
    pub reward: RewardConfig,

    /// Episode length and terminal rewards.
    pub episode: EpisodeConfig,

    /// Physics collaborator.
    pub physics: C,
}

impl<C: Default> Default for NavEnvConfig<C> {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            spawn: SpawnConfig::default(),
            reward: RewardConfig::default(),
            episode: EpisodeConfig::default(),
            physics: C::default(),
        }
    }
}

impl<C> NavEnvConfig<C> {
    /// Sets the arena.
    pub fn arena(mut self, v: ArenaConfig) -> Self {
        self.arena = v;
        self
    }

    /// Sets the spawn parameters.
    pub fn spawn(mut self, v: SpawnConfig) -> Self {
        self.spawn = v;
        self
    }

    /// Sets the shaping terms.
    pub fn reward(mut self, v: RewardConfig) -> Self {
        self.reward = v;
        self
    }

    /// Sets the episode parameters.
    pub fn episode(mut self, v: EpisodeConfig) -> Self {
        self.episode = v;
        self
    }

    /// Sets the maximum number of steps of an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.episode.max_steps = v;
        self
    }

    /// Sets the physics configuration.
    pub fn physics(mut self, v: C) -> Self {
        self.physics = v;
        self
    }

    /// Checks everything but the physics section, which is checked by the
    /// physics collaborator when it is built.
    pub fn validate(&self) -> Result<(), NavError> {
        self.arena.bounds.validate()?;
        self.arena.bounds.validate_margin(self.spawn.spawn_margin)?;
        self.validate_without_bounds()
    }

    /// Like [`NavEnvConfig::validate`], but skips the checks against
    /// `arena.bounds`. Used when the scene supplies the arena.
    pub fn validate_without_bounds(&self) -> Result<(), NavError> {
        finite("agent_height", self.arena.agent_height)?;
        self.spawn.validate()?;
        self.reward.validate()?;
        self.episode.validate()
    }
}

impl<C: Serialize + DeserializeOwned + Default> NavEnvConfig<C> {
    /// Constructs [`NavEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`NavEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
