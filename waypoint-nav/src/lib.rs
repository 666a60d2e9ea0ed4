#![warn(missing_docs)]
//! Planar navigation environment.
//!
//! An agent moves in the `(x, z)` plane of an arena towards a target. The
//! environment, [`NavEnv`], implements [`waypoint_core::Env`] and composes:
//!
//! * [`SpawnSampler`], which places the agent and the target at the start of
//!   every episode,
//! * [`encode`](observation::encode), which turns the agent state into the
//!   observation of the policy,
//! * [`map_action`](action::map_action), which turns the action of the policy
//!   into a motion command,
//! * [`RewardShaper`], which computes the dense reward of a step,
//! * [`EpisodeStateMachine`], which ends episodes on a goal, a collision or a
//!   timeout and starts the next one.
//!
//! Motion and collision detection are delegated to a [`Physics`]
//! implementation; [`KinematicBody`] is the one used without a game engine.
pub mod action;
pub mod arena;
pub mod behavior;
pub mod config;
pub mod episode;
pub mod error;
pub mod geometry;
pub mod observation;
pub mod physics;
pub mod reward;
pub mod spawn;
pub mod state;
mod env;

pub use action::{map_action, MotionCommand, NavAct};
pub use arena::{Arena, Obstacle, ObstacleMap, Occupancy};
pub use behavior::{Behavior, ManualInput, ScriptedInput};
pub use config::{ArenaConfig, EpisodeConfig, NavEnvConfig, RewardConfig, SpawnConfig};
pub use env::{NavEnv, NavInfo};
pub use episode::{
    CollisionEvent, EpisodeContext, EpisodeOutcome, EpisodeState, EpisodeStateMachine,
    TerminationCause,
};
pub use error::NavError;
pub use geometry::ArenaBounds;
pub use observation::NavObs;
pub use physics::{KinematicBody, KinematicConfig, Physics};
pub use reward::{RewardShaper, RewardTerms};
pub use spawn::SpawnSampler;
pub use state::{AgentState, TargetState};
