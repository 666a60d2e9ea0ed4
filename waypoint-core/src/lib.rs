#![warn(missing_docs)]
//! Core traits and orchestration loops for waypoint.
//!
//! This crate is independent of the navigation task. It defines how an
//! environment ([`Env`]) and a policy ([`Policy`]) interact through
//! observations ([`Obs`]) and actions ([`Act`]), how each interaction is
//! reported ([`Step`], [`record::Record`]), and the loops that drive them
//! ([`Rollout`], [`Runner`], [`ParallelRunner`], [`Evaluator`]).
pub mod error;
pub mod record;

mod base;
pub use base::{Act, Env, Info, Obs, Policy, Step};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod runner;
pub use runner::{ParallelRunner, Rollout, Runner, RunnerConfig, RunnerStat};
