//! Per-step reward shaping.
use crate::{
    config::RewardConfig,
    episode::EpisodeContext,
    geometry::planar_distance,
    state::{AgentState, TargetState},
};
use waypoint_core::record::{Record, RecordValue};

/// The terms of the reward of one step.
///
/// The reward of the step is the sum of all terms. `terminal` is non-zero
/// only at the step that ends an episode, and it adds to the other terms
/// rather than replacing them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RewardTerms {
    /// Constant penalty applied at every step.
    pub step_penalty: f32,

    /// Decrease of the distance to the target, scaled.
    pub progress: f32,

    /// Penalty for moving slower than the idle threshold, or zero.
    pub idle: f32,

    /// Goal bonus, obstacle penalty or timeout penalty, or zero while the episode continues.
    pub terminal: f32,
}

impl RewardTerms {
    /// The reward of the step.
    pub fn total(&self) -> f32 {
        self.step_penalty + self.progress + self.idle + self.terminal
    }

    /// The terms and their sum as a record.
    pub fn to_record(&self) -> Record {
        Record::from_slice(&[
            ("reward", RecordValue::Scalar(self.total())),
            ("reward_step", RecordValue::Scalar(self.step_penalty)),
            ("reward_progress", RecordValue::Scalar(self.progress)),
            ("reward_idle", RecordValue::Scalar(self.idle)),
            ("reward_terminal", RecordValue::Scalar(self.terminal)),
        ])
    }
}

/// Computes the shaping terms of a step.
#[derive(Clone, Debug)]
pub struct RewardShaper {
    config: RewardConfig,
}

impl RewardShaper {
    /// Constructs a shaper.
    pub fn new(config: RewardConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Computes the step, progress and idle terms for the state reached in
    /// this step, in that order.
    ///
    /// The progress term uses the distance stored in `context`, which is then
    /// overwritten with the current distance. The terminal term is left at
    /// zero; it is resolved by the [`EpisodeStateMachine`].
    ///
    /// [`EpisodeStateMachine`]: crate::EpisodeStateMachine
    pub fn compute_step_reward(
        &self,
        context: &mut EpisodeContext,
        agent: &AgentState,
        target: &TargetState,
    ) -> RewardTerms {
        let step_penalty = self.config.step_penalty;

        let distance = planar_distance(agent.position, target.position);
        let progress =
            (context.prev_distance_to_target() - distance) * self.config.distance_reward_scale;
        context.set_prev_distance_to_target(distance);

        let idle = if agent.planar_velocity().length() < self.config.idle_velocity_threshold {
            self.config.idle_penalty
        } else {
            0.0
        };

        RewardTerms {
            step_penalty,
            progress,
            idle,
            terminal: 0.0,
        }
    }
}
