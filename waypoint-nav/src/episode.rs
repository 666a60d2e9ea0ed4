//! Episode lifecycle.
use crate::{
    arena::Arena,
    config::{EpisodeConfig, SpawnConfig},
    geometry::planar_distance,
    reward::RewardTerms,
    spawn::SpawnSampler,
    state::{AgentState, TargetState},
};
use glam::Vec3;
use log::{debug, trace};
use std::fmt;
use waypoint_core::record::{Record, RecordValue};

/// Why an episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerminationCause {
    /// The agent reached the target.
    Goal,

    /// The agent hit an obstacle or a wall.
    Obstacle,

    /// The step budget ran out.
    Timeout,
}

impl TerminationCause {
    /// Name used in records and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::Obstacle => "obstacle",
            Self::Timeout => "timeout",
        }
    }

    /// `true` for a timeout, which truncates rather than terminates the episode.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl fmt::Display for TerminationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the episode state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeState {
    /// The episode is running.
    Active,

    /// The episode ended with the given cause.
    Ended(TerminationCause),
}

/// What a collision event means to the episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionKind {
    /// Contact with the target.
    Target,

    /// Contact with an obstacle or a wall.
    Obstacle,

    /// Any other tag; ignored.
    Unrecognized,
}

/// A collision reported by the physics collaborator, identified by a tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    tag: String,
}

impl CollisionEvent {
    /// Constructs an event with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// The tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Classifies the tag: `"target"`, `"obstacle"` and `"wall"` are recognized.
    pub fn kind(&self) -> CollisionKind {
        match self.tag.as_str() {
            "target" => CollisionKind::Target,
            "obstacle" | "wall" => CollisionKind::Obstacle,
            _ => CollisionKind::Unrecognized,
        }
    }
}

/// Mutable bookkeeping of the running episode.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeContext {
    step_index: usize,
    max_steps: usize,
    cumulative_reward: f32,
    prev_distance_to_target: f32,
    state: EpisodeState,
}

impl EpisodeContext {
    /// A fresh, active context.
    ///
    /// `distance_to_target` is the distance between the freshly placed agent
    /// and target.
    pub fn new(max_steps: usize, distance_to_target: f32) -> Self {
        Self {
            step_index: 0,
            max_steps,
            cumulative_reward: 0.0,
            prev_distance_to_target: distance_to_target,
            state: EpisodeState::Active,
        }
    }

    /// Index of the current step within the episode, starting at 0.
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Step budget of the episode; `0` means unlimited.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Sum of the rewards of the episode so far.
    pub fn cumulative_reward(&self) -> f32 {
        self.cumulative_reward
    }

    /// Distance to the target at the end of the previous step.
    pub fn prev_distance_to_target(&self) -> f32 {
        self.prev_distance_to_target
    }

    pub(crate) fn set_prev_distance_to_target(&mut self, d: f32) {
        self.prev_distance_to_target = d;
    }

    /// The state.
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    /// `true` while the episode runs.
    pub fn is_active(&self) -> bool {
        self.state == EpisodeState::Active
    }

    /// The termination cause; `None` while the episode runs.
    pub fn termination_cause(&self) -> Option<TerminationCause> {
        match self.state {
            EpisodeState::Active => None,
            EpisodeState::Ended(cause) => Some(cause),
        }
    }
}

/// Report of a finished episode, sent to the reporting sink.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeOutcome {
    /// Sum of the rewards of the episode, terminal reward included.
    pub cumulative_reward: f32,

    /// Why the episode ended.
    pub cause: TerminationCause,

    /// Number of steps of the episode.
    pub steps: usize,
}

impl EpisodeOutcome {
    /// The outcome as a record with `episode_return`, `termination` and `episode_steps`.
    pub fn to_record(&self) -> Record {
        Record::from_slice(&[
            ("episode_return", RecordValue::Scalar(self.cumulative_reward)),
            (
                "termination",
                RecordValue::String(self.cause.as_str().to_string()),
            ),
            ("episode_steps", RecordValue::Scalar(self.steps as f32)),
        ])
    }
}

/// Result of evaluating the termination conditions of a step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transition {
    /// The episode goes on.
    Continue,

    /// The episode ends.
    End {
        /// Why.
        cause: TerminationCause,

        /// Terminal reward added to the step.
        terminal_reward: f32,
    },
}

/// Positions and context of a freshly started episode.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeStart {
    /// Context of the new episode.
    pub context: EpisodeContext,

    /// The agent, at rest at its spawn position.
    pub agent: AgentState,

    /// The target.
    pub target: TargetState,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Decides when and why an episode ends, and prepares the next one.
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Active: begin
///     Active --> Active: no collision, budget left / step_index += 1
///     Active --> Ended: collision "target" / + goal_bonus
///     Active --> Ended: collision "obstacle" or "wall" / + obstacle_penalty
///     Active --> Ended: step_index >= max_steps - 1 / + time_out_penalty
///     Ended --> Active: begin (re-spawn)
/// ```
///
/// Conditions are checked in the order above and the first match wins, so a
/// step that touches both the target and an obstacle counts as a goal.
/// Collisions with unrecognized tags are ignored. With `max_steps == 0` an
/// episode only ends by collision.
pub struct EpisodeStateMachine {
    config: EpisodeConfig,
    spawn: SpawnConfig,
    sampler: SpawnSampler,
    arena: Arena,
}

impl EpisodeStateMachine {
    /// Constructs the state machine.
    pub fn new(config: EpisodeConfig, spawn: SpawnConfig, arena: Arena, sampler: SpawnSampler) -> Self {
        Self {
            config,
            spawn,
            sampler,
            arena,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &EpisodeConfig {
        &self.config
    }

    /// Restarts the random sequence of the spawn sampler.
    pub fn reseed(&mut self, seed: u64) {
        self.sampler.reseed(seed);
    }

    /// Samples the agent, then the target away from it, and returns a fresh context.
    ///
    /// `height` is the current out-of-plane coordinate of the agent, kept as is.
    pub fn begin(&mut self, height: f32) -> EpisodeStart {
        let agent = self.sampler.sample_position(&self.arena, &self.spawn, height);
        let target = self
            .sampler
            .sample_target_position(&self.arena, &self.spawn, agent);
        self.begin_at(agent, target)
    }

    /// Starts an episode with the given positions instead of sampling them.
    pub fn begin_at(&self, agent: Vec3, target: Vec3) -> EpisodeStart {
        EpisodeStart {
            context: EpisodeContext::new(self.config.max_steps, planar_distance(agent, target)),
            agent: AgentState::at_rest(agent),
            target: TargetState { position: target },
        }
    }

    /// Evaluates the termination conditions of the current step.
    pub fn resolve(&self, context: &EpisodeContext, events: &[CollisionEvent]) -> Transition {
        let mut hit_obstacle = false;
        for event in events.iter() {
            match event.kind() {
                CollisionKind::Target => {
                    return Transition::End {
                        cause: TerminationCause::Goal,
                        terminal_reward: self.config.goal_bonus,
                    }
                }
                CollisionKind::Obstacle => hit_obstacle = true,
                CollisionKind::Unrecognized => trace!("Ignore collision tag '{}'", event.tag()),
            }
        }

        if hit_obstacle {
            Transition::End {
                cause: TerminationCause::Obstacle,
                terminal_reward: self.config.obstacle_penalty,
            }
        } else if context.max_steps > 0 && context.step_index + 1 >= context.max_steps {
            Transition::End {
                cause: TerminationCause::Timeout,
                terminal_reward: self.config.time_out_penalty,
            }
        } else {
            Transition::Continue
        }
    }

    /// Completes a step: adds the terminal reward to `terms`, accumulates the
    /// step reward, and either advances the step index or ends the episode.
    ///
    /// Returns the outcome when the episode ended. Calling this on an ended
    /// context does nothing.
    pub fn tick(
        &self,
        context: &mut EpisodeContext,
        terms: &mut RewardTerms,
        events: &[CollisionEvent],
    ) -> Option<EpisodeOutcome> {
        if !context.is_active() {
            return None;
        }

        let transition = self.resolve(context, events);
        if let Transition::End {
            terminal_reward, ..
        } = transition
        {
            terms.terminal = terminal_reward;
        }
        context.cumulative_reward += terms.total();

        match transition {
            Transition::Continue => {
                context.step_index += 1;
                None
            }
            Transition::End { cause, .. } => {
                context.state = EpisodeState::Ended(cause);
                let outcome = EpisodeOutcome {
                    cumulative_reward: context.cumulative_reward,
                    cause,
                    steps: context.step_index + 1,
                };
                debug!(
                    "Episode ended by {} after {} steps, return = {}",
                    cause, outcome.steps, outcome.cumulative_reward
                );
                Some(outcome)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{arena::ObstacleMap, geometry::ArenaBounds};
    use std::sync::Arc;

    fn machine(max_steps: usize) -> EpisodeStateMachine {
        let arena = Arena::new(ArenaBounds::default(), Arc::new(ObstacleMap::default())).unwrap();
        EpisodeStateMachine::new(
            EpisodeConfig {
                max_steps,
                ..EpisodeConfig::default()
            },
            SpawnConfig::default(),
            arena,
            SpawnSampler::from_seed(0),
        )
    }

    fn step_terms() -> RewardTerms {
        RewardTerms {
            step_penalty: -0.001,
            progress: 0.0,
            idle: 0.0,
            terminal: 0.0,
        }
    }

    #[test]
    fn test_collision_tags() {
        assert_eq!(CollisionEvent::new("target").kind(), CollisionKind::Target);
        assert_eq!(CollisionEvent::new("obstacle").kind(), CollisionKind::Obstacle);
        assert_eq!(CollisionEvent::new("wall").kind(), CollisionKind::Obstacle);
        assert_eq!(CollisionEvent::new("road").kind(), CollisionKind::Unrecognized);
    }

    #[test]
    fn test_goal_wins_over_obstacle() {
        let m = machine(100);
        let mut ctx = EpisodeContext::new(100, 3.0);
        let mut terms = step_terms();
        let events = [CollisionEvent::new("obstacle"), CollisionEvent::new("target")];

        let outcome = m.tick(&mut ctx, &mut terms, &events).unwrap();
        assert_eq!(outcome.cause, TerminationCause::Goal);
        assert_eq!(terms.terminal, 10.0);
        assert_eq!(ctx.termination_cause(), Some(TerminationCause::Goal));
    }

    #[test]
    fn test_obstacle_ends_episode_with_penalty() {
        let m = machine(100);
        let mut ctx = EpisodeContext::new(100, 3.0);
        let mut terms = step_terms();
        let outcome = m
            .tick(&mut ctx, &mut terms, &[CollisionEvent::new("wall")])
            .unwrap();
        assert_eq!(outcome.cause, TerminationCause::Obstacle);
        assert_eq!(terms.terminal, -10.0);
        assert_eq!(outcome.cumulative_reward, -0.001 + -10.0);
        assert_eq!(outcome.steps, 1);
    }

    #[test]
    fn test_unrecognized_tag_is_ignored() {
        let m = machine(100);
        let mut ctx = EpisodeContext::new(100, 3.0);
        let mut terms = step_terms();
        let outcome = m.tick(&mut ctx, &mut terms, &[CollisionEvent::new("checkpoint")]);
        assert!(outcome.is_none());
        assert!(ctx.is_active());
        assert_eq!(ctx.step_index(), 1);
        assert_eq!(terms.terminal, 0.0);
    }

    #[test]
    fn test_timeout_at_last_step() {
        let m = machine(5);
        let mut ctx = EpisodeContext::new(5, 3.0);

        for tick in 1..=4 {
            let mut terms = step_terms();
            assert!(m.tick(&mut ctx, &mut terms, &[]).is_none(), "tick {}", tick);
            assert_eq!(ctx.step_index(), tick);
        }

        let mut terms = step_terms();
        assert_eq!(ctx.step_index(), 4);
        let outcome = m.tick(&mut ctx, &mut terms, &[]).unwrap();
        assert_eq!(outcome.cause, TerminationCause::Timeout);
        assert_eq!(outcome.steps, 5);
        assert_eq!(terms.terminal, EpisodeConfig::default().time_out_penalty);
        assert!(outcome.cause.is_truncation());

        // An ended context is left alone.
        let mut terms = step_terms();
        assert!(m.tick(&mut ctx, &mut terms, &[]).is_none());
        assert_eq!(ctx.step_index(), 4);
    }

    #[test]
    fn test_zero_max_steps_disables_timeout() {
        let m = machine(0);
        let mut ctx = EpisodeContext::new(0, 3.0);
        for _ in 0..10_000 {
            let mut terms = step_terms();
            assert!(m.tick(&mut ctx, &mut terms, &[]).is_none());
        }
        assert_eq!(ctx.step_index(), 10_000);
    }

    #[test]
    fn test_begin_samples_fresh_context() {
        let mut m = machine(50);
        let start = m.begin(0.5);
        assert_eq!(start.context.step_index(), 0);
        assert_eq!(start.context.cumulative_reward(), 0.0);
        assert!(start.context.is_active());
        assert_eq!(
            start.context.prev_distance_to_target(),
            planar_distance(start.agent.position, start.target.position)
        );
        assert!(start.context.prev_distance_to_target() >= 5.0);
        assert_eq!(start.agent.velocity, Some(Vec3::ZERO));
        assert_eq!(start.agent.position.y, 0.5);
    }
}
