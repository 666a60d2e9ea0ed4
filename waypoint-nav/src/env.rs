//! The navigation environment.
use crate::{
    action::{map_action, NavAct},
    arena::Arena,
    config::NavEnvConfig,
    episode::{CollisionEvent, EpisodeContext, EpisodeOutcome, EpisodeStart, EpisodeStateMachine},
    observation::{encode, NavObs},
    physics::{KinematicBody, Physics},
    reward::{RewardShaper, RewardTerms},
    spawn::SpawnSampler,
    state::{AgentState, TargetState},
};
use anyhow::Result;
use glam::Vec3;
use waypoint_core::{record::Record, Env, Info, Step};

/// Information attached to every step of [`NavEnv`].
#[derive(Clone, Debug, PartialEq)]
pub struct NavInfo {
    /// Reward terms of the step.
    pub terms: RewardTerms,

    /// Collisions reported by the physics in this step.
    pub events: Vec<CollisionEvent>,

    /// Set when the step ended an episode.
    pub outcome: Option<EpisodeOutcome>,
}

impl Info for NavInfo {}

/// A single agent navigating towards a target in a planar arena.
///
/// Every call to [`Env::step`] is one tick: the action is mapped to a motion
/// command, the physics advances one time step, and the observation, the
/// reward and the episode state are computed from the resulting state.
///
/// When a tick ends an episode, the environment starts the next one before
/// returning: the agent and the target are re-spawned, the context is
/// replaced by a fresh one, and the first observation of the new episode is
/// given in [`Step::init_obs`]. The step itself still carries the observation
/// and the reward of the last tick of the ended episode. `is_terminated` is
/// set for a goal or an obstacle collision and `is_truncated` for a timeout.
///
/// The record of a step holds the reward terms, and on an episode end also
/// `episode_return`, `termination` and `episode_steps`.
pub struct NavEnv<Ph: Physics = KinematicBody> {
    config: NavEnvConfig<Ph::Config>,
    seed: i64,
    physics: Ph,
    machine: EpisodeStateMachine,
    shaper: RewardShaper,
    context: EpisodeContext,
    target: TargetState,
    episodes: usize,
}

impl<Ph: Physics> NavEnv<Ph> {
    /// Builds an environment in an arena supplied by the scene.
    ///
    /// The arena replaces the `arena.bounds` and `arena.obstacles` sections
    /// of the configuration. Clones of one arena can be shared by any number
    /// of environments.
    pub fn with_arena(config: &NavEnvConfig<Ph::Config>, arena: Arena, seed: i64) -> Result<Self> {
        config.validate_without_bounds()?;
        arena.bounds().validate_margin(config.spawn.spawn_margin)?;

        let height = config.arena.agent_height;
        let mut physics = Ph::build(&config.physics, &arena)?;
        physics.place_agent(arena.bounds().center(height));

        let sampler = SpawnSampler::from_seed(seed as u64);
        let mut machine = EpisodeStateMachine::new(
            config.episode.clone(),
            config.spawn.clone(),
            arena,
            sampler,
        );
        let start = machine.begin(height);

        let mut env = Self {
            config: config.clone(),
            seed,
            physics,
            machine,
            shaper: RewardShaper::new(config.reward.clone()),
            context: start.context.clone(),
            target: start.target,
            episodes: 0,
        };
        env.apply(start);
        Ok(env)
    }

    /// Places the agent and the target of a new episode.
    fn apply(&mut self, start: EpisodeStart) -> NavObs {
        self.physics.place_agent(start.agent.position);
        self.physics.place_target(start.target.position);
        self.context = start.context;
        self.target = start.target;
        encode(&self.physics.kinematic_state())
    }

    /// Samples a new episode, keeping the current out-of-plane coordinate of the agent.
    fn begin_episode(&mut self) -> NavObs {
        let height = self.physics.kinematic_state().position.y;
        let start = self.machine.begin(height);
        self.apply(start)
    }

    /// Abandons the current episode and starts one with the given positions.
    ///
    /// Returns the first observation of the new episode.
    pub fn start_episode_at(&mut self, agent: Vec3, target: Vec3) -> NavObs {
        let start = self.machine.begin_at(agent, target);
        self.apply(start)
    }

    /// The configuration.
    pub fn config(&self) -> &NavEnvConfig<Ph::Config> {
        &self.config
    }

    /// Context of the running episode.
    pub fn context(&self) -> &EpisodeContext {
        &self.context
    }

    /// Current state of the agent.
    pub fn agent_state(&self) -> AgentState {
        self.physics.kinematic_state()
    }

    /// Target of the running episode.
    pub fn target(&self) -> &TargetState {
        &self.target
    }

    /// Number of episodes ended since the environment was built.
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// The physics.
    pub fn physics(&self) -> &Ph {
        &self.physics
    }

    /// The physics, mutably.
    pub fn physics_mut(&mut self) -> &mut Ph {
        &mut self.physics
    }
}

impl<Ph: Physics> Env for NavEnv<Ph> {
    type Config = NavEnvConfig<Ph::Config>;
    type Obs = NavObs;
    type Act = NavAct;
    type Info = NavInfo;

    /// Builds an environment in the arena described by the configuration.
    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let arena = Arena::from_config(&config.arena)?;
        Self::with_arena(config, arena, seed)
    }

    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        self.physics.set_motion_command(map_action(a));
        let events = self.physics.advance();

        let agent = self.physics.kinematic_state();
        let obs = encode(&agent);
        let mut terms = self
            .shaper
            .compute_step_reward(&mut self.context, &agent, &self.target);
        let outcome = self.machine.tick(&mut self.context, &mut terms, &events);

        let reward = terms.total();
        let mut record = terms.to_record();
        let (is_terminated, is_truncated, init_obs) = match outcome {
            None => (false, false, None),
            Some(outcome) => {
                record.merge_inplace(outcome.to_record());
                self.episodes += 1;
                let init_obs = self.begin_episode();
                let is_truncated = outcome.cause.is_truncation();
                (!is_truncated, is_truncated, Some(init_obs))
            }
        };

        let info = NavInfo {
            terms,
            events,
            outcome,
        };
        let step = Step::new(
            obs,
            *a,
            reward,
            is_terminated,
            is_truncated,
            info,
            init_obs,
        );
        (step, record)
    }

    /// Abandons the current episode and samples a new one.
    fn reset(&mut self) -> Result<NavObs> {
        Ok(self.begin_episode())
    }

    /// Restarts the spawn sampler from `seed + ix`, then samples a new episode.
    fn reset_with_index(&mut self, ix: usize) -> Result<NavObs> {
        self.machine
            .reseed((self.seed as u64).wrapping_add(ix as u64));
        self.reset()
    }
}
