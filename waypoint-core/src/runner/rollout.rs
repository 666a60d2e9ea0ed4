use crate::{record::Record, Env, Policy};
use anyhow::Result;

/// Interaction of a policy with a single environment, one tick at a time.
///
/// The environment is reset lazily before the first tick. When a step ends
/// an episode, the next tick starts from [`Step::init_obs`] if the
/// environment already reset itself, and from [`Env::reset`] otherwise.
///
/// [`Step::init_obs`]: crate::Step::init_obs
pub struct Rollout<E: Env> {
    env: E,
    prev_obs: Option<E::Obs>,
}

impl<E: Env> Rollout<E> {
    /// Creates a rollout over `env`.
    pub fn new(env: E) -> Self {
        Self {
            env,
            prev_obs: None,
        }
    }

    /// Returns a reference to the environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Returns a mutable reference to the environment.
    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Performs one tick.
    ///
    /// Returns the record of the environment step and whether the step ended
    /// an episode.
    pub fn step<P: Policy<E>>(&mut self, policy: &mut P) -> Result<(Record, bool)> {
        let obs = match self.prev_obs.take() {
            Some(obs) => obs,
            None => self.env.reset()?,
        };

        let act = policy.sample(&obs);
        let (step, record) = self.env.step(&act);
        let is_done = step.is_done();

        self.prev_obs = match (is_done, step.init_obs) {
            (false, _) => Some(step.obs),
            (true, Some(init_obs)) => Some(init_obs),
            (true, None) => None,
        };

        Ok((record, is_done))
    }
}
