//! Default implementation of the [`Evaluator`] trait.
use super::Evaluator;
use crate::{
    record::{Record, RecordStorage},
    Env, Policy,
};
use anyhow::Result;
use log::debug;

/// Runs a fixed number of episodes and reports the average return.
///
/// Episode `ix` starts from [`Env::reset_with_index`] with `ix`, so two
/// evaluators built with the same config and seed see the same episodes.
/// The record of the last step of every episode is aggregated with
/// [`RecordStorage`] and merged into the result, e.g. to count termination
/// causes.
///
/// ```ignore
/// let mut evaluator = DefaultEvaluator::<NavEnv>::new(&config, 42, 10)?;
/// let record = evaluator.evaluate(&mut policy)?;
/// println!("Average return: {}", record.get_scalar("Episode return")?);
/// ```
pub struct DefaultEvaluator<E: Env> {
    /// The number of episodes to run during evaluation.
    n_episodes: usize,

    /// The environment instance used for evaluation.
    env: E,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Record>
    where
        P: Policy<E>,
    {
        let mut r_total = 0f32;
        let mut storage = RecordStorage::new();

        for ix in 0..self.n_episodes {
            let mut prev_obs = self.env.reset_with_index(ix)?;
            let mut r_episode = 0f32;

            loop {
                let act = policy.sample(&prev_obs);
                let (step, record) = self.env.step(&act);
                r_episode += step.reward;
                if step.is_done() {
                    storage.store(record);
                    break;
                }
                prev_obs = step.obs;
            }
            debug!("Evaluation episode {}: return = {}", ix, r_episode);
            r_total += r_episode;
        }

        let mean = match self.n_episodes {
            0 => 0.0,
            n => r_total / n as f32,
        };
        Ok(storage
            .aggregate()
            .merge(Record::from_scalar("Episode return", mean)))
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs a new [`DefaultEvaluator`].
    ///
    /// * `config` - Configuration for the environment
    /// * `seed` - Random seed for environment initialization
    /// * `n_episodes` - Number of episodes to run during evaluation
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        Ok(Self {
            n_episodes,
            env: E::build(config, seed)?,
        })
    }
}
