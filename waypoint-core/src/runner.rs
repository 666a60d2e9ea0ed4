//! Drive a [`Policy`] on an [`Env`] and report finished episodes.
mod config;
mod parallel;
mod rollout;
use crate::{
    record::{AggregateRecorder, Record, RecordValue},
    Env, Policy,
};
use anyhow::{bail, Result};
pub use config::RunnerConfig;
use log::info;
pub use parallel::ParallelRunner;
pub use rollout::Rollout;
use std::{
    sync::{Arc, Mutex},
    time::{Duration, SystemTime},
};

/// Statistics of a run loop.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunnerStat {
    /// The number of environment steps.
    pub env_steps: usize,

    /// The number of finished episodes.
    pub episodes: usize,

    /// Wall-clock duration of the loop.
    pub duration: Duration,
}

impl RunnerStat {
    /// Returns a formatted table of a set of [`RunnerStat`]s, one row per agent.
    pub fn fmt_table(stats: &[RunnerStat]) -> String {
        let mut s = "agent id, env steps, episodes, duration [sec], steps per sec\n".to_string();
        for (i, stat) in stats.iter().enumerate() {
            let d = stat.duration.as_secs_f32();
            let p = if d > 0.0 {
                stat.env_steps as f32 / d
            } else {
                0.0
            };
            s += format!("{}, {}, {}, {}, {}\n", i, stat.env_steps, stat.episodes, d, p).as_str();
        }
        s
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs a single agent until the limits in [`RunnerConfig`] are reached.
///
/// ```mermaid
/// flowchart LR
///     A[Rollout::step] -->|episode ended| B[AggregateRecorder::store]
///     B -->|every flush_interval episodes| C[AggregateRecorder::flush]
///     A -->|limits or stop flag| D[RunnerStat]
/// ```
///
/// Each tick is a synchronous `policy.sample()` followed by `env.step()`.
/// The record of every step that ends an episode gets an `"episode"` entry
/// (the 1-based episode count) and is stored in the recorder, which is
/// flushed every [`RunnerConfig::flush_interval`] episodes and once more at
/// the end of the run.
pub struct Runner {
    config: RunnerConfig,
    stop: Arc<Mutex<bool>>,
}

impl Runner {
    /// Constructs a [`Runner`].
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            stop: Arc::new(Mutex::new(false)),
        }
    }

    /// Returns a flag which stops the loop at the next tick when set to `true`.
    pub fn stop_handle(&self) -> Arc<Mutex<bool>> {
        self.stop.clone()
    }

    /// Runs the loop on `env`.
    pub fn run<E, P, R>(&self, env: E, policy: &mut P, recorder: &mut R) -> Result<RunnerStat>
    where
        E: Env,
        P: Policy<E>,
        R: AggregateRecorder + ?Sized,
    {
        let flush_interval = self.config.flush_interval.max(1);
        let mut rollout = Rollout::new(env);
        let stat = drive(&mut rollout, policy, &self.config, &self.stop, |episode, record| {
            recorder.store(record);
            if episode % flush_interval == 0 {
                recorder.flush(episode as _);
            }
        })?;
        if stat.episodes % flush_interval != 0 {
            recorder.flush(stat.episodes as _);
        }
        info!(
            "Finished {} episodes in {} env steps ({:.2} sec)",
            stat.episodes,
            stat.env_steps,
            stat.duration.as_secs_f32()
        );
        Ok(stat)
    }
}

fn is_stopped(stop: &Mutex<bool>) -> bool {
    stop.lock().map(|v| *v).unwrap_or(true)
}

/// The loop shared by [`Runner`] and [`ParallelRunner`].
///
/// `on_episode` receives the 1-based episode count and the record of the
/// episode's last step.
pub(crate) fn drive<E, P, F>(
    rollout: &mut Rollout<E>,
    policy: &mut P,
    config: &RunnerConfig,
    stop: &Mutex<bool>,
    mut on_episode: F,
) -> Result<RunnerStat>
where
    E: Env,
    P: Policy<E>,
    F: FnMut(usize, Record),
{
    if config.max_env_steps == 0 && config.max_episodes == 0 {
        bail!("Either max_env_steps or max_episodes must be positive");
    }

    let timer = SystemTime::now();
    let mut stat = RunnerStat::default();

    loop {
        if is_stopped(stop)
            || (config.max_env_steps > 0 && stat.env_steps >= config.max_env_steps)
            || (config.max_episodes > 0 && stat.episodes >= config.max_episodes)
        {
            break;
        }

        let (mut record, is_done) = rollout.step(policy)?;
        stat.env_steps += 1;

        if is_done {
            stat.episodes += 1;
            record.insert("episode", RecordValue::Scalar(stat.episodes as _));
            on_episode(stat.episodes, record);
        }
    }

    stat.duration = timer.elapsed().unwrap_or_default();
    Ok(stat)
}
