use super::{drive, Rollout, RunnerConfig, RunnerStat};
use crate::{
    error::CoreError,
    record::{AggregateRecorder, Record, RecordValue},
    Env, Policy,
};
use anyhow::Result;
use crossbeam_channel::bounded;
use log::{info, warn};
use std::sync::{Arc, Mutex};

/// Runs independent agents in parallel, one thread per agent.
///
/// Every agent owns its environment and policy, built inside its thread by
/// the factories passed to [`ParallelRunner::run`] with the agent id. Agents
/// never touch each other's state; anything shared between them (e.g. a
/// static arena) has to be shared by the factories as read-only data.
///
/// Records of finished episodes are sent to the calling thread through a
/// bounded channel and stored in the recorder there, so the recorder does not
/// need to be thread safe. Each agent runs until it reaches the limits of
/// [`RunnerConfig`] or the stop flag is set.
pub struct ParallelRunner {
    config: RunnerConfig,
    n_agents: usize,
    channel_capacity: usize,
    stop: Arc<Mutex<bool>>,
}

impl ParallelRunner {
    /// Constructs a [`ParallelRunner`] with `n_agents` agents.
    pub fn new(config: RunnerConfig, n_agents: usize) -> Self {
        Self {
            config,
            n_agents,
            channel_capacity: 1000,
            stop: Arc::new(Mutex::new(false)),
        }
    }

    /// Sets the capacity of the channel of episode records.
    pub fn channel_capacity(mut self, v: usize) -> Self {
        self.channel_capacity = v.max(1);
        self
    }

    /// Returns a flag which stops all agents at their next tick when set to `true`.
    pub fn stop_handle(&self) -> Arc<Mutex<bool>> {
        self.stop.clone()
    }

    /// Runs all agents and returns their statistics, ordered by agent id.
    ///
    /// Stored records carry an `"agent"` entry with the agent id. The
    /// recorder is flushed every [`RunnerConfig::flush_interval`] episodes
    /// counted over all agents, and once more at the end.
    pub fn run<E, P, FE, FP, R>(
        &self,
        env_factory: FE,
        policy_factory: FP,
        recorder: &mut R,
    ) -> Result<Vec<RunnerStat>>
    where
        E: Env,
        P: Policy<E>,
        FE: Fn(usize) -> Result<E> + Sync,
        FP: Fn(usize) -> P + Sync,
        R: AggregateRecorder + ?Sized,
    {
        let flush_interval = self.config.flush_interval.max(1);
        let (sender, receiver) = bounded::<(usize, Record)>(self.channel_capacity);
        let env_factory = &env_factory;
        let policy_factory = &policy_factory;

        let results = std::thread::scope(|s| {
            let handles: Vec<_> = (0..self.n_agents)
                .map(|id| {
                    let sender = sender.clone();
                    let config = self.config.clone();
                    let stop = self.stop.clone();
                    s.spawn(move || -> Result<RunnerStat> {
                        let mut rollout = Rollout::new(env_factory(id)?);
                        let mut policy = policy_factory(id);
                        info!("Starts agent {}", id);
                        drive(&mut rollout, &mut policy, &config, &stop, |_, mut record| {
                            record.insert("agent", RecordValue::Scalar(id as _));
                            if sender.send((id, record)).is_err() {
                                warn!("Agent {}: record receiver is gone", id);
                            }
                        })
                    })
                })
                .collect();

            // Receiving ends when every agent dropped its sender.
            drop(sender);
            let mut n_episodes = 0usize;
            for (_id, record) in receiver.iter() {
                n_episodes += 1;
                recorder.store(record);
                if n_episodes % flush_interval == 0 {
                    recorder.flush(n_episodes as _);
                }
            }
            if n_episodes % flush_interval != 0 {
                recorder.flush(n_episodes as _);
            }

            handles
                .into_iter()
                .enumerate()
                .map(|(id, h)| match h.join() {
                    Ok(result) => result,
                    Err(_) => Err(CoreError::AgentPanicked(id).into()),
                })
                .collect::<Result<Vec<_>>>()
        })?;

        info!("\n{}", RunnerStat::fmt_table(&results));
        Ok(results)
    }
}
