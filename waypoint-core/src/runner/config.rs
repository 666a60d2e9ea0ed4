//! Configuration of [`Runner`](super::Runner) and [`ParallelRunner`](super::ParallelRunner).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Runner`](super::Runner).
///
/// A limit of `0` is disabled, but at least one of `max_env_steps` and
/// `max_episodes` must be positive. For [`ParallelRunner`](super::ParallelRunner)
/// the limits apply to each agent.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct RunnerConfig {
    /// The maximum number of environment steps.
    pub max_env_steps: usize,

    /// The maximum number of finished episodes.
    pub max_episodes: usize,

    /// Interval of flushing records in episodes.
    pub flush_interval: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_env_steps: 0,
            max_episodes: 100,
            flush_interval: 10,
        }
    }
}

impl RunnerConfig {
    /// Sets the maximum number of environment steps.
    pub fn max_env_steps(mut self, v: usize) -> Self {
        self.max_env_steps = v;
        self
    }

    /// Sets the maximum number of episodes.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the interval of flushing records in episodes.
    pub fn flush_interval(mut self, v: usize) -> Self {
        self.flush_interval = v;
        self
    }

    /// Constructs [`RunnerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RunnerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
