mod line_input;
mod random_policy;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use line_input::LineInput;
use log::info;
use random_policy::RandomPolicy;
use std::path::{Path, PathBuf};
use waypoint_core::{
    record::{AggregateRecorder, LogRecorder, Recorder},
    DefaultEvaluator, Env as _, Evaluator as _, ParallelRunner, Runner, RunnerConfig, RunnerStat,
};
use waypoint_nav::{Arena, Behavior, KinematicBody, KinematicConfig, NavEnv, NavEnvConfig};
use waypoint_tensorboard::TensorboardRecorder;

/// Runs and evaluates planar navigation episodes
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run episodes and report their outcomes
    Run(RunArgs),

    /// Evaluate the random policy on reproducible episodes
    Eval(EvalArgs),

    /// Write the default environment configuration to a YAML file
    InitConfig {
        /// Output path
        path: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Actions from a seeded random policy
    Policy,

    /// Actions read as `a0 a1` lines from stdin
    Manual,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Environment configuration (YAML); defaults are used if omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of agents running in parallel
    #[arg(long, default_value_t = 1)]
    agents: usize,

    /// Random seed; agent `i` uses `seed + i`
    #[arg(long, default_value_t = 42)]
    seed: i64,

    /// Number of episodes per agent, 0 for no limit
    #[arg(long, default_value_t = 100)]
    episodes: usize,

    /// Number of environment steps per agent, 0 for no limit
    #[arg(long, default_value_t = 0)]
    max_env_steps: usize,

    /// Who drives the agent
    #[arg(long, value_enum, default_value_t = Mode::Policy)]
    mode: Mode,

    /// Write TensorBoard logs to this directory instead of logging to the console
    #[arg(long)]
    logdir: Option<PathBuf>,

    /// Number of episodes between two reports
    #[arg(long, default_value_t = 10)]
    flush_interval: usize,
}

#[derive(clap::Args, Debug)]
struct EvalArgs {
    /// Environment configuration (YAML); defaults are used if omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of episodes
    #[arg(long, default_value_t = 10)]
    episodes: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: i64,
}

fn load_config(path: Option<&Path>) -> Result<NavEnvConfig> {
    let config = match path {
        Some(path) => {
            info!("Load configuration from {:?}", path);
            NavEnvConfig::load(path)?
        }
        None => NavEnvConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Seed of agent `id`, wrapping on overflow.
fn agent_seed(seed: i64, id: usize) -> i64 {
    seed.wrapping_add(id as i64)
}

fn create_recorder(logdir: Option<&Path>) -> Box<dyn AggregateRecorder> {
    match logdir {
        Some(logdir) => Box::new(TensorboardRecorder::new(logdir)),
        None => Box::new(LogRecorder::new()),
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let runner_config = RunnerConfig::default()
        .max_episodes(args.episodes)
        .max_env_steps(args.max_env_steps)
        .flush_interval(args.flush_interval);
    let mut recorder = create_recorder(args.logdir.as_deref());

    if args.agents == 0 {
        bail!("At least one agent is required");
    }

    if args.agents == 1 {
        let env = NavEnv::<KinematicBody>::build(&config, args.seed)?;
        let mut behavior: Behavior<RandomPolicy, LineInput<_>> = match args.mode {
            Mode::Policy => Behavior::PolicyDriven(RandomPolicy::new(args.seed as u64)),
            Mode::Manual => {
                info!("Reading 'a0 a1' per step from stdin");
                Behavior::ManuallyDriven(LineInput::stdin())
            }
        };
        let stat = Runner::new(runner_config).run(env, &mut behavior, recorder.as_mut())?;
        info!("\n{}", RunnerStat::fmt_table(&[stat]));
        return Ok(());
    }

    if args.mode == Mode::Manual {
        bail!("Manual mode drives a single agent, got --agents {}", args.agents);
    }
    let arena = Arena::from_config(&config.arena)?;
    let seed = args.seed;
    ParallelRunner::new(runner_config, args.agents).run(
        |id| NavEnv::<KinematicBody>::with_arena(&config, arena.clone(), agent_seed(seed, id)),
        |id| RandomPolicy::new(agent_seed(seed, id) as u64),
        recorder.as_mut(),
    )?;
    Ok(())
}

fn eval(args: &EvalArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut evaluator = DefaultEvaluator::<NavEnv>::new(&config, args.seed, args.episodes)?;
    let record = evaluator.evaluate(&mut RandomPolicy::new(args.seed as u64))?;
    LogRecorder::new().write(record);
    Ok(())
}

fn init_config(path: &Path) -> Result<()> {
    NavEnvConfig::<KinematicConfig>::default().save(path)?;
    info!("Wrote the default configuration to {:?}", path);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match &args.command {
        Command::Run(args) => run(args),
        Command::Eval(args) => eval(args),
        Command::InitConfig { path } => init_config(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_parse_run_args() {
        let args = Args::try_parse_from([
            "waypoint", "run", "--agents", "4", "--seed", "7", "--mode", "policy",
        ])
        .unwrap();
        match args.command {
            Command::Run(run) => {
                assert_eq!(run.agents, 4);
                assert_eq!(run.seed, 7);
                assert_eq!(run.mode, Mode::Policy);
                assert_eq!(run.episodes, 100);
                assert!(run.logdir.is_none());
            }
            _ => panic!("expected the run subcommand"),
        }
        assert!(Args::try_parse_from(["waypoint", "run", "--mode", "keyboard"]).is_err());
    }

    #[test]
    fn test_init_config_then_run() -> Result<()> {
        let dir = TempDir::new("waypoint_cli")?;
        let path = dir.path().join("nav.yaml");
        init_config(&path)?;
        assert_eq!(load_config(Some(path.as_path()))?, NavEnvConfig::default());

        let args = RunArgs {
            config: Some(path),
            agents: 2,
            seed: 0,
            episodes: 2,
            max_env_steps: 0,
            mode: Mode::Policy,
            logdir: None,
            flush_interval: 1,
        };
        run(&args)
    }

    #[test]
    fn test_bundled_config_loads() -> Result<()> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/obstacles.yaml");
        let config = load_config(Some(path.as_path()))?;
        assert_eq!(config.arena.obstacles.len(), 2);
        assert_eq!(config.episode.max_steps, 500);
        assert_eq!(config.physics.speed, 8.0);
        Ok(())
    }

    #[test]
    fn test_agent_seed_wraps() {
        assert_eq!(agent_seed(7, 2), 9);
        assert_eq!(agent_seed(i64::MAX, 1), i64::MIN);
    }

    #[test]
    fn test_manual_mode_rejects_many_agents() {
        let args = RunArgs {
            config: None,
            agents: 3,
            seed: 0,
            episodes: 1,
            max_env_steps: 0,
            mode: Mode::Manual,
            logdir: None,
            flush_interval: 1,
        };
        assert!(run(&args).is_err());
    }
}
