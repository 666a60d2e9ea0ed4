use anyhow::Result;
use test_log::test;
use waypoint_core::{
    record::{BufferedRecorder, NullRecorder, Record, RecordValue},
    Act, DefaultEvaluator, Env, Evaluator, Obs, ParallelRunner, Policy, Runner, RunnerConfig,
    Step,
};

#[derive(Clone, Debug)]
struct CountObs(usize);

impl Obs for CountObs {
    fn len(&self) -> usize {
        1
    }
}

#[derive(Clone, Debug)]
struct UnitAct;

impl Act for UnitAct {
    fn len(&self) -> usize {
        1
    }
}

/// An episode lasts `length` steps with reward 1 each; the env resets itself.
struct CountdownEnv {
    length: usize,
    t: usize,
}

impl Env for CountdownEnv {
    type Config = usize;
    type Obs = CountObs;
    type Act = UnitAct;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            length: *config,
            t: 0,
        })
    }

    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        self.t += 1;
        let obs = CountObs(self.t);
        if self.t == self.length {
            self.t = 0;
            let record = Record::from_slice(&[
                ("episode_return", RecordValue::Scalar(self.length as f32)),
                ("termination", RecordValue::String("timeout".to_string())),
            ]);
            let step = Step::new(obs, a.clone(), 1.0, false, true, (), Some(CountObs(0)));
            (step, record)
        } else {
            (
                Step::new(obs, a.clone(), 1.0, false, false, (), None),
                Record::empty(),
            )
        }
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.t = 0;
        Ok(CountObs(0))
    }

    fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
        self.reset()
    }
}

struct ConstPolicy;

impl Policy<CountdownEnv> for ConstPolicy {
    fn sample(&mut self, _obs: &CountObs) -> UnitAct {
        UnitAct
    }
}

#[test]
fn runner_stops_at_episode_limit() -> Result<()> {
    let env = CountdownEnv::build(&3, 0)?;
    let mut recorder = BufferedRecorder::new();
    let runner = Runner::new(RunnerConfig::default().max_episodes(4).flush_interval(2));
    let stat = runner.run(env, &mut ConstPolicy, &mut recorder)?;

    assert_eq!(stat.episodes, 4);
    assert_eq!(stat.env_steps, 12);
    assert_eq!(recorder.len(), 4);
    let episodes: Vec<f32> = recorder
        .iter()
        .map(|r| r.get_scalar("episode").unwrap())
        .collect();
    assert_eq!(episodes, vec![1.0, 2.0, 3.0, 4.0]);
    Ok(())
}

#[test]
fn runner_stops_at_step_limit() -> Result<()> {
    let env = CountdownEnv::build(&3, 0)?;
    let mut recorder = NullRecorder::default();
    let runner = Runner::new(RunnerConfig::default().max_episodes(0).max_env_steps(7));
    let stat = runner.run(env, &mut ConstPolicy, &mut recorder)?;

    assert_eq!(stat.env_steps, 7);
    assert_eq!(stat.episodes, 2);
    Ok(())
}

#[test]
fn runner_rejects_unbounded_config() {
    let env = CountdownEnv::build(&3, 0).unwrap();
    let mut recorder = BufferedRecorder::new();
    let runner = Runner::new(RunnerConfig::default().max_episodes(0).max_env_steps(0));
    assert!(runner.run(env, &mut ConstPolicy, &mut recorder).is_err());
}

#[test]
fn stop_flag_halts_runner() -> Result<()> {
    let env = CountdownEnv::build(&3, 0)?;
    let mut recorder = BufferedRecorder::new();
    let runner = Runner::new(RunnerConfig::default().max_episodes(10));
    *runner.stop_handle().lock().unwrap() = true;
    let stat = runner.run(env, &mut ConstPolicy, &mut recorder)?;
    assert_eq!(stat.env_steps, 0);
    assert!(recorder.is_empty());
    Ok(())
}

#[test]
fn parallel_runner_collects_every_agent() -> Result<()> {
    let mut recorder = BufferedRecorder::new();
    let runner = ParallelRunner::new(RunnerConfig::default().max_episodes(5), 3);
    let stats = runner.run(
        |id| CountdownEnv::build(&(id + 2), id as i64),
        |_| ConstPolicy,
        &mut recorder,
    )?;

    assert_eq!(stats.len(), 3);
    for (id, stat) in stats.iter().enumerate() {
        assert_eq!(stat.episodes, 5);
        assert_eq!(stat.env_steps, 5 * (id + 2));
    }
    assert_eq!(recorder.len(), 15);
    for id in 0..3 {
        let n = recorder
            .iter()
            .filter(|r| r.get_scalar("agent").unwrap() == id as f32)
            .count();
        assert_eq!(n, 5);
    }
    Ok(())
}

#[test]
fn parallel_runner_propagates_build_errors() {
    let mut recorder = BufferedRecorder::new();
    let runner = ParallelRunner::new(RunnerConfig::default().max_episodes(1), 2);
    let result = runner.run(
        |id| match id {
            1 => anyhow::bail!("no arena for agent 1"),
            _ => CountdownEnv::build(&2, 0),
        },
        |_| ConstPolicy,
        &mut recorder,
    );
    assert!(result.is_err());
}

#[test]
fn evaluator_averages_returns() -> Result<()> {
    let mut evaluator = DefaultEvaluator::<CountdownEnv>::new(&4, 0, 3)?;
    let record = evaluator.evaluate(&mut ConstPolicy)?;
    assert_eq!(record.get_scalar("Episode return")?, 4.0);
    assert_eq!(record.get_scalar("termination/timeout")?, 3.0);
    Ok(())
}
