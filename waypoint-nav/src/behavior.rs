//! Who drives the agent.
use crate::{action::NavAct, observation::NavObs};
use std::collections::VecDeque;
use waypoint_core::{Env, Policy};

/// Source of manual control axes, e.g. a keyboard or a gamepad.
pub trait ManualInput {
    /// Reads the current `(a0, a1)` axes.
    fn read_axes(&mut self) -> [f32; 2];
}

/// Replays a fixed sequence of axes in a loop.
///
/// An empty sequence reads as `(0, 0)`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    axes: VecDeque<[f32; 2]>,
}

impl ScriptedInput {
    /// Constructs an input replaying `axes`.
    pub fn new(axes: impl IntoIterator<Item = [f32; 2]>) -> Self {
        Self {
            axes: axes.into_iter().collect(),
        }
    }
}

impl ManualInput for ScriptedInput {
    fn read_axes(&mut self) -> [f32; 2] {
        match self.axes.pop_front() {
            Some(a) => {
                self.axes.push_back(a);
                a
            }
            None => [0.0, 0.0],
        }
    }
}

/// Behavior of an agent, fixed when the agent is set up.
///
/// Either the policy decides from the observation, or the observation is
/// ignored and the action comes from a manual input. Actions go through the
/// same action mapping in both cases.
pub enum Behavior<P, M> {
    /// Actions come from a policy.
    PolicyDriven(P),

    /// Actions come from a manual input.
    ManuallyDriven(M),
}

impl<E, P, M> Policy<E> for Behavior<P, M>
where
    E: Env<Obs = NavObs, Act = NavAct>,
    P: Policy<E>,
    M: ManualInput,
{
    fn sample(&mut self, obs: &NavObs) -> NavAct {
        match self {
            Self::PolicyDriven(policy) => policy.sample(obs),
            Self::ManuallyDriven(input) => input.read_axes().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NavEnv;

    struct Forward;

    impl Policy<NavEnv> for Forward {
        fn sample(&mut self, _obs: &NavObs) -> NavAct {
            NavAct::new(1.0, 0.0)
        }
    }

    #[test]
    fn test_scripted_input_cycles() {
        let mut input = ScriptedInput::new([[1.0, 0.0], [0.0, -1.0]]);
        assert_eq!(input.read_axes(), [1.0, 0.0]);
        assert_eq!(input.read_axes(), [0.0, -1.0]);
        assert_eq!(input.read_axes(), [1.0, 0.0]);
        assert_eq!(ScriptedInput::default().read_axes(), [0.0, 0.0]);
    }

    #[test]
    fn test_behavior_dispatch() {
        let obs = NavObs::new(0.3, 0.4);

        let mut b: Behavior<Forward, ScriptedInput> = Behavior::PolicyDriven(Forward);
        assert_eq!(Policy::<NavEnv>::sample(&mut b, &obs), NavAct::new(1.0, 0.0));

        let mut b: Behavior<Forward, ScriptedInput> =
            Behavior::ManuallyDriven(ScriptedInput::new([[0.0, 2.0]]));
        assert_eq!(Policy::<NavEnv>::sample(&mut b, &obs), NavAct::new(0.0, 2.0));
    }
}
