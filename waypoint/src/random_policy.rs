use waypoint_core::{Env, Policy};
use waypoint_nav::{NavAct, NavObs};

/// Samples both action components uniformly from `[-1, 1)`.
pub struct RandomPolicy {
    rng: fastrand::Rng,
}

impl RandomPolicy {
    /// Constructs a policy seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl<E: Env<Obs = NavObs, Act = NavAct>> Policy<E> for RandomPolicy {
    fn sample(&mut self, _obs: &NavObs) -> NavAct {
        NavAct::new(2.0 * self.rng.f32() - 1.0, 2.0 * self.rng.f32() - 1.0)
    }
}
