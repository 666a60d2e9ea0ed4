//! Policy.
use super::Env;

/// A policy on an environment.
///
/// Policy is a mapping from an observation to an action.
/// The mapping can be either of deterministic or stochastic.
pub trait Policy<E: Env> {
    /// Sample an action given an observation.
    fn sample(&mut self, obs: &E::Obs) -> E::Act;
}

impl<E: Env, P: Policy<E> + ?Sized> Policy<E> for Box<P> {
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        (**self).sample(obs)
    }
}
