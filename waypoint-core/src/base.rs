//! Core functionalities.
mod env;
mod policy;
mod step;
pub use env::Env;
pub use policy::Policy;
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
///
/// Environments in this crate are not vectorized; one object holds exactly
/// one observation.
pub trait Obs: Clone + Debug {
    /// Returns the number of elements of the observation vector.
    fn len(&self) -> usize;
}

/// An action of the environment.
pub trait Act: Clone + Debug {
    /// Returns the number of elements of the action vector.
    fn len(&self) -> usize;
}
