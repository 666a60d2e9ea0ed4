//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// A worker thread of [`ParallelRunner`](crate::ParallelRunner) panicked.
    #[error("Agent {0} panicked")]
    AgentPanicked(usize),
}
