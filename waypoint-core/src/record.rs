//! Types and traits for recording episode statistics.
//!
//! Environments return a [`Record`] from every step. Orchestration loops in
//! this crate hand the records of finished episodes to a recorder, which is
//! the reporting sink of a run.
//!
//! * [`Record`] - a key-value container of [`RecordValue`]s
//! * [`Recorder`] - writes a record to some output
//! * [`AggregateRecorder`] - stores records and writes aggregated values on flush
//! * [`RecordStorage`] - aggregation of stored records
//! * [`BufferedRecorder`] - keeps records in memory, mostly for tests
//! * [`NullRecorder`] - discards everything
//! * [`LogRecorder`] - writes aggregated values through the `log` facade
//!
//! ```rust
//! use waypoint_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode_return", RecordValue::Scalar(-1.5));
//! record.insert("termination", RecordValue::String("timeout".to_string()));
//! assert_eq!(record.get_scalar("episode_return").unwrap(), -1.5);
//! ```
mod base;
mod buffered_recorder;
mod log_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use log_recorder::LogRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
