//! TensorBoard recorder for waypoint.
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;
use waypoint_core::record::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};

/// Writes records to TFRecord.
///
/// Only [`RecordValue::Scalar`] is written. Strings, e.g. the termination
/// cause of an episode, are counted by [`RecordStorage`] on aggregation and
/// reach TensorBoard as `termination/<cause>` scalars.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    storage: RecordStorage,
    n_writes: usize,
}

/// Key of the record holding the step of [`Recorder::write`].
const STEP_KEY: &str = "episode";

impl TensorboardRecorder {
    /// Constructs a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            storage: RecordStorage::new(),
            n_writes: 0,
        }
    }

    fn write_at(&mut self, record: &Record, step: usize) {
        for (k, v) in record.iter() {
            match v {
                RecordValue::Scalar(_) if k == STEP_KEY => {}
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
                RecordValue::String(_) => {}
            }
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Writes a [`Record`] at the step given under the `episode` key.
    ///
    /// Records without the key are written at the number of
    /// [`Recorder::write`] calls so far.
    fn write(&mut self, record: Record) {
        self.n_writes += 1;
        let step = match record.get(STEP_KEY) {
            Some(RecordValue::Scalar(v)) => *v as usize,
            _ => self.n_writes,
        };
        self.write_at(&record, step);
    }
}

impl AggregateRecorder for TensorboardRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if self.storage.is_empty() {
            return;
        }
        let record = self.storage.aggregate();
        self.write_at(&record, step.max(0) as usize);
    }
}
