use super::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::info;

/// Writes records through the `log` facade at info level.
///
/// Stored records are aggregated with [`RecordStorage`] and printed as a
/// single line, keys sorted, on every flush.
#[derive(Default)]
pub struct LogRecorder {
    storage: RecordStorage,
}

impl LogRecorder {
    /// Constructs a [`LogRecorder`].
    pub fn new() -> Self {
        Self::default()
    }

    fn format(record: &Record) -> String {
        let mut items: Vec<_> = record
            .iter()
            .map(|(k, v)| match v {
                RecordValue::Scalar(v) => format!("{}: {:.4}", k, v),
                RecordValue::String(s) => format!("{}: {}", k, s),
            })
            .collect();
        items.sort();
        items.join(", ")
    }
}

impl Recorder for LogRecorder {
    fn write(&mut self, record: Record) {
        info!("{}", Self::format(&record));
    }
}

impl AggregateRecorder for LogRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if self.storage.is_empty() {
            return;
        }
        let record = self.storage.aggregate();
        info!("[{}] {}", step, Self::format(&record));
    }
}
