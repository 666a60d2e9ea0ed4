//! Record storage and aggregation.
use super::{Record, RecordValue};
use log::warn;
use std::collections::{HashMap, HashSet};
use xxhash_rust::xxh3::Xxh3Builder;

/// A storage of records with aggregation.
///
/// Values are aggregated per key according to their type:
///
/// * scalars: a single value is kept as is, several values become
///   `{key}_min`, `{key}_max`, `{key}_mean` and `{key}_median`
/// * strings: the latest value is kept under `{key}`, and the number of
///   occurrences of each distinct value is written as `{key}/{value}`
/// * datetimes and arrays: the latest value is kept
///
/// A value whose type differs from the first value found under the same key
/// is skipped with a warning.
#[derive(Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().copied().fold(f32::INFINITY, f32::min))
}

fn max(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().copied().fold(f32::NEG_INFINITY, f32::max))
}

fn mean(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().sum::<f32>() / vs.len() as f32)
}

fn median(mut vs: Vec<f32>) -> RecordValue {
    vs.sort_by(|x, y| x.total_cmp(y));
    RecordValue::Scalar(vs[vs.len() / 2])
}

fn same_kind(a: &RecordValue, b: &RecordValue) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

impl RecordStorage {
    /// Creates a new empty record storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record in the storage.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn get_keys(&self) -> HashSet<String, Xxh3Builder> {
        let mut keys = HashSet::<String, Xxh3Builder>::default();
        for record in self.data.iter() {
            for k in record.keys() {
                keys.insert(k.clone());
            }
        }
        keys
    }

    /// Values under `key` having the same type as the first one, oldest first.
    fn values_of<'a>(&'a self, key: &str) -> Vec<&'a RecordValue> {
        let mut first: Option<&RecordValue> = None;
        let mut values = vec![];
        for value in self.data.iter().filter_map(|r| r.get(key)) {
            match first {
                None => {
                    first = Some(value);
                    values.push(value);
                }
                Some(f) if same_kind(f, value) => values.push(value),
                Some(_) => warn!("Skip a value of unexpected type for key '{}'", key),
            }
        }
        values
    }

    fn scalar(key: &str, values: &[&RecordValue]) -> Record {
        let vs: Vec<f32> = values
            .iter()
            .filter_map(|v| match v {
                RecordValue::Scalar(v) => Some(*v),
                _ => None,
            })
            .collect();

        if vs.len() == 1 {
            Record::from_slice(&[(key.to_string(), RecordValue::Scalar(vs[0]))])
        } else {
            Record::from_slice(&[
                (format!("{}_min", key), min(&vs)),
                (format!("{}_max", key), max(&vs)),
                (format!("{}_mean", key), mean(&vs)),
                (format!("{}_median", key), median(vs)),
            ])
        }
    }

    fn string(key: &str, values: &[&RecordValue]) -> Record {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for v in values.iter() {
            if let RecordValue::String(s) = v {
                *counts.entry(s.as_str()).or_default() += 1;
            }
        }
        let mut record = Record::empty();
        for (s, n) in counts {
            record.insert(format!("{}/{}", key, s), RecordValue::Scalar(n as f32));
        }
        if let Some(latest) = values.last() {
            record.insert(key, (*latest).clone());
        }
        record
    }

    /// Aggregates all stored records and clears the storage.
    pub fn aggregate(&mut self) -> Record {
        let mut record = Record::empty();

        for key in self.get_keys().iter() {
            let values = self.values_of(key);
            let r = match values.first() {
                Some(RecordValue::Scalar(..)) => Self::scalar(key, &values),
                Some(RecordValue::String(..)) => Self::string(key, &values),
                None => Record::empty(),
            };
            record.merge_inplace(r);
        }

        self.data = vec![];

        record
    }
}
