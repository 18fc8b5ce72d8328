//! Record structure for versioned key-value pairs

use bytes::Bytes;

/// Per-record version counter
pub type Version = u64;

/// A single stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The key, fixed for the lifetime of the record
    pub key: String,

    /// The opaque value
    pub value: Bytes,

    /// Optimistic concurrency counter, 0 on creation
    pub version: Version,
}

impl Record {
    /// Create a new record at version 0
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Record {
            key: key.into(),
            value: value.into(),
            version: 0,
        }
    }

    /// Replace the value and advance the version by one
    pub fn replace(&mut self, value: Bytes) {
        self.value = value;
        self.version += 1;
    }

    /// Calculate approximate memory usage of this record in bytes
    pub fn memory_usage(&self) -> usize {
        self.key.len() + self.value.len() + std::mem::size_of::<Version>()
    }
}

/// A snapshot of a record's value and version, as returned by `get`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub value: Bytes,
    pub version: Version,
}

impl From<&Record> for VersionedValue {
    fn from(record: &Record) -> Self {
        VersionedValue {
            value: record.value.clone(),
            version: record.version,
        }
    }
}
