//! Append-only, ordered record history.
//!
//! Both the removal history and the transaction history are ledgers: records
//! are appended in commit order, never mutated, never deleted. Reporting
//! collaborators read them back oldest-first, optionally restricted to a
//! time range.

use chrono::{DateTime, Utc};

/// Implemented by records that carry their own creation timestamp.
pub trait Timestamped {
    /// The instant the record was committed.
    fn timestamp(&self) -> DateTime<Utc>;
}

/// An append-only sequence of records in insertion order, oldest first.
#[derive(Debug, Clone)]
pub struct Ledger<T> {
    records: Vec<T>,
}

impl<T> Ledger<T> {
    /// Creates an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Reconstructs a ledger from previously persisted records.
    ///
    /// The records are assumed to already be in insertion order.
    #[must_use]
    pub fn from_records(records: Vec<T>) -> Self {
        Self { records }
    }

    /// Appends a record. Ledger appends never fail; a failed durable write
    /// is surfaced by the caller before the record reaches the ledger.
    pub fn append(&mut self, record: T) {
        self.records.push(record);
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Number of records in the ledger.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: Timestamped> Ledger<T> {
    /// Records whose timestamp falls within `[start, end]`, in insertion
    /// order.
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> impl Iterator<Item = &T> {
        self.records
            .iter()
            .filter(move |r| r.timestamp() >= start && r.timestamp() <= end)
    }
}

impl<T> Default for Ledger<T> {
    fn default() -> Self {
        Self::new()
    }
}
