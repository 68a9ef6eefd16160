//! Test stores — in-memory and failure-injecting `SnapshotStore`
//! implementations for tests.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kasir_core::error::PosError;
use kasir_core::store::{SnapshotStore, StagedWrite};

/// An in-memory snapshot store. `stage` captures the snapshot off to the
/// side; `commit` publishes it, exactly like the file-backed store, so
/// tests can observe what was (and was not) made durable.
///
/// Clones share the same underlying records, which lets a test keep a
/// handle for assertions after handing the store to the engine.
#[derive(Debug)]
pub struct MemorySnapshotStore<T> {
    records: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone> MemorySnapshotStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a store pre-seeded with `records`.
    #[must_use]
    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    /// Returns a snapshot of the currently committed records.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn committed(&self) -> Vec<T> {
        self.records.lock().unwrap().clone()
    }
}

impl<T: Clone> Default for MemorySnapshotStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MemorySnapshotStore<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for MemorySnapshotStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Vec<T>, PosError> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn stage(&self, records: &[T]) -> Result<Box<dyn StagedWrite>, PosError> {
        Ok(Box::new(MemoryStagedWrite {
            target: Arc::clone(&self.records),
            staged: records.to_vec(),
        }))
    }
}

struct MemoryStagedWrite<T> {
    target: Arc<Mutex<Vec<T>>>,
    staged: Vec<T>,
}

impl<T: Send> StagedWrite for MemoryStagedWrite<T> {
    fn commit(self: Box<Self>) -> Result<(), PosError> {
        *self.target.lock().unwrap() = self.staged;
        Ok(())
    }
}

/// Which phase of a staged write should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// `stage` itself fails; nothing is written anywhere.
    Stage,
    /// `stage` succeeds but `commit` fails, as a rename would after a
    /// successful temp-file write.
    Commit,
}

/// A snapshot store whose writes fail at the configured phase. Loads
/// always return the empty list. Useful for testing that a persistence
/// failure leaves the in-memory state unchanged.
#[derive(Debug)]
pub struct FailingSnapshotStore<T> {
    point: FailurePoint,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FailingSnapshotStore<T> {
    /// Creates a store failing at `point`.
    #[must_use]
    pub fn new(point: FailurePoint) -> Self {
        Self {
            point,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for FailingSnapshotStore<T>
where
    T: Send + Sync + 'static,
{
    async fn load(&self) -> Result<Vec<T>, PosError> {
        Ok(Vec::new())
    }

    async fn stage(&self, _records: &[T]) -> Result<Box<dyn StagedWrite>, PosError> {
        match self.point {
            FailurePoint::Stage => Err(PosError::Persistence("disk full".to_owned())),
            FailurePoint::Commit => Ok(Box::new(FailingStagedWrite)),
        }
    }
}

struct FailingStagedWrite;

impl StagedWrite for FailingStagedWrite {
    fn commit(self: Box<Self>) -> Result<(), PosError> {
        Err(PosError::Persistence("atomic replace failed".to_owned()))
    }
}
