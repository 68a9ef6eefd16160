//! Durable snapshot persistence contract.
//!
//! Each record store (catalog, removal ledger, transaction ledger) is read
//! wholesale and rewritten wholesale on every mutation. The contract is
//! two-phase so a mutation touching several stores can make every write
//! durable-but-invisible first and only then publish all of them:
//!
//! 1. [`SnapshotStore::stage`] writes the complete new snapshot off to the
//!    side (for a file store: a synced temp file in the same directory) and
//!    returns a [`StagedWrite`] handle;
//! 2. [`StagedWrite::commit`] atomically replaces the visible store.
//!
//! A staged write that is dropped without commit leaves the store untouched,
//! which is how validation failures abort without any visible effect.

use async_trait::async_trait;

use crate::error::PosError;

/// A fully written, not yet visible snapshot replacement.
pub trait StagedWrite: Send {
    /// Atomically publishes the staged snapshot over the current one.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::Persistence`] if the replacement fails; the
    /// previously visible snapshot is left in place.
    fn commit(self: Box<Self>) -> Result<(), PosError>;
}

/// Durable storage for one record store.
#[async_trait]
pub trait SnapshotStore<T>: Send + Sync {
    /// Loads all records of the store, oldest first.
    ///
    /// A store that has never been written yields the empty list.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::Persistence`] if the store exists but cannot be
    /// read or decoded.
    async fn load(&self) -> Result<Vec<T>, PosError>;

    /// Durably stages `records` as the complete replacement snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::Persistence`] if the snapshot cannot be written;
    /// the visible store is unaffected.
    async fn stage(&self, records: &[T]) -> Result<Box<dyn StagedWrite>, PosError>;
}
