//! Kasir POS — JSON file snapshot persistence.
//!
//! Each record store is one pretty-printed JSON array file, read wholesale
//! and rewritten wholesale on every mutation. Replacement is atomic: the
//! new snapshot is written to a temp file in the destination directory,
//! synced, and renamed over the old file, so a crash mid-write can never
//! corrupt a store.

use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kasir_core::error::PosError;
use kasir_core::store::{SnapshotStore, StagedWrite};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

fn persistence_error(path: &Path, action: &str, err: impl std::fmt::Display) -> PosError {
    PosError::Persistence(format!("{action} {}: {err}", path.display()))
}

/// File-backed [`SnapshotStore`] holding one JSON array per store.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSnapshotStore<T> {
    /// Binds a store to `path`. The file is created on first commit; a
    /// missing file reads as the empty store.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// The file this store reads and replaces.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for JsonSnapshotStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn load(&self) -> Result<Vec<T>, PosError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(persistence_error(&self.path, "reading", err)),
        };
        serde_json::from_slice(&bytes)
            .map_err(|err| persistence_error(&self.path, "decoding", err))
    }

    async fn stage(&self, records: &[T]) -> Result<Box<dyn StagedWrite>, PosError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|err| persistence_error(&self.path, "staging", err))?;
        serde_json::to_writer_pretty(&mut tmp, records)
            .map_err(|err| persistence_error(&self.path, "encoding", err))?;
        tmp.as_file()
            .sync_all()
            .map_err(|err| persistence_error(&self.path, "syncing", err))?;
        Ok(Box::new(FileStagedWrite {
            tmp,
            dest: self.path.clone(),
        }))
    }
}

struct FileStagedWrite {
    tmp: NamedTempFile,
    dest: PathBuf,
}

impl StagedWrite for FileStagedWrite {
    fn commit(self: Box<Self>) -> Result<(), PosError> {
        self.tmp
            .persist(&self.dest)
            .map(|_| ())
            .map_err(|err| persistence_error(&self.dest, "replacing", err.error))
    }
}
