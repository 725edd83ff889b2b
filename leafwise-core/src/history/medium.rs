//! Durable key-value media backing the persisted history log.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a persistence read, write, or delete.
///
/// Persistence failures degrade the history feature only; they never stop
/// the diagnosis pipeline.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode history log: {0}")]
    Encode(String),

    #[error("storage rejected the write: {0}")]
    WriteRejected(String),
}

/// Durable key-value store scoped to the running client.
///
/// Holds one serialized log under a fixed key. Every operation may fail
/// without crashing the process.
#[async_trait]
pub trait StorageMedium: Send + Sync {
    /// Read the value under `key`; `None` when nothing is stored.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Replace the value under `key`.
    async fn write(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError>;

    /// Remove the value under `key`. Removing a missing key is a no-op.
    async fn delete(&self, key: &str) -> Result<(), PersistenceError>;
}

#[async_trait]
impl<M: StorageMedium + ?Sized> StorageMedium for Arc<M> {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        (**self).read(key).await
    }

    async fn write(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        (**self).write(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), PersistenceError> {
        (**self).delete(key).await
    }
}

/// File-backed medium storing each key as one JSON document in a directory.
pub struct FileMedium {
    root: PathBuf,
}

impl FileMedium {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

#[async_trait]
impl StorageMedium for FileMedium {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.path_for(key), value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PersistenceError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory medium for tests, with a switch simulating quota exhaustion.
#[derive(Default)]
pub struct MemoryMedium {
    values: Mutex<HashMap<String, Vec<u8>>>,
    reject_writes: AtomicBool,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes and deletes fail, as a full store would.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), PersistenceError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            Err(PersistenceError::WriteRejected("quota exceeded".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StorageMedium for MemoryMedium {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self
            .values
            .lock()
            .expect("memory medium poisoned")
            .get(key)
            .cloned())
    }

    async fn write(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        self.check_writable()?;
        self.values
            .lock()
            .expect("memory medium poisoned")
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PersistenceError> {
        self.check_writable()?;
        self.values
            .lock()
            .expect("memory medium poisoned")
            .remove(key);
        Ok(())
    }
}
