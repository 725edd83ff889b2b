//! Bounded, persisted diagnosis history.
//!
//! Entries are inserted newest-first, the log is truncated to capacity, and
//! every mutation is persisted as one JSON document under a fixed key.
//! Loading never fails: a corrupt or unreadable log degrades to an empty
//! one behind a warning, and the user can keep diagnosing without prior
//! history.

mod medium;

pub use medium::{FileMedium, MemoryMedium, PersistenceError, StorageMedium};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::artifact::ImageArtifact;
use crate::diagnose::DiagnosisResult;

/// Fixed key the serialized log lives under.
pub const HISTORY_STORAGE_KEY: &str = "leafwise.history";

/// Default number of entries kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 15;

/// One recorded diagnosis. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Displayable encoding of the diagnosed image.
    pub thumbnail: String,
    pub result: DiagnosisResult,
}

impl HistoryEntry {
    /// Build an entry for a just-completed diagnosis.
    pub fn new(artifact: &ImageArtifact, result: DiagnosisResult) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            thumbnail: artifact.display_encoding().to_string(),
            result,
        }
    }
}

/// Size-bounded, persisted log of past diagnoses, newest first.
///
/// The in-memory log is owned by the store; all mutation goes through
/// [`insert`](Self::insert) and [`clear`](Self::clear).
pub struct HistoryStore<M: StorageMedium> {
    medium: M,
    entries: Vec<HistoryEntry>,
    capacity: usize,
}

impl<M: StorageMedium> HistoryStore<M> {
    /// Load the persisted log.
    ///
    /// Never fails: read and decode problems leave an empty log behind a
    /// warning.
    pub async fn load(medium: M, capacity: usize) -> Self {
        let entries = match medium.read(HISTORY_STORAGE_KEY).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<HistoryEntry>>(&bytes) {
                Ok(mut entries) => {
                    if entries.len() > capacity {
                        warn!(
                            stored = entries.len(),
                            capacity, "persisted history exceeds capacity, truncating"
                        );
                        entries.truncate(capacity);
                    }
                    entries
                }
                Err(e) => {
                    warn!(error = %e, "persisted history is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "could not read persisted history, starting empty");
                Vec::new()
            }
        };

        debug!(entries = entries.len(), capacity, "history loaded");
        Self {
            medium,
            entries,
            capacity,
        }
    }

    /// Prepend an entry, evict beyond capacity, persist the whole log.
    ///
    /// On a persistence failure the in-memory log still reflects the insert
    /// for the rest of the session; the error is returned once and not
    /// retried.
    pub async fn insert(&mut self, entry: HistoryEntry) -> Result<(), PersistenceError> {
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
        self.persist().await
    }

    /// Look up an entry by id. Pure lookup, no mutation.
    pub fn select(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Drop all entries and delete the persisted copy.
    ///
    /// A failed delete is reported but the in-memory clear stands.
    pub async fn clear(&mut self) -> Result<(), PersistenceError> {
        self.entries.clear();
        self.medium.delete(HISTORY_STORAGE_KEY).await
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    async fn persist(&self) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec(&self.entries)
            .map_err(|e| PersistenceError::Encode(e.to_string()))?;
        self.medium.write(HISTORY_STORAGE_KEY, &bytes).await
    }
}
