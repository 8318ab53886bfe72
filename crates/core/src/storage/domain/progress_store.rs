use std::sync::Arc;

use crate::challenge::domain::progress::Progress;
use crate::shared::constants::PROGRESS_STORAGE_KEY;
use crate::storage::domain::key_value_store::{KeyValueStore, StorageError};

/// Result of reading the persisted progress cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressLoad {
    /// Stored value, or the first step when nothing was stored.
    Ok(Progress),
    /// The backend could not be read.
    Unavailable(String),
    /// Something was stored but it is not a valid progress value, or the
    /// backing file itself is unreadable as data.
    Corrupt(String),
}

impl ProgressLoad {
    /// Progress to resume from; failures fall back to the first step.
    pub fn progress(&self) -> Progress {
        match self {
            ProgressLoad::Ok(progress) => *progress,
            ProgressLoad::Unavailable(_) | ProgressLoad::Corrupt(_) => Progress::START,
        }
    }
}

/// Single-integer progress cursor under a versioned key.
#[derive(Clone)]
pub struct ProgressStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
}

impl ProgressStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(backend, PROGRESS_STORAGE_KEY)
    }

    pub fn with_key(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn load(&self) -> ProgressLoad {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ProgressLoad::Ok(Progress::START),
            Err(e @ StorageError::Malformed { .. }) => return ProgressLoad::Corrupt(e.to_string()),
            Err(e) => return ProgressLoad::Unavailable(e.to_string()),
        };
        match raw.trim().parse::<u8>().ok().and_then(Progress::new) {
            Some(progress) => ProgressLoad::Ok(progress),
            None => ProgressLoad::Corrupt(raw),
        }
    }

    pub fn save(&self, progress: Progress) -> Result<(), StorageError> {
        self.backend.set(&self.key, &progress.to_string())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove(&self.key)
    }
}
