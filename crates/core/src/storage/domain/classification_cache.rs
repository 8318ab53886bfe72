use std::sync::Arc;

use crate::detection::domain::attribute_classifier::Gender;
use crate::shared::constants::GENDER_STORAGE_KEY;
use crate::storage::domain::key_value_store::{KeyValueStore, StorageError};

/// Remembers the classifier label across sessions so later forms can be
/// prefilled. Resetting the challenge leaves it alone.
#[derive(Clone)]
pub struct ClassificationCache {
    backend: Arc<dyn KeyValueStore>,
}

impl ClassificationCache {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Cached label; unreadable or unknown values count as absent.
    pub fn load(&self) -> Option<Gender> {
        match self.backend.get(GENDER_STORAGE_KEY) {
            Ok(value) => value.as_deref().and_then(Gender::parse),
            Err(e) => {
                log::warn!("Could not read cached classification: {e}");
                None
            }
        }
    }

    pub fn save(&self, gender: Gender) -> Result<(), StorageError> {
        self.backend.set(GENDER_STORAGE_KEY, gender.as_str())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove(GENDER_STORAGE_KEY)
    }
}
