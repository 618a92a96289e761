//! Recording collection persistence.
//!
//! The whole collection is one JSON array under [`RECORDINGS_KEY`]. The only
//! update pattern is read-modify-write of the full list; concurrent writers
//! are last-writer-wins.

use super::{KeyValueStore, StoreError};
use crate::recording::Recording;
use std::sync::Arc;

/// Key holding the serialized recording list
pub const RECORDINGS_KEY: &str = "recordings";

/// Serializes the recording list to and from the key-value store
#[derive(Clone)]
pub struct RecordingStore {
    kv: Arc<dyn KeyValueStore>,
}

impl RecordingStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load the persisted collection, failing on read or parse errors.
    pub async fn try_load(&self) -> Result<Vec<Recording>, StoreError> {
        let Some(json) = self.kv.get(RECORDINGS_KEY).await? else {
            crate::debug!("No recordings persisted yet");
            return Ok(Vec::new());
        };

        serde_json::from_str(&json).map_err(|e| StoreError::Parse(e.to_string()))
    }

    /// Load the persisted collection.
    ///
    /// Degrades to an empty list when nothing is stored or the stored value
    /// cannot be read; the failure is logged.
    pub async fn load(&self) -> Vec<Recording> {
        match self.try_load().await {
            Ok(recordings) => recordings,
            Err(e) => {
                crate::warn!("Error loading recordings: {}", e);
                Vec::new()
            }
        }
    }

    /// Replace the persisted collection.
    pub async fn save_all(&self, recordings: &[Recording]) -> Result<(), StoreError> {
        let json =
            serde_json::to_string(recordings).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.kv.set(RECORDINGS_KEY, json).await?;
        crate::debug!("Persisted {} recordings", recordings.len());
        Ok(())
    }

    /// Append one recording (load, append, write back).
    ///
    /// Returns the collection as written. A collection that fails to load is
    /// not overwritten.
    pub async fn append(&self, recording: Recording) -> Result<Vec<Recording>, StoreError> {
        let mut recordings = self.try_load().await?;

        if recordings.iter().any(|r| r.id == recording.id) {
            return Err(StoreError::DuplicateId(recording.id));
        }

        recordings.push(recording);
        self.save_all(&recordings).await?;
        Ok(recordings)
    }
}

#[cfg(test)]
#[path = "recording_test.rs"]
mod tests;
