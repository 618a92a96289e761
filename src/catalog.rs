// In-memory view over the persisted recordings, read by the list screens.

use crate::recording::{Recording, RecordingId};
use crate::storage::{RecordingStore, StoreError};
use chrono::{Local, NaiveDate};

/// Ordered list of saved recordings, loaded wholesale from the store
pub struct RecordingsCatalog {
    store: RecordingStore,
    recordings: Vec<Recording>,
}

impl RecordingsCatalog {
    /// Create an empty catalog; call `refresh` to load.
    pub fn new(store: RecordingStore) -> Self {
        Self {
            store,
            recordings: Vec::new(),
        }
    }

    pub fn store(&self) -> &RecordingStore {
        &self.store
    }

    /// Reload the full collection. Read failures leave an empty catalog.
    pub async fn refresh(&mut self) -> &[Recording] {
        self.recordings = self.store.load().await;
        crate::debug!("Catalog refreshed: {} recordings", self.recordings.len());
        &self.recordings
    }

    /// Reload, reporting read failures. The in-memory list is kept on error.
    pub async fn try_refresh(&mut self) -> Result<&[Recording], StoreError> {
        self.recordings = self.store.try_load().await?;
        Ok(&self.recordings)
    }

    /// All recordings in insertion order
    pub fn recordings(&self) -> &[Recording] {
        &self.recordings
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    /// Recordings whose id encodes a creation date equal to `date`
    pub fn filter_by_created_on(&self, date: NaiveDate) -> Vec<&Recording> {
        self.recordings
            .iter()
            .filter(|r| r.id.created_on() == Some(date))
            .collect()
    }

    /// Recordings created today (local time)
    pub fn todays_recordings(&self) -> Vec<&Recording> {
        self.filter_by_created_on(Local::now().date_naive())
    }

    /// Linear lookup by id, compared as strings
    pub fn find_by_id(&self, id: &str) -> Option<&Recording> {
        self.recordings.iter().find(|r| r.id.as_str() == id)
    }

    pub fn contains(&self, id: &RecordingId) -> bool {
        self.find_by_id(id.as_str()).is_some()
    }

    /// Persist a new recording, then mirror the written collection.
    ///
    /// On failure the in-memory list is left as it was.
    pub async fn append(&mut self, recording: Recording) -> Result<(), StoreError> {
        let id = recording.id.clone();
        self.recordings = self.store.append(recording).await?;
        crate::info!("Recording {} saved ({} total)", id, self.recordings.len());
        Ok(())
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
