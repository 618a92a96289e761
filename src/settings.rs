//! User settings persisted next to the recordings.
//!
//! Stored as one JSON object under the `"settings"` key of the same
//! key-value store. Missing fields take their defaults, so settings written
//! by an older build still load.

use crate::audio::QualityPreset;
use crate::storage::{KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};

/// Key under which settings are stored
pub const SETTINGS_KEY: &str = "settings";

/// Settings screen values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Capture quality for new recordings
    pub quality: QualityPreset,
    /// Restart playback from the beginning when it reaches the end
    pub repeat_playback: bool,
}

impl Settings {
    /// Load settings.
    ///
    /// Returns defaults when nothing is stored or the stored value cannot be
    /// read; the failure is logged.
    pub async fn load(store: &dyn KeyValueStore) -> Self {
        match Self::try_load(store).await {
            Ok(settings) => settings,
            Err(e) => {
                crate::warn!("Failed to load settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub async fn try_load(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        let Some(raw) = store.get(SETTINGS_KEY).await? else {
            return Ok(Self::default());
        };
        serde_json::from_str(&raw).map_err(|e| StoreError::Parse(e.to_string()))
    }

    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let raw = serde_json::to_string(self).map_err(|e| StoreError::Serialize(e.to_string()))?;
        store.set(SETTINGS_KEY, raw).await?;
        crate::debug!("Settings saved: {:?}", self);
        Ok(())
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
