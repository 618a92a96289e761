//! Runtime configuration for the recorder core.
//!
//! Values are fixed by the UI contract (1 s elapsed ticks, 500 ms progress
//! updates, 500 ms control cool-down) but kept configurable so tests and hosts
//! can tune them. Every field has a serde default, so a partial JSON object
//! deserializes cleanly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Interval between elapsed-time ticks while recording
pub const DEFAULT_ELAPSED_TICK_MS: u64 = 1000;

/// Interval between playback position updates
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 500;

/// Cool-down after a user-triggered playback control completes
pub const DEFAULT_CONTROL_COOLDOWN_MS: u64 = 500;

/// File name of the JSON key-value store inside the data directory
pub const DEFAULT_STORE_FILE: &str = "voicememo.json";

/// Recorder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderConfig {
    pub elapsed_tick_ms: u64,
    pub progress_interval_ms: u64,
    pub control_cooldown_ms: u64,
    pub store_file: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            elapsed_tick_ms: DEFAULT_ELAPSED_TICK_MS,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
            control_cooldown_ms: DEFAULT_CONTROL_COOLDOWN_MS,
            store_file: DEFAULT_STORE_FILE.to_string(),
        }
    }
}

impl RecorderConfig {
    pub fn elapsed_tick(&self) -> Duration {
        Duration::from_millis(self.elapsed_tick_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn control_cooldown(&self) -> Duration {
        Duration::from_millis(self.control_cooldown_ms)
    }

    /// Default location of the store file.
    ///
    /// Uses the platform data directory (e.g. `~/.local/share/voicememo/`),
    /// falling back to the working directory when none is known.
    pub fn default_store_path(&self) -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("voicememo"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(&self.store_file)
    }
}
