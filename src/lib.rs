// Recording, storage and playback core for the voice memo app.
// The UI shell links this crate and drives it through RecorderController.

// Enable coverage attribute on nightly for explicit exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod audio;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod events;
pub mod logging;
pub mod playback;
pub mod recording;
pub mod settings;
pub mod storage;

// Re-export log macros for use throughout the crate
pub use log::{debug, error, info, trace, warn};

pub use audio::{
    AudioEngine, CaptureHandle, CapturedAudio, EngineError, PermissionStatus, PlaybackStatus,
    QualityPreset, SoundHandle,
};
pub use catalog::RecordingsCatalog;
pub use config::RecorderConfig;
pub use controller::{RecorderController, RecorderError};
pub use events::{ChannelEventEmitter, RecorderEvent, RecorderEventEmitter};
pub use playback::{ControlOutcome, PlaybackError, PlaybackMode, PlaybackSession, PlaybackState};
pub use recording::{Recording, RecordingError, RecordingId, RecordingSession, RecordingState};
pub use settings::Settings;
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, RecordingStore, StoreError};
