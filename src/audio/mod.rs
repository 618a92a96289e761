// Audio engine capability consumed by the recording and playback sessions.
//
// The native capture/playback engine lives outside this crate (platform media
// APIs). Sessions only see this trait, which keeps them testable against
// MockAudioEngine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

mod format;
pub use format::{format_playback_time, format_time, millis_to_secs};

#[cfg(test)]
pub(crate) mod mock;

/// Opaque handle to an in-progress capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureHandle(pub u64);

/// Opaque handle to a loaded, playable sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u64);

/// Result of asking the microphone permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Capture quality preset passed to the engine when recording starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QualityPreset {
    #[default]
    HighQuality,
    LowQuality,
}

/// What the engine hands back once a capture is finalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedAudio {
    /// Loaded sound for the captured audio, ready to play
    pub sound: SoundHandle,
    /// Exact duration of the capture in milliseconds
    pub duration_ms: u64,
    /// Locator of the audio payload (file path or blob reference)
    pub uri: String,
}

/// Snapshot of a sound's playback status, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub position_ms: u64,
    pub duration_ms: u64,
    pub is_playing: bool,
    /// True exactly once, on the update where the stream reached its end
    pub did_just_finish: bool,
}

/// Failures reported by the audio engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Capture failed: {0}")]
    Capture(String),
    #[error("Could not open {uri}: {reason}")]
    Open { uri: String, reason: String },
    #[error("Playback failed: {0}")]
    Playback(String),
    #[error("Unknown sound handle {0:?}")]
    UnknownSound(SoundHandle),
    #[error("Unknown capture handle {0:?}")]
    UnknownCapture(CaptureHandle),
}

/// Native audio capture and playback primitives.
///
/// Every method is a suspension point of the UI task. Implementations report
/// positions and durations in milliseconds.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Ask for microphone access.
    async fn request_permission(&self) -> Result<PermissionStatus, EngineError>;

    /// Begin capturing from the microphone.
    async fn start_capture(&self, quality: QualityPreset) -> Result<CaptureHandle, EngineError>;

    /// Finalize a capture and load the result as a playable sound.
    async fn stop_capture(&self, capture: CaptureHandle) -> Result<CapturedAudio, EngineError>;

    /// Load the audio at `uri`. `progress_interval` is the cadence at which
    /// engines with push support deliver status updates.
    async fn open_playable(
        &self,
        uri: &str,
        progress_interval: Duration,
    ) -> Result<SoundHandle, EngineError>;

    /// Start or resume playback.
    async fn play(&self, sound: SoundHandle) -> Result<(), EngineError>;

    async fn pause(&self, sound: SoundHandle) -> Result<(), EngineError>;

    async fn stop(&self, sound: SoundHandle) -> Result<(), EngineError>;

    async fn seek(&self, sound: SoundHandle, position_ms: u64) -> Result<(), EngineError>;

    async fn get_status(&self, sound: SoundHandle) -> Result<PlaybackStatus, EngineError>;

    /// Release the sound. The handle is invalid afterwards.
    async fn unload(&self, sound: SoundHandle) -> Result<(), EngineError>;

    /// Push channel of status updates for `sound`.
    ///
    /// Engines without push notifications return `None` and the playback
    /// session falls back to polling `get_status`.
    fn subscribe(&self, _sound: SoundHandle) -> Option<UnboundedReceiver<PlaybackStatus>> {
        None
    }
}
