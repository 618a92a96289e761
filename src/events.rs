// Recorder events for UI notification
// Defines event payloads and emission trait for testability

use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::playback::PlaybackState;
use crate::recording::Recording;

/// Event names as constants for consistency
pub mod event_names {
    pub const RECORDING_STARTED: &str = "recording_started";
    pub const RECORDING_STOPPED: &str = "recording_stopped";
    pub const RECORDING_DISCARDED: &str = "recording_discarded";
    pub const RECORDINGS_UPDATED: &str = "recordings_updated";
    pub const PLAYBACK_STATUS: &str = "playback_status";
    pub const ALERT: &str = "alert";
}

/// Payload for recording_started event
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordingStartedPayload {
    /// Id the recording will be saved under
    pub recording_id: String,
    /// ISO 8601 timestamp when recording started
    pub timestamp: String,
}

/// Payload for recording_stopped event
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordingStoppedPayload {
    /// Finalized recording awaiting save or discard
    pub recording: Recording,
}

/// Payload for recording_discarded event
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordingDiscardedPayload {
    pub recording_id: String,
}

/// Payload for recordings_updated event
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordingsUpdatedPayload {
    /// "add" after a save, "refresh" after a reload
    pub action: String,
    /// Affected recording, if any
    pub recording_id: Option<String>,
    /// Size of the collection after the change
    pub count: usize,
}

/// Payload for playback_status event
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatusPayload {
    pub recording_id: Option<String>,
    pub state: PlaybackState,
    pub position_secs: u64,
    pub duration_secs: u64,
    /// Position formatted for display (`MM:SS` or `H:MM:SS`)
    pub position: String,
    /// Total duration formatted for display
    pub duration: String,
}

/// Payload for alert event: a user-visible failure
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlertPayload {
    pub title: String,
    pub message: String,
}

impl AlertPayload {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Trait for emitting recorder events
/// Allows mocking in tests while the UI shell receives them in production
pub trait RecorderEventEmitter: Send + Sync {
    /// Emit recording_started event
    fn emit_recording_started(&self, payload: RecordingStartedPayload);

    /// Emit recording_stopped event
    fn emit_recording_stopped(&self, payload: RecordingStoppedPayload);

    /// Emit recording_discarded event
    fn emit_recording_discarded(&self, payload: RecordingDiscardedPayload);

    /// Emit recordings_updated event
    fn emit_recordings_updated(&self, payload: RecordingsUpdatedPayload);

    /// Emit playback_status event
    fn emit_playback_status(&self, payload: PlaybackStatusPayload);

    /// Emit alert event
    fn emit_alert(&self, payload: AlertPayload);
}

/// Event as delivered to the UI loop
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum RecorderEvent {
    RecordingStarted(RecordingStartedPayload),
    RecordingStopped(RecordingStoppedPayload),
    RecordingDiscarded(RecordingDiscardedPayload),
    RecordingsUpdated(RecordingsUpdatedPayload),
    PlaybackStatus(PlaybackStatusPayload),
    Alert(AlertPayload),
}

impl RecorderEvent {
    /// Event name, matching `event_names`
    pub fn name(&self) -> &'static str {
        match self {
            RecorderEvent::RecordingStarted(_) => event_names::RECORDING_STARTED,
            RecorderEvent::RecordingStopped(_) => event_names::RECORDING_STOPPED,
            RecorderEvent::RecordingDiscarded(_) => event_names::RECORDING_DISCARDED,
            RecorderEvent::RecordingsUpdated(_) => event_names::RECORDINGS_UPDATED,
            RecorderEvent::PlaybackStatus(_) => event_names::PLAYBACK_STATUS,
            RecorderEvent::Alert(_) => event_names::ALERT,
        }
    }
}

/// Helper macro to send events with error logging.
///
/// Logs a warning if the receiving side is gone instead of propagating the error.
macro_rules! send_or_warn {
    ($tx:expr, $event:expr) => {
        let event = $event;
        let name = event.name();
        if $tx.send(event).is_err() {
            crate::warn!("Failed to emit event '{}': receiver dropped", name);
        }
    };
}

/// Emitter that forwards every event over an unbounded channel to the UI loop
#[derive(Debug, Clone)]
pub struct ChannelEventEmitter {
    tx: UnboundedSender<RecorderEvent>,
}

impl ChannelEventEmitter {
    /// Create an emitter and the receiver the UI loop drains.
    pub fn new() -> (Self, UnboundedReceiver<RecorderEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }
}

impl RecorderEventEmitter for ChannelEventEmitter {
    fn emit_recording_started(&self, payload: RecordingStartedPayload) {
        send_or_warn!(self.tx, RecorderEvent::RecordingStarted(payload));
    }

    fn emit_recording_stopped(&self, payload: RecordingStoppedPayload) {
        send_or_warn!(self.tx, RecorderEvent::RecordingStopped(payload));
    }

    fn emit_recording_discarded(&self, payload: RecordingDiscardedPayload) {
        send_or_warn!(self.tx, RecorderEvent::RecordingDiscarded(payload));
    }

    fn emit_recordings_updated(&self, payload: RecordingsUpdatedPayload) {
        send_or_warn!(self.tx, RecorderEvent::RecordingsUpdated(payload));
    }

    fn emit_playback_status(&self, payload: PlaybackStatusPayload) {
        send_or_warn!(self.tx, RecorderEvent::PlaybackStatus(payload));
    }

    fn emit_alert(&self, payload: AlertPayload) {
        send_or_warn!(self.tx, RecorderEvent::Alert(payload));
    }
}

/// Get the current timestamp in ISO 8601 format
pub fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
#[path = "events_test.rs"]
pub(crate) mod tests;
