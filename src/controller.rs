// Recorder controller - the operation boundary the UI shell calls into
//
// Owns the recording session, the two playback sessions (inline review and
// playback by id) and the catalog. Every public operation logs its failures,
// turns the user-facing ones into alert events, and returns the error.

use crate::audio::{AudioEngine, PermissionStatus, QualityPreset};
use crate::catalog::RecordingsCatalog;
use crate::config::RecorderConfig;
use crate::events::{
    current_timestamp, AlertPayload, PlaybackStatusPayload, RecorderEventEmitter,
    RecordingDiscardedPayload, RecordingStartedPayload, RecordingStoppedPayload,
    RecordingsUpdatedPayload,
};
use crate::playback::{ControlOutcome, PlaybackError, PlaybackMode, PlaybackSession, PlaybackState};
use crate::recording::{Recording, RecordingError, RecordingId, RecordingSession};
use crate::settings::Settings;
use crate::storage::{KeyValueStore, RecordingStore, StoreError};
use std::sync::Arc;

/// Alert titles and messages shown to the user
pub mod alerts {
    pub const ERROR: &str = "Error";
    pub const PLAYBACK_ERROR: &str = "Playback Error";
    pub const PERMISSION_REQUIRED: &str = "Permission Required";

    pub const MICROPHONE_REQUIRED: &str = "Permission to access microphone is required!";
    pub const SAVE_FAILED: &str = "Failed to save recording";
    pub const NOT_FOUND: &str = "Recording not found";
    pub const LOAD_RECORDING_FAILED: &str = "Failed to load recording";
    pub const LOAD_AUDIO_FAILED: &str = "There was an error loading the audio file.";
    pub const TOGGLE_FAILED: &str = "There was an error toggling playback.";
    pub const STOP_FAILED: &str = "There was an error stopping the audio.";
}

/// Errors surfaced by controller operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecorderError {
    #[error(transparent)]
    Recording(#[from] RecordingError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Recording not found: {0}")]
    NotFound(String),
}

pub struct RecorderController {
    engine: Arc<dyn AudioEngine>,
    kv: Arc<dyn KeyValueStore>,
    emitter: Arc<dyn RecorderEventEmitter>,
    recording: RecordingSession,
    review: PlaybackSession,
    playback: PlaybackSession,
    catalog: RecordingsCatalog,
    settings: Settings,
}

impl RecorderController {
    pub fn new(
        engine: Arc<dyn AudioEngine>,
        kv: Arc<dyn KeyValueStore>,
        emitter: Arc<dyn RecorderEventEmitter>,
        config: &RecorderConfig,
    ) -> Self {
        Self {
            recording: RecordingSession::new(engine.clone(), config),
            review: PlaybackSession::new(engine.clone(), PlaybackMode::Inline, config),
            playback: PlaybackSession::new(engine.clone(), PlaybackMode::ById, config),
            catalog: RecordingsCatalog::new(RecordingStore::new(kv.clone())),
            settings: Settings::default(),
            engine,
            kv,
            emitter,
        }
    }

    pub fn recording_session(&self) -> &RecordingSession {
        &self.recording
    }

    /// Inline playback of the capture under review
    pub fn review_session(&self) -> &PlaybackSession {
        &self.review
    }

    /// Playback screen session
    pub fn playback_session(&self) -> &PlaybackSession {
        &self.playback
    }

    pub fn catalog(&self) -> &RecordingsCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    fn alert(&self, title: &str, message: &str) {
        self.emitter.emit_alert(AlertPayload::new(title, message));
    }

    fn emit_status(&self, session: &PlaybackSession) {
        self.emitter.emit_playback_status(PlaybackStatusPayload {
            recording_id: session.recording().map(|r| r.id.to_string()),
            state: session.state(),
            position_secs: session.position_secs(),
            duration_secs: session.duration_secs(),
            position: session.position_display(),
            duration: session.duration_display(),
        });
    }

    fn emit_updated(&self, action: &str, recording_id: Option<&RecordingId>) {
        self.emitter.emit_recordings_updated(RecordingsUpdatedPayload {
            action: action.to_string(),
            recording_id: recording_id.map(|id| id.to_string()),
            count: self.catalog.len(),
        });
    }

    /// Screen mount: ask for the microphone up front, apply stored settings
    /// and load the catalog.
    pub async fn init(&mut self) {
        match self.engine.request_permission().await {
            Ok(PermissionStatus::Granted) => crate::debug!("Microphone permission granted"),
            Ok(PermissionStatus::Denied) => {
                crate::warn!("Microphone permission denied");
                self.alert(alerts::PERMISSION_REQUIRED, alerts::MICROPHONE_REQUIRED);
            }
            Err(e) => crate::error!("Failed to request microphone permission: {}", e),
        }

        self.settings = Settings::load(self.kv.as_ref()).await;
        self.recording.set_quality(self.settings.quality);
        self.playback.set_repeat(self.settings.repeat_playback);

        self.refresh_recordings().await;
        crate::info!(
            "Recorder initialized with {} recordings",
            self.catalog.len()
        );
    }

    /// Reload the catalog. Read failures leave it empty and are only logged.
    pub async fn refresh_recordings(&mut self) -> &[Recording] {
        self.catalog.refresh().await;
        self.emit_updated("refresh", None);
        self.catalog.recordings()
    }

    pub fn recordings(&self) -> &[Recording] {
        self.catalog.recordings()
    }

    pub fn todays_recordings(&self) -> Vec<&Recording> {
        self.catalog.todays_recordings()
    }

    pub async fn start_recording(&mut self) -> Result<RecordingId, RecorderError> {
        match self.recording.start().await {
            Ok(id) => {
                self.emitter.emit_recording_started(RecordingStartedPayload {
                    recording_id: id.to_string(),
                    timestamp: current_timestamp(),
                });
                Ok(id)
            }
            Err(RecordingError::PermissionDenied) => {
                self.alert(alerts::PERMISSION_REQUIRED, alerts::MICROPHONE_REQUIRED);
                Err(RecordingError::PermissionDenied.into())
            }
            Err(e) => {
                crate::error!("Error starting recording: {}", e);
                Err(e.into())
            }
        }
    }

    pub async fn stop_recording(&mut self) -> Result<Recording, RecorderError> {
        let recording = self.recording.stop().await.map_err(|e| {
            crate::error!("Error stopping recording: {}", e);
            e
        })?;
        self.emitter.emit_recording_stopped(RecordingStoppedPayload {
            recording: recording.clone(),
        });
        Ok(recording)
    }

    /// Persist the capture under review.
    ///
    /// Saving releases the reviewed sound, so inline playback is detached
    /// afterwards. A failed save leaves the review player untouched.
    pub async fn save_recording(&mut self) -> Result<Recording, RecorderError> {
        match self.recording.save(&mut self.catalog).await {
            Ok(recording) => {
                self.review.detach().await;
                self.emit_updated("add", Some(&recording.id));
                Ok(recording)
            }
            Err(e) => {
                crate::error!("Error saving recording: {}", e);
                if matches!(e, RecordingError::Store(_)) {
                    self.alert(alerts::ERROR, alerts::SAVE_FAILED);
                }
                Err(e.into())
            }
        }
    }

    pub async fn discard_recording(&mut self) -> Result<RecordingId, RecorderError> {
        let id = self.recording.discard().await.map_err(|e| {
            crate::warn!("Error discarding recording: {}", e);
            e
        })?;
        self.review.detach().await;
        self.emitter
            .emit_recording_discarded(RecordingDiscardedPayload {
                recording_id: id.to_string(),
            });
        Ok(id)
    }

    /// Play the capture under review from the start
    pub async fn play_current(&mut self) -> Result<ControlOutcome, RecorderError> {
        let Some((recording, sound)) = self.recording.reviewing() else {
            crate::debug!("Nothing under review to play");
            return Err(PlaybackError::NoRecording.into());
        };
        let recording = recording.clone();

        let result = match self.review.attach(&recording, sound).await {
            Ok(()) => self.review.play().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(outcome) => {
                self.emit_status(&self.review);
                Ok(outcome)
            }
            Err(e) => {
                crate::error!("Error playing recording: {}", e);
                Err(e.into())
            }
        }
    }

    pub async fn stop_current(&mut self) -> Result<ControlOutcome, RecorderError> {
        let outcome = self.review.stop().await.map_err(|e| {
            crate::warn!("Error stopping review playback: {}", e);
            e
        })?;
        self.emit_status(&self.review);
        Ok(outcome)
    }

    /// Follow the inline playback until it finishes
    pub async fn track_current(&mut self) -> Result<Option<PlaybackState>, RecorderError> {
        let state = self.review.track().await?;
        if state.is_some() {
            self.emit_status(&self.review);
        }
        Ok(state)
    }

    /// Open the playback screen for a saved recording.
    pub async fn open_playback(&mut self, id: &str) -> Result<Recording, RecorderError> {
        if let Err(e) = self.catalog.try_refresh().await {
            crate::error!("Error loading recording by ID {}: {}", id, e);
            self.alert(alerts::ERROR, alerts::LOAD_RECORDING_FAILED);
            return Err(e.into());
        }

        let Some(recording) = self.catalog.find_by_id(id).cloned() else {
            crate::warn!("Recording not found: {}", id);
            self.alert(alerts::ERROR, alerts::NOT_FOUND);
            return Err(RecorderError::NotFound(id.to_string()));
        };

        if let Err(e) = self.playback.load(&recording).await {
            self.alert(alerts::PLAYBACK_ERROR, alerts::LOAD_AUDIO_FAILED);
            return Err(e.into());
        }
        self.emit_status(&self.playback);
        Ok(recording)
    }

    pub async fn toggle_playback(&mut self) -> Result<ControlOutcome, RecorderError> {
        match self.playback.toggle().await {
            Ok(outcome) => {
                if outcome == ControlOutcome::Applied {
                    self.emit_status(&self.playback);
                }
                Ok(outcome)
            }
            Err(e) => {
                crate::error!("Error toggling playback: {}", e);
                self.alert(alerts::PLAYBACK_ERROR, alerts::TOGGLE_FAILED);
                Err(e.into())
            }
        }
    }

    pub async fn stop_playback(&mut self) -> Result<ControlOutcome, RecorderError> {
        match self.playback.stop().await {
            Ok(outcome) => {
                if outcome == ControlOutcome::Applied {
                    self.emit_status(&self.playback);
                }
                Ok(outcome)
            }
            // Stop pressed while already stopped
            Err(e @ PlaybackError::InvalidTransition { .. }) => {
                crate::debug!("Stop ignored: {}", e);
                Err(e.into())
            }
            Err(e) => {
                crate::error!("Error stopping playback: {}", e);
                self.alert(alerts::PLAYBACK_ERROR, alerts::STOP_FAILED);
                Err(e.into())
            }
        }
    }

    /// Await the next status of the playback screen session and publish it.
    /// Returns `None` once there is nothing left to track.
    pub async fn track_playback(&mut self) -> Result<Option<PlaybackState>, RecorderError> {
        match self.playback.track().await {
            Ok(Some(state)) => {
                self.emit_status(&self.playback);
                Ok(Some(state))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                crate::error!("Error tracking playback: {}", e);
                Err(e.into())
            }
        }
    }

    /// Toggle repeat on the playback screen and remember it
    pub async fn set_repeat(&mut self, repeat: bool) -> Result<(), RecorderError> {
        self.playback.set_repeat(repeat);
        self.settings.repeat_playback = repeat;
        self.persist_settings().await
    }

    /// Quality preset for the next recording, remembered across launches
    pub async fn set_quality(&mut self, quality: QualityPreset) -> Result<(), RecorderError> {
        self.recording.set_quality(quality);
        self.settings.quality = quality;
        self.persist_settings().await
    }

    async fn persist_settings(&self) -> Result<(), RecorderError> {
        self.settings.save(self.kv.as_ref()).await.map_err(|e| {
            crate::warn!("Failed to persist settings: {}", e);
            RecorderError::from(e)
        })
    }

    /// Screen teardown: stop every timer and release every engine handle.
    pub async fn shutdown(&mut self) {
        self.review.cleanup().await;
        self.playback.cleanup().await;
        self.recording.cleanup().await;
        crate::info!("Recorder shut down");
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
