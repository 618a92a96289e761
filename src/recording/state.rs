// Recording session state machine: Idle -> Recording -> Reviewing -> Idle

use super::ticker::{ElapsedCounter, ElapsedTicker};
use super::types::{IdGenerator, Recording, RecordingId};
use crate::audio::{
    format_time, millis_to_secs, AudioEngine, CaptureHandle, EngineError, PermissionStatus,
    QualityPreset, SoundHandle,
};
use crate::catalog::RecordingsCatalog;
use crate::config::RecorderConfig;
use crate::storage::StoreError;
use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Recording state enum representing the current state of the recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RecordingState {
    /// Nothing recorded, ready to start
    #[default]
    Idle,
    /// Actively capturing audio
    Recording,
    /// Capture finished, waiting for save or discard
    Reviewing,
}

/// Errors that can occur during session operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordingError {
    /// Microphone access was refused
    #[error("Permission to access microphone is required")]
    PermissionDenied,
    /// Operation not valid in the current state
    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: RecordingState,
        to: RecordingState,
    },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Session phase with the data each state owns
enum Phase {
    Idle,
    Recording {
        capture: CaptureHandle,
        draft: Recording,
        ticker: ElapsedTicker,
    },
    Reviewing {
        recording: Recording,
        sound: SoundHandle,
    },
}

impl Phase {
    fn state(&self) -> RecordingState {
        match self {
            Phase::Idle => RecordingState::Idle,
            Phase::Recording { .. } => RecordingState::Recording,
            Phase::Reviewing { .. } => RecordingState::Reviewing,
        }
    }
}

/// One capture-to-save-or-discard lifecycle.
///
/// Owned by the controller of the recording screen; all operations run on the
/// UI task and suspend only at engine and store calls.
pub struct RecordingSession {
    engine: Arc<dyn AudioEngine>,
    quality: QualityPreset,
    tick_period: Duration,
    elapsed: ElapsedCounter,
    ids: IdGenerator,
    phase: Phase,
}

impl RecordingSession {
    /// Create a new session in Idle state
    pub fn new(engine: Arc<dyn AudioEngine>, config: &RecorderConfig) -> Self {
        Self {
            engine,
            quality: QualityPreset::default(),
            tick_period: config.elapsed_tick(),
            elapsed: ElapsedCounter::new(),
            ids: IdGenerator::new(),
            phase: Phase::Idle,
        }
    }

    /// Quality preset used by the next `start`
    pub fn set_quality(&mut self, quality: QualityPreset) {
        self.quality = quality;
    }

    pub fn quality(&self) -> QualityPreset {
        self.quality
    }

    /// Get the current recording state
    pub fn state(&self) -> RecordingState {
        self.phase.state()
    }

    /// Seconds counted by the elapsed-time ticker
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.get()
    }

    /// Elapsed time as `MM:SS`
    pub fn elapsed_display(&self) -> String {
        format_time(self.elapsed_secs())
    }

    /// Provisional record of the capture in progress
    pub fn draft(&self) -> Option<&Recording> {
        match &self.phase {
            Phase::Recording { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Finalized recording awaiting a decision, with its loaded sound
    pub fn reviewing(&self) -> Option<(&Recording, SoundHandle)> {
        match &self.phase {
            Phase::Reviewing { recording, sound } => Some((recording, *sound)),
            _ => None,
        }
    }

    fn invalid(&self, to: RecordingState) -> RecordingError {
        RecordingError::InvalidTransition {
            from: self.state(),
            to,
        }
    }

    /// Start capturing.
    ///
    /// Only valid from Idle; a second call while recording fails without
    /// touching the running timer. Permission denial or an engine failure
    /// leaves the session Idle.
    pub async fn start(&mut self) -> Result<RecordingId, RecordingError> {
        if !matches!(self.phase, Phase::Idle) {
            return Err(self.invalid(RecordingState::Recording));
        }

        if self.engine.request_permission().await? == PermissionStatus::Denied {
            crate::warn!("Microphone permission denied");
            return Err(RecordingError::PermissionDenied);
        }

        let capture = self.engine.start_capture(self.quality).await?;

        self.elapsed.reset();
        let ticker = ElapsedTicker::spawn(self.elapsed.clone(), self.tick_period);
        let (id, name) = self.ids.next(Local::now());
        crate::info!("Recording started: {} ({:?})", id, self.quality);

        self.phase = Phase::Recording {
            capture,
            draft: Recording::draft(id.clone(), name),
            ticker,
        };
        Ok(id)
    }

    /// Finalize the capture and move to Reviewing.
    ///
    /// If the engine fails to finalize, the session stays Recording with the
    /// timer running so the stop can be retried.
    pub async fn stop(&mut self) -> Result<Recording, RecordingError> {
        let capture = match &self.phase {
            Phase::Recording { capture, .. } => *capture,
            _ => {
                crate::debug!("Stop ignored: session is {:?}", self.state());
                return Err(self.invalid(RecordingState::Reviewing));
            }
        };

        let captured = match self.engine.stop_capture(capture).await {
            Ok(captured) => captured,
            Err(e) => {
                crate::error!("Error stopping recording, capture kept running: {}", e);
                return Err(e.into());
            }
        };

        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Recording { draft, ticker, .. } => {
                ticker.cancel();
                let recording = Recording {
                    id: draft.id,
                    name: draft.name,
                    duration: format_time(millis_to_secs(captured.duration_ms)),
                    uri: captured.uri,
                };
                crate::info!(
                    "Recording stopped: {} ({})",
                    recording.id,
                    recording.duration
                );
                self.phase = Phase::Reviewing {
                    recording: recording.clone(),
                    sound: captured.sound,
                };
                Ok(recording)
            }
            other => {
                // Phase cannot change while this call holds &mut self
                self.phase = other;
                Err(self.invalid(RecordingState::Reviewing))
            }
        }
    }

    /// Persist the reviewed recording and return to Idle.
    ///
    /// A store failure leaves the session Reviewing and the catalog unchanged.
    pub async fn save(
        &mut self,
        catalog: &mut RecordingsCatalog,
    ) -> Result<Recording, RecordingError> {
        let (recording, sound) = match &self.phase {
            Phase::Reviewing { recording, sound } => (recording.clone(), *sound),
            _ => return Err(self.invalid(RecordingState::Idle)),
        };

        catalog.append(recording.clone()).await?;

        self.phase = Phase::Idle;
        self.release(sound).await;
        Ok(recording)
    }

    /// Drop the reviewed recording without persisting it.
    pub async fn discard(&mut self) -> Result<RecordingId, RecordingError> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Reviewing { recording, sound } => {
                self.release(sound).await;
                crate::info!("Recording discarded: {}", recording.id);
                Ok(recording.id)
            }
            other => {
                self.phase = other;
                Err(self.invalid(RecordingState::Idle))
            }
        }
    }

    /// Screen teardown: stop the timer and release engine resources.
    ///
    /// Best-effort; failures are logged and the session always ends Idle.
    pub async fn cleanup(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::Recording {
                capture, ticker, ..
            } => {
                ticker.cancel();
                match self.engine.stop_capture(capture).await {
                    Ok(captured) => self.release(captured.sound).await,
                    Err(e) => crate::warn!("Failed to stop capture during cleanup: {}", e),
                }
            }
            Phase::Reviewing { sound, .. } => self.release(sound).await,
        }
    }

    async fn release(&self, sound: SoundHandle) {
        if let Err(e) = self.engine.unload(sound).await {
            crate::warn!("Failed to unload sound {:?}: {}", sound, e);
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
