// Playback session state machine: Stopped <-> Playing <-> Paused
//
// Holds at most one sound handle for one recording. Position updates come
// from the engine, pushed when it supports `subscribe`, polled otherwise.

use super::guard::{ControlGuard, ControlOutcome};
use crate::audio::{
    format_playback_time, millis_to_secs, AudioEngine, EngineError, PlaybackStatus, SoundHandle,
};
use crate::config::RecorderConfig;
use crate::recording::Recording;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// Public playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Which screen the session serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    /// Review playback on the recording screen: pause acts as stop
    Inline,
    /// Playback screen opened for a saved recording
    #[default]
    ById,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("Invalid playback transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: PlaybackState,
        to: PlaybackState,
    },
    #[error("No recording loaded")]
    NoRecording,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Clone, Copy)]
struct LoadedSound {
    sound: SoundHandle,
    /// False when the handle belongs to the recording session
    owned: bool,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Unloaded,
    Stopped(LoadedSound),
    Playing(LoadedSound),
    Paused(LoadedSound),
}

impl Phase {
    fn state(&self) -> PlaybackState {
        match self {
            Phase::Unloaded | Phase::Stopped(_) => PlaybackState::Stopped,
            Phase::Playing(_) => PlaybackState::Playing,
            Phase::Paused(_) => PlaybackState::Paused,
        }
    }

    fn loaded(&self) -> Option<LoadedSound> {
        match *self {
            Phase::Unloaded => None,
            Phase::Stopped(l) | Phase::Playing(l) | Phase::Paused(l) => Some(l),
        }
    }
}

/// Run a user-triggered control through the cool-down guard
macro_rules! guarded {
    ($self:ident, $op:expr) => {{
        if !$self.guard.is_open() {
            crate::debug!("Playback control dropped inside cool-down window");
            return Ok(ControlOutcome::Debounced);
        }
        let result = $op.await;
        $self.guard.arm();
        result.map(|_| ControlOutcome::Applied)
    }};
}

pub struct PlaybackSession {
    engine: Arc<dyn AudioEngine>,
    mode: PlaybackMode,
    progress_interval: Duration,
    guard: ControlGuard,
    recording: Option<Recording>,
    phase: Phase,
    position_ms: u64,
    duration_ms: u64,
    repeat: bool,
    updates: Option<UnboundedReceiver<PlaybackStatus>>,
}

impl PlaybackSession {
    pub fn new(engine: Arc<dyn AudioEngine>, mode: PlaybackMode, config: &RecorderConfig) -> Self {
        Self {
            engine,
            mode,
            progress_interval: config.progress_interval(),
            guard: ControlGuard::new(config.control_cooldown()),
            recording: None,
            phase: Phase::Unloaded,
            position_ms: 0,
            duration_ms: 0,
            repeat: false,
            updates: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.phase.state()
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn recording(&self) -> Option<&Recording> {
        self.recording.as_ref()
    }

    /// Handle currently held, owned or borrowed
    pub fn sound(&self) -> Option<SoundHandle> {
        self.phase.loaded().map(|l| l.sound)
    }

    pub fn is_loaded(&self) -> bool {
        self.sound().is_some()
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }

    pub fn position_secs(&self) -> u64 {
        millis_to_secs(self.position_ms)
    }

    pub fn duration_secs(&self) -> u64 {
        millis_to_secs(self.duration_ms)
    }

    /// Position for display, with an hour field for recordings of an hour or more
    pub fn position_display(&self) -> String {
        format_playback_time(self.position_secs(), self.duration_secs())
    }

    pub fn duration_display(&self) -> String {
        format_playback_time(self.duration_secs(), self.duration_secs())
    }

    fn invalid(&self, to: PlaybackState) -> PlaybackError {
        PlaybackError::InvalidTransition {
            from: self.state(),
            to,
        }
    }

    /// Open a sound for `recording`.
    ///
    /// No-op when a handle for the same recording is already held. Any other
    /// held handle is released first. On failure the session is left
    /// Stopped with nothing loaded.
    /// ```ignore
    /// session.load(&recording).await?;
    /// session.play().await?;
    /// while let Some(state) = session.track().await? { /* render */ }
    /// ```
    pub async fn load(&mut self, recording: &Recording) -> Result<(), PlaybackError> {
        if self.is_loaded() && self.recording.as_ref().map(|r| &r.id) == Some(&recording.id) {
            return Ok(());
        }
        self.release().await;
        // Kept on failure so a later play() retries the load
        self.recording = Some(recording.clone());

        let sound = self
            .engine
            .open_playable(&recording.uri, self.progress_interval)
            .await
            .map_err(|e| {
                crate::error!("Failed to load recording {}: {}", recording.id, e);
                e
            })?;

        let status = match self.engine.get_status(sound).await {
            Ok(status) => status,
            Err(e) => {
                if let Err(unload_err) = self.engine.unload(sound).await {
                    crate::warn!("Failed to unload sound {:?}: {}", sound, unload_err);
                }
                return Err(e.into());
            }
        };

        self.install(recording, LoadedSound { sound, owned: true }, status);
        crate::info!(
            "Loaded recording {} ({} ms)",
            recording.id,
            self.duration_ms
        );
        Ok(())
    }

    /// Play a handle owned by someone else, typically the recording session
    /// while a capture is under review. The handle is never unloaded here.
    pub async fn attach(
        &mut self,
        recording: &Recording,
        sound: SoundHandle,
    ) -> Result<(), PlaybackError> {
        if self.sound() == Some(sound) {
            return Ok(());
        }
        self.release().await;

        let status = self.engine.get_status(sound).await?;
        self.install(recording, LoadedSound { sound, owned: false }, status);
        Ok(())
    }

    fn install(&mut self, recording: &Recording, loaded: LoadedSound, status: PlaybackStatus) {
        self.recording = Some(recording.clone());
        self.phase = Phase::Stopped(loaded);
        self.position_ms = 0;
        self.duration_ms = status.duration_ms;
        self.updates = self.engine.subscribe(loaded.sound);
        self.guard.reset();
    }

    /// Start or resume playback. Loads the current recording first if needed.
    pub async fn play(&mut self) -> Result<ControlOutcome, PlaybackError> {
        guarded!(self, self.play_inner())
    }

    /// Pause playback; in inline mode this stops and rewinds instead.
    pub async fn pause(&mut self) -> Result<ControlOutcome, PlaybackError> {
        guarded!(self, self.pause_inner())
    }

    /// Stop playback and rewind to the start.
    pub async fn stop(&mut self) -> Result<ControlOutcome, PlaybackError> {
        guarded!(self, self.stop_inner())
    }

    /// Play/pause button: pauses while playing, plays otherwise.
    pub async fn toggle(&mut self) -> Result<ControlOutcome, PlaybackError> {
        guarded!(self, self.toggle_inner())
    }

    async fn toggle_inner(&mut self) -> Result<(), PlaybackError> {
        match self.phase {
            Phase::Playing(_) => self.pause_inner().await,
            _ => self.play_inner().await,
        }
    }

    async fn play_inner(&mut self) -> Result<(), PlaybackError> {
        let loaded = match self.phase {
            Phase::Playing(_) => return Err(self.invalid(PlaybackState::Playing)),
            Phase::Stopped(l) | Phase::Paused(l) => l,
            Phase::Unloaded => {
                let recording = self.recording.clone().ok_or(PlaybackError::NoRecording)?;
                self.load(&recording).await?;
                self.phase.loaded().ok_or(PlaybackError::NoRecording)?
            }
        };

        self.engine.play(loaded.sound).await?;
        self.phase = Phase::Playing(loaded);
        crate::debug!("Playback started at {} ms", self.position_ms);
        Ok(())
    }

    async fn pause_inner(&mut self) -> Result<(), PlaybackError> {
        if self.mode == PlaybackMode::Inline {
            return self.stop_inner().await;
        }
        match self.phase {
            Phase::Playing(loaded) => {
                self.engine.pause(loaded.sound).await?;
                self.phase = Phase::Paused(loaded);
                Ok(())
            }
            _ => Err(self.invalid(PlaybackState::Paused)),
        }
    }

    async fn stop_inner(&mut self) -> Result<(), PlaybackError> {
        match self.phase {
            Phase::Playing(loaded) | Phase::Paused(loaded) => {
                self.engine.stop(loaded.sound).await?;
                // Engine has stopped; the phase follows even if the rewind fails
                self.phase = Phase::Stopped(loaded);
                self.position_ms = 0;
                self.engine.seek(loaded.sound, 0).await.map_err(|e| {
                    crate::warn!("Stopped but failed to rewind {:?}: {}", loaded.sound, e);
                    e
                })?;
                Ok(())
            }
            _ => Err(self.invalid(PlaybackState::Stopped)),
        }
    }

    /// Fold an engine status update into the session.
    ///
    /// When the stream finishes while playing, repeat rewinds and keeps
    /// playing; otherwise playback stops and rewinds. Engine-originated, so
    /// the control guard does not apply.
    pub async fn apply_status(
        &mut self,
        status: PlaybackStatus,
    ) -> Result<PlaybackState, PlaybackError> {
        let Some(loaded) = self.phase.loaded() else {
            return Ok(self.state());
        };

        self.position_ms = status.position_ms;
        if status.duration_ms > 0 {
            self.duration_ms = status.duration_ms;
        }

        if status.did_just_finish && matches!(self.phase, Phase::Playing(_)) {
            if self.repeat {
                crate::debug!("Playback finished, repeating");
                self.engine.seek(loaded.sound, 0).await?;
                self.engine.play(loaded.sound).await?;
                self.position_ms = 0;
            } else {
                crate::debug!("Playback finished");
                self.stop_inner().await?;
            }
        }
        Ok(self.state())
    }

    /// Wait for the next status update.
    ///
    /// Uses the engine's push channel when available, otherwise polls every
    /// progress interval. `None` once nothing is playing; updates still
    /// queued from before a stop or pause are dropped.
    pub async fn next_status(&mut self) -> Result<Option<PlaybackStatus>, PlaybackError> {
        let playing = matches!(self.phase, Phase::Playing(_));

        if let Some(rx) = self.updates.as_mut() {
            if !playing {
                while rx.try_recv().is_ok() {}
                return Ok(None);
            }
            match rx.recv().await {
                Some(status) => return Ok(Some(status)),
                None => {
                    crate::debug!("Status channel closed, falling back to polling");
                    self.updates = None;
                }
            }
        }

        let Phase::Playing(loaded) = self.phase else {
            return Ok(None);
        };
        tokio::time::sleep(self.progress_interval).await;
        Ok(Some(self.engine.get_status(loaded.sound).await?))
    }

    /// Await one status update and apply it. `None` when there is nothing
    /// left to track.
    pub async fn track(&mut self) -> Result<Option<PlaybackState>, PlaybackError> {
        match self.next_status().await? {
            Some(status) => self.apply_status(status).await.map(Some),
            None => Ok(None),
        }
    }

    /// Screen teardown: stop playback and release an owned handle.
    pub async fn cleanup(&mut self) {
        self.release().await;
        self.recording = None;
        self.guard.reset();
    }

    /// Forget a borrowed handle whose owner has already released it, without
    /// touching the engine. An owned handle is released as in `cleanup`.
    pub async fn detach(&mut self) {
        match self.phase.loaded() {
            Some(loaded) if !loaded.owned => {
                self.phase = Phase::Unloaded;
                self.updates = None;
                self.position_ms = 0;
                self.duration_ms = 0;
                self.recording = None;
                self.guard.reset();
            }
            _ => self.cleanup().await,
        }
    }

    /// Stop and drop the held handle, unloading it when owned. Best-effort.
    async fn release(&mut self) {
        let phase = std::mem::replace(&mut self.phase, Phase::Unloaded);
        self.updates = None;
        self.position_ms = 0;
        self.duration_ms = 0;

        let Some(loaded) = phase.loaded() else {
            return;
        };
        if matches!(phase, Phase::Playing(_) | Phase::Paused(_)) {
            if let Err(e) = self.engine.stop(loaded.sound).await {
                crate::warn!("Failed to stop sound {:?}: {}", loaded.sound, e);
            }
        }
        if loaded.owned {
            if let Err(e) = self.engine.unload(loaded.sound).await {
                crate::warn!("Failed to unload sound {:?}: {}", loaded.sound, e);
            }
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
