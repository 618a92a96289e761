// In-memory AudioEngine for tests.
//
// Captures measure their duration with tokio's clock, so tests running with
// paused time get exact durations. Sounds are plain bookkeeping entries;
// `finish` simulates the stream reaching its end.

use super::*;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::time::Instant;

#[derive(Debug)]
struct MockSound {
    uri: String,
    duration_ms: u64,
    position_ms: u64,
    playing: bool,
    /// Set by `finish`, reported once by the next `get_status`
    just_finished: bool,
    subscriber: Option<UnboundedSender<PlaybackStatus>>,
}

impl MockSound {
    fn status(&self, did_just_finish: bool) -> PlaybackStatus {
        PlaybackStatus {
            position_ms: self.position_ms,
            duration_ms: self.duration_ms,
            is_playing: self.playing,
            did_just_finish,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    permission_denied: bool,
    fail_start: bool,
    fail_stop: bool,
    fail_play: bool,
    fail_seek: bool,
    fail_unload: bool,
    push_updates: bool,
    /// Audio payloads that `open_playable` can resolve, uri -> duration
    media: HashMap<String, u64>,
    captures: HashMap<CaptureHandle, Instant>,
    sounds: HashMap<SoundHandle, MockSound>,
    calls: Vec<String>,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn sound_mut(&mut self, sound: SoundHandle) -> Result<&mut MockSound, EngineError> {
        self.sounds
            .get_mut(&sound)
            .ok_or(EngineError::UnknownSound(sound))
    }
}

#[derive(Debug, Default)]
pub struct MockAudioEngine {
    inner: Mutex<Inner>,
}

impl MockAudioEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that delivers status updates over `subscribe`
    pub fn with_push_updates() -> Self {
        let engine = Self::new();
        engine.inner.lock().push_updates = true;
        engine
    }

    pub fn deny_permission(&self) {
        self.inner.lock().permission_denied = true;
    }

    pub fn fail_start(&self, fail: bool) {
        self.inner.lock().fail_start = fail;
    }

    pub fn fail_stop(&self, fail: bool) {
        self.inner.lock().fail_stop = fail;
    }

    pub fn fail_play(&self, fail: bool) {
        self.inner.lock().fail_play = fail;
    }

    pub fn fail_seek(&self, fail: bool) {
        self.inner.lock().fail_seek = fail;
    }

    pub fn fail_unload(&self, fail: bool) {
        self.inner.lock().fail_unload = fail;
    }

    /// Register an audio payload that can be opened by uri
    pub fn add_media(&self, uri: &str, duration_ms: u64) {
        self.inner.lock().media.insert(uri.to_string(), duration_ms);
    }

    /// Simulate the stream reaching its end; pushes the final status to a
    /// subscriber and returns it.
    pub fn finish(&self, sound: SoundHandle) -> PlaybackStatus {
        let mut inner = self.inner.lock();
        let entry = inner.sounds.get_mut(&sound).expect("unknown sound");
        entry.position_ms = entry.duration_ms;
        entry.playing = false;
        entry.just_finished = true;
        let status = entry.status(true);
        if let Some(tx) = &entry.subscriber {
            let _ = tx.send(status);
        }
        status
    }

    /// Move the playback position of a sound, pushing the update
    pub fn advance(&self, sound: SoundHandle, position_ms: u64) {
        let mut inner = self.inner.lock();
        let entry = inner.sounds.get_mut(&sound).expect("unknown sound");
        entry.position_ms = position_ms.min(entry.duration_ms);
        let status = entry.status(false);
        if let Some(tx) = &entry.subscriber {
            let _ = tx.send(status);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }

    /// Number of recorded calls whose name is `name`
    pub fn count(&self, name: &str) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.as_str() == name)
            .count()
    }

    pub fn is_loaded(&self, sound: SoundHandle) -> bool {
        self.inner.lock().sounds.contains_key(&sound)
    }

    pub fn is_playing(&self, sound: SoundHandle) -> bool {
        self.inner
            .lock()
            .sounds
            .get(&sound)
            .map(|s| s.playing)
            .unwrap_or(false)
    }

    pub fn position(&self, sound: SoundHandle) -> Option<u64> {
        self.inner.lock().sounds.get(&sound).map(|s| s.position_ms)
    }

    pub fn active_captures(&self) -> usize {
        self.inner.lock().captures.len()
    }

    pub fn uri_of(&self, sound: SoundHandle) -> Option<String> {
        self.inner.lock().sounds.get(&sound).map(|s| s.uri.clone())
    }
}

#[async_trait]
impl AudioEngine for MockAudioEngine {
    async fn request_permission(&self) -> Result<PermissionStatus, EngineError> {
        let mut inner = self.inner.lock();
        inner.calls.push("request_permission".into());
        Ok(if inner.permission_denied {
            PermissionStatus::Denied
        } else {
            PermissionStatus::Granted
        })
    }

    async fn start_capture(&self, _quality: QualityPreset) -> Result<CaptureHandle, EngineError> {
        let mut inner = self.inner.lock();
        inner.calls.push("start_capture".into());
        if inner.fail_start {
            return Err(EngineError::Capture("microphone busy".into()));
        }
        let handle = CaptureHandle(inner.next_id());
        inner.captures.insert(handle, Instant::now());
        Ok(handle)
    }

    async fn stop_capture(&self, capture: CaptureHandle) -> Result<CapturedAudio, EngineError> {
        let mut inner = self.inner.lock();
        inner.calls.push("stop_capture".into());
        if inner.fail_stop {
            return Err(EngineError::Capture("encoder failure".into()));
        }
        let started = inner
            .captures
            .remove(&capture)
            .ok_or(EngineError::UnknownCapture(capture))?;
        let duration_ms = started.elapsed().as_millis() as u64;
        let uri = format!("memory://capture-{}.m4a", capture.0);
        let sound = SoundHandle(inner.next_id());
        inner.media.insert(uri.clone(), duration_ms);
        inner.sounds.insert(
            sound,
            MockSound {
                uri: uri.clone(),
                duration_ms,
                position_ms: 0,
                playing: false,
                just_finished: false,
                subscriber: None,
            },
        );
        Ok(CapturedAudio {
            sound,
            duration_ms,
            uri,
        })
    }

    async fn open_playable(
        &self,
        uri: &str,
        _progress_interval: Duration,
    ) -> Result<SoundHandle, EngineError> {
        let mut inner = self.inner.lock();
        inner.calls.push("open_playable".into());
        let duration_ms = *inner.media.get(uri).ok_or_else(|| EngineError::Open {
            uri: uri.to_string(),
            reason: "no such media".into(),
        })?;
        let sound = SoundHandle(inner.next_id());
        inner.sounds.insert(
            sound,
            MockSound {
                uri: uri.to_string(),
                duration_ms,
                position_ms: 0,
                playing: false,
                just_finished: false,
                subscriber: None,
            },
        );
        Ok(sound)
    }

    async fn play(&self, sound: SoundHandle) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        inner.calls.push("play".into());
        if inner.fail_play {
            return Err(EngineError::Playback("output device lost".into()));
        }
        inner.sound_mut(sound)?.playing = true;
        Ok(())
    }

    async fn pause(&self, sound: SoundHandle) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        inner.calls.push("pause".into());
        inner.sound_mut(sound)?.playing = false;
        Ok(())
    }

    async fn stop(&self, sound: SoundHandle) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        inner.calls.push("stop".into());
        inner.sound_mut(sound)?.playing = false;
        Ok(())
    }

    async fn seek(&self, sound: SoundHandle, position_ms: u64) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        inner.calls.push("seek".into());
        if inner.fail_seek {
            return Err(EngineError::Playback("seek failed".into()));
        }
        let entry = inner.sound_mut(sound)?;
        entry.position_ms = position_ms.min(entry.duration_ms);
        Ok(())
    }

    async fn get_status(&self, sound: SoundHandle) -> Result<PlaybackStatus, EngineError> {
        let mut inner = self.inner.lock();
        inner.calls.push("get_status".into());
        let entry = inner.sound_mut(sound)?;
        let finished = std::mem::take(&mut entry.just_finished);
        Ok(entry.status(finished))
    }

    async fn unload(&self, sound: SoundHandle) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        inner.calls.push("unload".into());
        if inner.fail_unload {
            return Err(EngineError::Playback("unload failed".into()));
        }
        inner
            .sounds
            .remove(&sound)
            .map(|_| ())
            .ok_or(EngineError::UnknownSound(sound))
    }

    fn subscribe(&self, sound: SoundHandle) -> Option<UnboundedReceiver<PlaybackStatus>> {
        let mut inner = self.inner.lock();
        if !inner.push_updates {
            return None;
        }
        let entry = inner.sounds.get_mut(&sound)?;
        let (tx, rx) = unbounded_channel();
        entry.subscriber = Some(tx);
        Some(rx)
    }
}
