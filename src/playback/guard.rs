// Cool-down guard for user-triggered playback controls
//
// Rapid repeated presses of play/pause/stop are dropped while a cool-down
// window, measured from the completion of the last accepted press, is open.

use crate::config::DEFAULT_CONTROL_COOLDOWN_MS;
use std::time::Duration;
use tokio::time::Instant;

/// What happened to a guarded control request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The request passed the guard and was carried out
    Applied,
    /// The request arrived inside the cool-down window and was dropped
    Debounced,
}

/// Drops control requests arriving within `cooldown` of the previous one.
///
/// Requests are never queued: a dropped request has no effect at all.
#[derive(Debug, Clone)]
pub struct ControlGuard {
    /// Completion time of the last accepted request
    last_completed: Option<Instant>,
    cooldown: Duration,
}

impl ControlGuard {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            last_completed: None,
            cooldown,
        }
    }

    /// Whether a request arriving now would be accepted
    pub fn is_open(&self) -> bool {
        match self.last_completed {
            Some(last) => Instant::now().duration_since(last) >= self.cooldown,
            None => true,
        }
    }

    /// Start the cool-down window. Call once the accepted request completes,
    /// whether or not it succeeded.
    pub fn arm(&mut self) {
        self.last_completed = Some(Instant::now());
    }

    /// Forget the last request, e.g. when a new recording is loaded
    pub fn reset(&mut self) {
        self.last_completed = None;
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Default for ControlGuard {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_CONTROL_COOLDOWN_MS))
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
