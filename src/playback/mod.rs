// Playback module: playback lifecycle and the control cool-down guard

mod guard;
mod session;

pub use guard::{ControlGuard, ControlOutcome};
pub use session::{PlaybackError, PlaybackMode, PlaybackSession, PlaybackState};
