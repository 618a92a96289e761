// Recording module: the capture lifecycle and the persisted record type

mod state;
mod ticker;
mod types;

pub use state::{RecordingError, RecordingSession, RecordingState};
pub use ticker::{ElapsedCounter, ElapsedTicker};
pub use types::{recording_name, IdGenerator, Recording, RecordingId, PLACEHOLDER_DURATION};
