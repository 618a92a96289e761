//! Durable storage for recordings and settings.
//!
//! - `kv`: the `KeyValueStore` capability plus the JSON-file and in-memory
//!   backends
//! - `recording`: `RecordingStore`, the recording collection kept as one JSON
//!   array under a fixed key

mod kv;
mod recording;

pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use recording::{RecordingStore, RECORDINGS_KEY};

use crate::recording::RecordingId;

/// Error types for storage operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Backend could not be read
    #[error("Failed to read store: {0}")]
    Read(String),
    /// Backend could not be written
    #[error("Failed to write store: {0}")]
    Write(String),
    /// Stored value is not valid JSON for the expected type
    #[error("Failed to parse stored value: {0}")]
    Parse(String),
    /// Value could not be serialized
    #[error("Failed to serialize value: {0}")]
    Serialize(String),
    /// Recording with this ID is already persisted
    #[error("Recording with ID {0} already exists")]
    DuplicateId(RecordingId),
}
