// Persisted recording record and its identifier

use chrono::{
    DateTime, Duration as ChronoDuration, DurationRound, Local, NaiveDate, NaiveDateTime,
    TimeZone,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// strftime pattern of generated ids: local time down to the millisecond
const ID_FORMAT: &str = "%Y%m%d%H%M%S%3f";

/// Length of an id produced with ID_FORMAT
const ID_LEN: usize = 17;

/// Placeholder duration shown while a recording is in progress
pub const PLACEHOLDER_DURATION: &str = "00:00";

/// Identifier of a recording.
///
/// Always a string. Older stores persisted ids as JSON numbers (Unix epoch
/// milliseconds); those are accepted on load and normalised to their decimal
/// form, so lookups compare strings only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordingId(String);

impl RecordingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for a recording created at `at`
    pub fn from_timestamp(at: &DateTime<Local>) -> Self {
        Self(at.format(ID_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time encoded in the id, in local time.
    ///
    /// Generated ids carry a `YYYYMMDDhhmmssSSS` timestamp; legacy all-digit
    /// ids are epoch milliseconds. Anything else has no known creation time.
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        if !self.0.bytes().all(|b| b.is_ascii_digit()) || self.0.is_empty() {
            return None;
        }
        if self.0.len() == ID_LEN {
            if let Some(at) = parse_timestamp_id(&self.0) {
                return Some(at);
            }
        }
        let millis: i64 = self.0.parse().ok()?;
        Local
            .timestamp_millis_opt(millis)
            .single()
            .map(|at| at.naive_local())
    }

    /// Creation date encoded in the id
    pub fn created_on(&self) -> Option<NaiveDate> {
        self.created_at().map(|at| at.date())
    }
}

fn parse_timestamp_id(id: &str) -> Option<NaiveDateTime> {
    let field = |range: std::ops::Range<usize>| id.get(range)?.parse::<u32>().ok();
    let year = id.get(0..4)?.parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?)?.and_hms_milli_opt(
        field(8..10)?,
        field(10..12)?,
        field(12..14)?,
        field(14..17)?,
    )
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordingId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordingId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for RecordingId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RecordingId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<'de> Deserialize<'de> for RecordingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => Self(id),
            RawId::Number(id) => Self(id.to_string()),
        })
    }
}

/// A saved (or about to be saved) recording.
///
/// The open engine handle of a freshly stopped recording is not part of this
/// type; it lives only in the session that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    /// Primary key, derived from the creation timestamp
    pub id: RecordingId,
    /// Display name, derived from the creation timestamp
    pub name: String,
    /// Formatted `mm:ss` duration, fixed at stop time
    pub duration: String,
    /// Locator of the audio payload
    #[serde(default, alias = "fileUri")]
    pub uri: String,
}

impl Recording {
    /// Provisional record for a capture that just started
    pub fn draft(id: RecordingId, name: String) -> Self {
        Self {
            id,
            name,
            duration: PLACEHOLDER_DURATION.to_string(),
            uri: String::new(),
        }
    }
}

/// Display name for a recording created at `at`: `Recording-DDMMYYYYhhmm`
pub fn recording_name(at: &DateTime<Local>) -> String {
    format!("Recording-{}", at.format("%d%m%Y%H%M"))
}

/// Hands out strictly increasing creation timestamps.
///
/// Two recordings started within the same millisecond would otherwise share
/// an id; the later one is pushed forward by a millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: Option<DateTime<Local>>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id and display name for a recording created at `now`
    pub fn next(&mut self, now: DateTime<Local>) -> (RecordingId, String) {
        // Ids carry milliseconds only; compare at that precision
        let now = now
            .duration_trunc(ChronoDuration::milliseconds(1))
            .unwrap_or(now);
        let at = match self.last {
            Some(last) if now <= last => last + ChronoDuration::milliseconds(1),
            _ => now,
        };
        self.last = Some(at);
        (RecordingId::from_timestamp(&at), recording_name(&at))
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
