use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::CoreError;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Length of a store identifier in hexadecimal characters (12-byte ObjectId).
pub const ITEM_ID_LEN: usize = 24;

/// Current time truncated to millisecond precision.
///
/// The document store keeps dates as milliseconds since the epoch, so every
/// timestamp is created at that precision to compare equal after a round trip.
pub fn now() -> Timestamp {
    let now = chrono::Utc::now();
    chrono::DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// A syntactically valid item identifier: 24 lowercase hexadecimal characters.
///
/// Store operations only accept an `ItemId`, so a malformed identifier is
/// rejected before any query is issued and never reported as "not found".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// Parse a raw identifier (e.g. a path segment).
    ///
    /// Hex digits are accepted in either case and normalized to lowercase.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.len() != ITEM_ID_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidId(format!(
                "'{raw}' is not a valid item id (expected {ITEM_ID_LEN} hexadecimal characters)"
            )));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ItemId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
