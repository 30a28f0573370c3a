//! Memo and time-bound value types carried by a transaction envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

/// Optional annotation on a transaction. Text and numeric ids are mutually
/// exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Memo {
    /// UTF-8 text, at most 28 bytes.
    Text(String),
    /// A 64-bit identifier, typically an exchange deposit id.
    Id(u64),
}

impl Memo {
    /// Tag byte used in the transaction's canonical encoding.
    pub(crate) fn tag(&self) -> u8 {
        match self {
            Self::Text(_) => 1,
            Self::Id(_) => 2,
        }
    }
}

impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "text:{}", text),
            Self::Id(id) => write!(f, "id:{}", id),
        }
    }
}

// ---------------------------------------------------------------------------
// TimeBounds
// ---------------------------------------------------------------------------

/// Validity window in Unix seconds. A transaction is valid for
/// `min_time <= now < max_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBounds {
    pub min_time: i64,
    pub max_time: i64,
}

impl TimeBounds {
    pub fn new(min_time: i64, max_time: i64) -> Self {
        Self { min_time, max_time }
    }

    pub fn from_datetimes(min: DateTime<Utc>, max: DateTime<Utc>) -> Self {
        Self::new(min.timestamp(), max.timestamp())
    }

    /// `min_time < max_time`.
    pub fn is_well_formed(&self) -> bool {
        self.min_time < self.max_time
    }

    /// Half-open containment check.
    pub fn contains(&self, now: i64) -> bool {
        self.min_time <= now && now < self.max_time
    }
}

impl fmt::Display for TimeBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.min_time, self.max_time)
    }
}

/// Serde adapter for 32-byte hashes as lowercase hex.
pub(crate) mod hex32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let decoded = hex::decode(&s).map_err(serde::de::Error::custom)?;
        decoded
            .as_slice()
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}
