//! Normalization of provider timestamps.
//!
//! The API emits timestamps as `YYYY-MM-DDTHH:MM:SS` in UTC with no offset.
//! Parsing never fails hard: a blank or malformed value yields `None` and the
//! containing record stays usable.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Timestamp layout used by the provider.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a provider timestamp into a UTC time.
///
/// Returns `None` for empty or unparseable input. RFC 3339 values with an
/// explicit offset are accepted as well.
#[must_use]
pub fn normalize(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Some(naive.and_utc());
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Normalize an optional raw field.
#[must_use]
pub fn normalize_opt(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(normalize)
}

/// A wire timestamp paired with its normalized value.
///
/// The raw string is what the provider sent and what gets serialized back;
/// the structured time is always derived from it, so the two cannot drift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Timestamp {
    raw: String,
    time: Option<DateTime<Utc>>,
}

impl Timestamp {
    /// Normalize a raw wire value.
    #[must_use]
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let time = normalize(&raw);
        Self { raw, time }
    }

    /// The value exactly as received.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalized time, or `None` if the raw value was blank or invalid.
    #[must_use]
    pub const fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    /// Returns true if the raw value was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Re-derive the structured time from the raw value.
    #[must_use]
    pub fn renormalized(&self) -> Self {
        Self::parse(self.raw.clone())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::parse(raw.unwrap_or_default()))
    }
}
