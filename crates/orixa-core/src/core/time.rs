// crates/orixa-core/src/core/time.rs
// ============================================================================
// Module: Orixa Time Model
// Description: Timestamps attached to saved rules, mappings, and audit events.
// Purpose: Keep engines free of direct wall-clock reads.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Engines never read the wall clock directly; they ask an injected
//! [`crate::interfaces::Clock`]. Timestamps are unix milliseconds in memory;
//! persisted save times use the [`rfc3339`] serde adapter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Unix epoch milliseconds.
///
/// # Invariants
/// - No validation is performed; monotonicity is a clock responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the unix milliseconds value.
    #[must_use]
    pub const fn unix_millis(self) -> i64 {
        self.0
    }

    /// Renders the timestamp as RFC 3339, or `None` when out of range.
    #[must_use]
    pub fn to_rfc3339(self) -> Option<String> {
        let nanos = i128::from(self.0) * 1_000_000;
        let moment = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;
        moment.format(&Rfc3339).ok()
    }

    /// Parses an RFC 3339 string.
    #[must_use]
    pub fn parse_rfc3339(text: &str) -> Option<Self> {
        let moment = OffsetDateTime::parse(text, &Rfc3339).ok()?;
        let millis = moment.unix_timestamp_nanos() / 1_000_000;
        i64::try_from(millis).ok().map(Self)
    }
}

// ============================================================================
// SECTION: RFC 3339 Serde
// ============================================================================

/// Serde adapter storing a [`Timestamp`] as an RFC 3339 string.
///
/// Deserialization also accepts integer unix milliseconds.
pub mod rfc3339 {
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;
    use serde::de::Error as _;
    use serde::ser::Error as _;

    use super::Timestamp;

    /// Accepted wire forms.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        /// RFC 3339 text.
        Text(String),
        /// Unix milliseconds.
        Millis(i64),
    }

    /// Serializes `timestamp` as RFC 3339.
    ///
    /// # Errors
    /// Returns an error when the timestamp is outside the representable date range.
    pub fn serialize<S: Serializer>(timestamp: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        let text = timestamp.to_rfc3339().ok_or_else(|| {
            S::Error::custom(format!("timestamp {} ms is out of range", timestamp.unix_millis()))
        })?;
        serializer.serialize_str(&text)
    }

    /// Deserializes an RFC 3339 string or integer milliseconds.
    ///
    /// # Errors
    /// Returns an error when the text is not valid RFC 3339.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        match Wire::deserialize(deserializer)? {
            Wire::Text(text) => Timestamp::parse_rfc3339(&text)
                .ok_or_else(|| D::Error::custom(format!("invalid RFC 3339 timestamp: {text}"))),
            Wire::Millis(millis) => Ok(Timestamp::from_unix_millis(millis)),
        }
    }
}
