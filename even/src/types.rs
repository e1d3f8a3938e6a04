//! Value types shared by envelopes and persisted events.
//!
//! Both types are assigned once when an envelope is captured and never change
//! afterwards.

use chrono::{DateTime, Utc};
use nutype::nutype;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A globally unique event identifier using UUIDv7 format.
///
/// UUIDv7 keeps identifiers of envelopes captured in sequence sortable by
/// creation time.
#[nutype(
    validate(predicate = |id: &Uuid| id.get_version() == Some(uuid::Version::SortRand)),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct EventId(Uuid);

impl EventId {
    /// Generates a new `EventId` for the current instant.
    pub fn new() -> Self {
        Self::try_new(Uuid::now_v7()).expect("Uuid::now_v7() should always return a valid v7 UUID")
    }

    /// Returns true for the nil UUID, which `new` never produces.
    pub fn is_nil(&self) -> bool {
        self.as_ref().is_nil()
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// The UTC instant an envelope was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp from a UTC `DateTime`.
    pub const fn new(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Creates a timestamp representing the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying `DateTime`.
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Converts the timestamp into the underlying `DateTime`.
    pub const fn into_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::new(datetime)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.into_datetime()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn event_id_rejects_non_v7_uuids(uuid_bytes in any::<[u8; 16]>(), version in 0u8..=6u8) {
            let mut bytes = uuid_bytes;
            bytes[6] = (bytes[6] & 0x0F) | (version << 4);
            bytes[8] = (bytes[8] & 0x3F) | 0x80;

            let result = EventId::try_new(Uuid::from_bytes(bytes));
            prop_assert!(result.is_err());
        }

        #[test]
        fn timestamp_ordering_matches_datetime_ordering(
            secs1 in 0i64..253_402_300_799i64,
            secs2 in 0i64..253_402_300_799i64,
        ) {
            use chrono::TimeZone;

            if let (Some(dt1), Some(dt2)) = (
                Utc.timestamp_opt(secs1, 0).single(),
                Utc.timestamp_opt(secs2, 0).single()
            ) {
                prop_assert_eq!(Timestamp::new(dt1) < Timestamp::new(dt2), dt1 < dt2);
                prop_assert_eq!(Timestamp::new(dt1).into_datetime(), dt1);
            }
        }
    }

    #[test]
    fn event_id_new_creates_valid_v7() {
        let event_id = EventId::new();
        assert_eq!(
            event_id.as_ref().get_version(),
            Some(uuid::Version::SortRand)
        );
        assert!(!event_id.is_nil());
    }

    #[test]
    fn event_ids_are_unique() {
        assert_ne!(EventId::default(), EventId::default());
    }

    #[test]
    fn timestamp_serializes_transparently() {
        let timestamp = Timestamp::now();
        let json = serde_json::to_string(&timestamp).unwrap();
        let expected = serde_json::to_string(timestamp.as_datetime()).unwrap();
        assert_eq!(json, expected);
    }
}
