//! Property test generators for `even` types.
//!
//! Each generator only produces values the corresponding constructor accepts.

use chrono::{TimeZone, Utc};
use even::{EventId, StreamIdentity, Timestamp, HASH_LENGTH};
use proptest::prelude::*;

/// Generates non-empty stream names in mixed case.
///
/// # Example
/// ```rust,ignore
/// use proptest::prelude::*;
/// use even_testing::generators::arb_stream_name;
///
/// proptest! {
///     #[test]
///     fn names_hash(name in arb_stream_name()) {
///         assert!(even::StreamIdentity::from_name(name).is_ok());
///     }
/// }
/// ```
pub fn arb_stream_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9._:-]{0,63}"
}

/// Generates arbitrary 20-byte stream hashes.
pub fn arb_stream_hash() -> impl Strategy<Value = [u8; HASH_LENGTH]> {
    any::<[u8; HASH_LENGTH]>()
}

/// Generates stream identities built from names.
pub fn arb_named_stream() -> impl Strategy<Value = StreamIdentity> {
    arb_stream_name().prop_filter_map("Invalid stream name", |name| {
        StreamIdentity::from_name(name).ok()
    })
}

/// Generates stream identities with only a hash, as read back from storage.
pub fn arb_hashed_stream() -> impl Strategy<Value = StreamIdentity> {
    arb_stream_hash().prop_map(StreamIdentity::from)
}

/// Generates named and hash-only stream identities.
pub fn arb_stream_identity() -> impl Strategy<Value = StreamIdentity> {
    prop_oneof![arb_named_stream(), arb_hashed_stream()]
}

/// Generates `UUIDv7` event identifiers.
pub fn arb_event_id() -> impl Strategy<Value = EventId> {
    any::<()>().prop_map(|()| EventId::new())
}

/// Generates timestamps up to the year 9999.
pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
    (0i64..=253_402_300_799i64).prop_filter_map("Invalid timestamp", |secs| {
        Utc.timestamp_opt(secs, 0).single().map(Timestamp::new)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn named_streams_keep_their_name(stream in arb_named_stream()) {
            prop_assert!(stream.has_name());
            prop_assert_eq!(stream.hash().len(), HASH_LENGTH);
        }

        #[test]
        fn hashed_streams_have_no_name(stream in arb_hashed_stream()) {
            prop_assert!(!stream.has_name());
        }

        #[test]
        fn event_ids_are_not_nil(id in arb_event_id()) {
            prop_assert!(!id.is_nil());
        }
    }
}
