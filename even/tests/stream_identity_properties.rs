//! Property tests for content-addressed stream identities.

use even::{DomainTypePredicate, ProjectionStreamPredicate, StreamIdentity, HASH_LENGTH};
use even_testing::generators::{arb_named_stream, arb_stream_hash, arb_stream_name};
use proptest::prelude::*;
use std::collections::HashSet;

#[test]
fn known_name_digest() {
    let stream = StreamIdentity::from_name("account-1").unwrap();
    assert_eq!(stream.to_hex(), "d189aa4d3d82a6d699674a2079217dfb2706825d");
}

#[test]
fn known_byte_digests() {
    assert_eq!(
        StreamIdentity::from_bytes("abc").to_hex(),
        "a9993e364706816aba3e25717850c26c9cd0d89d"
    );
    assert_eq!(
        StreamIdentity::from_bytes("").to_hex(),
        "da39a3ee5e6b4b0d3255bfef95601890afd80709"
    );
}

#[test]
fn projection_stream_matches_digest_of_identity_bytes() {
    trait Auditable {}

    let predicate = DomainTypePredicate::implementing::<dyn Auditable>().unwrap();
    let identity = predicate.identity_source();
    let expected = format!(
        "DomainTypePredicate\u{1f}{}\u{1f}{}",
        identity.type_full_name(),
        identity.type_module_name()
    );

    assert_eq!(
        predicate.projection_stream(),
        StreamIdentity::from_bytes(expected)
    );
}

proptest! {
    #[test]
    fn name_case_does_not_change_identity(name in arb_stream_name()) {
        let upper = StreamIdentity::from_name(name.to_uppercase()).unwrap();
        let lower = StreamIdentity::from_name(name.to_lowercase()).unwrap();

        prop_assert_eq!(&upper, &lower);
        prop_assert_eq!(upper.hash(), lower.hash());
    }

    #[test]
    fn named_identity_equals_hash_only_identity(stream in arb_named_stream()) {
        let hash_only = StreamIdentity::from_hash(stream.hash()).unwrap();

        prop_assert_eq!(&stream, &hash_only);
        prop_assert_eq!(hash_only.name(), "");
    }

    #[test]
    fn name_is_informational(hash in arb_stream_hash(), name in arb_stream_name()) {
        let stream = StreamIdentity::from_hash_and_name(&hash, name.clone()).unwrap();

        prop_assert_eq!(stream.hash(), &hash);
        prop_assert_eq!(stream.name(), name.as_str());
    }

    #[test]
    fn wrong_hash_length_is_rejected(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        prop_assume!(bytes.len() != HASH_LENGTH);
        prop_assert!(StreamIdentity::from_hash(&bytes).is_err());
    }

    #[test]
    fn distinct_lowercased_names_give_distinct_hashes(
        names in prop::collection::hash_set(arb_stream_name(), 1..20)
    ) {
        let lowered: HashSet<String> = names.iter().map(|name| name.to_lowercase()).collect();
        let hashes: HashSet<[u8; HASH_LENGTH]> = lowered
            .iter()
            .map(|name| *StreamIdentity::from_name(name.as_str()).unwrap().hash())
            .collect();

        prop_assert_eq!(hashes.len(), lowered.len());
    }

    #[test]
    fn serde_keeps_hash_and_name(stream in arb_named_stream()) {
        let json = serde_json::to_string(&stream).unwrap();
        let decoded: StreamIdentity = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(decoded.hash(), stream.hash());
        prop_assert_eq!(decoded.name(), stream.name());
    }
}
