//! Assertions over envelopes and projection streams.

use even::{
    EventEnvelope, PersistedEvent, ProjectionStreamPredicate, ANONYMOUS_EVENT_TYPE,
    TYPE_REFERENCE_METADATA_KEY,
};

/// Asserts that an envelope records `expected` as its payload type reference.
///
/// # Panics
/// Panics if the reference is missing or differs.
pub fn assert_type_reference(envelope: &EventEnvelope, expected: &str) {
    assert_eq!(
        envelope.type_reference(),
        Some(expected),
        "Unexpected `{TYPE_REFERENCE_METADATA_KEY}` for event type {}",
        envelope.event_type()
    );
}

/// Asserts that an envelope is labelled anonymous and carries no type reference.
///
/// # Panics
/// Panics if the envelope has a named event type or a type reference.
pub fn assert_anonymous(envelope: &EventEnvelope) {
    assert_eq!(envelope.event_type(), ANONYMOUS_EVENT_TYPE);
    assert!(
        envelope.type_reference().is_none(),
        "Anonymous envelope carries type reference {:?}",
        envelope.type_reference()
    );
}

/// Returns the global sequences of the events a predicate selects, in order.
pub fn projection_members<P, E>(predicate: &P, events: &[E]) -> Vec<u64>
where
    P: ProjectionStreamPredicate + ?Sized,
    E: PersistedEvent,
{
    events
        .iter()
        .filter(|event| predicate.matches(*event))
        .map(PersistedEvent::global_sequence)
        .collect()
}

/// Asserts that a predicate selects exactly the events at `expected` sequences.
///
/// # Panics
/// Panics if the selected sequences differ from `expected`.
pub fn assert_projection_members<P, E>(predicate: &P, events: &[E], expected: &[u64])
where
    P: ProjectionStreamPredicate + ?Sized,
    E: PersistedEvent,
{
    let members = projection_members(predicate, events);
    assert_eq!(
        members,
        expected,
        "Projection stream {} selected unexpected events",
        predicate.projection_stream()
    );
}
