//! Read-side boundary with the storage engine.
//!
//! The storage engine owns how events are stored and decoded. This crate only
//! reads the accessors below; projection predicates consume [`PersistedEvent`]
//! values and never construct them.

use crate::domain::DomainEvent;
use crate::stream::StreamIdentity;
use crate::types::{EventId, Timestamp};
use std::fmt;

/// An event read back from the store.
pub trait PersistedEvent: Send + Sync + fmt::Debug {
    /// Position of the event in the global log.
    fn global_sequence(&self) -> u64;

    /// The stream the event was persisted to.
    fn stream(&self) -> &StreamIdentity;

    /// The logical event-type name recorded at write time.
    fn event_type(&self) -> &str;

    /// The decoded domain event.
    fn domain_event(&self) -> &dyn DomainEvent;
}

/// An event read as part of a single stream.
pub trait PersistedStreamEvent: PersistedEvent {
    /// Position of the event within its stream.
    fn stream_sequence(&self) -> u64;
}

/// An undecoded record as stored by the engine.
pub trait PersistedRawEvent: Send + Sync {
    /// Position of the record in the global log.
    fn global_sequence(&self) -> u64;

    /// Identifier assigned when the envelope was captured.
    fn event_id(&self) -> EventId;

    /// The stream the record belongs to.
    fn stream(&self) -> &StreamIdentity;

    /// The logical event-type name.
    fn event_type(&self) -> &str;

    /// When the envelope was captured.
    fn timestamp(&self) -> Timestamp;

    /// Encoded metadata, if any was stored.
    fn metadata(&self) -> Option<&[u8]>;

    /// Encoded payload.
    fn payload(&self) -> &[u8];

    /// Storage-format version of the payload encoding.
    fn payload_format(&self) -> u32;
}

/// Decodes raw records into persisted events.
pub trait PersistedEventFactory: Send + Sync {
    /// Decodes a record read from the global log.
    fn create_event(&self, raw: &dyn PersistedRawEvent) -> Box<dyn PersistedEvent>;

    /// Decodes a record read from a single stream.
    fn create_stream_event(
        &self,
        raw: &dyn PersistedRawEvent,
        stream_sequence: u64,
    ) -> Box<dyn PersistedStreamEvent>;
}
