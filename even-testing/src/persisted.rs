//! In-memory stand-ins for the storage engine's read side.
//!
//! [`MockPersistedEventFactory`] decodes [`RawEventRecord`]s the way a storage
//! engine would, copying the global sequence, stream and stream sequence onto
//! the events it creates. Payload decoding is pluggable; by default payloads
//! stay undecoded.

use even::{
    DomainEvent, EventEnvelope, EventId, PersistedEvent, PersistedEventFactory, PersistedRawEvent,
    PersistedStreamEvent, StreamIdentity, Timestamp, TypeKey, BASELINE_STORAGE_FORMAT,
};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Turns a raw record's payload into a domain event.
pub type PayloadDecoder = Arc<dyn Fn(&dyn PersistedRawEvent) -> Arc<dyn DomainEvent> + Send + Sync>;

/// A payload the factory had no decoder for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndecodedPayload {
    event_type: String,
    bytes: Vec<u8>,
}

impl UndecodedPayload {
    /// Keeps the encoded payload of a record.
    pub fn new(event_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            event_type: event_type.into(),
            bytes: bytes.into(),
        }
    }

    /// The event type recorded alongside the payload.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The encoded payload.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl DomainEvent for UndecodedPayload {
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An owned raw record, as a storage engine would read it.
#[derive(Debug, Clone)]
pub struct RawEventRecord {
    global_sequence: u64,
    event_id: EventId,
    stream: StreamIdentity,
    event_type: String,
    timestamp: Timestamp,
    metadata: Option<Vec<u8>>,
    payload: Vec<u8>,
    payload_format: u32,
}

impl RawEventRecord {
    /// A record with an empty payload in the baseline storage format.
    pub fn new(global_sequence: u64, stream: StreamIdentity, event_type: impl Into<String>) -> Self {
        Self {
            global_sequence,
            event_id: EventId::new(),
            stream,
            event_type: event_type.into(),
            timestamp: Timestamp::now(),
            metadata: None,
            payload: Vec::new(),
            payload_format: BASELINE_STORAGE_FORMAT,
        }
    }

    /// The record a storage engine would write for `envelope`.
    ///
    /// Envelope metadata is stored as JSON; the payload is left empty since
    /// payload encoding belongs to the engine.
    pub fn from_envelope(envelope: &EventEnvelope, global_sequence: u64) -> Self {
        let metadata = if envelope.metadata().is_empty() {
            None
        } else {
            serde_json::to_vec(envelope.metadata()).ok()
        };

        Self {
            global_sequence,
            event_id: envelope.event_id(),
            stream: envelope.stream().clone(),
            event_type: envelope.event_type().to_string(),
            timestamp: envelope.timestamp(),
            metadata,
            payload: Vec::new(),
            payload_format: BASELINE_STORAGE_FORMAT,
        }
    }

    /// Replaces the event identifier.
    #[must_use]
    pub const fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = event_id;
        self
    }

    /// Replaces the capture timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the encoded metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: impl Into<Vec<u8>>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    /// Sets the encoded payload.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Sets the payload storage format.
    #[must_use]
    pub const fn with_payload_format(mut self, payload_format: u32) -> Self {
        self.payload_format = payload_format;
        self
    }
}

impl PersistedRawEvent for RawEventRecord {
    fn global_sequence(&self) -> u64 {
        self.global_sequence
    }

    fn event_id(&self) -> EventId {
        self.event_id
    }

    fn stream(&self) -> &StreamIdentity {
        &self.stream
    }

    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn metadata(&self) -> Option<&[u8]> {
        self.metadata.as_deref()
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn payload_format(&self) -> u32 {
        self.payload_format
    }
}

/// A decoded event read from the global log.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    global_sequence: u64,
    stream: StreamIdentity,
    event_type: String,
    payload: Arc<dyn DomainEvent>,
}

impl RecordedEvent {
    /// Records `payload` at a position of the global log.
    pub fn new(
        global_sequence: u64,
        stream: StreamIdentity,
        event_type: impl Into<String>,
        payload: impl DomainEvent,
    ) -> Self {
        Self::shared(global_sequence, stream, event_type, Arc::new(payload))
    }

    /// Records an already shared payload.
    pub fn shared(
        global_sequence: u64,
        stream: StreamIdentity,
        event_type: impl Into<String>,
        payload: Arc<dyn DomainEvent>,
    ) -> Self {
        Self {
            global_sequence,
            stream,
            event_type: event_type.into(),
            payload,
        }
    }

    /// What reading `envelope` back at `global_sequence` would yield.
    pub fn from_envelope(envelope: &EventEnvelope, global_sequence: u64) -> Self {
        Self::shared(
            global_sequence,
            envelope.stream().clone(),
            envelope.event_type(),
            envelope.shared_payload(),
        )
    }
}

impl PersistedEvent for RecordedEvent {
    fn global_sequence(&self) -> u64 {
        self.global_sequence
    }

    fn stream(&self) -> &StreamIdentity {
        &self.stream
    }

    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn domain_event(&self) -> &dyn DomainEvent {
        self.payload.as_ref()
    }
}

/// A decoded event read as part of a single stream.
#[derive(Debug, Clone)]
pub struct RecordedStreamEvent {
    event: RecordedEvent,
    stream_sequence: u64,
}

impl RecordedStreamEvent {
    /// Places `event` at a position of its stream.
    pub const fn new(event: RecordedEvent, stream_sequence: u64) -> Self {
        Self {
            event,
            stream_sequence,
        }
    }

    /// The event without its stream position.
    pub const fn event(&self) -> &RecordedEvent {
        &self.event
    }
}

impl PersistedEvent for RecordedStreamEvent {
    fn global_sequence(&self) -> u64 {
        self.event.global_sequence()
    }

    fn stream(&self) -> &StreamIdentity {
        self.event.stream()
    }

    fn event_type(&self) -> &str {
        self.event.event_type()
    }

    fn domain_event(&self) -> &dyn DomainEvent {
        self.event.domain_event()
    }
}

impl PersistedStreamEvent for RecordedStreamEvent {
    fn stream_sequence(&self) -> u64 {
        self.stream_sequence
    }
}

/// A [`PersistedEventFactory`] that decodes records in memory.
#[derive(Clone, Default)]
pub struct MockPersistedEventFactory {
    decoder: Option<PayloadDecoder>,
}

impl MockPersistedEventFactory {
    /// A factory leaving payloads as [`UndecodedPayload`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory decoding payloads with `decoder`.
    pub fn with_decoder<F>(decoder: F) -> Self
    where
        F: Fn(&dyn PersistedRawEvent) -> Arc<dyn DomainEvent> + Send + Sync + 'static,
    {
        Self {
            decoder: Some(Arc::new(decoder)),
        }
    }

    fn decode(&self, raw: &dyn PersistedRawEvent) -> Arc<dyn DomainEvent> {
        match &self.decoder {
            Some(decoder) => decoder(raw),
            None => Arc::new(UndecodedPayload::new(raw.event_type(), raw.payload())),
        }
    }

    fn record(&self, raw: &dyn PersistedRawEvent) -> RecordedEvent {
        RecordedEvent::shared(
            raw.global_sequence(),
            raw.stream().clone(),
            raw.event_type(),
            self.decode(raw),
        )
    }
}

impl fmt::Debug for MockPersistedEventFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockPersistedEventFactory")
            .field("has_decoder", &self.decoder.is_some())
            .finish()
    }
}

impl PersistedEventFactory for MockPersistedEventFactory {
    fn create_event(&self, raw: &dyn PersistedRawEvent) -> Box<dyn PersistedEvent> {
        Box::new(self.record(raw))
    }

    fn create_stream_event(
        &self,
        raw: &dyn PersistedRawEvent,
        stream_sequence: u64,
    ) -> Box<dyn PersistedStreamEvent> {
        Box::new(RecordedStreamEvent::new(self.record(raw), stream_sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream() -> StreamIdentity {
        StreamIdentity::from_name("account-1").unwrap()
    }

    #[test]
    fn undecoded_payload_keeps_bytes() {
        let raw = RawEventRecord::new(7, stream(), "AccountOpened").with_payload(b"{}".to_vec());

        let event = MockPersistedEventFactory::new().create_event(&raw);
        let payload = event
            .domain_event()
            .downcast_ref::<UndecodedPayload>()
            .unwrap();

        assert_eq!(payload.event_type(), "AccountOpened");
        assert_eq!(payload.bytes(), b"{}");
    }

    #[test]
    fn raw_record_defaults() {
        let raw = RawEventRecord::new(1, stream(), "AccountOpened");

        assert!(raw.metadata().is_none());
        assert!(raw.payload().is_empty());
        assert_eq!(raw.payload_format(), BASELINE_STORAGE_FORMAT);
        assert!(!raw.event_id().is_nil());
    }

    #[test]
    fn debug_hides_decoder() {
        let factory = MockPersistedEventFactory::with_decoder(|raw| {
            Arc::new(UndecodedPayload::new(raw.event_type(), Vec::new()))
        });

        assert_eq!(
            format!("{factory:?}"),
            "MockPersistedEventFactory { has_decoder: true }"
        );
    }
}
