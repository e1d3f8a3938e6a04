//! Envelopes wrapping domain events for hand-off to the storage engine.
//!
//! An envelope is captured once: its identifier, timestamp, resolved event
//! type and metadata are fixed at construction. Unless the payload is
//! anonymous, the metadata always records the payload's unversioned qualified
//! type name under [`TYPE_REFERENCE_METADATA_KEY`], so readers can resolve the
//! payload type after the producing crate has been rebuilt or re-versioned.
//!
//! # Example
//!
//! ```rust
//! use even::{EventEnvelope, StreamIdentity, TypeMetadataResolver, AnonymousEvent};
//!
//! let envelope = EventEnvelope::builder()
//!     .stream(StreamIdentity::from_name("account-1")?)
//!     .payload(AnonymousEvent::new(serde_json::json!({ "amount": 10 })))
//!     .build(&TypeMetadataResolver::declared_only())?;
//!
//! assert_eq!(envelope.event_type(), even::ANONYMOUS_EVENT_TYPE);
//! assert!(envelope.type_reference().is_none());
//! # Ok::<(), even::errors::InvalidArgument>(())
//! ```

use crate::domain::{DomainEvent, TypeKey};
use crate::errors::{InvalidArgument, Result};
use crate::stream::StreamIdentity;
use crate::type_metadata::{
    TypeMetadataResolver, TypeMetadataSource, ANONYMOUS_EVENT_TYPE, TYPE_REFERENCE_METADATA_KEY,
};
use crate::types::{EventId, Timestamp};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Metadata attached to an envelope.
pub type EnvelopeMetadata = HashMap<String, Value>;

/// A domain event ready to be persisted.
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    event_id: EventId,
    timestamp: Timestamp,
    stream: StreamIdentity,
    event_type: String,
    payload: Arc<dyn DomainEvent>,
    metadata: EnvelopeMetadata,
}

impl EventEnvelope {
    /// Starts building an envelope.
    pub fn builder() -> EventEnvelopeBuilder {
        EventEnvelopeBuilder::default()
    }

    /// Wraps a payload for a stream, resolving its event type.
    pub fn new<E, S>(
        stream: StreamIdentity,
        payload: E,
        resolver: &TypeMetadataResolver<S>,
    ) -> Result<Self>
    where
        E: DomainEvent,
        S: TypeMetadataSource,
    {
        Self::builder()
            .stream(stream)
            .payload(payload)
            .build(resolver)
    }

    /// Identifier generated for this envelope.
    pub const fn event_id(&self) -> EventId {
        self.event_id
    }

    /// When the envelope was captured.
    pub const fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The stream the event is appended to.
    pub const fn stream(&self) -> &StreamIdentity {
        &self.stream
    }

    /// The logical event-type name.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The domain event.
    pub fn payload(&self) -> &dyn DomainEvent {
        self.payload.as_ref()
    }

    /// A shared handle to the domain event.
    pub fn shared_payload(&self) -> Arc<dyn DomainEvent> {
        Arc::clone(&self.payload)
    }

    /// The domain event as a concrete type, if it is one.
    pub fn payload_as<T: DomainEvent>(&self) -> Option<&T> {
        self.payload().downcast_ref()
    }

    /// The key describing the payload's type.
    pub fn payload_type(&self) -> TypeKey {
        self.payload.type_key()
    }

    /// All metadata, including the type reference.
    pub const fn metadata(&self) -> &EnvelopeMetadata {
        &self.metadata
    }

    /// A single metadata value.
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// The unversioned qualified type name of the payload, absent for
    /// anonymous payloads.
    pub fn type_reference(&self) -> Option<&str> {
        self.metadata_value(TYPE_REFERENCE_METADATA_KEY)
            .and_then(Value::as_str)
    }

    /// The category of the payload type.
    pub fn category<S: TypeMetadataSource>(&self, resolver: &TypeMetadataResolver<S>) -> String {
        resolver.resolve_category(&self.payload_type())
    }

    /// The storage-format version of the payload type.
    pub fn storage_format<S: TypeMetadataSource>(&self, resolver: &TypeMetadataResolver<S>) -> u32 {
        resolver.resolve_storage_format(Some(&self.payload_type()))
    }
}

/// Collects the parts of an [`EventEnvelope`].
#[derive(Debug, Default)]
pub struct EventEnvelopeBuilder {
    stream: Option<StreamIdentity>,
    payload: Option<Arc<dyn DomainEvent>>,
    event_type: Option<String>,
    metadata: Option<EnvelopeMetadata>,
}

impl EventEnvelopeBuilder {
    /// Sets the target stream.
    #[must_use]
    pub fn stream(mut self, stream: StreamIdentity) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Sets the domain event.
    #[must_use]
    pub fn payload<E: DomainEvent>(mut self, payload: E) -> Self {
        self.payload = Some(Arc::new(payload));
        self
    }

    /// Sets an already shared domain event.
    #[must_use]
    pub fn shared_payload(mut self, payload: Arc<dyn DomainEvent>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Overrides the resolved event type.
    #[must_use]
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Replaces the caller-supplied metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: EnvelopeMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Adds a single metadata entry.
    #[must_use]
    pub fn metadata_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let _ = self
            .metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Captures the envelope.
    ///
    /// Fails when the stream or payload is missing, or when the event type
    /// is empty.
    pub fn build<S: TypeMetadataSource>(
        self,
        resolver: &TypeMetadataResolver<S>,
    ) -> Result<EventEnvelope> {
        let stream = self.stream.ok_or(InvalidArgument::MissingStream)?;
        let payload = self.payload.ok_or(InvalidArgument::MissingPayload)?;
        let payload_type = payload.type_key();

        let event_type = self
            .event_type
            .unwrap_or_else(|| resolver.resolve_event_type(&payload_type));
        if event_type.is_empty() {
            return Err(InvalidArgument::EmptyEventType);
        }

        let mut metadata = self.metadata.unwrap_or_default();
        if event_type != ANONYMOUS_EVENT_TYPE {
            let type_reference = payload_type.unversioned_qualified_name();
            if let Some(previous) = metadata.insert(
                TYPE_REFERENCE_METADATA_KEY.to_owned(),
                Value::String(type_reference.clone()),
            ) {
                if previous.as_str() != Some(type_reference.as_str()) {
                    debug!(
                        %previous,
                        type_reference = %type_reference,
                        "replaced caller-supplied type reference"
                    );
                }
            }
        }

        let envelope = EventEnvelope {
            event_id: EventId::new(),
            timestamp: Timestamp::now(),
            stream,
            event_type,
            payload,
            metadata,
        };

        trace!(
            event_id = %envelope.event_id,
            stream = %envelope.stream,
            event_type = %envelope.event_type,
            "captured event envelope"
        );

        Ok(envelope)
    }
}
