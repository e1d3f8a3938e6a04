//! `Even` - stream identity and event envelopes for event-sourced storage
//!
//! This crate defines how streams are identified (a SHA-1 hash of the
//! case-normalized stream name), how domain events are wrapped into envelopes
//! with resolved type metadata before they reach a storage engine, and how
//! projection predicates select the events of virtual streams and name those
//! streams deterministically.
//!
//! Persistence, dispatch and payload serialization belong to the storage
//! engine; the boundary it implements is in [`persisted`].
//!
//! # Example
//!
//! ```rust
//! use even::{DomainEvent, EventEnvelope, StreamIdentity, TypeMetadataResolver};
//!
//! #[derive(Debug, DomainEvent)]
//! #[even(name = "Bank.AccountOpened", module = "Bank")]
//! struct AccountOpened {
//!     owner: String,
//! }
//!
//! let envelope = EventEnvelope::new(
//!     StreamIdentity::from_name("account-1")?,
//!     AccountOpened { owner: "ada".into() },
//!     &TypeMetadataResolver::declared_only(),
//! )?;
//!
//! assert_eq!(envelope.event_type(), "AccountOpened");
//! assert_eq!(envelope.type_reference(), Some("Bank.AccountOpened, Bank"));
//! # Ok::<(), even::errors::InvalidArgument>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod domain;
pub mod envelope;
pub mod errors;
pub mod persisted;
pub mod predicate;
pub mod stream;
pub mod type_metadata;
pub mod types;

pub use domain::{AnonymousEvent, DeclaredEvent, DomainEvent, TypeKey};
pub use envelope::{EnvelopeMetadata, EventEnvelope, EventEnvelopeBuilder};
pub use errors::{ConfigurationError, InvalidArgument};
pub use persisted::{
    PersistedEvent, PersistedEventFactory, PersistedRawEvent, PersistedStreamEvent,
};
pub use predicate::{DomainTypePredicate, PredicateIdentity, ProjectionStreamPredicate};
pub use stream::{StreamHash, StreamIdentity, HASH_LENGTH};
pub use type_metadata::{
    CachingMetadataSource, DeclaredOnly, MetadataOverrides, TypeMetadata, TypeMetadataRegistry,
    TypeMetadataRegistryBuilder, TypeMetadataResolver, TypeMetadataSource, ANONYMOUS_EVENT_TYPE,
    BASELINE_STORAGE_FORMAT, TYPE_REFERENCE_METADATA_KEY,
};
pub use types::{EventId, Timestamp};

#[cfg(feature = "derive")]
pub use even_macros::DomainEvent;
