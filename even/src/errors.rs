//! Error types for Even.
//!
//! Every failure in this crate is a precondition violation at the call site:
//! a hash of the wrong length, an empty name, an envelope missing its stream
//! or payload. These are deterministic given their inputs, so nothing here is
//! retried. Callers decide whether to abort the surrounding operation or
//! report the error upward.
//!
//! # Example Usage
//!
//! ```rust
//! use even::errors::InvalidArgument;
//! use even::StreamIdentity;
//!
//! match StreamIdentity::from_hash(&[0u8; 19]) {
//!     Err(InvalidArgument::InvalidHashLength { actual, .. }) => assert_eq!(actual, 19),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use thiserror::Error;

/// A constructor argument violated its contract.
///
/// Each variant names the argument at fault so the message can be shown to
/// a developer without further context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    /// A stream hash was not exactly [`HASH_LENGTH`](crate::stream::HASH_LENGTH) bytes.
    #[error("The hash is invalid - must be exactly {expected} bytes (was {actual})")]
    InvalidHashLength {
        /// Required length in bytes
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// A stream hash could not be decoded from its hexadecimal form.
    #[error("The hash is not valid hexadecimal: {0}")]
    InvalidHex(String),

    /// A stream name was empty.
    #[error("The stream name cannot be null or empty")]
    EmptyStreamName,

    /// An envelope was built without a stream.
    #[error("An event envelope requires a stream")]
    MissingStream,

    /// An envelope was built without a payload.
    #[error("An event envelope requires a domain event payload")]
    MissingPayload,

    /// An explicitly supplied event type was empty.
    #[error("The event type cannot be empty")]
    EmptyEventType,

    /// A type key was given an empty full name or module name.
    #[error("The {0} of a type key cannot be empty")]
    EmptyTypeName(&'static str),

    /// A capability predicate targeted a type that is not a trait object.
    ///
    /// Concrete event types are targeted through their declaration so that
    /// each type has exactly one predicate identity.
    #[error("The predicate target {0} is not a trait object; target concrete events with `DomainTypePredicate::declared`")]
    NotATraitObject(&'static str),
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Type metadata overrides were not a valid JSON object of declarations.
    #[error("Invalid type metadata overrides: {0}")]
    InvalidOverrides(#[source] serde_json::Error),
}

/// Type alias for results of fallible constructors.
pub type Result<T> = std::result::Result<T, InvalidArgument>;
