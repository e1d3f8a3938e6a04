//! Predicates selecting the events of virtual (projection) streams.
//!
//! A projection stream is every persisted event that passes a predicate. Its
//! identity is content-addressed from the predicate's configuration, so two
//! predicates configured alike always name the same projection stream.
//!
//! Concrete event types are targeted through their declaration, capabilities
//! shared by several event types through their trait object. Each target
//! type therefore has a single spelling and a single identity.
//!
//! ```rust
//! use even::{DomainEvent, DomainTypePredicate, ProjectionStreamPredicate};
//!
//! trait AccountEvent {}
//!
//! #[derive(Debug, DomainEvent)]
//! #[even(name = "Bank.AccountOpened", module = "Bank", implements(dyn AccountEvent))]
//! struct AccountOpened;
//!
//! let a = DomainTypePredicate::declared::<AccountOpened>();
//! let b = DomainTypePredicate::declared::<AccountOpened>();
//! assert_eq!(a.projection_stream(), b.projection_stream());
//!
//! let accounts = DomainTypePredicate::implementing::<dyn AccountEvent>()?;
//! assert_ne!(accounts.projection_stream(), a.projection_stream());
//! # Ok::<(), even::errors::InvalidArgument>(())
//! ```

use crate::domain::{DeclaredEvent, TypeKey};
use crate::errors::{InvalidArgument, Result};
use crate::persisted::PersistedEvent;
use crate::stream::StreamIdentity;
use serde::Serialize;
use std::fmt;

const IDENTITY_SEPARATOR: char = '\u{1f}';

/// Decides membership of a virtual stream.
pub trait ProjectionStreamPredicate: Send + Sync + fmt::Debug {
    /// Returns true if the event belongs to the virtual stream.
    fn matches(&self, event: &dyn PersistedEvent) -> bool;

    /// A stable value identifying this predicate's configuration.
    fn identity_source(&self) -> PredicateIdentity;

    /// The content-addressed identity of the virtual stream.
    fn projection_stream(&self) -> StreamIdentity {
        StreamIdentity::from_bytes(self.identity_source().to_bytes())
    }
}

/// The deterministic identity of a predicate: its kind and target type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PredicateIdentity {
    kind: &'static str,
    type_full_name: &'static str,
    type_module_name: &'static str,
}

impl PredicateIdentity {
    /// Identity of a predicate of `kind` targeting `target`.
    pub const fn new(kind: &'static str, target: &TypeKey) -> Self {
        Self {
            kind,
            type_full_name: target.full_name(),
            type_module_name: target.module_name(),
        }
    }

    /// The predicate kind.
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Full name of the target type.
    pub const fn type_full_name(&self) -> &'static str {
        self.type_full_name
    }

    /// Defining module of the target type.
    pub const fn type_module_name(&self) -> &'static str {
        self.type_module_name
    }

    /// Canonical bytes fed to the stream digest.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for PredicateIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{IDENTITY_SEPARATOR}{}{IDENTITY_SEPARATOR}{}",
            self.kind, self.type_full_name, self.type_module_name
        )
    }
}

/// Matches events whose payload is, or declares itself as, a target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainTypePredicate {
    target: TypeKey,
}

impl DomainTypePredicate {
    const KIND: &'static str = "DomainTypePredicate";

    const fn new(target: TypeKey) -> Self {
        Self { target }
    }

    /// Targets a declared event type and the types declaring it as a
    /// supertype.
    pub fn declared<T: DeclaredEvent>() -> Self {
        Self::new(TypeKey::declared::<T>())
    }

    /// Targets every event type declaring `implements(dyn Trait)`, directly
    /// or through a declared supertype.
    ///
    /// Fails unless `T` is a trait object; concrete event types go through
    /// [`declared`](Self::declared).
    pub fn implementing<T: ?Sized + 'static>() -> Result<Self> {
        let target = TypeKey::of::<T>();
        if !target.full_name().starts_with("dyn ") {
            return Err(InvalidArgument::NotATraitObject(target.full_name()));
        }
        Ok(Self::new(target))
    }

    /// The target type.
    pub const fn target(&self) -> &TypeKey {
        &self.target
    }
}

impl ProjectionStreamPredicate for DomainTypePredicate {
    fn matches(&self, event: &dyn PersistedEvent) -> bool {
        event.domain_event().is_a(&self.target)
    }

    fn identity_source(&self) -> PredicateIdentity {
        PredicateIdentity::new(Self::KIND, &self.target)
    }
}
