//! Domain event payloads and the type references that describe them.
//!
//! Rust has no runtime reflection, so every payload reports a [`TypeKey`]:
//! its `TypeId` plus the full type name and defining module used in persisted
//! metadata. Types deriving `DomainEvent` also carry their compile-time
//! declaration (category, event type, storage format, supertypes) in the key.

use crate::errors::{InvalidArgument, Result};
use crate::type_metadata::TypeMetadata;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A reference to a payload type.
///
/// Keys compare by `TypeId` only; the names are what gets written into
/// envelope metadata and predicate identities.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    full_name: &'static str,
    module_name: &'static str,
    declaration: Option<fn() -> TypeMetadata>,
    supertypes: Option<fn() -> Vec<TypeKey>>,
}

impl TypeKey {
    /// Describes `T` using the compiler's type name.
    ///
    /// The module name is the crate segment of the type path. The exact
    /// text of `std::any::type_name` is not guaranteed across compiler
    /// versions, so types whose names are persisted should use
    /// [`named`](Self::named) or derive `DomainEvent`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full_name = std::any::type_name::<T>();
        Self {
            id: TypeId::of::<T>(),
            full_name,
            module_name: crate_segment(full_name),
            declaration: None,
            supertypes: None,
        }
    }

    /// Describes `T` with an explicit full name and defining module.
    pub fn named<T: ?Sized + 'static>(
        full_name: &'static str,
        module_name: &'static str,
    ) -> Result<Self> {
        if full_name.is_empty() {
            return Err(InvalidArgument::EmptyTypeName("full name"));
        }
        if module_name.is_empty() {
            return Err(InvalidArgument::EmptyTypeName("module name"));
        }

        Ok(Self {
            id: TypeId::of::<T>(),
            full_name,
            module_name,
            declaration: None,
            supertypes: None,
        })
    }

    /// Describes a type that declares its metadata at compile time.
    pub fn declared<T: DeclaredEvent>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            full_name: T::FULL_NAME,
            module_name: T::MODULE_NAME,
            declaration: Some(T::declaration),
            supertypes: Some(T::supertypes),
        }
    }

    /// Returns the `TypeId` of the described type.
    pub const fn type_id(&self) -> TypeId {
        self.id
    }

    /// Returns the full type name, including its namespace path.
    pub const fn full_name(&self) -> &'static str {
        self.full_name
    }

    /// Returns the name of the module (crate) defining the type.
    pub const fn module_name(&self) -> &'static str {
        self.module_name
    }

    /// Returns the last path segment of the full name, without generic
    /// arguments.
    pub fn bare_name(&self) -> &'static str {
        let path = self
            .full_name
            .split('<')
            .next()
            .unwrap_or(self.full_name)
            .trim_start_matches("dyn ");
        path.rsplit([':', '.']).next().unwrap_or(path)
    }

    /// Returns `"<full name>, <module name>"`.
    ///
    /// No version is included, so payloads stored by one build of the
    /// producing crate still resolve after it is recompiled or re-versioned.
    pub fn unversioned_qualified_name(&self) -> String {
        format!("{}, {}", self.full_name, self.module_name)
    }

    /// Returns the metadata declared on the type itself, if any.
    pub fn declaration(&self) -> Option<TypeMetadata> {
        self.declaration.map(|declare| declare())
    }

    /// Returns the supertypes the type declares it implements.
    pub fn supertypes(&self) -> Vec<Self> {
        self.supertypes.map(|list| list()).unwrap_or_default()
    }

    /// Returns true if this type is `target` or declares it, directly or
    /// through a declared supertype, as a supertype.
    pub fn is_a(&self, target: &Self) -> bool {
        let mut visited = Vec::new();
        let mut pending = vec![*self];

        while let Some(key) = pending.pop() {
            if key == *target {
                return true;
            }
            if visited.contains(&key.id) {
                continue;
            }
            visited.push(key.id);
            pending.extend(key.supertypes());
        }

        false
    }
}

fn crate_segment(full_name: &'static str) -> &'static str {
    let path = full_name.trim_start_matches("dyn ");
    path.split("::")
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(path)
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeKey")
            .field("full_name", &self.full_name)
            .field("module_name", &self.module_name)
            .field("declared", &self.declaration.is_some())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name)
    }
}

/// A domain event payload.
///
/// The storage layer treats payloads as opaque; this trait only exposes what
/// envelopes and projection predicates need. Usually implemented through
/// `#[derive(DomainEvent)]`.
pub trait DomainEvent: Any + Send + Sync + fmt::Debug {
    /// Returns the key describing the payload's concrete type.
    fn type_key(&self) -> TypeKey;

    /// Returns the payload as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns true if the payload's type is `target` or one of its declared
    /// supertypes.
    fn is_a(&self, target: &TypeKey) -> bool {
        self.type_key().is_a(target)
    }
}

impl dyn DomainEvent + '_ {
    /// Downcasts the payload to a concrete event type.
    pub fn downcast_ref<T: DomainEvent>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }
}

/// Compile-time declaration of a payload type's metadata.
///
/// This is what `#[derive(DomainEvent)]` generates from `#[even(...)]`
/// attributes.
pub trait DeclaredEvent: 'static {
    /// Full type name written to envelope metadata.
    const FULL_NAME: &'static str;

    /// Name of the defining module.
    const MODULE_NAME: &'static str;

    /// Declared category, event type, storage format and anonymity.
    fn declaration() -> TypeMetadata {
        TypeMetadata::default()
    }

    /// Types this payload should match in projection predicates.
    fn supertypes() -> Vec<TypeKey> {
        Vec::new()
    }
}

/// A structurally typed payload with no stable type name.
///
/// Payloads built inline, without a declared type, must be wrapped in
/// `AnonymousEvent`: envelopes label them with
/// [`ANONYMOUS_EVENT_TYPE`](crate::type_metadata::ANONYMOUS_EVENT_TYPE) and
/// write no type reference.
///
/// ```rust
/// use even::AnonymousEvent;
///
/// let event = AnonymousEvent::new(serde_json::json!({ "amount": 10 }));
/// assert_eq!(event.value()["amount"], 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnonymousEvent(serde_json::Value);

impl AnonymousEvent {
    /// Wraps a structural value.
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Returns the wrapped value.
    pub const fn value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Unwraps the value.
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for AnonymousEvent {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}

impl DeclaredEvent for AnonymousEvent {
    const FULL_NAME: &'static str = "even::AnonymousEvent";
    const MODULE_NAME: &'static str = "even";

    fn declaration() -> TypeMetadata {
        TypeMetadata::new().anonymous()
    }
}

impl DomainEvent for AnonymousEvent {
    fn type_key(&self) -> TypeKey {
        TypeKey::declared::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
