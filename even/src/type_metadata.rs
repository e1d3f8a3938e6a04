//! Type metadata declarations and their resolution.
//!
//! A payload type may declare a category, an explicit event-type name, a
//! storage-format version and whether it is structurally anonymous. The
//! declarations come from three places, consulted in this order:
//!
//! 1. a [`TypeMetadataSource`], usually a [`TypeMetadataRegistry`] populated at
//!    startup (including [`MetadataOverrides`] loaded from configuration),
//! 2. the compile-time declaration carried by the [`TypeKey`] of types
//!    deriving `DomainEvent`,
//! 3. nothing, in which case defaults derived from the type name apply.
//!
//! [`TypeMetadataResolver`] turns those declarations into the values written
//! to envelopes. Lookups can be costlier than the resolution itself, so wrap
//! sources that are queried repeatedly in a [`CachingMetadataSource`].

use crate::domain::{DeclaredEvent, TypeKey};
use crate::errors::ConfigurationError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Event type recorded for payloads without a stable type name.
pub const ANONYMOUS_EVENT_TYPE: &str = "$anonymous";

/// Metadata key holding the unversioned qualified type name of the payload.
pub const TYPE_REFERENCE_METADATA_KEY: &str = "$type";

/// Storage format of types that declare none.
pub const BASELINE_STORAGE_FORMAT: u32 = 0;

/// Metadata declared for a payload type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeMetadata {
    /// Stream category of the type; defaults to the lower-cased bare name.
    pub category: Option<String>,
    /// Logical event-type name; defaults to the bare name.
    pub event_type: Option<String>,
    /// Version of the storage format used for the payload.
    pub storage_format: Option<u32>,
    /// The payload has no stable type name.
    pub anonymous: bool,
}

impl TypeMetadata {
    /// Creates an empty declaration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the explicit event-type name.
    #[must_use]
    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the storage-format version.
    #[must_use]
    pub const fn with_storage_format(mut self, format: u32) -> Self {
        self.storage_format = Some(format);
        self
    }

    /// Flags the type as structurally anonymous.
    #[must_use]
    pub const fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// Supplies declared metadata for payload types.
pub trait TypeMetadataSource: Send + Sync {
    /// Returns the metadata registered for `key`, if any.
    fn metadata_for(&self, key: &TypeKey) -> Option<TypeMetadata>;
}

impl<S: TypeMetadataSource + ?Sized> TypeMetadataSource for &S {
    fn metadata_for(&self, key: &TypeKey) -> Option<TypeMetadata> {
        (**self).metadata_for(key)
    }
}

impl<S: TypeMetadataSource + ?Sized> TypeMetadataSource for Arc<S> {
    fn metadata_for(&self, key: &TypeKey) -> Option<TypeMetadata> {
        (**self).metadata_for(key)
    }
}

/// A source with no registrations; only compile-time declarations apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredOnly;

impl TypeMetadataSource for DeclaredOnly {
    fn metadata_for(&self, _key: &TypeKey) -> Option<TypeMetadata> {
        None
    }
}

/// Metadata overrides keyed by full type name, loaded from configuration.
///
/// ```rust
/// use even::MetadataOverrides;
///
/// let overrides = MetadataOverrides::from_json_str(
///     r#"{ "bank::AccountOpened": { "category": "accounts", "storage_format": 2 } }"#,
/// )?;
/// assert_eq!(overrides.len(), 1);
/// # Ok::<(), even::errors::ConfigurationError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataOverrides(HashMap<String, TypeMetadata>);

impl MetadataOverrides {
    /// Creates an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses overrides from a JSON object of `full type name -> metadata`.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(ConfigurationError::InvalidOverrides)
    }

    /// Adds an override for the type with the given full name.
    #[must_use]
    pub fn with(mut self, full_name: impl Into<String>, metadata: TypeMetadata) -> Self {
        let _ = self.0.insert(full_name.into(), metadata);
        self
    }

    /// Returns the override for a full type name.
    pub fn get(&self, full_name: &str) -> Option<&TypeMetadata> {
        self.0.get(full_name)
    }

    /// Number of overridden types.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no overrides.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Registration {
    full_name: &'static str,
    metadata: TypeMetadata,
}

/// Explicitly registered type metadata.
///
/// Populated once at startup and shared read-only afterwards. Overrides take
/// precedence over registrations for the same type.
#[derive(Debug, Clone, Default)]
pub struct TypeMetadataRegistry {
    types: HashMap<TypeId, Registration>,
    overrides: MetadataOverrides,
}

impl TypeMetadataRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a registry.
    pub fn builder() -> TypeMetadataRegistryBuilder {
        TypeMetadataRegistryBuilder::new()
    }

    /// Registers metadata for a type, returning any metadata it replaces.
    pub fn register(&mut self, key: TypeKey, metadata: TypeMetadata) -> Option<TypeMetadata> {
        let previous = self.types.insert(
            key.type_id(),
            Registration {
                full_name: key.full_name(),
                metadata,
            },
        );

        match &previous {
            Some(_) => debug!(type_name = key.full_name(), "replaced type metadata"),
            None => trace!(type_name = key.full_name(), "registered type metadata"),
        }

        previous.map(|registration| registration.metadata)
    }

    /// Registers the compile-time declaration of `T`.
    pub fn register_declared<T: DeclaredEvent>(&mut self) -> Option<TypeMetadata> {
        self.register(TypeKey::declared::<T>(), T::declaration())
    }

    /// Replaces the configured overrides.
    pub fn set_overrides(&mut self, overrides: MetadataOverrides) {
        debug!(count = overrides.len(), "applied type metadata overrides");
        self.overrides = overrides;
    }

    /// Returns true if metadata was registered for the type.
    pub fn is_registered(&self, key: &TypeKey) -> bool {
        self.types.contains_key(&key.type_id())
    }

    /// Returns the full names of all registered types, sorted.
    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .types
            .values()
            .map(|registration| registration.full_name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeMetadataSource for TypeMetadataRegistry {
    fn metadata_for(&self, key: &TypeKey) -> Option<TypeMetadata> {
        self.overrides.get(key.full_name()).cloned().or_else(|| {
            self.types
                .get(&key.type_id())
                .map(|registration| registration.metadata.clone())
        })
    }
}

/// Fluent construction of a [`TypeMetadataRegistry`].
#[derive(Debug, Default)]
pub struct TypeMetadataRegistryBuilder {
    registry: TypeMetadataRegistry,
}

impl TypeMetadataRegistryBuilder {
    /// Creates a builder for an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers metadata for a type.
    #[must_use]
    pub fn register(mut self, key: TypeKey, metadata: TypeMetadata) -> Self {
        let _ = self.registry.register(key, metadata);
        self
    }

    /// Registers the compile-time declaration of `T`.
    #[must_use]
    pub fn register_declared<T: DeclaredEvent>(mut self) -> Self {
        let _ = self.registry.register_declared::<T>();
        self
    }

    /// Applies configured overrides.
    #[must_use]
    pub fn overrides(mut self, overrides: MetadataOverrides) -> Self {
        self.registry.set_overrides(overrides);
        self
    }

    /// Builds the registry.
    pub fn build(self) -> TypeMetadataRegistry {
        self.registry
    }
}

/// Memoizes lookups of another source, once per distinct type.
///
/// Concurrent misses on the same type may query the inner source more than
/// once; every query yields the same value.
#[derive(Debug, Default)]
pub struct CachingMetadataSource<S> {
    inner: S,
    cache: RwLock<HashMap<TypeId, Option<TypeMetadata>>>,
}

impl<S: TypeMetadataSource> CachingMetadataSource<S> {
    /// Wraps a source.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of types looked up so far.
    pub fn cached_types(&self) -> usize {
        self.cache.read().len()
    }

    /// Returns the wrapped source.
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: TypeMetadataSource> TypeMetadataSource for CachingMetadataSource<S> {
    fn metadata_for(&self, key: &TypeKey) -> Option<TypeMetadata> {
        if let Some(cached) = self.cache.read().get(&key.type_id()) {
            return cached.clone();
        }

        trace!(type_name = key.full_name(), "type metadata cache miss");
        let metadata = self.inner.metadata_for(key);
        let _ = self
            .cache
            .write()
            .insert(key.type_id(), metadata.clone());
        metadata
    }
}

/// Resolves category, event type and storage format of payload types.
#[derive(Debug, Clone, Default)]
pub struct TypeMetadataResolver<S = DeclaredOnly> {
    source: S,
}

impl TypeMetadataResolver<DeclaredOnly> {
    /// A resolver that only honours compile-time declarations.
    pub const fn declared_only() -> Self {
        Self {
            source: DeclaredOnly,
        }
    }
}

impl<S: TypeMetadataSource> TypeMetadataResolver<S> {
    /// Creates a resolver over a metadata source.
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Returns the source backing this resolver.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Returns the effective declaration for a type.
    pub fn metadata(&self, key: &TypeKey) -> Option<TypeMetadata> {
        self.source
            .metadata_for(key)
            .or_else(|| key.declaration())
    }

    /// See [`resolve_category`].
    pub fn resolve_category(&self, key: &TypeKey) -> String {
        resolve_category(key, self.metadata(key).as_ref())
    }

    /// See [`resolve_event_type`].
    pub fn resolve_event_type(&self, key: &TypeKey) -> String {
        resolve_event_type(key, self.metadata(key).as_ref())
    }

    /// See [`resolve_storage_format`].
    pub fn resolve_storage_format(&self, key: Option<&TypeKey>) -> u32 {
        key.map_or(BASELINE_STORAGE_FORMAT, |key| {
            resolve_storage_format(self.metadata(key).as_ref())
        })
    }
}

/// The declared category, or the bare type name in lower case.
pub fn resolve_category(key: &TypeKey, metadata: Option<&TypeMetadata>) -> String {
    metadata
        .and_then(|metadata| metadata.category.clone())
        .unwrap_or_else(|| key.bare_name().to_lowercase())
}

/// The declared event type; otherwise [`ANONYMOUS_EVENT_TYPE`] for anonymous
/// types; otherwise the bare type name.
///
/// An explicit event type wins over the anonymous flag.
pub fn resolve_event_type(key: &TypeKey, metadata: Option<&TypeMetadata>) -> String {
    match metadata {
        Some(TypeMetadata {
            event_type: Some(event_type),
            ..
        }) => event_type.clone(),
        Some(TypeMetadata {
            anonymous: true, ..
        }) => ANONYMOUS_EVENT_TYPE.to_owned(),
        _ => key.bare_name().to_owned(),
    }
}

/// The declared storage format, or [`BASELINE_STORAGE_FORMAT`].
pub fn resolve_storage_format(metadata: Option<&TypeMetadata>) -> u32 {
    metadata
        .and_then(|metadata| metadata.storage_format)
        .unwrap_or(BASELINE_STORAGE_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnonymousEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AccountOpened;
    struct FundsDeposited;
    struct InlinePayload;

    struct Renamed;

    impl DeclaredEvent for Renamed {
        const FULL_NAME: &'static str = "Bank.Renamed";
        const MODULE_NAME: &'static str = "Bank";

        fn declaration() -> TypeMetadata {
            TypeMetadata::new()
                .with_event_type("account-renamed")
                .with_category("accounts")
                .with_storage_format(3)
        }
    }

    #[derive(Default)]
    struct CountingSource {
        lookups: AtomicUsize,
    }

    impl TypeMetadataSource for CountingSource {
        fn metadata_for(&self, _key: &TypeKey) -> Option<TypeMetadata> {
            let _ = self.lookups.fetch_add(1, Ordering::SeqCst);
            Some(TypeMetadata::new().with_category("counted"))
        }
    }

    fn registry() -> TypeMetadataRegistry {
        TypeMetadataRegistry::builder()
            .register(
                TypeKey::of::<FundsDeposited>(),
                TypeMetadata::new()
                    .with_event_type("deposit")
                    .with_category("ledger")
                    .with_storage_format(2),
            )
            .register(TypeKey::of::<InlinePayload>(), TypeMetadata::new().anonymous())
            .build()
    }

    #[test]
    fn event_type_uses_explicit_override() {
        let resolver = TypeMetadataResolver::new(registry());
        assert_eq!(
            resolver.resolve_event_type(&TypeKey::of::<FundsDeposited>()),
            "deposit"
        );
    }

    #[test]
    fn event_type_is_sentinel_for_anonymous_types() {
        let resolver = TypeMetadataResolver::new(registry());
        assert_eq!(
            resolver.resolve_event_type(&TypeKey::of::<InlinePayload>()),
            ANONYMOUS_EVENT_TYPE
        );

        let declared = TypeMetadataResolver::declared_only();
        assert_eq!(
            declared.resolve_event_type(&TypeKey::declared::<AnonymousEvent>()),
            ANONYMOUS_EVENT_TYPE
        );
    }

    #[test]
    fn event_type_defaults_to_bare_name() {
        let resolver = TypeMetadataResolver::new(registry());
        assert_eq!(
            resolver.resolve_event_type(&TypeKey::of::<AccountOpened>()),
            "AccountOpened"
        );
    }

    #[test]
    fn explicit_event_type_wins_over_anonymous_flag() {
        let key = TypeKey::of::<InlinePayload>();
        let metadata = TypeMetadata::new().anonymous().with_event_type("inline");
        assert_eq!(resolve_event_type(&key, Some(&metadata)), "inline");
    }

    #[test]
    fn category_defaults_to_lowercased_bare_name() {
        let resolver = TypeMetadataResolver::new(registry());
        assert_eq!(
            resolver.resolve_category(&TypeKey::of::<AccountOpened>()),
            "accountopened"
        );
        assert_eq!(
            resolver.resolve_category(&TypeKey::of::<FundsDeposited>()),
            "ledger"
        );
    }

    #[test]
    fn storage_format_defaults_to_baseline() {
        let resolver = TypeMetadataResolver::new(registry());
        assert_eq!(
            resolver.resolve_storage_format(Some(&TypeKey::of::<FundsDeposited>())),
            2
        );
        assert_eq!(
            resolver.resolve_storage_format(Some(&TypeKey::of::<AccountOpened>())),
            0
        );
        assert_eq!(resolver.resolve_storage_format(None), 0);
    }

    #[test]
    fn compile_time_declarations_apply_without_registration() {
        let resolver = TypeMetadataResolver::declared_only();
        let key = TypeKey::declared::<Renamed>();

        assert_eq!(resolver.resolve_event_type(&key), "account-renamed");
        assert_eq!(resolver.resolve_category(&key), "accounts");
        assert_eq!(resolver.resolve_storage_format(Some(&key)), 3);
    }

    #[test]
    fn registrations_take_precedence_over_declarations() {
        let registry = TypeMetadataRegistry::builder()
            .register(TypeKey::declared::<Renamed>(), TypeMetadata::new())
            .build();
        let resolver = TypeMetadataResolver::new(registry);

        assert_eq!(
            resolver.resolve_event_type(&TypeKey::declared::<Renamed>()),
            "Renamed"
        );
    }

    #[test]
    fn overrides_take_precedence_over_registrations() {
        let overrides = MetadataOverrides::from_json_str(
            r#"{ "Bank.Renamed": { "event_type": "renamed-v2", "storage_format": 4 } }"#,
        )
        .unwrap();
        let registry = TypeMetadataRegistry::builder()
            .register_declared::<Renamed>()
            .overrides(overrides)
            .build();
        let resolver = TypeMetadataResolver::new(registry);
        let key = TypeKey::declared::<Renamed>();

        assert_eq!(resolver.resolve_event_type(&key), "renamed-v2");
        assert_eq!(resolver.resolve_storage_format(Some(&key)), 4);
        assert_eq!(resolver.resolve_category(&key), "renamed");
    }

    #[test]
    fn overrides_reject_unknown_fields() {
        let result = MetadataOverrides::from_json_str(r#"{ "A": { "colour": "blue" } }"#);
        assert!(matches!(result, Err(ConfigurationError::InvalidOverrides(_))));
    }

    #[test]
    fn overrides_reject_negative_storage_format() {
        let result = MetadataOverrides::from_json_str(r#"{ "A": { "storage_format": -1 } }"#);
        assert!(matches!(result, Err(ConfigurationError::InvalidOverrides(_))));
    }

    #[test]
    fn registering_twice_replaces_metadata() {
        let mut registry = TypeMetadataRegistry::new();
        let key = TypeKey::of::<AccountOpened>();

        assert!(registry
            .register(key, TypeMetadata::new().with_category("a"))
            .is_none());
        let previous = registry.register(key, TypeMetadata::new().with_category("b"));

        assert_eq!(previous, Some(TypeMetadata::new().with_category("a")));
        assert_eq!(registry.len(), 1);
        assert!(registry.is_registered(&key));
        assert_eq!(registry.registered_types(), vec![key.full_name()]);
    }

    #[test]
    fn registered_types_are_listed_in_name_order() {
        let registry = TypeMetadataRegistry::builder()
            .register(
                TypeKey::named::<InlinePayload>("Zoo.Inline", "Zoo").unwrap(),
                TypeMetadata::new(),
            )
            .register(
                TypeKey::named::<FundsDeposited>("Bank.FundsDeposited", "Bank").unwrap(),
                TypeMetadata::new(),
            )
            .register(
                TypeKey::named::<AccountOpened>("Bank.AccountOpened", "Bank").unwrap(),
                TypeMetadata::new(),
            )
            .build();

        assert_eq!(
            registry.registered_types(),
            vec!["Bank.AccountOpened", "Bank.FundsDeposited", "Zoo.Inline"]
        );
    }

    #[test]
    fn caching_source_queries_once_per_type() {
        let cache = CachingMetadataSource::new(CountingSource::default());

        for _ in 0..3 {
            let _ = cache.metadata_for(&TypeKey::of::<AccountOpened>());
        }
        let _ = cache.metadata_for(&TypeKey::of::<FundsDeposited>());

        assert_eq!(cache.inner().lookups.load(Ordering::SeqCst), 2);
        assert_eq!(cache.cached_types(), 2);
    }

    #[test]
    fn caching_source_remembers_missing_metadata() {
        let cache = CachingMetadataSource::new(TypeMetadataRegistry::new());
        assert!(cache.metadata_for(&TypeKey::of::<AccountOpened>()).is_none());
        assert!(cache.metadata_for(&TypeKey::of::<AccountOpened>()).is_none());
        assert_eq!(cache.cached_types(), 1);
    }
}
