use core::any::TypeId;
use core::fmt;
use core::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hashbrown::HashMap;

use crate::CodecError;
use crate::schema::{Model, ModelDecl, Resource, Schema};

// -----------------------------------------------------------------------------
// SchemaRegistry

/// A lazily filled cache of parsed [`Schema`]s.
///
/// Schemas are built the first time a type is encoded or decoded and then
/// shared as `Arc<Schema>`. Lookups take a read lock; a miss parses the
/// declaration without holding any lock, then takes the write lock and keeps
/// whichever schema was stored first, so concurrent first uses of a type
/// observe one schema.
///
/// # Example
///
/// ```
/// use hd_codec::SchemaRegistry;
/// use hd_codec::derive::Resource;
///
/// #[derive(Resource, Default)]
/// struct Person {
///     #[resource("primary,people")]
///     id: String,
/// }
///
/// let registry = SchemaRegistry::new();
/// let schema = registry.register::<Person>().unwrap();
/// assert_eq!(schema.resource_type(), Some("people"));
/// assert!(registry.by_resource_type("people").is_some());
/// ```
pub struct SchemaRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    schemas: HashMap<TypeId, Arc<Schema>>,
    resource_types: HashMap<String, TypeId>,
}

impl Default for SchemaRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Create an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the schema of `decl`, parsing it on first use.
    pub fn schema_of(&self, decl: &'static ModelDecl) -> Result<Arc<Schema>, CodecError> {
        let type_id = decl.type_id();

        let cached = self.read().schemas.get(&type_id).cloned();
        if let Some(schema) = cached {
            return Ok(schema);
        }

        let parsed = Arc::new(Schema::from_decl(decl)?);

        let mut inner = self.write();
        let schema = inner
            .schemas
            .entry(type_id)
            .or_insert_with(|| {
                log::debug!("registered schema of `{}`", decl.type_path);
                parsed
            })
            .clone();

        if let Some(resource_type) = schema.resource_type() {
            let owner = *inner
                .resource_types
                .entry(resource_type.to_owned())
                .or_insert(type_id);
            if owner != type_id {
                log::warn!(
                    "resource type `{resource_type}` is declared by more than one type; \
                     `{}` is not reachable by name",
                    decl.type_path,
                );
            }
        }

        Ok(schema)
    }

    /// Returns the schema of a value.
    #[inline]
    pub fn schema(&self, resource: &dyn Resource) -> Result<Arc<Schema>, CodecError> {
        self.schema_of(resource.declaration())
    }

    /// Parses and stores the schema of `T` ahead of use.
    ///
    /// Registration is optional; it surfaces declaration errors early.
    #[inline]
    pub fn register<T: Model>(&self) -> Result<Arc<Schema>, CodecError> {
        self.schema_of(T::DECLARATION)
    }

    /// Looks up an already known schema by its resource type.
    pub fn by_resource_type(&self, resource_type: &str) -> Option<Arc<Schema>> {
        let inner = self.read();
        let type_id = inner.resource_types.get(resource_type)?;
        inner.schemas.get(type_id).cloned()
    }

    /// Whether the schema of `T` has been built.
    ///
    /// Keyed like [`schema_of`](Self::schema_of), so `Box<M>` answers for `M`.
    #[inline]
    pub fn contains<T: Model>(&self) -> bool {
        self.read().schemas.contains_key(&T::DECLARATION.type_id())
    }

    /// Number of cached schemas.
    #[inline]
    pub fn len(&self) -> usize {
        self.read().schemas.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read().schemas.is_empty()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.read().schemas.values().map(|schema| schema.type_path()))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// SchemaRegistryArc

/// A shared [`SchemaRegistry`], for handing one cache to many threads.
#[derive(Clone, Default, Debug)]
pub struct SchemaRegistryArc {
    /// The wrapped [`SchemaRegistry`].
    pub internal: Arc<SchemaRegistry>,
}

impl Deref for SchemaRegistryArc {
    type Target = SchemaRegistry;

    #[inline]
    fn deref(&self) -> &SchemaRegistry {
        &self.internal
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;
    use std::sync::Arc;
    use std::thread;

    use super::{SchemaRegistry, SchemaRegistryArc};
    use crate::CodecError;
    use crate::derive::Resource;
    use crate::schema::{FieldDecl, Hooks, ModelDecl};

    struct Marker;
    struct Broken;

    static PEOPLE: ModelDecl = ModelDecl {
        type_path: "tests::Marker",
        type_id: TypeId::of::<Marker>,
        fields: &[
            FieldDecl::new("id", "primary,people"),
            FieldDecl::new("name", "attr,name"),
        ],
        hooks: Hooks::NONE,
    };

    static BROKEN: ModelDecl = ModelDecl {
        type_path: "tests::Broken",
        type_id: TypeId::of::<Broken>,
        fields: &[FieldDecl::new("id", "primary"), FieldDecl::new("other", "primary")],
        hooks: Hooks::NONE,
    };

    #[test]
    fn caches_one_schema_per_type() {
        let registry = SchemaRegistry::new();
        let a = registry.schema_of(&PEOPLE).unwrap();
        let b = registry.schema_of(&PEOPLE).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.by_resource_type("people").unwrap(), &a));
        assert!(registry.by_resource_type("articles").is_none());
    }

    #[test]
    fn errors_are_not_cached() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.schema_of(&BROKEN),
            Err(CodecError::InvalidSchema { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn concurrent_first_use() {
        let registry = SchemaRegistryArc::default();
        let schemas: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || registry.schema_of(&PEOPLE).unwrap())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(registry.len(), 1);
        assert!(schemas.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[derive(Resource, Default)]
    struct Tag {
        #[resource("primary,tags")]
        id: u32,
    }

    #[test]
    fn boxed_models_share_the_inner_schema() {
        let registry = SchemaRegistry::new();
        assert!(!registry.contains::<Tag>());

        registry.register::<Box<Tag>>().unwrap();
        assert!(registry.contains::<Tag>());
        assert!(registry.contains::<Box<Tag>>());
        assert_eq!(registry.len(), 1);
    }
}
