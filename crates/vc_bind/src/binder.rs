use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use vc_reflect::info::{ConstructorInfo, FieldInfo, MethodInfo, PropertyInfo, Type};
use vc_reflect::registry::{TypeMeta, TypeRegistry, TypeRegistryArc};
use vc_utils::hash::Hashed;

use crate::bind::{BuildContext, Shape};
use crate::capability::CapabilityOverride;
use crate::{
    BindError, BindingCache, Capabilities, CapabilityKey, CapabilityScope, Category, CollectionKind,
    Strategy, Subject, validate,
};

// -----------------------------------------------------------------------------
// Binder

/// Resolves bindings over a shared [`TypeRegistry`].
///
/// Each request validates its arguments, then walks the strategy ladder of
/// its operation. The first strategy that is enabled and not known to fail
/// builds the binding, which is cached per strategy. Reflection always
/// succeeds and ends every ladder.
///
/// Bindings are `Arc`s: resolving the same request twice returns the same
/// allocation, also across threads.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_bind::Binder;
/// use vc_reflect::{derive::Reflect, info::Typed, registry::TypeRegistry};
///
/// #[derive(Reflect, Clone, Debug)]
/// struct Player { score: i32 }
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Player>();
/// let binder = Binder::new(registry);
///
/// let field = binder.find_field(&Player::ty(), "score").unwrap();
/// let get = binder.typed_field_getter::<Player, i32>(&field).unwrap();
/// let set = binder.typed_field_setter::<Player, i32>(&field).unwrap();
///
/// let mut player = Player { score: 1 };
/// set(&mut player, 42).unwrap();
/// assert_eq!(get(&player), Ok(42));
///
/// let again = binder.typed_field_getter::<Player, i32>(&field).unwrap();
/// assert!(Arc::ptr_eq(&get, &again));
/// ```
pub struct Binder {
    registry: TypeRegistryArc,
    cache: BindingCache,
    capabilities: CapabilityOverride,
}

impl Binder {
    pub fn new(registry: impl Into<TypeRegistryArc>) -> Self {
        Self {
            registry: registry.into(),
            cache: BindingCache::new(),
            capabilities: CapabilityOverride::new(),
        }
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistryArc {
        &self.registry
    }

    #[inline]
    pub fn cache(&self) -> &BindingCache {
        &self.cache
    }

    /// The capabilities used for new requests.
    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities.current()
    }

    /// Forces `caps` until the returned scope is dropped.
    ///
    /// Already cached bindings stay cached. Requests made under the override
    /// skip disabled strategies, even when a binding built with one of them
    /// is available.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_bind::{Binder, Capabilities};
    /// use vc_reflect::registry::TypeRegistry;
    ///
    /// let binder = Binder::new(TypeRegistry::new());
    /// {
    ///     let _scope = binder.override_capabilities(Capabilities::NONE);
    ///     assert_eq!(binder.capabilities(), Capabilities::NONE);
    /// }
    /// assert_eq!(binder.capabilities(), Capabilities::probe());
    /// ```
    #[inline]
    pub fn override_capabilities(&self, caps: Capabilities) -> CapabilityScope<'_> {
        log::debug!("capabilities overridden: {caps:?}");
        self.capabilities.set(caps)
    }

    /// Number of builds started with `strategy`.
    ///
    /// Cache hits and strategies skipped as unavailable are not counted.
    #[inline]
    pub fn build_attempts(&self, strategy: Strategy) -> usize {
        self.cache.attempts(strategy)
    }

    /// Drops cached bindings and failure records of `category`.
    #[inline]
    pub fn clear(&self, category: Category) {
        self.cache.clear(category);
    }

    #[inline]
    pub fn clear_all(&self) {
        self.cache.clear_all();
    }
}

impl Default for Binder {
    /// A binder over [`TypeRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new(TypeRegistry::new())
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("capabilities", &self.capabilities())
            .field("cache", &self.cache)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Resolution

impl Binder {
    /// Walks the ladder of `shape`, ending with [`Strategy::Reflection`].
    pub(crate) fn resolve<S: Shape>(&self, shape: &S) -> S::Binding {
        let category = shape.category();
        let subject = shape.subject();
        let caps = self.capabilities.current();
        let key_for =
            |strategy| Hashed::new(CapabilityKey::new(category, subject.clone(), strategy, shape.shape_id()));

        // Only taken when something has to be built.
        let mut guard = None;

        for &strategy in shape.ladder() {
            if !caps.supports(strategy) {
                continue;
            }
            let key = key_for(strategy);
            if let Some(binding) = self.cache.get::<S::Binding>(&key) {
                return binding;
            }
            if self.cache.is_unavailable(&key) {
                continue;
            }

            let registry: &TypeRegistry = guard.get_or_insert_with(|| self.registry.read());
            let cx = BuildContext {
                registry,
                shared: &self.registry,
            };
            self.cache.record_attempt(strategy);
            match catch_unwind(AssertUnwindSafe(|| shape.build(strategy, &cx))) {
                Ok(Some(binding)) => {
                    log::trace!("{category:?} `{subject:?}` bound with {strategy}");
                    return self.cache.insert(key, binding);
                }
                Ok(None) => {
                    log::debug!("{strategy} cannot bind {category:?} `{subject:?}`");
                    self.cache.mark_unavailable(key);
                }
                Err(_) => {
                    log::debug!("{strategy} panicked binding {category:?} `{subject:?}`");
                    self.cache.mark_unavailable(key);
                }
            }
        }

        let key = key_for(Strategy::Reflection);
        if let Some(binding) = self.cache.get::<S::Binding>(&key) {
            return binding;
        }
        let registry: &TypeRegistry = guard.get_or_insert_with(|| self.registry.read());
        let cx = BuildContext {
            registry,
            shared: &self.registry,
        };
        self.cache.record_attempt(Strategy::Reflection);
        let binding = shape.reflection(&cx);
        log::trace!("{category:?} `{subject:?}` bound with {}", Strategy::Reflection);
        self.cache.insert(key, binding)
    }
}

// -----------------------------------------------------------------------------
// Introspection

impl Binder {
    /// Returns `true` if any binding of `category` is cached for `subject`.
    #[inline]
    pub fn is_cached(&self, category: Category, subject: &Subject) -> bool {
        self.cache.contains_subject(category, subject)
    }

    /// Returns `true` if `strategy` is known to fail for `subject`.
    #[inline]
    pub fn is_unavailable(&self, category: Category, subject: &Subject, strategy: Strategy) -> bool {
        self.cache.is_unavailable_for(category, subject, strategy)
    }

    pub fn is_field_getter_cached(&self, field: &FieldInfo) -> bool {
        self.is_cached(Category::FieldGetter, &Subject::member(field.id()))
    }

    pub fn is_field_setter_cached(&self, field: &FieldInfo) -> bool {
        self.is_cached(Category::FieldSetter, &Subject::member(field.id()))
    }

    /// Indexers are looked up as [`Category::IndexerGetter`].
    pub fn is_property_getter_cached(&self, property: &PropertyInfo) -> bool {
        let category = if property.is_indexer() {
            Category::IndexerGetter
        } else {
            Category::PropertyGetter
        };
        self.is_cached(category, &Subject::member(property.id()))
    }

    /// Indexers are looked up as [`Category::IndexerSetter`].
    pub fn is_property_setter_cached(&self, property: &PropertyInfo) -> bool {
        let category = if property.is_indexer() {
            Category::IndexerSetter
        } else {
            Category::PropertySetter
        };
        self.is_cached(category, &Subject::member(property.id()))
    }

    pub fn is_method_invoker_cached(&self, method: &MethodInfo) -> bool {
        self.is_cached(Category::MethodInvoker, &Subject::member(method.id()))
    }

    pub fn is_constructor_cached(&self, ctor: &ConstructorInfo) -> bool {
        self.is_cached(Category::Constructor, &Subject::member(ctor.id()))
    }

    /// See [`is_dictionary_cached`](Self::is_dictionary_cached) for dictionaries.
    pub fn is_collection_cached(&self, kind: CollectionKind, element: &Type) -> bool {
        self.is_cached(Category::Collection, &Subject::collection(kind, element))
    }

    pub fn is_dictionary_cached(&self, key: &Type, value: &Type) -> bool {
        self.is_cached(Category::Collection, &Subject::dictionary(key, value))
    }
}

// -----------------------------------------------------------------------------
// Lookup

impl Binder {
    fn with_meta<T>(&self, ty: &Type, f: impl FnOnce(&TypeMeta) -> Result<T, BindError>) -> Result<T, BindError> {
        let registry = self.registry.read();
        match registry.get(ty.id()) {
            Some(meta) => f(meta),
            None => Err(BindError::UnknownType {
                ty: ty.path().to_string(),
            }),
        }
    }

    fn no_member(ty: &Type, name: &str) -> BindError {
        BindError::NoMatchingMember {
            ty: ty.path(),
            name: String::from(name),
        }
    }

    /// Looks up a field declared on `ty`.
    pub fn find_field(&self, ty: &Type, name: &str) -> Result<Arc<FieldInfo>, BindError> {
        self.with_meta(ty, |meta| meta.field(name).cloned().ok_or_else(|| Self::no_member(ty, name)))
    }

    pub fn find_property(&self, ty: &Type, name: &str) -> Result<Arc<PropertyInfo>, BindError> {
        self.with_meta(ty, |meta| {
            meta.property(name)
                .cloned()
                .ok_or_else(|| Self::no_member(ty, name))
        })
    }

    /// Looks up the indexer of `ty` with exactly these index types.
    pub fn find_indexer(&self, ty: &Type, index: &[Type]) -> Result<Arc<PropertyInfo>, BindError> {
        self.with_meta(ty, |meta| {
            meta.indexer(index)
                .cloned()
                .ok_or_else(|| Self::no_member(ty, PropertyInfo::INDEXER))
        })
    }

    /// Looks up the method of `ty` with exactly these parameter types.
    pub fn find_method(&self, ty: &Type, name: &str, params: &[Type]) -> Result<Arc<MethodInfo>, BindError> {
        self.with_meta(ty, |meta| {
            meta.method(name, params)
                .cloned()
                .ok_or_else(|| Self::no_member(ty, name))
        })
    }

    /// Looks up the constructor of `ty` with exactly these parameter types.
    pub fn find_constructor(&self, ty: &Type, params: &[Type]) -> Result<Arc<ConstructorInfo>, BindError> {
        self.with_meta(ty, |meta| {
            meta.constructor(params)
                .cloned()
                .ok_or_else(|| BindError::NoConstructor {
                    ty: ty.path(),
                    params: validate::type_list(params),
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use std::sync::RwLock;
    use std::thread;

    use vc_reflect::derive::Reflect;
    use vc_reflect::info::{FieldInfo, Typed};
    use vc_reflect::registry::{TypeMeta, TypeRegistry};

    use crate::{BindError, Binder, Capabilities, Category, Strategy, Subject};

    #[derive(Reflect, Clone, Debug)]
    struct Player {
        score: i32,
    }

    fn binder() -> Binder {
        let mut registry = TypeRegistry::new();
        registry.register::<Player>();
        Binder::new(registry)
    }

    #[test]
    fn lookups_report_what_is_missing() {
        let binder = binder();
        assert!(binder.find_field(&Player::ty(), "score").is_ok());
        assert!(matches!(
            binder.find_field(&Player::ty(), "health"),
            Err(BindError::NoMatchingMember { .. })
        ));
        assert!(matches!(
            binder.find_field(&Arc::<str>::ty(), "len"),
            Err(BindError::UnknownType { .. })
        ));
        assert!(matches!(
            binder.find_constructor(&Player::ty(), &[i32::ty()]),
            Err(BindError::NoConstructor { .. })
        ));
    }

    #[test]
    fn cached_per_strategy() {
        let binder = binder();
        let field = binder.find_field(&Player::ty(), "score").unwrap();

        let fast = binder.typed_field_getter::<Player, i32>(&field).unwrap();
        let slow = {
            let _scope = binder.override_capabilities(Capabilities::NONE);
            binder.typed_field_getter::<Player, i32>(&field).unwrap()
        };
        assert_eq!(fast(&Player { score: 3 }), Ok(3));
        assert_eq!(slow(&Player { score: 4 }), Ok(4));
        assert!(binder.is_field_getter_cached(&field));
        assert_eq!(binder.build_attempts(Strategy::Reflection), 1);

        let again = {
            let _scope = binder.override_capabilities(Capabilities::NONE);
            binder.typed_field_getter::<Player, i32>(&field).unwrap()
        };
        assert!(Arc::ptr_eq(&slow, &again));
        assert_eq!(binder.build_attempts(Strategy::Reflection), 1);

        binder.clear(Category::FieldGetter);
        assert!(!binder.is_field_getter_cached(&field));
    }

    #[test]
    fn failures_are_recorded_once() {
        let binder = binder();
        let field = binder.find_field(&Player::ty(), "score").unwrap();
        let subject = Subject::member(field.id());

        let wide = binder.typed_field_getter::<Player, i64>(&field).unwrap();
        let accelerated = binder.build_attempts(Strategy::Emit) + binder.build_attempts(Strategy::Expression);
        assert!(wide(&Player { score: 1 }).is_err());

        let again = binder.typed_field_getter::<Player, i64>(&field).unwrap();
        assert!(Arc::ptr_eq(&wide, &again));
        assert_eq!(
            binder.build_attempts(Strategy::Emit) + binder.build_attempts(Strategy::Expression),
            accelerated,
        );
        for strategy in [Strategy::Emit, Strategy::Expression] {
            let supported = Capabilities::probe().supports(strategy);
            assert_eq!(binder.is_unavailable(Category::FieldGetter, &subject, strategy), supported);
        }
    }

    #[test]
    fn racing_threads_share_one_binding() {
        static TICKS: RwLock<u64> = RwLock::new(0);

        let mut registry = TypeRegistry::new();
        let ticks = FieldInfo::new_static::<Player, u64>("ticks", &TICKS);
        registry.insert_type_meta(TypeMeta::of::<Player>().with_field(ticks));
        let binder = Binder::new(registry);
        let field = binder.find_field(&Player::ty(), "ticks").unwrap();

        let bindings: alloc::vec::Vec<_> = thread::scope(|scope| {
            let handles: alloc::vec::Vec<_> = (0..8)
                .map(|_| scope.spawn(|| binder.typed_static_field_getter::<u64>(&field).unwrap()))
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });
        for binding in &bindings[1..] {
            assert!(Arc::ptr_eq(&bindings[0], binding));
        }
        assert_eq!(binder.cache().len(), 1);
    }
}
