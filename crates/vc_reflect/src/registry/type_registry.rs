use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt::Debug;
use core::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use vc_utils::TypeIdMap;
use vc_utils::hash::{FixedHashState, HashMap, HashSet};

use crate::Object;
use crate::info::{Type, Typed};
use crate::ops::Map;
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTrait, Upcast};

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of reflected types.
///
/// This struct is the central store for type information:
/// - [`TypeMeta`]s indexed by [`TypeId`], type path and short type name,
/// - [`Upcast`]s between registered types,
/// - closed generic types indexed by their definition name,
/// - dictionary factories for registered key/value pairs.
///
/// [Registering](TypeRegistry::register) a type generates its [`TypeMeta`]
/// from its [`GetTypeMeta`] implementation, which is automatically
/// implemented by [`#[derive(Reflect)]`](crate::derive::Reflect).
///
/// # Example
///
/// ```
/// use vc_reflect::registry::{TypeRegistry, TypeTraitDefault};
///
/// let registry = TypeRegistry::new();
///
/// let generator = registry
///     .get_with_type_name("String").unwrap()
///     .get_trait::<TypeTraitDefault>().unwrap();
///
/// let s = generator.default();
/// assert_eq!(s.type_name(), "alloc::string::String");
/// assert_eq!(s.take::<String>().unwrap(), "");
/// ```
pub struct TypeRegistry {
    type_meta_table: TypeIdMap<TypeMeta>,
    type_path_to_id: HashMap<&'static str, TypeId>,
    type_name_to_id: HashMap<&'static str, TypeId>,
    ambiguous_names: HashSet<&'static str>,
    generic_to_id: HashMap<&'static str, Vec<(Box<[TypeId]>, TypeId)>>,
    upcasts: HashMap<(TypeId, TypeId), Upcast>,
    map_factories: HashMap<(TypeId, TypeId), fn(usize) -> Box<dyn Map>>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a empty [`TypeRegistry`].
    #[inline]
    pub const fn empty() -> Self {
        Self {
            type_meta_table: TypeIdMap::new(),
            type_path_to_id: HashMap::with_hasher(FixedHashState),
            type_name_to_id: HashMap::with_hasher(FixedHashState),
            ambiguous_names: HashSet::with_hasher(FixedHashState),
            generic_to_id: HashMap::with_hasher(FixedHashState),
            upcasts: HashMap::with_hasher(FixedHashState),
            map_factories: HashMap::with_hasher(FixedHashState),
        }
    }

    /// Create a type registry with default registrations for primitive types.
    ///
    /// - `()` `bool` `char`
    /// - `i8 - i128` `isize`
    /// - `u8 - u128` `usize`
    /// - `f32` `f64`
    /// - `String` `&'static str`
    /// - [`Object`]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<()>();
        registry.register::<bool>();
        registry.register::<char>();
        registry.register::<u8>();
        registry.register::<u16>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<u128>();
        registry.register::<usize>();
        registry.register::<i8>();
        registry.register::<i16>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<i128>();
        registry.register::<isize>();
        registry.register::<f32>();
        registry.register::<f64>();
        registry.register::<String>();
        registry.register::<&'static str>();
        registry.register::<Object>();
        registry
    }

    // # Validity
    // The type must **not** already exist.
    fn add_new_type_indices(&mut self, type_meta: &TypeMeta) {
        let ty = type_meta.ty();
        let type_name = ty.name();

        if !self.ambiguous_names.contains(type_name) {
            if self.type_name_to_id.contains_key(type_name) {
                self.type_name_to_id.remove(type_name);
                self.ambiguous_names.insert(type_name);
            } else {
                self.type_name_to_id.insert(type_name, ty.id());
            }
        }

        self.type_path_to_id.insert(ty.path(), ty.id());

        if let Some(generic) = type_meta.generic() {
            let args = generic.args().iter().map(Type::id).collect();
            self.generic_to_id
                .entry(generic.definition())
                .or_default()
                .push((args, ty.id()));
        }
    }

    /// Try add or do nothing.
    ///
    /// - If key [`TypeId`] has already exist, the function will do nothing and return `false`.
    /// - If the key [`TypeId`] does not exist, the function will insert value and return `true`.
    ///
    /// This method will _not_ register type dependencies.
    /// Use [`register`](Self::register) to register a type with its dependencies.
    pub fn try_insert_type_meta(&mut self, type_meta: TypeMeta) -> bool {
        if self.type_meta_table.contains(&type_meta.type_id()) {
            return false;
        }
        self.add_new_type_indices(&type_meta);
        self.type_meta_table.insert(type_meta.type_id(), type_meta);
        true
    }

    /// Insert or **Overwrite** a [`TypeMeta`].
    ///
    /// Name indices are only updated for new types.
    ///
    /// This method will _not_ register type dependencies.
    /// Use [`register`](Self::register) to register a type with its dependencies.
    pub fn insert_type_meta(&mut self, type_meta: TypeMeta) {
        if !self.type_meta_table.contains(&type_meta.type_id()) {
            self.add_new_type_indices(&type_meta);
        }
        self.type_meta_table.insert(type_meta.type_id(), type_meta);
    }

    /// Attempts to register the type `T` if it has not yet been registered already.
    ///
    /// This will also recursively register any type dependencies as specified by
    /// [`GetTypeMeta::register_dependencies`]. When deriving `Reflect`, these are
    /// the types of the reflected fields.
    ///
    /// # Example
    ///
    /// ```
    /// # use core::any::TypeId;
    /// # use vc_reflect::{derive::Reflect, registry::{TypeRegistry, TypeTraitDefault}};
    /// #[derive(Reflect, Clone, Debug, Default)]
    /// #[reflect(default)]
    /// struct Foo {
    ///   name: Option<String>,
    ///   value: i32
    /// }
    ///
    /// let mut type_registry = TypeRegistry::empty();
    ///
    /// type_registry.register::<Foo>();
    ///
    /// assert!(type_registry.contains(TypeId::of::<Foo>()));
    /// assert!(type_registry.contains(TypeId::of::<Option<String>>()));
    /// assert!(type_registry.contains(TypeId::of::<i32>()));
    /// assert!(type_registry.get_type_trait::<TypeTraitDefault>(TypeId::of::<Foo>()).is_some());
    /// ```
    pub fn register<T: GetTypeMeta>(&mut self) {
        if self.try_insert_type_meta_with(TypeId::of::<T>(), T::get_type_meta) {
            T::register_dependencies(self);
        }
    }

    fn try_insert_type_meta_with(&mut self, type_id: TypeId, f: impl FnOnce() -> TypeMeta) -> bool {
        if self.type_meta_table.contains(&type_id) {
            return false;
        }
        self.try_insert_type_meta(f())
    }

    /// Automatically registers all types annotated with `#[reflect(auto_register)]`.
    ///
    /// Repeated calls are cheap and will not insert duplicates.
    ///
    /// Returns `true` if automatic registration is supported on the current
    /// platform. Without the `auto_register` feature this does nothing and
    /// returns `false`.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            use crate::__macro_exports::auto_register;
            if self.contains(TypeId::of::<auto_register::AvailFlag>()) {
                return true;
            }
            auto_register::register_types(self);
            self.contains(TypeId::of::<auto_register::AvailFlag>())
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    /// Registers the type trait `D` for type `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    pub fn register_type_trait<T: Typed, D: TypeTrait + FromType<T>>(&mut self) {
        match self.type_meta_table.get_mut(&TypeId::of::<T>()) {
            Some(type_meta) => type_meta.insert_trait(D::from_type()),
            None => panic!(
                "Called `TypeRegistry::register_type_trait`, but the type `{}` of type_trait `{}` without registering",
                core::any::type_name::<T>(),
                core::any::type_name::<D>(),
            ),
        }
    }

    /// Registers an implicit conversion from `S` to `D`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use vc_reflect::{Object, registry::TypeRegistry};
    ///
    /// let mut registry = TypeRegistry::new();
    /// registry.register_upcast::<Arc<String>, Arc<str>>(|s| Arc::from(s.as_str()));
    ///
    /// let upcast = registry.upcast_of(
    ///     core::any::TypeId::of::<Arc<String>>(),
    ///     core::any::TypeId::of::<Arc<str>>(),
    /// ).unwrap();
    /// let out = upcast.apply(Object::new(Arc::new(String::from("a")))).unwrap();
    /// assert!(out.is::<Arc<str>>());
    /// ```
    pub fn register_upcast<S: Typed, D: Typed>(&mut self, cast: impl Fn(S) -> D + Send + Sync + 'static) {
        let upcast = Upcast::new(cast);
        self.upcasts.insert((upcast.source().id(), upcast.target().id()), upcast);
    }

    /// Registers `HashMap<K, V>` as the dictionary type for `K` and `V`.
    pub fn register_map<K, V>(&mut self)
    where
        K: Typed + Debug + Eq + Hash,
        V: Typed + Debug,
    {
        self.map_factories.insert((TypeId::of::<K>(), TypeId::of::<V>()), |capacity| {
            Box::new(HashMap::<K, V>::with_capacity_and_hasher(capacity, FixedHashState))
        });
    }

    /// Whether the type with given [`TypeId`] has been registered in this registry.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.type_meta_table.contains(&type_id)
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&TypeMeta> {
        self.type_meta_table.get(&type_id)
    }

    #[inline]
    pub fn get_mut(&mut self, type_id: TypeId) -> Option<&mut TypeMeta> {
        self.type_meta_table.get_mut(&type_id)
    }

    /// Returns the [`TypeMeta`] of the type with the given full path.
    pub fn get_with_type_path(&self, type_path: &str) -> Option<&TypeMeta> {
        match self.type_path_to_id.get(type_path) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns the [`TypeMeta`] of the type with the given short name.
    ///
    /// Returns `None` if the name is ambiguous.
    pub fn get_with_type_name(&self, type_name: &str) -> Option<&TypeMeta> {
        match self.type_name_to_id.get(type_name) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns `true` if the given short name matches multiple registered types.
    pub fn is_ambiguous(&self, type_name: &str) -> bool {
        self.ambiguous_names.contains(type_name)
    }

    /// Returns the [`TypeTrait`] `T` of the type with the given [`TypeId`].
    pub fn get_type_trait<T: TypeTrait>(&self, type_id: TypeId) -> Option<&T> {
        match self.get(type_id) {
            Some(type_meta) => type_meta.get_trait::<T>(),
            None => None,
        }
    }

    /// Returns the closed type built from `definition` with the given arguments.
    pub fn get_generic(&self, definition: &str, args: &[TypeId]) -> Option<&TypeMeta> {
        let (_, id) = self
            .generic_to_id
            .get(definition)?
            .iter()
            .find(|(closed, _)| **closed == *args)?;
        self.get(*id)
    }

    /// Returns `true` if a generic definition with this name is registered.
    pub fn has_generic_definition(&self, definition: &str) -> bool {
        self.generic_to_id.contains_key(definition)
    }

    /// Returns the registered upcast from `source` to `target`.
    #[inline]
    pub fn upcast_of(&self, source: TypeId, target: TypeId) -> Option<&Upcast> {
        self.upcasts.get(&(source, target))
    }

    /// Returns the upcasts registered into `target`.
    pub fn upcasts_into(&self, target: TypeId) -> impl Iterator<Item = &Upcast> {
        self.upcasts.values().filter(move |upcast| upcast.target().id() == target)
    }

    /// Returns `true` if a `source` value may be stored where `target` is expected:
    /// the types are equal, `target` is [`Object`], or an [`Upcast`] is registered.
    pub fn is_assignable(&self, target: &Type, source: &Type) -> bool {
        target == source || target.is_object() || self.upcasts.contains_key(&(source.id(), target.id()))
    }

    /// Returns the dictionary factory registered for `key` and `value`.
    #[inline]
    pub fn map_factory(&self, key: TypeId, value: TypeId) -> Option<fn(usize) -> Box<dyn Map>> {
        self.map_factories.get(&(key, value)).copied()
    }

    /// Returns an iterator over the [`TypeMeta`]s of the registered types.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeMeta> {
        self.type_meta_table.values()
    }

    /// Returns the ([`TypeMeta`], [`TypeTrait`]) pairs of every type carrying `T`.
    pub fn iter_with_trait<T: TypeTrait>(&self) -> impl Iterator<Item = (&TypeMeta, &T)> {
        self.type_meta_table.values().filter_map(|item| {
            let type_trait = item.get_trait::<T>();
            type_trait.map(|t| (item, t))
        })
    }
}

// -----------------------------------------------------------------------------
// TypeRegistryArc

/// A shared, lockable [`TypeRegistry`].
#[derive(Clone, Default)]
pub struct TypeRegistryArc {
    /// The wrapped [`TypeRegistry`].
    pub internal: Arc<RwLock<TypeRegistry>>,
}

impl TypeRegistryArc {
    #[inline]
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`TypeRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`TypeRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<TypeRegistry> for TypeRegistryArc {
    #[inline]
    fn from(registry: TypeRegistry) -> Self {
        Self::new(registry)
    }
}

impl core::fmt::Debug for TypeRegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.read().type_path_to_id.keys().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::ConstructorInfo;

    #[derive(Clone, Debug, Default)]
    struct Pair<A, B>(A, B);

    impl<A: Typed + Debug, B: Typed + Debug> Typed for Pair<A, B> {}

    impl<A: Typed + Debug + Default, B: Typed + Debug + Default> GetTypeMeta for Pair<A, B> {
        fn get_type_meta() -> TypeMeta {
            TypeMeta::of::<Self>()
                .with_generic("Pair", &[A::ty(), B::ty()])
                .with_constructor(ConstructorInfo::default::<Self>())
        }
    }

    #[test]
    fn closed_generics_are_indexed() {
        let mut registry = TypeRegistry::new();
        registry.register::<Pair<i32, String>>();
        registry.register::<Pair<u8, u8>>();

        let args = [TypeId::of::<i32>(), TypeId::of::<String>()];
        let meta = registry.get_generic("Pair", &args).unwrap();
        assert_eq!(meta.type_id(), TypeId::of::<Pair<i32, String>>());
        assert!(registry.get_generic("Pair", &[TypeId::of::<u8>()]).is_none());
        assert!(registry.has_generic_definition("Pair"));
        assert!(!registry.has_generic_definition("Triple"));
    }

    #[test]
    fn assignability() {
        let mut registry = TypeRegistry::new();
        let (int, object) = (i32::ty(), Object::ty());
        assert!(registry.is_assignable(&object, &int));
        assert!(!registry.is_assignable(&int, &object));
        assert!(!registry.is_assignable(&i64::ty(), &int));

        registry.register_upcast::<i32, i64>(i64::from);
        assert!(registry.is_assignable(&i64::ty(), &int));
    }

    #[test]
    fn short_names_can_be_ambiguous() {
        mod a {
            #[derive(Clone, Debug)]
            pub struct Same;
        }
        mod b {
            #[derive(Clone, Debug)]
            pub struct Same;
        }
        impl Typed for a::Same {}
        impl Typed for b::Same {}

        let mut registry = TypeRegistry::empty();
        registry.insert_type_meta(TypeMeta::of::<a::Same>());
        registry.insert_type_meta(TypeMeta::of::<b::Same>());
        assert!(registry.is_ambiguous("Same"));
        assert!(registry.get_with_type_name("Same").is_none());
        assert!(registry.get_with_type_path(b::Same::ty().path()).is_some());
    }
}
