//! Collections of an element type known only at run time.
//!
//! Factories create the concrete `Box<[T]>`, `Vec<T>`, `HashSet<T>` or
//! `HashMap<K, V>` from the type traits registered for the element type.
//! Emit captures the constructor when binding, reflection looks it up on
//! every call. Without trait data both create the dynamic collections of
//! [`vc_reflect::ops`], which check element types on insertion.

use alloc::boxed::Box;
use alloc::sync::Arc;

use vc_reflect::info::{Type, Typed};
use vc_reflect::ops::{Array, DynamicArray, DynamicList, DynamicMap, DynamicSet, List, Map, ReflectHash, Set};
use vc_reflect::registry::{
    TypeRegistry, TypeRegistryArc, TypeTraitArray, TypeTraitDefault, TypeTraitHash, TypeTraitList,
};
use vc_reflect::{CallError, Object, Reflect};

use super::{ArrayFactory, BuildContext, ListFactory, MapFactory, SetAdder, SetClearer, SetFactory, Shape, unwrap_mut};
use crate::{BindError, Binder, Category, CollectionKind, Ladder, Operation, Strategy, Subject};

// -----------------------------------------------------------------------------
// Shape

struct CollectionRequest {
    kind: CollectionKind,
    element: Type,
    /// The value type of dictionaries.
    value: Option<Type>,
    /// The element hasher, for sets and dictionary keys.
    hasher: Option<ReflectHash>,
}

struct CollectionShape<B> {
    request: CollectionRequest,
    emit: fn(&TypeRegistry, &CollectionRequest) -> Option<B>,
    reflection: fn(&TypeRegistryArc, &CollectionRequest) -> B,
}

impl<B: Clone + Send + Sync + 'static> Shape for CollectionShape<B> {
    type Binding = B;

    fn category(&self) -> Category {
        Category::Collection
    }

    fn subject(&self) -> Subject {
        let request = &self.request;
        match &request.value {
            Some(value) => Subject::dictionary(&request.element, value),
            None => Subject::collection(request.kind, &request.element),
        }
    }

    fn ladder(&self) -> &'static [Strategy] {
        Ladder::for_op(Operation::Collection, true)
    }

    fn emit(&self, cx: &BuildContext<'_>) -> Option<B> {
        (self.emit)(cx.registry, &self.request)
    }

    fn expression(&self, _: &BuildContext<'_>) -> Option<B> {
        None
    }

    fn reflection(&self, cx: &BuildContext<'_>) -> B {
        (self.reflection)(cx.shared, &self.request)
    }
}

// -----------------------------------------------------------------------------
// Strategies

fn emit_array(registry: &TypeRegistry, request: &CollectionRequest) -> Option<ArrayFactory> {
    let new = registry
        .get_type_trait::<TypeTraitArray>(request.element.id())?
        .constructor();
    let factory: ArrayFactory = Arc::new(new);
    Some(factory)
}

fn reflect_array(shared: &TypeRegistryArc, request: &CollectionRequest) -> ArrayFactory {
    let shared = shared.clone();
    let element = request.element;
    Arc::new(move |len: usize| -> Box<dyn Array> {
        let registry = shared.read();
        if let Some(array) = registry.get_type_trait::<TypeTraitArray>(element.id()) {
            return array.new_array(len);
        }
        dynamic_array(&registry, element, len)
    })
}

/// Filled with defaults where the element type has one, unset otherwise.
fn dynamic_array(registry: &TypeRegistry, element: Type, len: usize) -> Box<dyn Array> {
    match registry.get_type_trait::<TypeTraitDefault>(element.id()) {
        Some(default) => Box::new(DynamicArray::filled_with(element, len, || default.default())),
        None => Box::new(DynamicArray::new(element, len)),
    }
}

fn emit_list(registry: &TypeRegistry, request: &CollectionRequest) -> Option<ListFactory> {
    let new = registry
        .get_type_trait::<TypeTraitList>(request.element.id())?
        .constructor();
    let factory: ListFactory = Arc::new(new);
    Some(factory)
}

fn reflect_list(shared: &TypeRegistryArc, request: &CollectionRequest) -> ListFactory {
    let shared = shared.clone();
    let element = request.element;
    Arc::new(move |capacity: usize| -> Box<dyn List> {
        match shared.read().get_type_trait::<TypeTraitList>(element.id()) {
            Some(list) => list.new_list(capacity),
            None => Box::new(DynamicList::with_capacity(element, capacity)),
        }
    })
}

fn emit_set(registry: &TypeRegistry, request: &CollectionRequest) -> Option<SetFactory> {
    let new = registry
        .get_type_trait::<TypeTraitHash>(request.element.id())?
        .set_constructor();
    let factory: SetFactory = Arc::new(new);
    Some(factory)
}

fn reflect_set(shared: &TypeRegistryArc, request: &CollectionRequest) -> SetFactory {
    let shared = shared.clone();
    let element = request.element;
    let hasher = request.hasher.unwrap_or_else(ReflectHash::unhashable);
    Arc::new(move |capacity: usize| -> Box<dyn Set> {
        match shared.read().get_type_trait::<TypeTraitHash>(element.id()) {
            Some(hash) => hash.new_set(capacity),
            None => Box::new(DynamicSet::with_capacity(element, hasher, capacity)),
        }
    })
}

fn emit_map(registry: &TypeRegistry, request: &CollectionRequest) -> Option<MapFactory> {
    let value = request.value?;
    let new = registry.map_factory(request.element.id(), value.id())?;
    let factory: MapFactory = Arc::new(new);
    Some(factory)
}

fn reflect_map(shared: &TypeRegistryArc, request: &CollectionRequest) -> MapFactory {
    let shared = shared.clone();
    let key = request.element;
    let value = request.value.unwrap_or_else(Object::ty);
    let hasher = request.hasher.unwrap_or_else(ReflectHash::unhashable);
    Arc::new(move |capacity: usize| -> Box<dyn Map> {
        match shared.read().map_factory(key.id(), value.id()) {
            Some(new) => new(capacity),
            None => Box::new(DynamicMap::with_capacity(key, value, hasher, capacity)),
        }
    })
}

/// Dynamic sets are served the same way by every strategy.
#[inline]
fn as_dynamic_set(target: &mut dyn Reflect) -> Option<&mut DynamicSet> {
    target.downcast_mut::<DynamicSet>()
}

fn emit_adder(registry: &TypeRegistry, request: &CollectionRequest) -> Option<SetAdder> {
    let add = registry
        .get_type_trait::<TypeTraitHash>(request.element.id())?
        .adder();
    let adder: SetAdder = Arc::new(move |target: &mut dyn Reflect, value: Object| {
        let target = unwrap_mut(target);
        match as_dynamic_set(target) {
            Some(set) => set.insert(value),
            None => add(target, value),
        }
    });
    Some(adder)
}

/// Looks the typed adder up at call time.
fn reflect_adder(shared: &TypeRegistryArc, request: &CollectionRequest) -> SetAdder {
    let shared = shared.clone();
    let element = request.element;
    Arc::new(move |target: &mut dyn Reflect, value: Object| {
        let target = unwrap_mut(target);
        if let Some(set) = as_dynamic_set(target) {
            return set.insert(value);
        }
        let add = shared
            .read()
            .get_type_trait::<TypeTraitHash>(element.id())
            .map(TypeTraitHash::adder);
        match add {
            Some(add) => add(target, value),
            None => Err(CallError::NotHashable { ty: element.path() }),
        }
    })
}

fn emit_clearer(registry: &TypeRegistry, request: &CollectionRequest) -> Option<SetClearer> {
    let clear = registry
        .get_type_trait::<TypeTraitHash>(request.element.id())?
        .clearer();
    let clearer: SetClearer = Arc::new(move |target: &mut dyn Reflect| {
        let target = unwrap_mut(target);
        match as_dynamic_set(target) {
            Some(set) => {
                set.clear();
                Ok(())
            }
            None => clear(target),
        }
    });
    Some(clearer)
}

fn reflect_clearer(shared: &TypeRegistryArc, request: &CollectionRequest) -> SetClearer {
    let shared = shared.clone();
    let element = request.element;
    Arc::new(move |target: &mut dyn Reflect| {
        let target = unwrap_mut(target);
        if let Some(set) = as_dynamic_set(target) {
            set.clear();
            return Ok(());
        }
        let clear = shared
            .read()
            .get_type_trait::<TypeTraitHash>(element.id())
            .map(TypeTraitHash::clearer);
        match clear {
            Some(clear) => clear(target),
            None => Err(CallError::NotHashable { ty: element.path() }),
        }
    })
}

// -----------------------------------------------------------------------------
// Binder

impl Binder {
    fn collection<B: Clone + Send + Sync + 'static>(
        &self,
        request: CollectionRequest,
        emit: fn(&TypeRegistry, &CollectionRequest) -> Option<B>,
        reflection: fn(&TypeRegistryArc, &CollectionRequest) -> B,
    ) -> B {
        self.resolve(&CollectionShape {
            request,
            emit,
            reflection,
        })
    }

    /// Sets and dictionary keys need a registered hasher.
    fn hasher_of(&self, ty: &Type) -> Result<ReflectHash, BindError> {
        self.registry()
            .read()
            .get_type_trait::<TypeTraitHash>(ty.id())
            .map(TypeTraitHash::hasher)
            .ok_or(BindError::NotHashable { ty: ty.path() })
    }

    fn hashed(&self, kind: CollectionKind, element: &Type) -> Result<CollectionRequest, BindError> {
        let hasher = self.hasher_of(element)?;
        Ok(CollectionRequest {
            kind,
            element: *element,
            value: None,
            hasher: Some(hasher),
        })
    }

    /// Creates fixed-length arrays of `element`.
    ///
    /// Arrays of registered [`Default`] types are filled with the default
    /// value. Elements of other types start unset.
    pub fn array_factory(&self, element: &Type) -> Result<ArrayFactory, BindError> {
        let request = CollectionRequest {
            kind: CollectionKind::Array,
            element: *element,
            value: None,
            hasher: None,
        };
        Ok(self.collection(request, emit_array, reflect_array))
    }

    pub fn create_array(&self, element: &Type, len: usize) -> Result<Box<dyn Array>, BindError> {
        Ok(self.array_factory(element)?(len))
    }

    /// Creates empty lists of `element` with the given capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_bind::Binder;
    /// use vc_reflect::{Object, info::Typed};
    ///
    /// let binder = Binder::default();
    /// let mut list = binder.create_list_with_capacity(&String::ty(), 128).unwrap();
    /// assert!(list.is_empty());
    ///
    /// list.push(Object::new(String::from("a"))).unwrap();
    /// assert!(list.push(Object::new(1_u8)).is_err());
    /// assert_eq!(list.len(), 1);
    /// ```
    pub fn list_factory(&self, element: &Type) -> Result<ListFactory, BindError> {
        let request = CollectionRequest {
            kind: CollectionKind::List,
            element: *element,
            value: None,
            hasher: None,
        };
        Ok(self.collection(request, emit_list, reflect_list))
    }

    #[inline]
    pub fn create_list(&self, element: &Type) -> Result<Box<dyn List>, BindError> {
        self.create_list_with_capacity(element, 0)
    }

    pub fn create_list_with_capacity(&self, element: &Type, capacity: usize) -> Result<Box<dyn List>, BindError> {
        Ok(self.list_factory(element)?(capacity))
    }

    /// Creates empty hash sets of `element`.
    ///
    /// Fails with [`BindError::NotHashable`] unless `element` was registered
    /// with a hasher.
    pub fn hash_set_factory(&self, element: &Type) -> Result<SetFactory, BindError> {
        let request = self.hashed(CollectionKind::HashSet, element)?;
        Ok(self.collection(request, emit_set, reflect_set))
    }

    #[inline]
    pub fn create_hash_set(&self, element: &Type) -> Result<Box<dyn Set>, BindError> {
        self.create_hash_set_with_capacity(element, 0)
    }

    pub fn create_hash_set_with_capacity(&self, element: &Type, capacity: usize) -> Result<Box<dyn Set>, BindError> {
        Ok(self.hash_set_factory(element)?(capacity))
    }

    /// Creates empty dictionaries from `key` to `value`.
    ///
    /// The typed `HashMap<K, V>` is created when the pair was registered with
    /// [`TypeRegistry::register_map`].
    pub fn dictionary_factory(&self, key: &Type, value: &Type) -> Result<MapFactory, BindError> {
        let mut request = self.hashed(CollectionKind::Dictionary, key)?;
        request.value = Some(*value);
        Ok(self.collection(request, emit_map, reflect_map))
    }

    #[inline]
    pub fn create_dictionary(&self, key: &Type, value: &Type) -> Result<Box<dyn Map>, BindError> {
        self.create_dictionary_with_capacity(key, value, 0)
    }

    pub fn create_dictionary_with_capacity(
        &self,
        key: &Type,
        value: &Type,
        capacity: usize,
    ) -> Result<Box<dyn Map>, BindError> {
        Ok(self.dictionary_factory(key, value)?(capacity))
    }

    /// Inserts into a set of `element`, typed or dynamic.
    pub fn set_adder(&self, element: &Type) -> Result<SetAdder, BindError> {
        let request = self.hashed(CollectionKind::SetAdder, element)?;
        Ok(self.collection(request, emit_adder, reflect_adder))
    }

    /// Clears a set of `element`, typed or dynamic.
    pub fn set_clearer(&self, element: &Type) -> Result<SetClearer, BindError> {
        let request = self.hashed(CollectionKind::SetClearer, element)?;
        Ok(self.collection(request, emit_clearer, reflect_clearer))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    use vc_reflect::Object;
    use vc_reflect::info::Typed;
    use vc_reflect::ops::{DynamicArray, DynamicSet};
    use vc_reflect::registry::TypeRegistry;
    use vc_utils::hash::{HashMap, HashSet};

    use crate::{BindError, Binder, Capabilities, CollectionKind, Strategy};

    fn configurations() -> [Capabilities; 2] {
        [Capabilities::ALL, Capabilities::NONE]
    }

    #[test]
    fn list_with_capacity() {
        let binder = Binder::default();
        for caps in configurations() {
            let _scope = binder.override_capabilities(caps);
            let list = binder.create_list_with_capacity(&String::ty(), 128).unwrap();
            assert_eq!(list.len(), 0);
            assert!(list.capacity() >= 128);
            assert_eq!(list.element(), String::ty());
        }
        assert!(binder.is_collection_cached(CollectionKind::List, &String::ty()));
    }

    #[test]
    fn every_strategy_creates_the_same_collections() {
        let mut registry = TypeRegistry::new();
        registry.register::<Vec<i32>>();
        registry.register::<HashMap<String, u32>>();
        let binder = Binder::new(registry);

        for caps in configurations() {
            let _scope = binder.override_capabilities(caps);
            binder.clear_all();

            let list = binder.create_list(&i32::ty()).unwrap();
            assert!(list.as_reflect().is::<Vec<i32>>());
            let set = binder.create_hash_set(&i32::ty()).unwrap();
            assert!(set.as_reflect().is::<HashSet<i32>>());
            let map = binder.create_dictionary(&String::ty(), &u32::ty()).unwrap();
            assert!(map.as_reflect().is::<HashMap<String, u32>>());

            let array = binder.create_array(&i32::ty(), 3).unwrap();
            assert_eq!(array.len(), 3);
            assert_eq!(array.get(2).unwrap().take_as::<i32>(), Ok(0));

            // `Vec<i32>` has a default but no typed array.
            let array = binder.create_array(&Vec::<i32>::ty(), 2).unwrap();
            assert!(array.as_reflect().is::<DynamicArray>());
            assert_eq!(array.get(1).unwrap().take_as::<Vec<i32>>(), Ok(Vec::new()));
        }
    }

    #[test]
    fn emit_is_skipped_without_capability() {
        let binder = Binder::default();
        binder.create_list(&i32::ty()).unwrap();
        binder.create_array(&u8::ty(), 3).unwrap();
        assert_eq!(binder.build_attempts(Strategy::Emit), 2);

        let _scope = binder.override_capabilities(Capabilities::NONE);
        binder.clear_all();
        binder.create_list(&i32::ty()).unwrap();
        binder.create_array(&u8::ty(), 3).unwrap();
        assert_eq!(binder.build_attempts(Strategy::Emit), 0);
        assert_eq!(binder.build_attempts(Strategy::Reflection), 2);
    }

    #[test]
    fn arrays_without_defaults_start_unset() {
        let binder = Binder::default();
        for caps in configurations() {
            let _scope = binder.override_capabilities(caps);
            let array = binder.create_array(&Object::ty(), 2).unwrap();
            assert!(array.as_reflect().is::<DynamicArray>());
            assert!(array.get(0).is_none());
        }
    }

    #[test]
    fn sets_and_their_helpers() {
        let binder = Binder::default();
        for caps in configurations() {
            let _scope = binder.override_capabilities(caps);
            let add = binder.set_adder(&String::ty()).unwrap();
            let clear = binder.set_clearer(&String::ty()).unwrap();

            let mut set = binder.create_hash_set_with_capacity(&String::ty(), 4).unwrap();
            assert_eq!(add(set.as_reflect_mut(), Object::new(String::from("a"))), Ok(true));
            assert_eq!(add(set.as_reflect_mut(), Object::new(String::from("a"))), Ok(false));
            assert!(add(set.as_reflect_mut(), Object::new(1_u8)).is_err());
            assert_eq!(set.len(), 1);
            clear(set.as_reflect_mut()).unwrap();
            assert!(set.is_empty());

            let mut typed: HashSet<String> = HashSet::default();
            assert_eq!(add(&mut typed, Object::new(String::from("b"))), Ok(true));
            assert_eq!(typed.len(), 1);

            let mut boxed = Object::new(DynamicSet::new(String::ty(), vc_reflect::ops::ReflectHash::of::<String>()));
            assert_eq!(add(&mut boxed, Object::new(String::from("c"))), Ok(true));
        }

        assert!(matches!(
            binder.hash_set_factory(&f64::ty()),
            Err(BindError::NotHashable { .. })
        ));
        let mut list: Vec<String> = Vec::new();
        let add = binder.set_adder(&String::ty()).unwrap();
        assert!(add(&mut list, Object::new(String::new())).is_err());
    }

    #[test]
    fn dictionaries() {
        let mut registry = TypeRegistry::new();
        registry.register::<HashMap<String, u32>>();
        let binder = Binder::new(registry);

        let mut map = binder.create_dictionary(&String::ty(), &u32::ty()).unwrap();
        assert!(map.as_reflect().is::<HashMap<String, u32>>());
        map.insert(Object::new(String::from("k")), Object::new(1_u32)).unwrap();
        assert_eq!(map.len(), 1);
        assert!(binder.is_dictionary_cached(&String::ty(), &u32::ty()));

        // Unregistered pairs fall back to a dynamic map.
        let mut map = binder.create_dictionary_with_capacity(&i32::ty(), &String::ty(), 8).unwrap();
        assert!(map.insert(Object::new(1_i32), Object::new(String::new())).is_ok());
        assert!(map.insert(Object::new(1_u8), Object::new(String::new())).is_err());

        assert!(matches!(
            binder.create_dictionary(&f32::ty(), &i32::ty()),
            Err(BindError::NotHashable { .. })
        ));
    }

    #[test]
    fn factories_are_cached() {
        let binder = Binder::default();
        let first = binder.list_factory(&String::ty()).unwrap();
        let second = binder.list_factory(&String::ty()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        let other = binder.list_factory(&i32::ty()).unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
    }
}
