use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use vc_utils::hash::{HashMap, HashSet};

use crate::Object;
use crate::info::{ConstructorInfo, Typed};
use crate::registry::{
    FromType, GetTypeMeta, TypeMeta, TypeRegistry, TypeTraitArray, TypeTraitDefault, TypeTraitHash,
};

// -----------------------------------------------------------------------------
// Primitives

fn default_meta<T: Typed + Debug + Default>() -> TypeMeta {
    TypeMeta::of::<T>()
        .with_constructor(ConstructorInfo::default::<T>())
        .with_trait::<TypeTraitDefault>(FromType::<T>::from_type())
        .with_trait::<TypeTraitArray>(FromType::<T>::from_type())
}

macro_rules! impl_hashed_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl GetTypeMeta for $ty {
                fn get_type_meta() -> TypeMeta {
                    default_meta::<Self>().with_trait::<TypeTraitHash>(FromType::<Self>::from_type())
                }
            }
        )*
    };
}

impl_hashed_primitive!(
    (), bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, String,
    &'static str,
);

impl GetTypeMeta for f32 {
    fn get_type_meta() -> TypeMeta {
        default_meta::<Self>()
    }
}

impl GetTypeMeta for f64 {
    fn get_type_meta() -> TypeMeta {
        default_meta::<Self>()
    }
}

impl GetTypeMeta for Object {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
    }
}

// -----------------------------------------------------------------------------
// Containers

impl<T: GetTypeMeta + Debug> GetTypeMeta for Vec<T> {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
            .with_generic("Vec", &[T::ty()])
            .with_constructor(ConstructorInfo::default::<Self>())
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

impl<T: GetTypeMeta + Debug> GetTypeMeta for Box<[T]> {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

impl<T: GetTypeMeta + Debug> GetTypeMeta for Option<T> {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
            .with_generic("Option", &[T::ty()])
            .with_constructor(ConstructorInfo::default::<Self>())
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

impl<T: ?Sized + Send + Sync + Debug + 'static> GetTypeMeta for Arc<T> {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
    }
}

impl<T: GetTypeMeta + Debug + Eq + Hash> GetTypeMeta for HashSet<T> {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
            .with_generic("HashSet", &[T::ty()])
            .with_constructor(ConstructorInfo::default::<Self>())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

impl<K, V> GetTypeMeta for HashMap<K, V>
where
    K: GetTypeMeta + Debug + Eq + Hash,
    V: GetTypeMeta + Debug,
{
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
            .with_generic("HashMap", &[K::ty(), V::ty()])
            .with_constructor(ConstructorInfo::default::<Self>())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<K>();
        registry.register::<V>();
        registry.register_map::<K, V>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::any::TypeId;

    #[test]
    fn primitives_carry_collection_traits() {
        let registry = TypeRegistry::new();
        let int = registry.get(TypeId::of::<i32>()).unwrap();
        assert!(int.has_trait::<TypeTraitHash>());
        assert!(int.has_trait::<TypeTraitArray>());
        assert!(int.parameterless_constructor().is_some());

        let float = registry.get(TypeId::of::<f64>()).unwrap();
        assert!(!float.has_trait::<TypeTraitHash>());
    }

    #[test]
    fn map_registers_factory() {
        let mut registry = TypeRegistry::new();
        registry.register::<HashMap<String, u32>>();
        let factory = registry
            .map_factory(TypeId::of::<String>(), TypeId::of::<u32>())
            .unwrap();
        assert!(factory(4).is_empty());
    }

    #[test]
    fn containers_are_closed_generics() {
        let mut registry = TypeRegistry::new();
        registry.register::<Vec<i32>>();
        registry.register::<HashMap<String, u32>>();

        let list = registry.get_generic("Vec", &[TypeId::of::<i32>()]).unwrap();
        assert_eq!(list.type_id(), TypeId::of::<Vec<i32>>());
        let map = registry
            .get_generic("HashMap", &[TypeId::of::<String>(), TypeId::of::<u32>()])
            .unwrap();
        assert_eq!(map.type_id(), TypeId::of::<HashMap<String, u32>>());
        assert!(!registry.has_generic_definition("HashSet"));
    }
}
