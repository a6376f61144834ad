use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use vc_utils::hash::{HashMap, NoOpHashMap};

use crate::info::{Type, Typed};
use crate::ops::{ReflectHash, check_element};
use crate::{CallError, Object, Reflect};

// -----------------------------------------------------------------------------
// Map

/// A dictionary from keys to values.
pub trait Map: Reflect {
    /// The declared key type.
    fn key(&self) -> Type;

    /// The declared value type.
    fn value(&self) -> Type;

    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the value stored under `key`.
    fn get(&self, key: &Object) -> Option<Object>;

    /// Returns the previous value stored under `key`.
    fn insert(&mut self, key: Object, value: Object) -> Result<Option<Object>, CallError>;

    fn remove(&mut self, key: &Object) -> Option<Object>;

    fn clear(&mut self);
}

impl<K, V> Map for HashMap<K, V>
where
    K: Typed + Debug + Eq + Hash,
    V: Typed + Debug,
{
    #[inline]
    fn key(&self) -> Type {
        K::ty()
    }

    #[inline]
    fn value(&self) -> Type {
        V::ty()
    }

    #[inline]
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn get(&self, key: &Object) -> Option<Object> {
        let value = HashMap::get(self, key.downcast_ref::<K>()?)?;
        Some(Object::new(value.clone()))
    }

    fn insert(&mut self, key: Object, value: Object) -> Result<Option<Object>, CallError> {
        let key = key.take_as::<K>()?;
        let value = value.take_as::<V>()?;
        Ok(HashMap::insert(self, key, value).map(Object::new))
    }

    fn remove(&mut self, key: &Object) -> Option<Object> {
        HashMap::remove(self, key.downcast_ref::<K>()?).map(Object::new)
    }

    #[inline]
    fn clear(&mut self) {
        HashMap::clear(self);
    }
}

// -----------------------------------------------------------------------------
// DynamicMap

/// A dictionary of [`Object`]s, keys hashed through a [`ReflectHash`].
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, info::Typed, ops::{DynamicMap, Map, ReflectHash}};
///
/// let mut map = DynamicMap::new(String::ty(), i32::ty(), ReflectHash::of::<String>());
/// let key = Object::new(String::from("hp"));
///
/// assert!(map.insert(key.clone(), Object::new(10_i32)).unwrap().is_none());
/// assert!(map.insert(key.clone(), Object::new(20_i32)).unwrap().is_some());
/// assert_eq!(map.get(&key).unwrap().take_as::<i32>(), Ok(20));
/// assert!(map.insert(Object::new(1_u8), Object::new(1_i32)).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct DynamicMap {
    key: Type,
    value: Type,
    hasher: ReflectHash,
    buckets: NoOpHashMap<u64, Vec<(Object, Object)>>,
    len: usize,
}

impl DynamicMap {
    pub fn new(key: Type, value: Type, hasher: ReflectHash) -> Self {
        Self::with_capacity(key, value, hasher, 0)
    }

    pub fn with_capacity(key: Type, value: Type, hasher: ReflectHash, capacity: usize) -> Self {
        Self {
            key,
            value,
            hasher,
            buckets: NoOpHashMap::with_capacity_and_hasher(capacity, Default::default()),
            len: 0,
        }
    }

    fn locate(&self, key: &Object) -> Option<(u64, Option<usize>)> {
        let hash = self.hasher.hash(key.as_inner())?;
        let index = self.buckets.get(&hash).and_then(|bucket| {
            bucket
                .iter()
                .position(|(k, _)| self.hasher.eq(k.as_inner(), key.as_inner()) == Some(true))
        });
        Some((hash, index))
    }
}

impl Map for DynamicMap {
    #[inline]
    fn key(&self) -> Type {
        self.key
    }

    #[inline]
    fn value(&self) -> Type {
        self.value
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, key: &Object) -> Option<Object> {
        let (hash, index) = self.locate(key)?;
        Some(self.buckets.get(&hash)?.get(index?)?.1.clone())
    }

    fn insert(&mut self, key: Object, value: Object) -> Result<Option<Object>, CallError> {
        check_element(&self.key, &key)?;
        check_element(&self.value, &value)?;
        let (hash, index) = self
            .locate(&key)
            .ok_or(CallError::NotHashable { ty: key.type_name() })?;
        let bucket = self.buckets.entry(hash).or_default();
        match index.and_then(|i| bucket.get_mut(i)) {
            Some(entry) => Ok(Some(core::mem::replace(&mut entry.1, value))),
            None => {
                bucket.push((key, value));
                self.len += 1;
                Ok(None)
            }
        }
    }

    fn remove(&mut self, key: &Object) -> Option<Object> {
        let (hash, index) = self.locate(key)?;
        let (_, value) = self.buckets.get_mut(&hash)?.swap_remove(index?);
        self.len -= 1;
        Some(value)
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }
}
