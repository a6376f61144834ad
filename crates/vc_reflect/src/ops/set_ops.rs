use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use vc_utils::hash::{HashSet, NoOpHashMap};

use crate::info::{Type, Typed};
use crate::ops::{ReflectHash, check_element};
use crate::{CallError, Object, Reflect};

// -----------------------------------------------------------------------------
// Set

/// A set of unique elements.
pub trait Set: Reflect {
    /// The declared element type.
    fn element(&self) -> Type;

    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `false` for values of another type.
    fn contains(&self, value: &Object) -> bool;

    /// Returns `true` if the value was not present.
    fn insert(&mut self, value: Object) -> Result<bool, CallError>;

    /// Returns `true` if the value was present.
    fn remove(&mut self, value: &Object) -> bool;

    fn clear(&mut self);
}

impl<T: Typed + Debug + Eq + Hash> Set for HashSet<T> {
    #[inline]
    fn element(&self) -> Type {
        T::ty()
    }

    #[inline]
    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn contains(&self, value: &Object) -> bool {
        value.downcast_ref::<T>().is_some_and(|value| HashSet::contains(self, value))
    }

    fn insert(&mut self, value: Object) -> Result<bool, CallError> {
        Ok(HashSet::insert(self, value.take_as::<T>()?))
    }

    fn remove(&mut self, value: &Object) -> bool {
        value.downcast_ref::<T>().is_some_and(|value| HashSet::remove(self, value))
    }

    #[inline]
    fn clear(&mut self) {
        HashSet::clear(self);
    }
}

// -----------------------------------------------------------------------------
// DynamicSet

/// A set of [`Object`]s hashed through a [`ReflectHash`].
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, info::Typed, ops::{DynamicSet, ReflectHash, Set}};
///
/// let mut set = DynamicSet::new(u16::ty(), ReflectHash::of::<u16>());
/// assert_eq!(set.insert(Object::new(1_u16)), Ok(true));
/// assert_eq!(set.insert(Object::new(1_u16)), Ok(false));
/// assert!(set.contains(&Object::new(1_u16)));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct DynamicSet {
    element: Type,
    hasher: ReflectHash,
    buckets: NoOpHashMap<u64, Vec<Object>>,
    len: usize,
}

impl DynamicSet {
    pub fn new(element: Type, hasher: ReflectHash) -> Self {
        Self::with_capacity(element, hasher, 0)
    }

    pub fn with_capacity(element: Type, hasher: ReflectHash, capacity: usize) -> Self {
        Self {
            element,
            hasher,
            buckets: NoOpHashMap::with_capacity_and_hasher(capacity, Default::default()),
            len: 0,
        }
    }

    fn position(&self, hash: u64, value: &Object) -> Option<usize> {
        self.buckets.get(&hash)?.iter().position(|item| {
            self.hasher.eq(item.as_inner(), value.as_inner()) == Some(true)
        })
    }
}

impl Set for DynamicSet {
    #[inline]
    fn element(&self) -> Type {
        self.element
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn contains(&self, value: &Object) -> bool {
        self.hasher
            .hash(value.as_inner())
            .is_some_and(|hash| self.position(hash, value).is_some())
    }

    fn insert(&mut self, value: Object) -> Result<bool, CallError> {
        check_element(&self.element, &value)?;
        let hash = self
            .hasher
            .hash(value.as_inner())
            .ok_or(CallError::NotHashable { ty: value.type_name() })?;
        if self.position(hash, &value).is_some() {
            return Ok(false);
        }
        self.buckets.entry(hash).or_default().push(value);
        self.len += 1;
        Ok(true)
    }

    fn remove(&mut self, value: &Object) -> bool {
        let Some(hash) = self.hasher.hash(value.as_inner()) else {
            return false;
        };
        let Some(index) = self.position(hash, value) else {
            return false;
        };
        if let Some(bucket) = self.buckets.get_mut(&hash) {
            bucket.swap_remove(index);
        }
        self.len -= 1;
        true
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }
}
