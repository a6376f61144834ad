use core::hash::{BuildHasher, Hash};

use vc_utils::hash::FixedHashState;

use crate::Reflect;

/// Type-erased `Hash` and `Eq` for one element type.
///
/// Both functions return `None` when a value is not of that type.
///
/// # Examples
///
/// ```
/// use vc_reflect::ops::ReflectHash;
///
/// let hash = ReflectHash::of::<u32>();
/// assert_eq!(hash.hash(&1_u32), hash.hash(&1_u32));
/// assert_eq!(hash.eq(&1_u32, &2_u32), Some(false));
/// assert_eq!(hash.hash(&1_i8), None);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ReflectHash {
    hash: fn(&dyn Reflect) -> Option<u64>,
    eq: fn(&dyn Reflect, &dyn Reflect) -> Option<bool>,
}

impl ReflectHash {
    pub fn of<T: Reflect + Eq + Hash>() -> Self {
        Self {
            hash: |value| Some(FixedHashState.hash_one(value.downcast_ref::<T>()?)),
            eq: |a, b| Some(a.downcast_ref::<T>()? == b.downcast_ref::<T>()?),
        }
    }

    /// Hashes nothing, so every insertion fails with `NotHashable`.
    pub fn unhashable() -> Self {
        Self {
            hash: |_| None,
            eq: |_, _| None,
        }
    }

    #[inline]
    pub fn hash(&self, value: &dyn Reflect) -> Option<u64> {
        (self.hash)(value)
    }

    #[inline]
    pub fn eq(&self, a: &dyn Reflect, b: &dyn Reflect) -> Option<bool> {
        (self.eq)(a, b)
    }
}
