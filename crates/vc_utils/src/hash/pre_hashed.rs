use core::fmt::Debug;
use core::hash::{BuildHasher, Hash, Hasher};
use core::ops::Deref;

use crate::hash::{ConcurrentMap, ConcurrentSet, FixedHashState, NoOpHashState};

// -----------------------------------------------------------------------------
// Hashed

/// A value paired with its pre-computed [`FixedHashState`] hash.
///
/// Composite keys are hashed once on construction; table lookups then only
/// pass the stored `u64` through [`NoOpHashState`]. Equality short-circuits
/// on the hash before comparing values.
///
/// # Examples
///
/// ```
/// use vc_utils::hash::Hashed;
///
/// let a = Hashed::new(("Player", "score"));
/// let b = Hashed::new(("Player", "score"));
/// assert_eq!(a, b);
/// assert_eq!(a.hash(), b.hash());
/// ```
pub struct Hashed<V> {
    hash: u64,
    value: V,
}

impl<V: Hash> Hashed<V> {
    /// Pre-hashes the given value using the [`FixedHashState`].
    #[inline]
    pub fn new(value: V) -> Self {
        Self {
            hash: FixedHashState.hash_one(&value),
            value,
        }
    }
}

impl<V> Hashed<V> {
    /// Return the pre-computed hash.
    #[inline(always)]
    pub const fn hash(&self) -> u64 {
        self.hash
    }

    /// Extract internal value.
    #[inline(always)]
    pub fn into_inner(self) -> V {
        self.value
    }
}

impl<V> Hash for Hashed<V> {
    #[inline]
    fn hash<R: Hasher>(&self, state: &mut R) {
        state.write_u64(self.hash);
    }
}

impl<V> Deref for Hashed<V> {
    type Target = V;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<V: PartialEq> PartialEq for Hashed<V> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.value.eq(&other.value)
    }
}

impl<V: Eq> Eq for Hashed<V> {}

impl<V: Debug> Debug for Hashed<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hashed")
            .field("hash", &self.hash)
            .field("value", &self.value)
            .finish()
    }
}

impl<V: Clone> Clone for Hashed<V> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            hash: self.hash,
            value: self.value.clone(),
        }
    }
}

// -----------------------------------------------------------------------------
// Concurrent containers

/// A [`ConcurrentMap`] pre-configured to use [`Hashed`] keys.
pub type PreHashConcurrentMap<K, V> = ConcurrentMap<Hashed<K>, V, NoOpHashState>;

/// A [`ConcurrentSet`] pre-configured to use [`Hashed`] keys.
pub type PreHashConcurrentSet<K> = ConcurrentSet<Hashed<K>, NoOpHashState>;

#[cfg(test)]
mod tests {
    use super::{Hashed, PreHashConcurrentMap};
    use crate::hash::NoOpHashState;

    #[test]
    fn equal_values_share_hash() {
        let a = Hashed::new((1_u32, "a"));
        let b = Hashed::new((1_u32, "a"));
        let c = Hashed::new((2_u32, "a"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(*a, (1, "a"));
    }

    #[test]
    fn concurrent_map_first_insert_wins() {
        let map: PreHashConcurrentMap<&str, u32> =
            PreHashConcurrentMap::with_hasher(NoOpHashState);

        let first = *map.entry(Hashed::new("k")).or_insert(1);
        let second = *map.entry(Hashed::new("k")).or_insert(2);

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(map.len(), 1);
    }
}
