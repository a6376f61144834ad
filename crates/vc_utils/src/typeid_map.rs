use core::any::TypeId;
use core::fmt::Debug;

use hashbrown::hash_map::Entry;

use crate::hash::{NoOpHashMap, NoOpHashState};

// -----------------------------------------------------------------------------
// TypeIdMap

/// Per-type tables: registered type metadata, trait tables, cached names.
///
/// Keys are hashed with [`NoOpHashState`].
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use vc_utils::TypeIdMap;
///
/// let mut names = TypeIdMap::new();
/// let id = TypeId::of::<u32>();
/// assert_eq!(*names.get_or_insert(id, || "u32"), "u32");
/// assert_eq!(*names.get_or_insert(id, || "other"), "u32");
/// assert!(!names.contains(&TypeId::of::<u8>()));
/// ```
pub struct TypeIdMap<V>(NoOpHashMap<TypeId, V>);

impl<V> TypeIdMap<V> {
    #[inline]
    pub const fn new() -> Self {
        Self(NoOpHashMap::with_hasher(NoOpHashState))
    }

    /// Returns the entry for `id`, creating it with `init` when missing.
    #[inline]
    pub fn get_or_insert(&mut self, id: TypeId, init: impl FnOnce() -> V) -> &mut V {
        match self.0.entry(id) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => slot.insert(init()),
        }
    }

    #[inline]
    pub fn get(&self, id: &TypeId) -> Option<&V> {
        self.0.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: &TypeId) -> Option<&mut V> {
        self.0.get_mut(id)
    }

    /// Stores `value` under `id` and hands back whatever was there.
    #[inline]
    pub fn insert(&mut self, id: TypeId, value: V) -> Option<V> {
        self.0.insert(id, value)
    }

    #[inline]
    pub fn remove(&mut self, id: &TypeId) -> Option<V> {
        self.0.remove(id)
    }

    #[inline]
    pub fn contains(&self, id: &TypeId) -> bool {
        self.0.contains_key(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Values in no particular order.
    #[inline]
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.0.values()
    }
}

impl<V> Default for TypeIdMap<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Debug> Debug for TypeIdMap<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use super::TypeIdMap;

    #[test]
    fn replace_and_remove() {
        let mut map = TypeIdMap::default();
        let id = TypeId::of::<i64>();
        assert_eq!(map.insert(id, 1), None);
        assert_eq!(map.insert(id, 2), Some(1));
        *map.get_mut(&id).unwrap() += 1;
        assert_eq!(map.get(&id), Some(&3));
        assert_eq!(map.values().len(), 1);
        assert_eq!(map.remove(&id), Some(3));
        assert_eq!(map.len(), 0);
    }
}
