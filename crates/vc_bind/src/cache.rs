use alloc::sync::Arc;
use core::any::Any;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

use vc_utils::hash::{Hashed, NoOpHashState, PreHashConcurrentMap, PreHashConcurrentSet};

use crate::{Category, CapabilityKey, Strategy, Subject};

// -----------------------------------------------------------------------------
// BindingCache

/// Built bindings and failed strategies, keyed by [`CapabilityKey`].
///
/// Lookups never take a global lock. When two threads build the same key,
/// the first insertion wins and both get the stored binding back.
///
/// A key recorded as unavailable stays so until it is cleared; the failing
/// strategy is never attempted again for it.
pub struct BindingCache {
    bindings: PreHashConcurrentMap<CapabilityKey, Arc<dyn Any + Send + Sync>>,
    unavailable: PreHashConcurrentSet<CapabilityKey>,
    attempts: [AtomicUsize; 3],
}

impl BindingCache {
    pub fn new() -> Self {
        Self {
            bindings: PreHashConcurrentMap::with_hasher(NoOpHashState),
            unavailable: PreHashConcurrentSet::with_hasher(NoOpHashState),
            attempts: [const { AtomicUsize::new(0) }; 3],
        }
    }

    /// Returns the binding stored under `key`.
    ///
    /// `B` is the binding type of the key's shape.
    pub fn get<B: Clone + 'static>(&self, key: &Hashed<CapabilityKey>) -> Option<B> {
        let entry = self.bindings.get(key)?;
        entry.value().downcast_ref::<B>().cloned()
    }

    /// Stores `binding` unless another one got there first, and returns the
    /// stored binding.
    pub fn insert<B: Clone + Send + Sync + 'static>(&self, key: Hashed<CapabilityKey>, binding: B) -> B {
        let entry = self
            .bindings
            .entry(key)
            .or_insert_with(|| Arc::new(binding.clone()));
        entry.value().downcast_ref::<B>().cloned().unwrap_or(binding)
    }

    #[inline]
    pub fn contains(&self, key: &Hashed<CapabilityKey>) -> bool {
        self.bindings.contains_key(key)
    }

    /// Returns `true` if any strategy has a binding for `subject`.
    pub fn contains_subject(&self, category: Category, subject: &Subject) -> bool {
        self.bindings
            .iter()
            .any(|entry| entry.key().category() == category && entry.key().subject() == subject)
    }

    #[inline]
    pub fn is_unavailable(&self, key: &Hashed<CapabilityKey>) -> bool {
        self.unavailable.contains(key)
    }

    /// Returns `true` if `strategy` failed for `subject` with any shape.
    pub fn is_unavailable_for(&self, category: Category, subject: &Subject, strategy: Strategy) -> bool {
        self.unavailable.iter().any(|key| {
            key.category() == category && key.strategy() == strategy && key.subject() == subject
        })
    }

    #[inline]
    pub fn mark_unavailable(&self, key: Hashed<CapabilityKey>) {
        self.unavailable.insert(key);
    }

    #[inline]
    pub(crate) fn record_attempt(&self, strategy: Strategy) {
        self.attempts[strategy.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Number of builds started with `strategy` since the last [`clear_all`](Self::clear_all).
    #[inline]
    pub fn attempts(&self, strategy: Strategy) -> usize {
        self.attempts[strategy.index()].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Drops the bindings and failure records of one category.
    pub fn clear(&self, category: Category) {
        self.bindings.retain(|key, _| key.category() != category);
        self.unavailable.retain(|key| key.category() != category);
    }

    /// Drops everything and resets the attempt counters.
    pub fn clear_all(&self) {
        self.bindings.clear();
        self.unavailable.clear();
        for counter in &self.attempts {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for BindingCache {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BindingCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingCache")
            .field("bindings", &self.bindings.len())
            .field("unavailable", &self.unavailable.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::any::TypeId;

    use vc_reflect::info::{MemberId, MemberKind, Typed};
    use vc_utils::hash::Hashed;

    use super::BindingCache;
    use crate::{Category, CapabilityKey, Strategy, Subject};

    fn key(category: Category, strategy: Strategy) -> Hashed<CapabilityKey> {
        let member = MemberId::new(u8::ty(), MemberKind::Field, "value", &[]);
        Hashed::new(CapabilityKey::new(
            category,
            Subject::member(&member),
            strategy,
            TypeId::of::<u8>(),
        ))
    }

    #[test]
    fn first_insert_wins() {
        let cache = BindingCache::new();
        let first = Arc::new(1_u32);
        let second = Arc::new(2_u32);

        let stored = cache.insert(key(Category::FieldGetter, Strategy::Emit), first.clone());
        assert!(Arc::ptr_eq(&stored, &first));

        let stored = cache.insert(key(Category::FieldGetter, Strategy::Emit), second);
        assert!(Arc::ptr_eq(&stored, &first));

        let cached: Arc<u32> = cache.get(&key(Category::FieldGetter, Strategy::Emit)).unwrap();
        assert!(Arc::ptr_eq(&cached, &first));
        assert!(cache.get::<Arc<u32>>(&key(Category::FieldGetter, Strategy::Expression)).is_none());
    }

    #[test]
    fn clear_by_category() {
        let cache = BindingCache::new();
        cache.insert(key(Category::FieldGetter, Strategy::Emit), 1_u8);
        cache.insert(key(Category::FieldSetter, Strategy::Emit), 2_u8);
        cache.mark_unavailable(key(Category::FieldGetter, Strategy::Expression));
        cache.record_attempt(Strategy::Expression);

        cache.clear(Category::FieldGetter);
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_unavailable(&key(Category::FieldGetter, Strategy::Expression)));
        assert!(cache.contains(&key(Category::FieldSetter, Strategy::Emit)));
        assert_eq!(cache.attempts(Strategy::Expression), 1);

        cache.clear_all();
        assert!(cache.is_empty());
        assert_eq!(cache.attempts(Strategy::Expression), 0);
    }
}
