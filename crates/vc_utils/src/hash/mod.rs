//! Provide hash containers, re-exports *hashbrown*, *foldhash* and *dashmap*.
//!
//! - [`HashMap`] / [`HashSet`]: single-threaded containers with [`FixedHashState`].
//! - [`ConcurrentMap`] / [`ConcurrentSet`]: sharded containers for shared state.
//! - [`Hashed`]: a key carrying its pre-computed hash, used by [`PreHashConcurrentMap`].

// -----------------------------------------------------------------------------
// Modules

mod hasher;
mod pre_hashed;

// -----------------------------------------------------------------------------
// Exports

pub use hasher::FixedHashState;
pub use hasher::{NoOpHashState, NoOpHasher};

pub use pre_hashed::{Hashed, PreHashConcurrentMap, PreHashConcurrentSet};

/// A [`hashbrown::HashMap`] using [`FixedHashState`] by default.
///
/// Create one with `HashMap::default()` or `HashMap::with_hasher(FixedHashState)`.
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`] by default.
pub type HashSet<T, S = FixedHashState> = hashbrown::HashSet<T, S>;

/// A [`hashbrown::HashMap`] using [`NoOpHashState`], for keys that are already hashes.
pub type NoOpHashMap<K, V> = hashbrown::HashMap<K, V, NoOpHashState>;

/// A sharded concurrent map using [`FixedHashState`] by default.
///
/// Reads take a shard read-lock only; "insert if absent" is atomic per key.
pub type ConcurrentMap<K, V, S = FixedHashState> = dashmap::DashMap<K, V, S>;

/// A sharded concurrent set using [`FixedHashState`] by default.
pub type ConcurrentSet<T, S = FixedHashState> = dashmap::DashSet<T, S>;

// -----------------------------------------------------------------------------
// Re-export crates

pub use dashmap;
pub use foldhash;
pub use hashbrown;
