//! Build states for the binding caches and registries.
//!
//! [`FixedHashState`] hashes keys with `foldhash` under one seed for the
//! whole process. [`NoOpHashState`] is for keys that already are hashes:
//! `TypeId`s and [`Hashed`](crate::hash::Hashed) values.

use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHashState

const SEED: FixedState = FixedState::with_seed(0x5F3A_91C2_7E44_D0B9);

/// `foldhash` with a constant seed, so equal keys hash equally everywhere.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use vc_utils::hash::FixedHashState;
///
/// assert_eq!(FixedHashState.hash_one("score"), FixedHashState.hash_one("score"));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FoldHasher<'static>;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        SEED.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// NoOpHashState

/// Keeps the last integer written to it as the hash.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    // Only reached by keys that do not write a single integer.
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().rev() {
            self.hash = self.hash.rotate_left(8).wrapping_add(u64::from(byte));
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }

    #[inline]
    fn write_u128(&mut self, i: u128) {
        self.hash = (i as u64) ^ ((i >> 64) as u64);
    }
}

/// Passes pre-computed hashes straight through.
///
/// # Examples
///
/// ```
/// use core::hash::{BuildHasher, Hash, Hasher};
/// use vc_utils::hash::NoOpHashState;
///
/// let mut hasher = NoOpHashState.build_hasher();
/// 42_u64.hash(&mut hasher);
/// assert_eq!(hasher.finish(), 42);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher::default()
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;
    use core::hash::BuildHasher;

    use super::{FixedHashState, NoOpHashState};

    #[test]
    fn type_ids_keep_their_bits() {
        let a = NoOpHashState.hash_one(TypeId::of::<u8>());
        let b = NoOpHashState.hash_one(TypeId::of::<u16>());
        assert_ne!(a, b);
        assert_ne!(a, 0);
    }

    #[test]
    fn fixed_state_is_stable() {
        assert_ne!(FixedHashState.hash_one(1_u32), FixedHashState.hash_one(2_u32));
        assert_eq!(FixedHashState.hash_one((1_u8, "a")), FixedHashState.hash_one((1_u8, "a")));
    }
}
