use alloc::boxed::Box;
use core::fmt::Debug;
use core::hash::Hash;

use vc_utils::hash::{FixedHashState, HashSet};

use crate::info::Typed;
use crate::ops::{ReflectHash, Set};
use crate::registry::{FromType, TypeTrait};
use crate::{CallError, Object, Reflect};

/// `Eq + Hash` support for a registered type.
///
/// Provides the [`ReflectHash`] used by dynamic sets and dictionaries,
/// and typed `HashSet<T>` creation and mutation.
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, Reflect, ops::Set, registry::{FromType, TypeTraitHash}};
///
/// let hash = <TypeTraitHash as FromType<u32>>::from_type();
/// let mut set = hash.new_set(0);
///
/// assert_eq!(hash.add(set.as_reflect_mut(), Object::new(3_u32)), Ok(true));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Clone)]
pub struct TypeTraitHash {
    hasher: ReflectHash,
    new_set: fn(usize) -> Box<dyn Set>,
    add: fn(&mut dyn Reflect, Object) -> Result<bool, CallError>,
    clear: fn(&mut dyn Reflect) -> Result<(), CallError>,
}

impl TypeTraitHash {
    #[inline]
    pub fn hasher(&self) -> ReflectHash {
        self.hasher
    }

    #[inline]
    pub fn set_constructor(&self) -> fn(usize) -> Box<dyn Set> {
        self.new_set
    }

    #[inline]
    pub fn new_set(&self, capacity: usize) -> Box<dyn Set> {
        (self.new_set)(capacity)
    }

    /// Inserts into a `HashSet<T>`.
    ///
    /// Fails with [`CallError::InvalidCast`] if `target` is not a `HashSet<T>`
    /// or `value` is not a `T`.
    #[inline]
    pub fn add(&self, target: &mut dyn Reflect, value: Object) -> Result<bool, CallError> {
        (self.add)(target, value)
    }

    /// Returns the typed insertion function, see [`TypeTraitHash::add`].
    #[inline]
    pub fn adder(&self) -> fn(&mut dyn Reflect, Object) -> Result<bool, CallError> {
        self.add
    }

    /// Returns the typed clearing function of `HashSet<T>`.
    #[inline]
    pub fn clearer(&self) -> fn(&mut dyn Reflect) -> Result<(), CallError> {
        self.clear
    }
}

fn typed_set<T: Typed + Debug + Eq + Hash>(
    target: &mut dyn Reflect,
) -> Result<&mut HashSet<T>, CallError> {
    let from = target.reflect_type_name();
    target
        .downcast_mut::<HashSet<T>>()
        .ok_or_else(|| CallError::invalid_cast(from, core::any::type_name::<HashSet<T>>()))
}

impl<T: Typed + Debug + Eq + Hash> FromType<T> for TypeTraitHash {
    fn from_type() -> Self {
        Self {
            hasher: ReflectHash::of::<T>(),
            new_set: |capacity| Box::new(HashSet::<T>::with_capacity_and_hasher(capacity, FixedHashState)),
            add: |target, value| {
                let value = value.take_as::<T>()?;
                Ok(typed_set::<T>(target)?.insert(value))
            },
            clear: |target| {
                typed_set::<T>(target)?.clear();
                Ok(())
            },
        }
    }
}

impl TypeTrait for TypeTraitHash {}
