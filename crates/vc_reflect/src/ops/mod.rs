//! Collection interfaces and their dynamic fallbacks.
//!
//! ## Interfaces
//!
//! - [`Array`]: fixed length, e.g. `Box<[T]>`.
//! - [`List`]: growable, e.g. `Vec<T>`.
//! - [`Set`]: hashed set, e.g. `HashSet<T>`.
//! - [`Map`]: hashed dictionary, e.g. `HashMap<K, V>`.
//!
//! ## Dynamic types
//!
//! [`DynamicArray`], [`DynamicList`], [`DynamicSet`] and [`DynamicMap`]
//! hold [`Object`](crate::Object)s and check every element against their
//! declared element type. Hashed dynamic collections take a [`ReflectHash`]
//! for their element or key type.

// -----------------------------------------------------------------------------
// Modules

mod array_ops;
mod list_ops;
mod map_ops;
mod reflect_hash;
mod set_ops;

// -----------------------------------------------------------------------------
// Exports

pub use array_ops::{Array, DynamicArray};
pub use list_ops::{DynamicList, List};
pub use map_ops::{DynamicMap, Map};
pub use reflect_hash::ReflectHash;
pub use set_ops::{DynamicSet, Set};

use crate::info::Type;
use crate::{CallError, Object};

#[inline]
pub(crate) fn check_element(ty: &Type, value: &Object) -> Result<(), CallError> {
    if ty.accepts(value) {
        Ok(())
    } else {
        Err(CallError::invalid_cast(value.type_name(), ty.path()))
    }
}
