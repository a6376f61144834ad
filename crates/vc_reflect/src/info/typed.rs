use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use vc_utils::hash::{HashMap, HashSet};

use crate::info::{Type, TypeKind};
use crate::{Object, Reflect};

// -----------------------------------------------------------------------------
// Typed

/// A static accessor to the [`Type`] of a reflected type.
///
/// Automatically implemented by [`#[derive(Reflect)]`](crate::derive::Reflect).
/// Manual implementations usually only pick a [`TypeKind`].
///
/// # Examples
///
/// ```
/// use vc_reflect::info::{Typed, TypeKind};
///
/// #[derive(Clone, Debug)]
/// struct Handle(u32);
///
/// impl Typed for Handle {
///     const KIND: TypeKind = TypeKind::Reference;
/// }
///
/// assert!(Handle::ty().is_reference());
/// ```
pub trait Typed: Reflect + Clone {
    /// How values of this type are held.
    const KIND: TypeKind = TypeKind::Value;

    /// Returns the [`Type`] of `Self`.
    #[inline]
    fn ty() -> Type {
        Type::with_kind::<Self>(Self::KIND)
    }
}

macro_rules! impl_typed_value {
    ($($ty:ty),* $(,)?) => {
        $(impl Typed for $ty {})*
    };
}

impl_typed_value!(
    (), bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
    String, &'static str,
);

impl Typed for Object {
    const KIND: TypeKind = TypeKind::Object;
}

impl<T: ?Sized + Send + Sync + Debug + 'static> Typed for Arc<T> {
    const KIND: TypeKind = TypeKind::Reference;
}

impl<T: Typed + Debug> Typed for Vec<T> {}

impl<T: Typed + Debug> Typed for Box<[T]> {}

impl<T: Typed + Debug> Typed for Option<T> {}

impl<T: Typed + Debug + Eq + Hash> Typed for HashSet<T> {}

impl<K: Typed + Debug + Eq + Hash, V: Typed + Debug> Typed for HashMap<K, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_kinds() {
        assert!(i32::ty().is_value());
        assert!(String::ty().is_value());
        assert!(Object::ty().is_object());
        assert!(Arc::<str>::ty().is_reference());
        assert!(!Arc::<str>::ty().is_object());
        assert_eq!(Vec::<u8>::ty().name(), "Vec<u8>");
    }
}
