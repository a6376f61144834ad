use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::{CallError, Reflect};

// -----------------------------------------------------------------------------
// Object

/// A boxed value of any reflected type.
///
/// `Object` is the universal type of the host model: every value is
/// assignable to it. An `Object` never directly contains another `Object`,
/// [`Object::new`] flattens such values.
///
/// # Examples
///
/// ```
/// use vc_reflect::Object;
///
/// let object = Object::new(5_u8);
/// assert!(object.is::<u8>());
///
/// let nested = Object::new(object.clone());
/// assert!(nested.is::<u8>());
/// assert_eq!(nested.take::<u8>().ok(), Some(5));
/// ```
pub struct Object(Box<dyn Reflect>);

impl Object {
    /// Boxes a value.
    ///
    /// If `T` is `Object`, the value is returned as is.
    #[inline]
    pub fn new<T: Reflect>(value: T) -> Self {
        match cast_same::<T, Object>(value) {
            Ok(object) => object,
            Err(value) => Self(Box::new(value)),
        }
    }

    /// Wraps an already boxed value, flattening nested objects.
    pub fn from_boxed(boxed: Box<dyn Reflect>) -> Self {
        match boxed.take::<Object>() {
            Ok(object) => object,
            Err(boxed) => Self(boxed),
        }
    }

    /// The `()` object, used as the result of members that return nothing.
    #[inline]
    pub fn unit() -> Self {
        Self(Box::new(()))
    }

    /// Returns the [`TypeId`] of the boxed value.
    #[inline]
    pub fn ty_id(&self) -> TypeId {
        self.0.ty_id()
    }

    /// Returns the type name of the boxed value.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.0.reflect_type_name()
    }

    /// Returns `true` if the boxed value is of type `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.0.downcast_mut()
    }

    /// Unboxes the value, or returns `self` if it is not a `T`.
    ///
    /// Unlike [`Object::take_as`], this never treats `T = Object` specially.
    pub fn take<T: Any>(self) -> Result<T, Self> {
        self.0.take::<T>().map_err(Self)
    }

    /// Converts the object to `T` with a checked unbox.
    ///
    /// `T = Object` always succeeds. Any other `T` must match the runtime
    /// type exactly, otherwise [`CallError::InvalidCast`] is returned.
    pub fn take_as<T: Reflect>(self) -> Result<T, CallError> {
        match cast_same::<Object, T>(self) {
            Ok(value) => Ok(value),
            Err(object) => object
                .take::<T>()
                .map_err(|object| CallError::invalid_cast(object.type_name(), core::any::type_name::<T>())),
        }
    }

    /// Clones the object out as `T` with a checked unbox.
    ///
    /// See [`Object::take_as`].
    pub fn clone_as<T: Reflect + Clone>(&self) -> Result<T, CallError> {
        if TypeId::of::<T>() == TypeId::of::<Object>() {
            return self.clone().take_as::<T>();
        }
        self.downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| CallError::invalid_cast(self.type_name(), core::any::type_name::<T>()))
    }

    /// Returns the boxed value as `&dyn Reflect`.
    #[inline]
    pub fn as_inner(&self) -> &dyn Reflect {
        &*self.0
    }

    /// Returns the boxed value as `&mut dyn Reflect`.
    #[inline]
    pub fn as_inner_mut(&mut self) -> &mut dyn Reflect {
        &mut *self.0
    }

    /// Returns the box.
    #[inline]
    pub fn into_inner(self) -> Box<dyn Reflect> {
        self.0
    }
}

impl Clone for Object {
    #[inline]
    fn clone(&self) -> Self {
        self.0.clone_object()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Object").field(&self.0).finish()
    }
}

// -----------------------------------------------------------------------------
// Helpers

/// Moves `value` into `D` if `S` and `D` are the same type.
///
/// # Examples
///
/// ```
/// use vc_reflect::cast_same;
///
/// assert_eq!(cast_same::<i32, i32>(1), Ok(1));
/// assert_eq!(cast_same::<i32, u32>(1), Err(1));
/// ```
pub fn cast_same<S: Any, D: Any>(value: S) -> Result<D, S> {
    let mut slot = Some(value);
    if let Some(same) = (&mut slot as &mut dyn Any).downcast_mut::<Option<D>>()
        && let Some(value) = same.take()
    {
        return Ok(value);
    }
    match slot {
        Some(value) => Err(value),
        None => unreachable!(),
    }
}

/// Returns the value a receiver of type `T` stands for.
///
/// For `T = Object` this is the boxed value, otherwise it is `value` itself.
#[inline]
pub fn reflect_ref<T: Reflect>(value: &T) -> &dyn Reflect {
    match (value as &dyn Any).downcast_ref::<Object>() {
        Some(object) => object.as_inner(),
        None => value,
    }
}

/// Mutable version of [`reflect_ref`].
///
/// Mutating through an `Object` receiver writes into the boxed value in place.
#[inline]
pub fn reflect_mut<T: Reflect>(value: &mut T) -> &mut dyn Reflect {
    if TypeId::of::<T>() == TypeId::of::<Object>() {
        match (value as &mut dyn Any).downcast_mut::<Object>() {
            Some(object) => object.as_inner_mut(),
            None => unreachable!(),
        }
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn object_never_nests() {
        let inner = Object::new(String::from("a"));
        let outer = Object::new(inner);
        assert!(outer.is::<String>());

        let boxed: Box<dyn Reflect> = Box::new(outer.clone());
        assert!(Object::from_boxed(boxed).is::<String>());
    }

    #[test]
    fn take_as_checks_type() {
        assert_eq!(Object::new(3_i32).take_as::<i32>(), Ok(3));
        assert!(Object::new(3_i32).take_as::<Object>().is_ok());
        assert_eq!(
            Object::new(3_i32).take_as::<i64>(),
            Err(CallError::invalid_cast("i32", "i64"))
        );
    }

    #[test]
    fn reflect_mut_unwraps_object() {
        let mut object = Object::new(1_u32);
        *reflect_mut(&mut object).downcast_mut::<u32>().unwrap() = 9;
        assert_eq!(object.downcast_ref::<u32>(), Some(&9));

        let mut plain = 4_u32;
        assert!(reflect_mut(&mut plain).is::<u32>());
    }
}
