use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt::{self, Debug};

use crate::Object;

// -----------------------------------------------------------------------------
// Reflect

/// The dynamic face of a value: type identity, cloning into an [`Object`]
/// and downcasting.
///
/// Implemented for every `'static` value that is `Send + Sync + Clone + Debug`,
/// so it never needs to be implemented by hand.
///
/// Note that [`Any::type_id`] on `Box<dyn Reflect>` returns the id of the box.
/// Use [`Reflect::ty_id`] instead.
///
/// # Examples
///
/// ```
/// use vc_reflect::Reflect;
///
/// let x: &dyn Reflect = &10_i32;
/// assert!(x.is::<i32>());
/// assert_eq!(x.downcast_ref::<i32>(), Some(&10));
/// ```
pub trait Reflect: Any + Send + Sync {
    /// Casts this value to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Casts this value to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Casts this boxed value to `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Casts this value to `&dyn Reflect`.
    fn as_reflect(&self) -> &dyn Reflect;

    /// Casts this value to `&mut dyn Reflect`.
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect;

    /// Clones the value into a new [`Object`].
    fn clone_object(&self) -> Object;

    /// Returns the [`TypeId`] of the underlying type.
    fn ty_id(&self) -> TypeId;

    /// Returns [`core::any::type_name`] of the underlying type.
    fn reflect_type_name(&self) -> &'static str;

    /// Formats the underlying value with its `Debug` implementation.
    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: Any + Send + Sync + Clone + Debug> Reflect for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    #[inline]
    fn as_reflect(&self) -> &dyn Reflect {
        self
    }

    #[inline]
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
        self
    }

    #[inline]
    fn clone_object(&self) -> Object {
        Object::new(self.clone())
    }

    #[inline]
    fn ty_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    #[inline]
    fn reflect_type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    #[inline]
    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl dyn Reflect {
    /// Returns `true` if the underlying value is of type `T`.
    #[inline(always)]
    pub fn is<T: Any>(&self) -> bool {
        self.ty_id() == TypeId::of::<T>()
    }

    /// Downcasts the value to type `T` by reference.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Downcasts the value to type `T` by mutable reference.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Downcasts the value to type `T`, unboxing and consuming the trait object.
    ///
    /// If the underlying value is not of type `T`, returns `Err(self)`.
    pub fn take<T: Any>(self: Box<dyn Reflect>) -> Result<T, Box<dyn Reflect>> {
        if self.is::<T>() {
            #[expect(unsafe_code, reason = "type is already checked")]
            Ok(unsafe { *self.into_any().downcast::<T>().unwrap_unchecked() })
        } else {
            Err(self)
        }
    }
}

impl Debug for dyn Reflect {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reflect_debug(f)
    }
}
