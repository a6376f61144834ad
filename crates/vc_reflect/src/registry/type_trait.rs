use core::any::Any;

/// A capability attached to a registered type, stored in its [`TypeMeta`].
///
/// Type traits are usually created through [`FromType`] so that the
/// functions inside are monomorphized for the type they describe.
///
/// [`TypeMeta`]: crate::registry::TypeMeta
/// [`FromType`]: crate::registry::FromType
pub trait TypeTrait: Any + Send + Sync {}

impl dyn TypeTrait {
    #[inline]
    pub fn downcast_ref<T: TypeTrait>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref()
    }

    #[inline]
    pub fn downcast_mut<T: TypeTrait>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut()
    }
}
