use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::info::{Type, Typed};
use crate::ops::check_element;
use crate::{CallError, Object, Reflect};

// -----------------------------------------------------------------------------
// Array

/// A fixed-length sequence.
pub trait Array: Reflect {
    /// The declared element type.
    fn element(&self) -> Type;

    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the element, or `None` if out of bounds or unset.
    fn get(&self, index: usize) -> Option<Object>;

    fn set(&mut self, index: usize, value: Object) -> Result<(), CallError>;
}

impl<T: Typed + Debug> Array for Box<[T]> {
    #[inline]
    fn element(&self) -> Type {
        T::ty()
    }

    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn get(&self, index: usize) -> Option<Object> {
        <[T]>::get(self, index).map(|value| Object::new(value.clone()))
    }

    fn set(&mut self, index: usize, value: Object) -> Result<(), CallError> {
        let len = <[T]>::len(self);
        let slot = self
            .get_mut(index)
            .ok_or(CallError::OutOfBounds { index, len })?;
        *slot = value.take_as::<T>()?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// DynamicArray

/// A fixed-length array of [`Object`]s with a declared element type.
///
/// Elements start unset.
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, info::Typed, ops::{Array, DynamicArray}};
///
/// let mut array = DynamicArray::new(u8::ty(), 2);
/// assert!(array.get(0).is_none());
///
/// array.set(1, Object::new(7_u8)).unwrap();
/// assert!(array.set(0, Object::new(7_i64)).is_err());
/// assert_eq!(array.get(1).unwrap().take_as::<u8>(), Ok(7));
/// ```
#[derive(Clone, Debug)]
pub struct DynamicArray {
    element: Type,
    items: Vec<Option<Object>>,
}

impl DynamicArray {
    pub fn new(element: Type, len: usize) -> Self {
        let mut items = Vec::with_capacity(len);
        items.resize_with(len, || None);
        Self { element, items }
    }

    /// Creates an array whose elements are all produced by `fill`.
    ///
    /// `fill` must return values of `element`.
    pub fn filled_with(element: Type, len: usize, mut fill: impl FnMut() -> Object) -> Self {
        let mut items = Vec::with_capacity(len);
        items.resize_with(len, || Some(fill()));
        Self { element, items }
    }
}

impl Array for DynamicArray {
    #[inline]
    fn element(&self) -> Type {
        self.element
    }

    #[inline]
    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize) -> Option<Object> {
        self.items.get(index)?.clone()
    }

    fn set(&mut self, index: usize, value: Object) -> Result<(), CallError> {
        check_element(&self.element, &value)?;
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(CallError::OutOfBounds { index, len })?;
        *slot = Some(value);
        Ok(())
    }
}
