use alloc::vec::Vec;
use core::fmt::Debug;

use crate::info::{Type, Typed};
use crate::ops::check_element;
use crate::{CallError, Object, Reflect};

// -----------------------------------------------------------------------------
// List

/// A growable sequence.
pub trait List: Reflect {
    /// The declared element type.
    fn element(&self) -> Type;

    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    /// Returns a copy of the element at `index`.
    fn get(&self, index: usize) -> Option<Object>;

    fn push(&mut self, value: Object) -> Result<(), CallError>;

    fn pop(&mut self) -> Option<Object>;

    fn clear(&mut self);
}

impl<T: Typed + Debug> List for Vec<T> {
    #[inline]
    fn element(&self) -> Type {
        T::ty()
    }

    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        Vec::capacity(self)
    }

    fn get(&self, index: usize) -> Option<Object> {
        <[T]>::get(self, index).map(|value| Object::new(value.clone()))
    }

    fn push(&mut self, value: Object) -> Result<(), CallError> {
        Vec::push(self, value.take_as::<T>()?);
        Ok(())
    }

    fn pop(&mut self) -> Option<Object> {
        Vec::pop(self).map(Object::new)
    }

    #[inline]
    fn clear(&mut self) {
        Vec::clear(self);
    }
}

// -----------------------------------------------------------------------------
// DynamicList

/// A growable list of [`Object`]s with a declared element type.
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, info::Typed, ops::{DynamicList, List}};
///
/// let mut list = DynamicList::with_capacity(String::ty(), 4);
/// assert!(list.is_empty());
/// assert!(list.capacity() >= 4);
///
/// list.push(Object::new(String::from("a"))).unwrap();
/// assert!(list.push(Object::new(1_u8)).is_err());
/// assert_eq!(list.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct DynamicList {
    element: Type,
    items: Vec<Object>,
}

impl DynamicList {
    #[inline]
    pub fn new(element: Type) -> Self {
        Self::with_capacity(element, 0)
    }

    #[inline]
    pub fn with_capacity(element: Type, capacity: usize) -> Self {
        Self {
            element,
            items: Vec::with_capacity(capacity),
        }
    }
}

impl List for DynamicList {
    #[inline]
    fn element(&self) -> Type {
        self.element
    }

    #[inline]
    fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.items.capacity()
    }

    fn get(&self, index: usize) -> Option<Object> {
        self.items.as_slice().get(index).cloned()
    }

    fn push(&mut self, value: Object) -> Result<(), CallError> {
        check_element(&self.element, &value)?;
        self.items.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Option<Object> {
        self.items.pop()
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}
