use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::info::Typed;
use crate::ops::Array;
use crate::registry::{FromType, TypeTrait};

/// Creates `Box<[T]>` arrays filled with `T::default()`.
#[derive(Clone)]
pub struct TypeTraitArray {
    func: fn(usize) -> Box<dyn Array>,
}

impl TypeTraitArray {
    #[inline]
    pub fn constructor(&self) -> fn(usize) -> Box<dyn Array> {
        self.func
    }

    #[inline]
    pub fn new_array(&self, len: usize) -> Box<dyn Array> {
        (self.func)(len)
    }
}

impl<T: Default + Typed + Debug> FromType<T> for TypeTraitArray {
    fn from_type() -> Self {
        Self {
            func: |len| {
                let mut items = Vec::with_capacity(len);
                items.resize_with(len, T::default);
                Box::new(items.into_boxed_slice())
            },
        }
    }
}

impl TypeTrait for TypeTraitArray {}
