use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::info::Typed;
use crate::ops::List;
use crate::registry::{FromType, TypeTrait};

/// Creates empty `Vec<T>` lists.
///
/// Inserted by [`TypeMeta::of`](crate::registry::TypeMeta::of) for every type.
#[derive(Clone)]
pub struct TypeTraitList {
    func: fn(usize) -> Box<dyn List>,
}

impl TypeTraitList {
    #[inline]
    pub fn constructor(&self) -> fn(usize) -> Box<dyn List> {
        self.func
    }

    #[inline]
    pub fn new_list(&self, capacity: usize) -> Box<dyn List> {
        (self.func)(capacity)
    }
}

impl<T: Typed + Debug> FromType<T> for TypeTraitList {
    fn from_type() -> Self {
        Self {
            func: |capacity| Box::new(Vec::<T>::with_capacity(capacity)),
        }
    }
}

impl TypeTrait for TypeTraitList {}
