use alloc::sync::Arc;
use core::fmt;

use crate::info::{Type, Typed};
use crate::{CallError, Object};

/// A registered implicit conversion from `source` to `target`.
///
/// Upcasts model reference assignability between distinct types, such as a
/// concrete handle converting into a trait-object handle. Conversions to
/// [`Object`] are implicit and never registered.
#[derive(Clone)]
pub struct Upcast {
    source: Type,
    target: Type,
    cast: Arc<dyn Fn(Object) -> Result<Object, CallError> + Send + Sync>,
}

impl Upcast {
    pub fn new<S: Typed, D: Typed>(cast: impl Fn(S) -> D + Send + Sync + 'static) -> Self {
        Self {
            source: S::ty(),
            target: D::ty(),
            cast: Arc::new(move |object| Ok(Object::new(cast(object.take_as::<S>()?)))),
        }
    }

    #[inline]
    pub fn source(&self) -> Type {
        self.source
    }

    #[inline]
    pub fn target(&self) -> Type {
        self.target
    }

    /// Converts `object`, which must hold a `source` value.
    #[inline]
    pub fn apply(&self, object: Object) -> Result<Object, CallError> {
        (self.cast)(object)
    }
}

impl fmt::Debug for Upcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Upcast({} -> {})", self.source, self.target)
    }
}
