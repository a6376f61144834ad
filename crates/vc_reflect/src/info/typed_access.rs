//! Statically typed accessors kept next to a member's dynamic implementation.
//!
//! Registering a member with concrete Rust types monomorphizes these at
//! registration time. Binders recover them by downcasting
//! [`typed_access`](crate::info::FieldInfo::typed_access) to the exact
//! accessor type, which only succeeds when every requested type matches
//! the declared one.

use alloc::sync::Arc;

/// Accessors of an instance field or property of `I` with value `F`.
pub struct InstanceAccess<I, F> {
    pub(crate) get: Option<Arc<dyn Fn(&I) -> F + Send + Sync>>,
    pub(crate) set: Option<Arc<dyn Fn(&mut I, F) + Send + Sync>>,
}

impl<I, F> InstanceAccess<I, F> {
    #[inline]
    pub fn getter(&self) -> Option<&Arc<dyn Fn(&I) -> F + Send + Sync>> {
        self.get.as_ref()
    }

    #[inline]
    pub fn setter(&self) -> Option<&Arc<dyn Fn(&mut I, F) + Send + Sync>> {
        self.set.as_ref()
    }
}

/// Accessors of a static field or property with value `F`.
pub struct StaticAccess<F> {
    pub(crate) get: Option<Arc<dyn Fn() -> F + Send + Sync>>,
    pub(crate) set: Option<Arc<dyn Fn(F) + Send + Sync>>,
}

impl<F> StaticAccess<F> {
    #[inline]
    pub fn getter(&self) -> Option<&Arc<dyn Fn() -> F + Send + Sync>> {
        self.get.as_ref()
    }

    #[inline]
    pub fn setter(&self) -> Option<&Arc<dyn Fn(F) + Send + Sync>> {
        self.set.as_ref()
    }
}

/// Accessors of a single-index indexer of `I` with index `X` and value `F`.
pub struct IndexerAccess<I, X, F> {
    pub(crate) get: Option<Arc<dyn Fn(&I, X) -> F + Send + Sync>>,
    pub(crate) set: Option<Arc<dyn Fn(&mut I, X, F) + Send + Sync>>,
}

impl<I, X, F> IndexerAccess<I, X, F> {
    #[inline]
    pub fn getter(&self) -> Option<&Arc<dyn Fn(&I, X) -> F + Send + Sync>> {
        self.get.as_ref()
    }

    #[inline]
    pub fn setter(&self) -> Option<&Arc<dyn Fn(&mut I, X, F) + Send + Sync>> {
        self.set.as_ref()
    }
}

/// An instance method of `I`.
pub struct MethodAccess<I, Args, R> {
    pub(crate) call: Arc<dyn Fn(&mut I, Args) -> R + Send + Sync>,
}

impl<I, Args, R> MethodAccess<I, Args, R> {
    #[inline]
    pub fn call(&self) -> &Arc<dyn Fn(&mut I, Args) -> R + Send + Sync> {
        &self.call
    }
}

/// A static method or constructor.
pub struct FunctionAccess<Args, R> {
    pub(crate) call: Arc<dyn Fn(Args) -> R + Send + Sync>,
}

impl<Args, R> FunctionAccess<Args, R> {
    #[inline]
    pub fn call(&self) -> &Arc<dyn Fn(Args) -> R + Send + Sync> {
        &self.call
    }
}
