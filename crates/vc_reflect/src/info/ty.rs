use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::{PoisonError, RwLock};

use vc_utils::TypeIdMap;

use crate::Object;
use crate::info::Typed;

// -----------------------------------------------------------------------------
// TypeKind

/// How values of a type are held.
///
/// Value types are stored inline. Reference types are shared handles
/// (`Arc<T>` and types marked `#[reflect(reference)]`).
/// [`Object`] is the universal reference type every value is assignable to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Value,
    Reference,
    Object,
}

// -----------------------------------------------------------------------------
// Type

/// Identity and classification of a reflected type.
///
/// Equality and hashing only consider the [`TypeId`].
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, info::Type};
///
/// let ty = Type::of::<Vec<String>>();
/// assert!(ty.is_value());
/// assert_eq!(ty.name(), "Vec<String>");
///
/// assert!(Type::of::<Object>().is_object());
/// ```
#[derive(Clone, Copy)]
pub struct Type {
    id: TypeId,
    path: &'static str,
    kind: TypeKind,
}

impl Type {
    /// Returns the [`Type`] of `T`.
    #[inline]
    pub fn of<T: Typed>() -> Self {
        T::ty()
    }

    /// Creates a [`Type`] for `T` with the given kind.
    ///
    /// Usually only called by [`Typed::ty`].
    #[inline]
    pub fn with_kind<T: Any + ?Sized>(kind: TypeKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: core::any::type_name::<T>(),
            kind,
        }
    }

    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// The full type path, e.g. `alloc::vec::Vec<alloc::string::String>`.
    #[inline(always)]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// The path with module prefixes removed, e.g. `Vec<String>`.
    pub fn name(&self) -> &'static str {
        short_name(self.id, self.path)
    }

    #[inline(always)]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub const fn is_value(&self) -> bool {
        matches!(self.kind, TypeKind::Value)
    }

    /// Returns `true` for reference types, including [`Object`].
    #[inline]
    pub const fn is_reference(&self) -> bool {
        !self.is_value()
    }

    #[inline]
    pub const fn is_object(&self) -> bool {
        matches!(self.kind, TypeKind::Object)
    }

    /// Returns `true` if this is the type `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Returns `true` if `object` holds a value of exactly this type,
    /// or if this is [`Object`].
    #[inline]
    pub fn accepts(&self, object: &Object) -> bool {
        self.is_object() || object.ty_id() == self.id
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.path)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// Short names

/// Generic types share one static, so the cache is keyed by [`TypeId`].
static SHORT_NAMES: RwLock<TypeIdMap<&'static str>> = RwLock::new(TypeIdMap::new());

fn short_name(id: TypeId, path: &'static str) -> &'static str {
    if !path.contains("::") {
        return path;
    }
    if let Some(name) = SHORT_NAMES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
    {
        return *name;
    }
    let mut names = SHORT_NAMES.write().unwrap_or_else(PoisonError::into_inner);
    *names.get_or_insert(id, || &*Box::leak(strip_modules(path).into_boxed_str()))
}

fn strip_modules(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut segment_start = 0;
    let mut chars = path.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
        } else if c.is_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push(c);
            segment_start = out.len();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_modules_keeps_generics() {
        assert_eq!(
            strip_modules("alloc::vec::Vec<alloc::string::String>"),
            "Vec<String>"
        );
        assert_eq!(
            strip_modules("(core::option::Option<i32>, &str)"),
            "(Option<i32>, &str)"
        );
        assert_eq!(strip_modules("u8"), "u8");
    }

    #[test]
    fn equality_ignores_kind() {
        let a = Type::with_kind::<u8>(TypeKind::Value);
        let b = Type::with_kind::<u8>(TypeKind::Reference);
        assert_eq!(a, b);
        assert_eq!(a.name(), "u8");
    }
}
